use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use baikal::configuration::get_configuration;
use baikal::domain::entities::document_match::DocumentMatch;
use baikal::ports::{
    ChunkSearch, ChunkStore, ChunkStoreError, CompletionRequest, Embedder, EmbedderError,
    Generator, GeneratorError,
};
use baikal::startup::Application;
use baikal::telemetry::{get_tracing_subscriber, init_tracing_subscriber};
use once_cell::sync::Lazy;

// Ensures that the `tracing` stack is only initialized once using `once_cell`
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber =
            get_tracing_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_tracing_subscriber(subscriber);
    } else {
        let subscriber =
            get_tracing_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_tracing_subscriber(subscriber);
    };
});

/// Deterministic embedding provider. Counts calls so tests can assert that
/// validation failures never reach a provider.
#[derive(Default)]
pub struct FakeEmbedder {
    pub calls: AtomicUsize,
    pub fail_with: Option<String>,
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.fail_with {
            return Err(EmbedderError::Provider(message.clone()));
        }
        Ok(vec![0.1, 0.2, 0.3])
    }

    fn model_name(&self) -> &str {
        "fake-embedding-model"
    }
}

/// Replays a canned model reply and records the requests it received
pub struct FakeGenerator {
    pub calls: AtomicUsize,
    pub reply: String,
    pub fail_with: Option<String>,
    pub last_request: Mutex<Option<CompletionRequest>>,
}

impl FakeGenerator {
    pub fn with_reply(reply: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            reply: reply.to_string(),
            fail_with: None,
            last_request: Mutex::new(None),
        }
    }

    pub fn failing_with(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::with_reply("")
        }
    }
}

#[async_trait]
impl Generator for FakeGenerator {
    async fn complete(&self, request: CompletionRequest) -> Result<String, GeneratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request);
        if let Some(message) = &self.fail_with {
            return Err(GeneratorError::Provider(message.clone()));
        }
        Ok(self.reply.clone())
    }

    fn model_name(&self) -> &str {
        "fake-generation-model"
    }
}

/// Replays a canned match set and records the search parameters
pub struct FakeChunkStore {
    pub calls: AtomicUsize,
    pub matches: Vec<DocumentMatch>,
    pub last_search: Mutex<Option<ChunkSearch>>,
}

impl FakeChunkStore {
    pub fn with_matches(matches: Vec<DocumentMatch>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            matches,
            last_search: Mutex::new(None),
        }
    }
}

#[async_trait]
impl ChunkStore for FakeChunkStore {
    async fn find_nearest(
        &self,
        search: &ChunkSearch,
    ) -> Result<Vec<DocumentMatch>, ChunkStoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_search.lock().unwrap() = Some(search.clone());
        Ok(self.matches.clone())
    }
}

pub struct TestApp {
    pub address: String,
    pub embedder: Arc<FakeEmbedder>,
    pub generator: Arc<FakeGenerator>,
    pub chunk_store: Arc<FakeChunkStore>,
}

/// A test API client / test suite
impl TestApp {
    pub async fn post_brain(&self, body: &serde_json::Value) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}/baikal-brain", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_librarian(&self, body: &serde_json::Value) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}/baikal-librarian", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

/// Launches the server as a background task, with default fakes:
/// empty match set, canned generation reply.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(
        FakeEmbedder::default(),
        FakeGenerator::with_reply("Réponse générée."),
        FakeChunkStore::with_matches(vec![]),
    )
    .await
}

/// Launches the server as a background task with the given fakes.
///
/// When a tokio runtime is shut down all tasks spawned on it are dropped,
/// therefore no clean up logic is needed between test runs.
pub async fn spawn_app_with(
    embedder: FakeEmbedder,
    generator: FakeGenerator,
    chunk_store: FakeChunkStore,
) -> TestApp {
    // The first time `initialize` is invoked the code in `TRACING` is executed.
    // All other invocations will instead skip execution.
    Lazy::force(&TRACING);

    // Randomizes the port to ensure test isolation
    let configuration = {
        let mut c = get_configuration().expect("Failed to read configuration.");
        c.application.port = 0;
        c
    };

    let embedder = Arc::new(embedder);
    let generator = Arc::new(generator);
    let chunk_store = Arc::new(chunk_store);

    let application = Application::build_with_providers(
        configuration,
        None,
        embedder.clone(),
        generator.clone(),
        chunk_store.clone(),
    )
    .expect("Failed to build application.");

    let application_port = application.port();

    // Launches the application as a background task
    let _ = tokio::spawn(application.run_until_stopped());

    TestApp {
        address: format!("http://127.0.0.1:{}", application_port),
        embedder,
        generator,
        chunk_store,
    }
}
