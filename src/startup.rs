use std::net::TcpListener;
use std::sync::Arc;

use actix_web::http::Method;
use actix_web::{
    dev::Server,
    web::{self, Data},
    App, HttpServer,
};
use tracing::info;
use tracing_actix_web::TracingLogger;

use crate::configuration::Settings;
use crate::domain::use_cases::answer_query::AnswerQueryUseCase;
use crate::domain::use_cases::route_query::RouteQueryUseCase;
use crate::ports::{ChunkStore, Embedder, Generator};
use crate::repositories::openai_embedder::OpenAiEmbedder;
use crate::repositories::openai_generator::OpenAiGenerator;
use crate::repositories::postgrest_chunk_store::PostgrestChunkStore;
use crate::routes::brain::{brain_method_not_allowed, route_query};
use crate::routes::cors::preflight;
use crate::routes::health_check::health_check;
use crate::routes::librarian::{answer_query, librarian_method_not_allowed};

/// Holds the newly built server, and some useful properties
pub struct Application {
    server: Server,
    port: u16,
}

impl Application {
    /// Wires the HTTP-backed providers from settings.
    ///
    /// Missing provider credentials do NOT fail the build: they surface as
    /// per-request configuration errors.
    ///
    /// # Parameters
    /// - nb_workers: number of actix-web workers.
    ///   If `None`, the number of available physical CPUs is used as the worker count.
    #[tracing::instrument(name = "Building application", skip(settings))]
    pub async fn build(
        settings: Settings,
        nb_workers: Option<usize>,
    ) -> Result<Self, std::io::Error> {
        let embedder: Arc<dyn Embedder> = Arc::new(OpenAiEmbedder::new(&settings.providers));
        let generator: Arc<dyn Generator> = Arc::new(OpenAiGenerator::new(&settings.providers));
        let chunk_store: Arc<dyn ChunkStore> =
            Arc::new(PostgrestChunkStore::new(&settings.vector_store));

        Self::build_with_providers(settings, nb_workers, embedder, generator, chunk_store)
    }

    /// Same as [`Application::build`] but with injected providers.
    /// Integration tests use it to substitute deterministic fakes.
    pub fn build_with_providers(
        settings: Settings,
        nb_workers: Option<usize>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        chunk_store: Arc<dyn ChunkStore>,
    ) -> Result<Self, std::io::Error> {
        let address = format!(
            "{}:{}",
            settings.application.host, settings.application.port
        );
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();

        let server = run(
            listener,
            settings,
            nb_workers,
            embedder,
            generator,
            chunk_store,
        )?;

        Ok(Self { server, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// This function only returns when the application is stopped
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        info!("Running server ...");
        self.server.await
    }
}

/// listener: the consumer binds their own port
///
/// TracingLogger middleware: helps collecting telemetry data.
/// It generates a unique identifier for each incoming request: `request_id`.
pub fn run(
    listener: TcpListener,
    settings: Settings,
    nb_workers: Option<usize>,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    chunk_store: Arc<dyn ChunkStore>,
) -> Result<Server, std::io::Error> {
    // Use cases are stateless over their ports: shared among all workers
    let route_query_use_case = Data::new(RouteQueryUseCase::new(
        generator.clone(),
        settings.retrieval.router_max_tokens,
    ));
    let answer_query_use_case = Data::new(AnswerQueryUseCase::new(
        embedder,
        chunk_store,
        generator,
        settings.retrieval.clone(),
    ));

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .service(
                web::resource("/baikal-brain")
                    .route(web::post().to(route_query))
                    .route(web::method(Method::OPTIONS).to(preflight))
                    .default_service(web::to(brain_method_not_allowed)),
            )
            .service(
                web::resource("/baikal-librarian")
                    .route(web::post().to(answer_query))
                    .route(web::method(Method::OPTIONS).to(preflight))
                    .default_service(web::to(librarian_method_not_allowed)),
            )
            .app_data(route_query_use_case.clone())
            .app_data(answer_query_use_case.clone())
    })
    .listen(listener)?;

    // If no workers were set, use the actix-web default (number of physical CPUs)
    if let Some(nb_workers) = nb_workers {
        return Ok(server.workers(nb_workers).run());
    }

    // No await
    Ok(server.run())
}
