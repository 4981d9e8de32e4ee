use secrecy::Secret;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub providers: ProviderSettings,
    pub vector_store: VectorStoreSettings,
    pub retrieval: RetrievalSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

/// Embedding + chat-completion provider (OpenAI-compatible API).
///
/// The API key is optional on purpose: a missing credential must surface as a
/// per-request configuration error, not as a startup crash.
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderSettings {
    pub api_base: String,
    pub api_key: Option<Secret<String>>,
    pub embedding_model: String,
    pub generation_model: String,
}

/// Vector-indexed document-chunk store (PostgREST-style RPC endpoint).
///
/// Both fields are optional for the same reason as the provider API key.
#[derive(Debug, Deserialize, Clone)]
pub struct VectorStoreSettings {
    pub url: Option<String>,
    pub service_key: Option<Secret<String>>,
}

/// Retrieval and generation knobs, injected into the handlers so tests can
/// substitute smaller caps without touching the pipeline logic.
#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalSettings {
    pub default_match_threshold: f64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub default_match_count: u32,
    /// Maximum size, in characters, of the context blob fed to the generation model
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_context_chars: usize,
    /// Minimum room left under the cap for a partial chunk to still be appended
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub min_partial_chars: usize,
    pub answer_temperature: f32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub answer_max_tokens: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub router_max_tokens: u32,
}

/// Extracts app settings from configuration files and env variables
///
/// `base.yaml` contains shared settings for all environments.
/// A specific env file exists for each environment: `local.yaml` and `production.yaml`.
/// The environment is set with the env var `APP_ENVIRONMENT`.
/// If `APP_ENVIRONMENT` is not set, `local.yaml` is the default.
///
/// Settings are also taken from environment variables: with a prefix of APP and '__' as separator.
/// For ex: `APP_PROVIDERS__API_KEY=sk-...` would set `Settings.providers.api_key`.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");
    let configuration_directory = base_path.join("configuration");

    // Detects the running environment.
    // Default to `local` if unspecified.
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .expect("Failed to parse APP_ENVIRONMENT.");
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(
            configuration_directory.join("base.yaml"),
        ))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        // Adds in settings from environment variables (with a prefix of APP and '__' as separator)
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

/// The possible runtime environment for our application.
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}
