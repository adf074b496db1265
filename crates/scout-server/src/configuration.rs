use crate::error::{to_env_var, ConfigError};
use config::{Config, Environment};
use scout::invoker::Credentials;
use scout::providers::configs::ApiConfig;
use scout::providers::{groq::GROQ_HOST, openai::OPENAI_HOST};
use scout::systems::search::{SearchConfig, MAX_SEARCH_RESULTS, TAVILY_HOST};
use serde::Deserialize;
use std::net::{AddrParseError, SocketAddr};

#[derive(Debug, Default, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiSettings {
    pub host: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<i32>,
}

impl ApiSettings {
    fn into_config(self) -> ApiConfig {
        ApiConfig {
            host: self.host,
            api_key: self.api_key,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchSettings {
    pub host: String,
    #[serde(default)]
    pub api_key: String,
    pub max_results: u32,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub openai: ApiSettings,
    pub groq: ApiSettings,
    pub search: SearchSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        // Start with default configuration
        let config = Config::builder()
            // Server defaults
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            // Upstream defaults, keys fall back to the conventional variables
            .set_default("openai.host", OPENAI_HOST)?
            .set_default("openai.api_key", conventional_key("OPENAI_API_KEY"))?
            .set_default("groq.host", GROQ_HOST)?
            .set_default("groq.api_key", conventional_key("GROQ_API_KEY"))?
            .set_default("search.host", TAVILY_HOST)?
            .set_default("search.api_key", conventional_key("TAVILY_API_KEY"))?
            .set_default("search.max_results", MAX_SEARCH_RESULTS as i64)?
            // Layer on the environment variables
            .add_source(
                Environment::with_prefix("SCOUT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let result: Result<Self, config::ConfigError> = config.try_deserialize();

        match result {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                // Handle both NotFound and missing field message variants
                let error_str = err.to_string();
                if error_str.starts_with("missing field") {
                    // Extract field name from error message "missing field `host`"
                    let field = error_str
                        .trim_start_matches("missing field `")
                        .trim_end_matches('`');
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else if let config::ConfigError::NotFound(field) = &err {
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else {
                    Err(ConfigError::Other(err))
                }
            }
        }
    }

    /// Names of the credential variables left empty
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.openai.api_key.is_empty() {
            missing.push("OPENAI_API_KEY");
        }
        if self.groq.api_key.is_empty() {
            missing.push("GROQ_API_KEY");
        }
        if self.search.api_key.is_empty() {
            missing.push("TAVILY_API_KEY");
        }
        missing
    }

    pub fn into_credentials(self) -> Credentials {
        let mut search = SearchConfig::new(self.search.host, self.search.api_key);
        search.max_results = self.search.max_results;

        Credentials {
            openai: self.openai.into_config(),
            groq: self.groq.into_config(),
            search,
        }
    }
}

fn conventional_key(name: &str) -> String {
    std::env::var(name).unwrap_or_default()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}
