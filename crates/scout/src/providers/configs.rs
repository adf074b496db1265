/// Connection settings for one upstream OpenAI-compatible API.
///
/// Built once at startup and shared read-only; the model is chosen per request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub host: String,
    pub api_key: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
}

impl ApiConfig {
    pub fn new<H: Into<String>, K: Into<String>>(host: H, api_key: K) -> Self {
        Self {
            host: host.into(),
            api_key: api_key.into(),
            temperature: None,
            max_tokens: None,
        }
    }
}

// Unified enum to wrap different provider configurations
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    OpenAi(OpenAiProviderConfig),
    Groq(GroqProviderConfig),
}

#[derive(Debug, Clone)]
pub struct OpenAiProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct GroqProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
}

impl OpenAiProviderConfig {
    pub fn from_api(api: &ApiConfig, model: &str) -> Self {
        Self {
            host: api.host.clone(),
            api_key: api.api_key.clone(),
            model: model.to_string(),
            temperature: api.temperature,
            max_tokens: api.max_tokens,
        }
    }
}

impl GroqProviderConfig {
    pub fn from_api(api: &ApiConfig, model: &str) -> Self {
        Self {
            host: api.host.clone(),
            api_key: api.api_key.clone(),
            model: model.to_string(),
            temperature: api.temperature,
            max_tokens: api.max_tokens,
        }
    }
}
