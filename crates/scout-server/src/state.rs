use scout::invoker::Invoker;
use serde::Serialize;
use std::sync::Arc;

pub const ALLOWED_MODEL_NAMES: [&str; 2] = ["llama3-70b-8192", "gpt-4o-mini"];
pub const ALLOWED_PROVIDERS: [&str; 2] = ["groq", "openai"];

/// Models and providers a chat request may name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllowList {
    #[serde(rename = "allowed_models")]
    pub models: Vec<String>,
    #[serde(rename = "allowed_providers")]
    pub providers: Vec<String>,
}

impl Default for AllowList {
    fn default() -> Self {
        Self {
            models: ALLOWED_MODEL_NAMES.iter().map(|m| m.to_string()).collect(),
            providers: ALLOWED_PROVIDERS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl AllowList {
    pub fn allows_model(&self, model: &str) -> bool {
        self.models.iter().any(|m| m == model)
    }

    pub fn allows_provider(&self, provider: &str) -> bool {
        self.providers.iter().any(|p| p == provider)
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub invoker: Arc<Invoker>,
    pub allow_list: Arc<AllowList>,
}

impl AppState {
    pub fn new(invoker: Invoker, allow_list: AllowList) -> Self {
        Self {
            invoker: Arc::new(invoker),
            allow_list: Arc::new(allow_list),
        }
    }
}
