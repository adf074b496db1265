use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use scout::errors::InvokeError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// Map a settings key like `openai.api_key` to the variable that sets it
pub fn to_env_var(field: &str) -> String {
    format!("SCOUT_{}", field.to_uppercase().replace('.', "__"))
}

/// Errors surfaced to clients of the chat API as `{"detail": ...}`
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{detail}")]
    MalformedBody { status: StatusCode, detail: String },

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ChatError {
    pub fn status(&self) -> StatusCode {
        match self {
            ChatError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ChatError::MalformedBody { status, .. } => *status,
            ChatError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<InvokeError> for ChatError {
    fn from(err: InvokeError) -> Self {
        if err.is_client_error() {
            ChatError::InvalidRequest(err.to_string())
        } else {
            ChatError::Internal(format!("{:#}", err))
        }
    }
}

impl From<JsonRejection> for ChatError {
    fn from(rejection: JsonRejection) -> Self {
        ChatError::MalformedBody {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_to_env_var() {
        assert_eq!(to_env_var("openai.api_key"), "SCOUT_OPENAI__API_KEY");
        assert_eq!(to_env_var("port"), "SCOUT_PORT");
    }

    #[test]
    fn test_invoke_error_mapping() {
        let err = ChatError::from(InvokeError::UnsupportedProvider("bedrock".to_string()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("bedrock"));

        let err = ChatError::from(InvokeError::Provider(
            anyhow!("401 Unauthorized").context("OpenAI request failed"),
        ));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.to_string(),
            "Internal server error: OpenAI request failed: 401 Unauthorized"
        );
    }
}
