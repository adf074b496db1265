use serde::{Deserialize, Serialize};
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum AgentError {
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Tool execution failed: {0}")]
    ExecutionError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AgentResult<T> = Result<T, AgentError>;

/// Failures raised while invoking the agent for a single chat turn
#[derive(Error, Debug)]
pub enum InvokeError {
    #[error("Provider must be 'groq' or 'openai', got '{0}'")]
    UnsupportedProvider(String),

    #[error(transparent)]
    Provider(anyhow::Error),
}

impl InvokeError {
    /// Whether the caller could fix this by changing the request
    pub fn is_client_error(&self) -> bool {
        matches!(self, InvokeError::UnsupportedProvider(_))
    }
}
