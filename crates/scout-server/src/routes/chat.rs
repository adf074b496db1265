use crate::error::ChatError;
use crate::state::{AllowList, AppState};
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub model_name: String,
    pub model_provider: String,
    pub system_prompt: String,
    pub messages: Vec<String>,
    pub allow_search: bool,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub status: &'static str,
}

impl ChatRequest {
    /// Check the request against the allow-lists. The first failing check wins.
    pub fn validate(&self, allow_list: &AllowList) -> Result<(), ChatError> {
        if !allow_list.allows_model(&self.model_name) {
            return Err(ChatError::InvalidRequest(format!(
                "Model '{}' not allowed. Allowed models: {:?}",
                self.model_name, allow_list.models
            )));
        }

        if !allow_list.allows_provider(&self.model_provider) {
            return Err(ChatError::InvalidRequest(format!(
                "Provider '{}' not allowed. Allowed providers: {:?}",
                self.model_provider, allow_list.providers
            )));
        }

        if self.messages.is_empty() {
            return Err(ChatError::InvalidRequest(
                "Messages cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Collapse the messages into the single query sent to the agent
    pub fn query(&self) -> String {
        match self.messages.as_slice() {
            [single] => single.clone(),
            many => many.join(" "),
        }
    }
}

async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ChatError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("malformed chat request: {}", rejection.body_text());
        ChatError::from(rejection)
    })?;

    if let Err(err) = request.validate(&state.allow_list) {
        warn!("rejected chat request: {}", err);
        return Err(err);
    }

    info!(
        model = %request.model_name,
        provider = %request.model_provider,
        allow_search = request.allow_search,
        "chat request"
    );

    let response = state
        .invoker
        .invoke(
            &request.model_name,
            &request.query(),
            request.allow_search,
            &request.model_provider,
            &request.system_prompt,
        )
        .await
        .map_err(|err| {
            error!("agent invocation failed: {:#}", err);
            ChatError::from(err)
        })?;

    Ok(Json(ChatResponse {
        response,
        status: "success",
    }))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat_handler))
        .with_state(state)
}
