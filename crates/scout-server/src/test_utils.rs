use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use scout::agent::Agent;
use scout::invoker::{AgentRuntime, Credentials, Invoker};
use scout::models::message::Message;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use crate::routes;
use crate::state::{AllowList, AppState};

/// Stands in for the agent loop, answering with canned messages
pub struct StubRuntime {
    reply: Vec<Message>,
    error: Option<String>,
    pub seen: Mutex<Vec<Vec<Message>>>,
}

impl StubRuntime {
    pub fn replying(reply: Vec<Message>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            error: None,
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(error: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Vec::new(),
            error: Some(error.to_string()),
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl AgentRuntime for StubRuntime {
    async fn run(&self, _agent: &Agent, messages: Vec<Message>) -> Result<Vec<Message>> {
        self.seen.lock().unwrap().push(messages.clone());
        if let Some(error) = &self.error {
            return Err(anyhow!(error.clone()));
        }
        let mut conversation = messages;
        conversation.extend(self.reply.clone());
        Ok(conversation)
    }
}

pub fn app(runtime: Arc<StubRuntime>) -> Router {
    let invoker = Invoker::with_runtime(Arc::new(Credentials::default()), runtime);
    routes::configure(AppState::new(invoker, AllowList::default()))
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}
