use crate::state::{AllowList, AppState};
use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

async fn root() -> Json<Value> {
    Json(json!({ "message": "Scout agent API is running" }))
}

async fn models(State(state): State<AppState>) -> Json<AllowList> {
    Json(state.allow_list.as_ref().clone())
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/models", get(models))
        .with_state(state)
}
