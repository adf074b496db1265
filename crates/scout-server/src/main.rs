mod configuration;
mod error;
mod routes;
mod state;

#[cfg(test)]
mod test_utils;

use scout::invoker::Invoker;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::configuration::Settings;
use crate::state::{AllowList, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    if let Ok(path) = dotenv::dotenv() {
        info!("loaded environment from {:?}", path);
    }

    let settings = Settings::new()?;
    for env_var in settings.missing_credentials() {
        warn!("{} is not set, requests that need it will fail", env_var);
    }
    let addr = settings.server.socket_addr()?;

    let invoker = Invoker::new(Arc::new(settings.into_credentials()));
    let state = AppState::new(invoker, AllowList::default());

    // Create router with CORS support
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::configure(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
