//! HTTP API server for the Genie gateway
//!
//! Two stateless endpoints forward to the upstream LLM: `/chat-completion`
//! builds the tutor instruction, `/translate` the translation instruction.
//! No retries, no persisted state.

pub mod chat;
pub mod health;
pub mod translate;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::llm::LlmClient;
use crate::Result;

/// Shared state for API handlers
pub struct ApiState {
    /// Upstream LLM client
    pub llm: LlmClient,
}

impl ApiState {
    /// Build state from configuration
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            llm: LlmClient::new(
                config.llm.base_url.clone(),
                config.api_keys.groq.clone(),
                config.llm.model.clone(),
            ),
        }
    }
}

/// Build the gateway router with all routes and layers
#[must_use]
pub fn router(state: Arc<ApiState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(chat::router(Arc::clone(&state)))
        .merge(translate::router(state))
        .merge(health::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
}

impl ApiServer {
    /// Create a server from configuration
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            state: Arc::new(ApiState::from_config(config)),
            port: config.server.port,
        }
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if the server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(port = self.port, "API server listening");

        axum::serve(listener, router(self.state))
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }

    /// Run the API server in a background task
    #[must_use]
    pub fn spawn(self) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}
