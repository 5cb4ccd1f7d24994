//! HTTP surface for the Northwind assistant.
//!
//! - `POST /api/chat`: chat-UI callback, demo-mode reply on failure
//! - `GET /api/examples`: starter questions shown next to the chat box
//! - `POST /api/ask`: grounded answer with the sources used
//! - `GET /health`: search and completion probes

pub mod core;
mod error_handler;
mod middleware_layer;
mod routes;

use std::{future::Future, sync::Arc};

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tokio::{net::TcpListener, signal};
use tracing::{error, info};

pub use crate::core::app_state::AppState;
pub use crate::error_handler::{AppError, AppResult};

use crate::{
    middleware_layer::json_extractor::json_error_mapper,
    routes::{
        ask::ask_question_route::ask_question,
        chat::{chat_route::chat, examples_route::examples},
        health::health_route::health,
    },
};

/// Builds the router with every route and the JSON error mapper.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/examples", get(examples))
        .route("/api/ask", post(ask_question))
        .route("/health", get(health))
        .layer(middleware::from_fn(json_error_mapper))
        .with_state(Arc::new(state))
}

/// Binds `addr` and serves until Ctrl+C.
pub async fn start(state: AppState, addr: &str) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr).await.map_err(|source| AppError::Bind {
        addr: addr.to_string(),
        source,
    })?;
    info!(%addr, "api listening");
    serve(listener, state, shutdown_signal()).await
}

/// Serves on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<(), AppError>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(AppError::Server)?;
    info!("api stopped");
    Ok(())
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
