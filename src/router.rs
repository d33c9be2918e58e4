use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::db::SessionProvider;
use crate::handlers;

/// Shared application state, threaded explicitly through the handlers.
#[derive(Clone)]
pub struct GateState {
    pub api_key: Arc<str>,
    pub sessions: Arc<SessionProvider>,
}

impl GateState {
    pub fn new(api_key: Arc<str>, sessions: Arc<SessionProvider>) -> Self {
        Self { api_key, sessions }
    }
}

pub fn gate_router(state: GateState) -> Router {
    Router::new()
        .route("/query", post(handlers::query::query_handler))
        .route("/health", get(handlers::health::health_handler))
        .with_state(state)
}
