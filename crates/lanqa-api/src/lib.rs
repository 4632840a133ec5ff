//! JSON REST API for lanqa.
//!
//! Exposes an axum [`Router`] over a [`QaService`]. TLS and authentication
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = lanqa_api::api_router(service.clone(), config.knowledge.history_limit);
//! ```

pub mod error;
pub mod health;
pub mod knowledge;
pub mod qa;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use lanqa_core::{chat::ChatModel, store::RelationalStore};
use lanqa_service::QaService;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<R, M> {
  pub service:       Arc<QaService<R, M>>,
  /// Records returned by `GET /history` when no `limit` is given.
  pub history_limit: usize,
}

// `derive(Clone)` would demand `R: Clone, M: Clone`.
impl<R, M> Clone for AppState<R, M> {
  fn clone(&self) -> Self {
    Self { service: self.service.clone(), history_limit: self.history_limit }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `service`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<R, M>(service: Arc<QaService<R, M>>, history_limit: usize) -> Router<()>
where
  R: RelationalStore + 'static,
  M: ChatModel + 'static,
{
  Router::new()
    .route("/ask", post(qa::ask::<R, M>))
    .route("/reload", post(qa::reload::<R, M>))
    .route("/knowledge", get(knowledge::list::<R, M>))
    .route("/history", get(knowledge::history::<R, M>))
    .route("/stats", get(knowledge::stats::<R, M>))
    .route("/health/llm", get(health::llm::<R, M>))
    .route("/health/store", get(health::store::<R, M>))
    .layer(TraceLayer::new_for_http())
    .with_state(AppState { service, history_limit })
}

#[cfg(test)]
mod tests;
