//! Handlers for the question pipeline and source switching.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/ask` | Body: `{"question":"..."}`; 400 if blank |
//! | `POST` | `/reload` | Body: `{"source":"json\|database"}` |

use axum::{Json, extract::State};
use lanqa_core::{chat::ChatModel, item::Source, store::RelationalStore};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError};

// ─── Ask ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AskBody {
  pub question: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
  pub answer: String,
}

/// `POST /ask`: body: `{"question":"..."}`
///
/// Model and transport failures are not HTTP errors: they come back as the
/// answer text.
pub async fn ask<R, M>(
  State(state): State<AppState<R, M>>,
  Json(body): Json<AskBody>,
) -> Result<Json<AskResponse>, ApiError>
where
  R: RelationalStore + 'static,
  M: ChatModel + 'static,
{
  let question = body.question.trim();
  if question.is_empty() {
    return Err(ApiError::BadRequest("question must not be empty".into()));
  }
  let answer = state.service.ask(question).await;
  Ok(Json(AskResponse { answer }))
}

// ─── Reload ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ReloadBody {
  /// `json`, `database` or `db`.
  pub source: String,
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
  /// Whether the resulting corpus is non-empty.
  pub success:       bool,
  /// May differ from the requested source after a fallback.
  pub active_source: Source,
}

/// `POST /reload`: body: `{"source":"database"}`
pub async fn reload<R, M>(
  State(state): State<AppState<R, M>>,
  Json(body): Json<ReloadBody>,
) -> Result<Json<ReloadResponse>, ApiError>
where
  R: RelationalStore + 'static,
  M: ChatModel + 'static,
{
  let target: Source = body.source.parse()?;
  let outcome = state.service.reload_outcome(target).await;
  tracing::debug!(
    requested = %target,
    active = %outcome.active_source,
    success = outcome.success,
    "reload requested over api"
  );
  Ok(Json(ReloadResponse {
    success:       outcome.success,
    active_source: outcome.active_source,
  }))
}
