//! Read-only views of the active corpus and interaction history.

use axum::{
  Json,
  extract::{Query, State},
};
use lanqa_core::{
  chat::ChatModel,
  item::{InteractionRecord, KnowledgeItem},
  stats::KnowledgeStats,
  store::RelationalStore,
};
use serde::Deserialize;

use crate::AppState;

// ─── Knowledge ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct KnowledgeParams {
  /// Case-insensitive keyword over question, answer and category.
  pub q: Option<String>,
}

/// `GET /knowledge[?q=...]`
pub async fn list<R, M>(
  State(state): State<AppState<R, M>>,
  Query(params): Query<KnowledgeParams>,
) -> Json<Vec<KnowledgeItem>>
where
  R: RelationalStore + 'static,
  M: ChatModel + 'static,
{
  let items = match params.q.as_deref().map(str::trim) {
    Some(keyword) if !keyword.is_empty() => state.service.search_knowledge(keyword),
    _ => state.service.knowledge(),
  };
  Json(items)
}

// ─── History ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct HistoryParams {
  pub limit: Option<usize>,
}

/// `GET /history[?limit=N]`: newest first.
pub async fn history<R, M>(
  State(state): State<AppState<R, M>>,
  Query(params): Query<HistoryParams>,
) -> Json<Vec<InteractionRecord>>
where
  R: RelationalStore + 'static,
  M: ChatModel + 'static,
{
  let limit = params.limit.unwrap_or(state.history_limit);
  Json(state.service.history(limit).await)
}

// ─── Stats ───────────────────────────────────────────────────────────────────

/// `GET /stats`
pub async fn stats<R, M>(State(state): State<AppState<R, M>>) -> Json<KnowledgeStats>
where
  R: RelationalStore + 'static,
  M: ChatModel + 'static,
{
  Json(state.service.stats().await)
}
