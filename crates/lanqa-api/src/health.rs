//! Connectivity probes: `GET /health/llm` and `GET /health/store`.

use axum::{Json, extract::State};
use lanqa_core::{chat::ChatModel, store::RelationalStore};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct Health {
  pub ok: bool,
}

pub async fn llm<R, M>(State(state): State<AppState<R, M>>) -> Json<Health>
where
  R: RelationalStore + 'static,
  M: ChatModel + 'static,
{
  Json(Health { ok: state.service.test_llm().await })
}

pub async fn store<R, M>(State(state): State<AppState<R, M>>) -> Json<Health>
where
  R: RelationalStore + 'static,
  M: ChatModel + 'static,
{
  Json(Health { ok: state.service.test_store().await })
}
