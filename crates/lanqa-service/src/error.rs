//! Error type for `lanqa-service`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid settings: {0}")]
  Settings(#[from] lanqa_core::Error),

  #[error("database source is disabled")]
  DatabaseDisabled,

  #[error("database unavailable: {0}")]
  SourceUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("corpus build task failed: {0}")]
  Build(#[from] tokio::task::JoinError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
