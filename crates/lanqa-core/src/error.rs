//! Error types for `lanqa-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("embedding dimension must be at least 1")]
  ZeroDimension,

  #[error("top_k must be at least 1")]
  ZeroTopK,

  #[error("unknown knowledge source: {0:?}")]
  UnknownSource(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
