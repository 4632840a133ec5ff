//! Error type for `lanqa-llm`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("API returned {status}: {body}")]
  Status { status: u16, body: String },

  #[error("response contained no answer")]
  EmptyAnswer,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
