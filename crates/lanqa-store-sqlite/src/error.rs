//! Error type for `lanqa-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// An operation was attempted before [`connect`] succeeded.
  ///
  /// [`connect`]: lanqa_core::store::RelationalStore::connect
  #[error("store is not connected")]
  NotConnected,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
