//! The `RelationalStore` trait.
//!
//! Implemented by storage backends (e.g. `lanqa-store-sqlite`). The service
//! depends on this abstraction, not on any concrete backend, so the reload
//! and fallback logic can be exercised against fakes.

use std::future::Future;

use crate::{
  item::{InteractionRecord, QaPair},
  stats::StoreCounts,
};

/// Abstraction over the relational knowledge store.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait RelationalStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Establish (or re-validate) the backing connection. An error means the
  /// store is unreachable.
  fn connect(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Cheap liveness probe; never errors.
  fn test_connection(&self) -> impl Future<Output = bool> + Send + '_;

  /// Every stored question/answer pair, ordered by id.
  fn fetch_all_items(
    &self,
  ) -> impl Future<Output = Result<Vec<QaPair>, Self::Error>> + Send + '_;

  /// Append one interaction. The store assigns the id and timestamp.
  fn append_history(
    &self,
    question: String,
    answer: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The most recent `limit` interactions, newest first.
  fn fetch_history(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<InteractionRecord>, Self::Error>> + Send + '_;

  fn counts(&self) -> impl Future<Output = Result<StoreCounts, Self::Error>> + Send + '_;
}
