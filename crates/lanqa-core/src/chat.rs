//! The `ChatModel` trait: the remote LLM as seen by the service.

use std::future::Future;

/// A chat-completion backend.
pub trait ChatModel: Send + Sync {
  /// Send `prompt` and return the model's answer.
  ///
  /// Never fails: transport and API errors come back as a descriptive string,
  /// which callers treat as the answer verbatim.
  fn call(&self, prompt: &str) -> impl Future<Output = String> + Send;

  /// Whether a real completion can currently be obtained.
  fn test_connection(&self) -> impl Future<Output = bool> + Send + '_;
}
