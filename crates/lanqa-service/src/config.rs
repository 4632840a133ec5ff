//! Runtime settings for [`QaService`](crate::QaService).

use lanqa_core::{item::Source, retriever::RetrievalSettings};

/// Read once at startup and immutable afterwards; only the active source
/// changes, and only through an explicit reload.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
  pub retrieval:              RetrievalSettings,
  pub system_prompt:          String,
  pub default_source:         Source,
  /// Permits in the query pool; extra callers wait.
  pub max_concurrent_queries: usize,
  /// Pending history writes before new ones are dropped.
  pub history_queue_capacity: usize,
}

impl Default for ServiceConfig {
  fn default() -> Self {
    Self {
      retrieval:              RetrievalSettings::default(),
      system_prompt:          "你是一个专业的兰州旅游专家，请根据知识库内容回答用户问题。"
        .to_string(),
      default_source:         Source::Json,
      max_concurrent_queries: 8,
      history_queue_capacity: 256,
    }
  }
}
