//! Configuration for the lanqa server binary.
//!
//! Kept in a library target so the mapping from `config.toml` onto the
//! component configs can be tested without starting a server.

use std::path::{Path, PathBuf};

use lanqa_core::{item::Source, retriever::RetrievalSettings};
use lanqa_llm::ChatConfig;
use lanqa_service::ServiceConfig;
use serde::Deserialize;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime configuration, deserialised from `config.toml` and `LANQA_*`
/// environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  #[serde(default)]
  pub server:    ServerSection,
  #[serde(default)]
  pub retrieval: RetrievalSection,
  #[serde(default)]
  pub knowledge: KnowledgeSection,
  #[serde(default)]
  pub database:  DatabaseSection,
  pub llm:       ChatConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
  pub host: String,
  pub port: u16,
}

impl Default for ServerSection {
  fn default() -> Self { Self { host: "127.0.0.1".to_string(), port: 8080 } }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalSection {
  pub dimension:     usize,
  pub top_k:         usize,
  pub system_prompt: String,
}

impl Default for RetrievalSection {
  fn default() -> Self {
    let settings = RetrievalSettings::default();
    Self {
      dimension:     settings.dimension,
      top_k:         settings.top_k,
      system_prompt: ServiceConfig::default().system_prompt,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KnowledgeSection {
  pub default_source:         Source,
  pub knowledge_path:         PathBuf,
  pub history_path:           PathBuf,
  pub max_concurrent_queries: usize,
  pub history_queue_capacity: usize,
  /// Records returned by `GET /history` without an explicit limit.
  pub history_limit:          usize,
}

impl Default for KnowledgeSection {
  fn default() -> Self {
    let service = ServiceConfig::default();
    Self {
      default_source:         service.default_source,
      knowledge_path:         PathBuf::from("knowledge_base.json"),
      history_path:           PathBuf::from("chat_history.json"),
      max_concurrent_queries: service.max_concurrent_queries,
      history_queue_capacity: service.history_queue_capacity,
      history_limit:          50,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
  pub enabled: bool,
  pub path:    PathBuf,
}

impl Default for DatabaseSection {
  fn default() -> Self { Self { enabled: false, path: PathBuf::from("lanqa.db") } }
}

impl AppConfig {
  /// Load `path` layered with `LANQA_*` environment variables
  /// (e.g. `LANQA_LLM__API_KEY`). The file must exist.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(true))
      .add_source(
        config::Environment::with_prefix("LANQA")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()?
      .try_deserialize()
  }

  pub fn retrieval_settings(&self) -> RetrievalSettings {
    RetrievalSettings { dimension: self.retrieval.dimension, top_k: self.retrieval.top_k }
  }

  /// Reject settings the retrieval engine cannot run with.
  pub fn validate(&self) -> lanqa_core::Result<()> { self.retrieval_settings().validate() }

  pub fn service_config(&self) -> ServiceConfig {
    ServiceConfig {
      retrieval:              self.retrieval_settings(),
      system_prompt:          self.retrieval.system_prompt.clone(),
      default_source:         self.knowledge.default_source,
      max_concurrent_queries: self.knowledge.max_concurrent_queries,
      history_queue_capacity: self.knowledge.history_queue_capacity,
    }
  }

  /// The SQLite path with a leading `~` expanded.
  pub fn database_path(&self) -> PathBuf { expand_tilde(&self.database.path) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
