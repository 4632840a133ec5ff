//! [`QaService`]: reload state machine and the question/answer pipeline.

use std::sync::{Arc, PoisonError, RwLock};

use lanqa_core::{
  chat::ChatModel,
  item::{InteractionRecord, KnowledgeItem, QaPair, RetrievalResult, Source},
  prompt::{build_context, build_prompt},
  stats::KnowledgeStats,
  store::RelationalStore,
};
use lanqa_store_json::JsonStore;
use tokio::sync::{Mutex, Semaphore};

use crate::{Error, Result, ServiceConfig, generation::Generation, history::HistoryWriter};

/// Prefix of the answer returned when the pipeline itself fails.
pub const DIAGNOSTIC_PREFIX: &str = "处理问题时发生错误";

/// Result of [`QaService::reload_outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadOutcome {
  /// Whether the published corpus is non-empty.
  pub success:       bool,
  /// The source actually published; `Json` after a fallback.
  pub active_source: Source,
}

/// Serves questions against the active knowledge generation.
///
/// The generation is shared, read-mostly state: queries clone the `Arc` out
/// of the lock and work on that snapshot, while a reload builds its
/// replacement off to the side and swaps it in under a write lock that is
/// held only for the assignment.
pub struct QaService<R, M> {
  config:        ServiceConfig,
  json:          Arc<JsonStore>,
  /// `None` when the database is disabled in configuration.
  database:      Option<Arc<R>>,
  chat:          Arc<M>,
  active:        RwLock<Arc<Generation>>,
  reload_lock:   Mutex<()>,
  query_permits: Semaphore,
  history:       HistoryWriter,
}

impl<R, M> QaService<R, M>
where
  R: RelationalStore + 'static,
  M: ChatModel + 'static,
{
  /// Validate `config`, start the history writer and load the configured
  /// default source. Must be called from within a tokio runtime.
  pub async fn start(
    config: ServiceConfig,
    json: Arc<JsonStore>,
    database: Option<Arc<R>>,
    chat: Arc<M>,
  ) -> Result<Self> {
    config.retrieval.validate()?;

    let history =
      HistoryWriter::spawn(config.history_queue_capacity, json.clone(), database.clone());
    let empty = Generation::empty(config.default_source, config.retrieval);

    let service = Self {
      query_permits: Semaphore::new(config.max_concurrent_queries.max(1)),
      active: RwLock::new(Arc::new(empty)),
      reload_lock: Mutex::new(()),
      config,
      json,
      database,
      chat,
      history,
    };

    if !service.reload(service.config.default_source).await {
      tracing::warn!("started with an empty knowledge base");
    }
    Ok(service)
  }

  // ── Generation ────────────────────────────────────────────────────────────

  /// The generation queries currently run against.
  pub fn snapshot(&self) -> Arc<Generation> {
    self.active.read().unwrap_or_else(PoisonError::into_inner).clone()
  }

  fn publish(&self, generation: Generation) {
    *self.active.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(generation);
  }

  pub fn active_source(&self) -> Source { self.snapshot().source() }

  /// Replace the active corpus with one loaded from `target`.
  ///
  /// A database target that cannot be reached falls back to the JSON file.
  /// Returns `true` iff the resulting corpus is non-empty, whichever source
  /// supplied it. Concurrent reloads are serialised.
  pub async fn reload(&self, target: Source) -> bool { self.reload_outcome(target).await.success }

  /// [`reload`](Self::reload), also reporting the source this reload
  /// published. Both fields come from the same reload.
  pub async fn reload_outcome(&self, target: Source) -> ReloadOutcome {
    let _guard = self.reload_lock.lock().await;
    tracing::info!(requested = %target, "switching knowledge source");

    let (source, items) = match target {
      Source::Database => match self.load_database().await {
        Ok(items) => (Source::Database, items),
        Err(e) => {
          tracing::warn!(error = %e, "database unavailable, falling back to json");
          (Source::Json, self.load_json().await)
        }
      },
      Source::Json => (Source::Json, self.load_json().await),
    };

    let generation = match Generation::build(source, items, self.config.retrieval).await {
      Ok(generation) => generation,
      Err(e) => {
        tracing::error!(error = %e, "failed to build knowledge index; keeping previous one");
        return ReloadOutcome { success: false, active_source: self.active_source() };
      }
    };

    let success = !generation.is_empty();
    tracing::info!(source = %source, items = generation.items().len(), "knowledge source active");
    self.publish(generation);
    ReloadOutcome { success, active_source: source }
  }

  async fn load_database(&self) -> Result<Vec<KnowledgeItem>> {
    let db = self.database.as_ref().ok_or(Error::DatabaseDisabled)?;
    db.connect()
      .await
      .map_err(|e| Error::SourceUnavailable(Box::new(e)))?;
    let pairs = db
      .fetch_all_items()
      .await
      .map_err(|e| Error::SourceUnavailable(Box::new(e)))?;
    tracing::info!(items = pairs.len(), "loaded knowledge from database");
    Ok(pairs.into_iter().map(QaPair::into_item).collect())
  }

  async fn load_json(&self) -> Vec<KnowledgeItem> {
    match self.json.load_items().await {
      Ok(items) => {
        tracing::info!(items = items.len(), "loaded knowledge from json");
        items
      }
      Err(e) => {
        tracing::error!(error = %e, "failed to load json knowledge base");
        Vec::new()
      }
    }
  }

  // ── Queries ───────────────────────────────────────────────────────────────

  /// Top-K retrieval against the current generation.
  pub fn retrieve(&self, question: &str) -> Vec<RetrievalResult> {
    self.snapshot().retriever().retrieve(question)
  }

  /// Answer `question`: retrieve, build the prompt, ask the model, queue the
  /// interaction for persistence, and return the answer.
  ///
  /// Always returns a string; failures come back as diagnostics.
  pub async fn ask(&self, question: &str) -> String {
    let _permit = match self.query_permits.acquire().await {
      Ok(permit) => permit,
      Err(e) => return format!("{DIAGNOSTIC_PREFIX}: {e}"),
    };

    let generation = self.snapshot();
    let results = generation.retriever().retrieve(question);
    tracing::debug!(
      source = %generation.source(),
      hits = results.len(),
      best = ?results.first().map(|r| r.similarity),
      "retrieved context"
    );

    let context = build_context(&results);
    let prompt = build_prompt(question, &context, &self.config.system_prompt);
    let answer = self.chat.call(&prompt).await;

    self
      .history
      .record(generation.source(), question.to_owned(), answer.clone());
    answer
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// All items of the active corpus.
  pub fn knowledge(&self) -> Vec<KnowledgeItem> { self.snapshot().items().to_vec() }

  /// Items whose question, answer or category contains `keyword`, ignoring
  /// case.
  pub fn search_knowledge(&self, keyword: &str) -> Vec<KnowledgeItem> {
    self
      .snapshot()
      .items()
      .iter()
      .filter(|item| item.matches_keyword(keyword))
      .cloned()
      .collect()
  }

  /// The newest `limit` interactions from the active source's history,
  /// newest first. Read failures yield an empty list.
  pub async fn history(&self, limit: usize) -> Vec<InteractionRecord> {
    if let (Source::Database, Some(db)) = (self.active_source(), &self.database) {
      return match db.fetch_history(limit).await {
        Ok(records) => records,
        Err(e) => {
          tracing::warn!(error = %e, "failed to read database history");
          Vec::new()
        }
      };
    }

    match self.json.fetch_history(limit).await {
      Ok(mut records) => {
        records.reverse();
        records
      }
      Err(e) => {
        tracing::warn!(error = %e, "failed to read json history");
        Vec::new()
      }
    }
  }

  pub async fn stats(&self) -> KnowledgeStats {
    let generation = self.snapshot();
    let store_counts = match (generation.source(), &self.database) {
      (Source::Database, Some(db)) => match db.counts().await {
        Ok(counts) => Some(counts),
        Err(e) => {
          tracing::warn!(error = %e, "failed to read database counts");
          None
        }
      },
      _ => None,
    };
    KnowledgeStats::from_items(generation.items(), generation.source(), store_counts)
  }

  // ── Health ────────────────────────────────────────────────────────────────

  pub async fn test_llm(&self) -> bool { self.chat.test_connection().await }

  /// With the database enabled, probe its connection; otherwise check that
  /// the JSON knowledge file yields a non-empty corpus.
  pub async fn test_store(&self) -> bool {
    match &self.database {
      Some(db) => db.test_connection().await,
      None => match self.json.load_items().await {
        Ok(items) => !items.is_empty(),
        Err(e) => {
          tracing::warn!(error = %e, "json knowledge file unreadable");
          false
        }
      },
    }
  }

  /// Stop accepting history records and wait for queued ones to be written.
  pub async fn shutdown(&self) { self.history.shutdown().await }
}
