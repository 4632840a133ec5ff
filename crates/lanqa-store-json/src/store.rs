//! [`JsonStore`]: knowledge file loader and capped history file.

use std::path::{Path, PathBuf};

use lanqa_core::item::{InteractionRecord, KnowledgeItem};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{Error, Result};

/// Maximum number of records kept in the history file; older ones are
/// dropped at write time.
pub const HISTORY_CAPACITY: usize = 100;

// ─── File shapes ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct KnowledgeFile {
  knowledge_base: Vec<KnowledgeItem>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryFile {
  #[serde(default)]
  history: Vec<InteractionRecord>,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// Document store over two JSON files.
///
/// History writes are whole-file read-modify-write cycles; the internal
/// mutex serialises them so concurrent writers never lose an update.
#[derive(Debug)]
pub struct JsonStore {
  knowledge_path: PathBuf,
  history_path:   PathBuf,
  history_lock:   Mutex<()>,
}

impl JsonStore {
  pub fn new(knowledge_path: impl Into<PathBuf>, history_path: impl Into<PathBuf>) -> Self {
    Self {
      knowledge_path: knowledge_path.into(),
      history_path:   history_path.into(),
      history_lock:   Mutex::new(()),
    }
  }

  pub fn knowledge_path(&self) -> &Path { &self.knowledge_path }

  pub fn history_path(&self) -> &Path { &self.history_path }

  /// Read the whole knowledge corpus.
  pub async fn load_items(&self) -> Result<Vec<KnowledgeItem>> {
    let raw = read(&self.knowledge_path).await?;
    let file: KnowledgeFile = parse(&self.knowledge_path, &raw)?;
    tracing::debug!(
      path = %self.knowledge_path.display(),
      items = file.knowledge_base.len(),
      "loaded knowledge file"
    );
    Ok(file.knowledge_base)
  }

  /// Append one interaction stamped with the current local time, keeping only
  /// the newest [`HISTORY_CAPACITY`] records.
  pub async fn append_history(&self, question: &str, answer: &str) -> Result<()> {
    let _guard = self.history_lock.lock().await;

    let mut file = self.read_history().await?;
    file.history.push(InteractionRecord::now(question, answer));
    if file.history.len() > HISTORY_CAPACITY {
      let excess = file.history.len() - HISTORY_CAPACITY;
      file.history.drain(..excess);
    }

    let body = serde_json::to_string_pretty(&file).map_err(|source| Error::Json {
      path: self.history_path.clone(),
      source,
    })?;
    write_atomic(&self.history_path, body).await
  }

  /// The last `limit` records, oldest first. A missing file is an empty
  /// history.
  pub async fn fetch_history(&self, limit: usize) -> Result<Vec<InteractionRecord>> {
    let _guard = self.history_lock.lock().await;

    let mut history = self.read_history().await?.history;
    let skip = history.len().saturating_sub(limit);
    Ok(history.split_off(skip))
  }

  async fn read_history(&self) -> Result<HistoryFile> {
    match tokio::fs::read_to_string(&self.history_path).await {
      Ok(raw) => parse(&self.history_path, &raw),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HistoryFile::default()),
      Err(source) => Err(Error::Io { path: self.history_path.clone(), source }),
    }
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

async fn read(path: &Path) -> Result<String> {
  tokio::fs::read_to_string(path)
    .await
    .map_err(|source| Error::Io { path: path.to_path_buf(), source })
}

fn parse<T: for<'de> Deserialize<'de>>(path: &Path, raw: &str) -> Result<T> {
  serde_json::from_str(raw).map_err(|source| Error::Json { path: path.to_path_buf(), source })
}

/// Write to a sibling temporary file, then rename over `path`.
async fn write_atomic(path: &Path, body: String) -> Result<()> {
  let tmp = path.with_extension("json.tmp");
  let io_err = |source| Error::Io { path: path.to_path_buf(), source };
  tokio::fs::write(&tmp, body).await.map_err(io_err)?;
  tokio::fs::rename(&tmp, path).await.map_err(io_err)
}
