//! Knowledge items, interaction records and the knowledge-source selector.
//!
//! A [`KnowledgeItem`] is immutable once loaded. Corpora are replaced
//! wholesale on reload, never edited in place.

use std::{fmt, str::FromStr};

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Category assigned to every item loaded from the relational store; the
/// `qa_pairs` table carries no category column of its own.
pub const DATABASE_CATEGORY: &str = "数据库";

/// Timestamp layout shared by the SQLite and JSON history stores.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ─── Source ──────────────────────────────────────────────────────────────────

/// Which backing store supplies the active corpus.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Source {
  #[default]
  Json,
  Database,
}

impl Source {
  /// Human-readable label, as shown to operators.
  pub fn label(self) -> &'static str {
    match self {
      Self::Json => "本地JSON",
      Self::Database => "数据库",
    }
  }
}

impl fmt::Display for Source {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Json => "json",
      Self::Database => "database",
    })
  }
}

impl FromStr for Source {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "json" => Ok(Self::Json),
      "database" | "db" => Ok(Self::Database),
      other => Err(Error::UnknownSource(other.to_owned())),
    }
  }
}

// ─── Items ───────────────────────────────────────────────────────────────────

/// One question/answer entry of a knowledge corpus.
///
/// `id` is unique within one loaded corpus only; relational and document ids
/// are independent sequences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeItem {
  pub id:       i64,
  pub question: String,
  pub answer:   String,
  pub category: String,
}

impl KnowledgeItem {
  /// The text that gets indexed and embedded for this item.
  pub fn indexed_text(&self) -> String {
    format!("{} {}", self.question, self.answer)
  }

  /// Case-insensitive substring match over question, answer and category.
  pub fn matches_keyword(&self, keyword: &str) -> bool {
    let needle = keyword.to_lowercase();
    [&self.question, &self.answer, &self.category]
      .iter()
      .any(|field| field.to_lowercase().contains(&needle))
  }
}

/// A row of the relational `qa_pairs` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
  pub id:       i64,
  pub question: String,
  pub answer:   String,
}

impl QaPair {
  /// Convert into a corpus item tagged with [`DATABASE_CATEGORY`].
  pub fn into_item(self) -> KnowledgeItem {
    KnowledgeItem {
      id:       self.id,
      question: self.question,
      answer:   self.answer,
      category: DATABASE_CATEGORY.to_owned(),
    }
  }
}

// ─── History ─────────────────────────────────────────────────────────────────

/// One answered question. Append-only; never edited or deleted by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
  pub question:  String,
  pub answer:    String,
  pub timestamp: String,
  /// Assigned by the relational store; JSON history has no ids.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id:        Option<i64>,
}

impl InteractionRecord {
  /// A new, id-less record stamped with the current local time.
  pub fn now(question: impl Into<String>, answer: impl Into<String>) -> Self {
    Self {
      question:  question.into(),
      answer:    answer.into(),
      timestamp: current_timestamp(),
      id:        None,
    }
  }
}

/// The current local time rendered with [`TIMESTAMP_FORMAT`].
pub fn current_timestamp() -> String {
  Local::now().format(TIMESTAMP_FORMAT).to_string()
}

// ─── Retrieval results ───────────────────────────────────────────────────────

/// A corpus item paired with its similarity to a query. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalResult {
  pub item:       KnowledgeItem,
  pub similarity: f64,
}
