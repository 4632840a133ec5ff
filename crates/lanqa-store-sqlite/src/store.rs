//! [`SqliteStore`]: the SQLite implementation of [`RelationalStore`].

use std::{
  path::{Path, PathBuf},
  sync::{Arc, Mutex, PoisonError},
};

use lanqa_core::{
  item::{InteractionRecord, QaPair, current_timestamp},
  stats::StoreCounts,
  store::RelationalStore,
};
use tokio_rusqlite::Connection;

use crate::{Error, Result, schema::SCHEMA};

#[derive(Debug, Clone)]
enum Location {
  File(PathBuf),
  Memory,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A lanqa knowledge store backed by a single SQLite file.
///
/// The connection is established lazily by [`RelationalStore::connect`] and
/// then reused. Cloning is cheap; clones share the connection slot.
#[derive(Clone)]
pub struct SqliteStore {
  location: Location,
  conn:     Arc<Mutex<Option<Connection>>>,
}

impl SqliteStore {
  /// A store for `path` that has not connected yet.
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      location: Location::File(path.into()),
      conn:     Arc::new(Mutex::new(None)),
    }
  }

  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let store = Self::new(path.as_ref());
    store.connect().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let store = Self {
      location: Location::Memory,
      conn:     Arc::new(Mutex::new(None)),
    };
    store.connect().await?;
    Ok(store)
  }

  fn slot(&self) -> std::sync::MutexGuard<'_, Option<Connection>> {
    self.conn.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn conn(&self) -> Result<Connection> { self.slot().clone().ok_or(Error::NotConnected) }

  // ── Seeding ───────────────────────────────────────────────────────────────

  /// Insert one question/answer pair and return its id.
  pub async fn insert_item(&self, question: String, answer: String) -> Result<i64> {
    let id = self
      .conn()?
      .call(move |conn| {
        conn.execute(
          "INSERT INTO qa_pairs (question, answer) VALUES (?1, ?2)",
          rusqlite::params![question, answer],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;
    Ok(id)
  }
}

fn qa_pair_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<QaPair> {
  Ok(QaPair {
    id:       row.get(0)?,
    question: row.get(1)?,
    answer:   row.get(2)?,
  })
}

// ─── RelationalStore impl ────────────────────────────────────────────────────

impl RelationalStore for SqliteStore {
  type Error = Error;

  async fn connect(&self) -> Result<()> {
    let existing = self.slot().clone();
    let conn = match existing {
      Some(conn) => conn,
      None => match &self.location {
        Location::File(path) => Connection::open(path.clone()).await?,
        Location::Memory => Connection::open_in_memory().await?,
      },
    };

    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
      })
      .await?;

    *self.slot() = Some(conn);
    tracing::debug!(location = ?self.location, "sqlite store connected");
    Ok(())
  }

  async fn test_connection(&self) -> bool {
    let Ok(conn) = self.conn() else {
      return false;
    };
    match conn
      .call(|conn| Ok(conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?))
      .await
    {
      Ok(_) => true,
      Err(e) => {
        tracing::warn!(error = %e, "sqlite connection test failed");
        false
      }
    }
  }

  async fn fetch_all_items(&self) -> Result<Vec<QaPair>> {
    let pairs = self
      .conn()?
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT id, question, answer FROM qa_pairs ORDER BY id")?;
        let rows = stmt
          .query_map([], qa_pair_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(pairs)
  }

  async fn append_history(&self, question: String, answer: String) -> Result<()> {
    let timestamp = current_timestamp();
    self
      .conn()?
      .call(move |conn| {
        conn.execute(
          "INSERT INTO chat_history (question, answer, timestamp) VALUES (?1, ?2, ?3)",
          rusqlite::params![question, answer, timestamp],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn fetch_history(&self, limit: usize) -> Result<Vec<InteractionRecord>> {
    let limit_val = limit as i64;
    let records = self
      .conn()?
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, question, answer, timestamp
           FROM chat_history
           ORDER BY timestamp DESC, id DESC
           LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val], |row| {
            Ok(InteractionRecord {
              id:        Some(row.get(0)?),
              question:  row.get(1)?,
              answer:    row.get(2)?,
              timestamp: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(records)
  }

  async fn counts(&self) -> Result<StoreCounts> {
    let (items, history): (i64, i64) = self
      .conn()?
      .call(|conn| {
        let items = conn.query_row("SELECT COUNT(*) FROM qa_pairs", [], |r| r.get(0))?;
        let history =
          conn.query_row("SELECT COUNT(*) FROM chat_history", [], |r| r.get(0))?;
        Ok((items, history))
      })
      .await?;

    Ok(StoreCounts {
      item_count:    items as u64,
      history_count: history as u64,
    })
  }
}
