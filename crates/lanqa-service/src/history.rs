//! Background persistence of answered questions.
//!
//! Delivery is best-effort: records are queued without waiting, written by a
//! single worker task, and dropped (with a warning) if the queue is full or
//! the write fails. The caller's answer never waits on persistence.

use std::sync::{Arc, Mutex, PoisonError};

use lanqa_core::{item::Source, store::RelationalStore};
use lanqa_store_json::JsonStore;
use tokio::{
  sync::mpsc::{self, error::TrySendError},
  task::JoinHandle,
};

struct HistoryJob {
  /// Source of the generation that answered; decides the destination.
  source:   Source,
  question: String,
  answer:   String,
}

pub(crate) struct HistoryWriter {
  tx:     Mutex<Option<mpsc::Sender<HistoryJob>>>,
  worker: Mutex<Option<JoinHandle<()>>>,
}

impl HistoryWriter {
  /// Start the worker. Must be called from within a tokio runtime.
  pub(crate) fn spawn<R>(
    capacity: usize,
    json: Arc<JsonStore>,
    database: Option<Arc<R>>,
  ) -> Self
  where
    R: RelationalStore + 'static,
  {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let worker = tokio::spawn(run(rx, json, database));
    Self {
      tx:     Mutex::new(Some(tx)),
      worker: Mutex::new(Some(worker)),
    }
  }

  /// Queue one interaction for persistence.
  pub(crate) fn record(&self, source: Source, question: String, answer: String) {
    let tx = self.tx.lock().unwrap_or_else(PoisonError::into_inner).clone();
    let Some(tx) = tx else {
      tracing::warn!("history writer stopped; interaction not recorded");
      return;
    };

    match tx.try_send(HistoryJob { source, question, answer }) {
      Ok(()) => {}
      Err(TrySendError::Full(_)) => {
        tracing::warn!("history queue full; interaction dropped")
      }
      Err(TrySendError::Closed(_)) => {
        tracing::warn!("history queue closed; interaction dropped")
      }
    }
  }

  /// Close the queue and wait for queued records to be written.
  pub(crate) async fn shutdown(&self) {
    drop(self.tx.lock().unwrap_or_else(PoisonError::into_inner).take());
    let worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner).take();
    if let Some(worker) = worker
      && let Err(e) = worker.await
    {
      tracing::error!(error = %e, "history writer panicked");
    }
  }
}

async fn run<R>(
  mut rx: mpsc::Receiver<HistoryJob>,
  json: Arc<JsonStore>,
  database: Option<Arc<R>>,
) where
  R: RelationalStore,
{
  while let Some(job) = rx.recv().await {
    match (job.source, &database) {
      (Source::Database, Some(db)) => {
        if let Err(e) = db.append_history(job.question, job.answer).await {
          tracing::warn!(error = %e, "failed to save interaction to database");
        }
      }
      _ => {
        if let Err(e) = json.append_history(&job.question, &job.answer).await {
          tracing::warn!(error = %e, "failed to save interaction to json history");
        }
      }
    }
  }
  tracing::debug!("history writer drained");
}
