//! Question-answering orchestration for lanqa.
//!
//! [`QaService`] owns the active knowledge generation (corpus, vocabulary and
//! embedded vectors, always swapped together), switches between the JSON and
//! database sources, runs queries through a bounded pool and persists history
//! in the background.

mod generation;
mod history;
mod service;

pub mod config;
pub mod error;

pub use config::ServiceConfig;
pub use error::{Error, Result};
pub use generation::Generation;
pub use service::{DIAGNOSTIC_PREFIX, QaService, ReloadOutcome};
