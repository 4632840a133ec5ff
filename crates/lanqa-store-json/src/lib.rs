//! Flat-file document store for lanqa.
//!
//! Reads the knowledge corpus from a JSON file and keeps a capped, append-only
//! interaction history in a second JSON file. Both files are read and written
//! whole.

mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{HISTORY_CAPACITY, JsonStore};
