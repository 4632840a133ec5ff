//! Core types, collaborator traits and the retrieval engine for lanqa.
//!
//! This crate has no HTTP or database dependencies.
//! Everything in the retrieval path (tokenizing, vocabulary, embedding,
//! ranking, prompt assembly) is pure in-memory computation and never blocks.

pub mod chat;
pub mod embed;
pub mod error;
pub mod item;
pub mod prompt;
pub mod retriever;
pub mod stats;
pub mod store;
pub mod tokenize;
pub mod vocabulary;

pub use error::{Error, Result};
