//! Chat-completion client for lanqa.
//!
//! Speaks the OpenAI-compatible `chat/completions` wire format and implements
//! [`lanqa_core::chat::ChatModel`].

mod client;

pub mod error;

pub use client::{ChatClient, ChatConfig};
pub use error::{Error, Result};
