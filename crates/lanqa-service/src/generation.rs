//! One immutable (corpus, vocabulary, vectors) triple.

use lanqa_core::{
  item::{KnowledgeItem, Source},
  retriever::{RetrievalSettings, Retriever},
};

use crate::Result;

/// Everything a query needs, built together and published together.
///
/// Queries hold an `Arc<Generation>` for their whole lifetime, so a reload
/// never pulls vectors or IDF weights out from under them.
#[derive(Debug)]
pub struct Generation {
  source:    Source,
  retriever: Retriever,
}

impl Generation {
  pub fn empty(source: Source, settings: RetrievalSettings) -> Self {
    Self { source, retriever: settings.build(Vec::new()) }
  }

  /// Index and embed `items` on the blocking pool.
  pub async fn build(
    source: Source,
    items: Vec<KnowledgeItem>,
    settings: RetrievalSettings,
  ) -> Result<Self> {
    let retriever = tokio::task::spawn_blocking(move || settings.build(items)).await?;
    Ok(Self { source, retriever })
  }

  pub fn source(&self) -> Source { self.source }

  pub fn retriever(&self) -> &Retriever { &self.retriever }

  pub fn items(&self) -> &[KnowledgeItem] { self.retriever.items() }

  pub fn is_empty(&self) -> bool { self.retriever.is_empty() }
}
