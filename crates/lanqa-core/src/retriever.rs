//! Top-K similarity retrieval over an eagerly embedded corpus.

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  embed::{Embedder, EmbeddedVector, cosine_similarity},
  item::{KnowledgeItem, RetrievalResult},
  vocabulary::VocabularyIndex,
};

// ─── Settings ────────────────────────────────────────────────────────────────

/// Embedding dimension and result count, fixed for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalSettings {
  #[serde(default = "default_dimension")]
  pub dimension: usize,
  #[serde(default = "default_top_k")]
  pub top_k:     usize,
}

fn default_dimension() -> usize { 384 }

fn default_top_k() -> usize { 5 }

impl Default for RetrievalSettings {
  fn default() -> Self {
    Self { dimension: default_dimension(), top_k: default_top_k() }
  }
}

impl RetrievalSettings {
  pub fn validate(&self) -> Result<()> {
    if self.dimension == 0 {
      return Err(Error::ZeroDimension);
    }
    if self.top_k == 0 {
      return Err(Error::ZeroTopK);
    }
    Ok(())
  }

  /// Build a retriever over `items` with these settings.
  pub fn build(&self, items: Vec<KnowledgeItem>) -> Retriever {
    Retriever::new(items, Embedder::new(self.dimension), self.top_k)
  }
}

// ─── Retriever ───────────────────────────────────────────────────────────────

/// Holds one corpus, the vocabulary built from it and one vector per item.
///
/// `vectors[i]` is always the embedding of `items[i]`, and every vector was
/// produced by the same [`Embedder`] queries are embedded with. A retriever
/// is immutable; reloading builds a new one.
#[derive(Debug, Clone)]
pub struct Retriever {
  items:    Vec<KnowledgeItem>,
  vectors:  Vec<EmbeddedVector>,
  embedder: Embedder,
  top_k:    usize,
}

impl Retriever {
  /// Build the vocabulary over `items`, attach it to `embedder`, and embed
  /// every item. Cost is O(items × dimension).
  pub fn new(items: Vec<KnowledgeItem>, embedder: Embedder, top_k: usize) -> Self {
    let embedder = embedder.with_vocabulary(VocabularyIndex::build(&items));
    let vectors = items.iter().map(|item| embedder.embed_item(item)).collect();
    Self { items, vectors, embedder, top_k }
  }

  /// Rank every item against `question` and return at most `top_k` of them,
  /// most similar first. Equal scores keep corpus order.
  pub fn retrieve(&self, question: &str) -> Vec<RetrievalResult> {
    let query = self.embedder.embed_text(question);

    let mut scored: Vec<(usize, f64)> = self
      .vectors
      .iter()
      .enumerate()
      .map(|(i, vector)| (i, cosine_similarity(&query, vector)))
      .collect();

    // `sort_by` is stable, which is what keeps ties in corpus order.
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(self.top_k);

    scored
      .into_iter()
      .map(|(i, similarity)| RetrievalResult {
        item: self.items[i].clone(),
        similarity,
      })
      .collect()
  }

  pub fn items(&self) -> &[KnowledgeItem] { &self.items }

  pub fn embedder(&self) -> &Embedder { &self.embedder }

  pub fn top_k(&self) -> usize { self.top_k }

  pub fn len(&self) -> usize { self.items.len() }

  pub fn is_empty(&self) -> bool { self.items.is_empty() }
}
