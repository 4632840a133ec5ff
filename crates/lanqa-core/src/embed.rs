//! Positional TF-IDF embedding.
//!
//! Weights are assigned by token position, not by vocabulary slot: the token
//! at sequence position `i` writes its weight into `vector[i]`. Two texts with
//! the same words in a different order therefore embed differently. This
//! positional layout is the contract; a vocabulary-slot histogram would rank
//! differently.

use std::{collections::HashMap, sync::Arc};

use crate::{item::KnowledgeItem, tokenize::tokenize, vocabulary::VocabularyIndex};

// ─── Vector ──────────────────────────────────────────────────────────────────

/// A fixed-dimension, L2-normalised (or all-zero) embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedVector {
  values:         Vec<f64>,
  source_item_id: Option<i64>,
}

impl EmbeddedVector {
  pub fn values(&self) -> &[f64] { &self.values }

  pub fn dimension(&self) -> usize { self.values.len() }

  /// Id of the corpus item this vector was built from, if any.
  pub fn source_item_id(&self) -> Option<i64> { self.source_item_id }

  /// Euclidean norm: 1.0 for any text with a known term, 0.0 otherwise.
  pub fn norm(&self) -> f64 { self.values.iter().map(|v| v * v).sum::<f64>().sqrt() }

  pub fn is_zero(&self) -> bool { self.values.iter().all(|v| *v == 0.0) }
}

/// Dot product of two unit vectors. No re-normalisation happens here, and a
/// zero vector scores 0.0 against anything.
pub fn cosine_similarity(a: &EmbeddedVector, b: &EmbeddedVector) -> f64 {
  a.values.iter().zip(&b.values).map(|(x, y)| x * y).sum()
}

// ─── Embedder ────────────────────────────────────────────────────────────────

/// Turns text into [`EmbeddedVector`]s using one corpus' IDF weights.
///
/// Cloning is cheap; the vocabulary is shared.
#[derive(Debug, Clone)]
pub struct Embedder {
  dimension:  usize,
  vocabulary: Arc<VocabularyIndex>,
}

impl Embedder {
  /// An embedder with an empty vocabulary; every text embeds to zero until
  /// [`Embedder::with_vocabulary`] attaches a corpus index.
  pub fn new(dimension: usize) -> Self {
    Self { dimension, vocabulary: Arc::new(VocabularyIndex::default()) }
  }

  /// Replace the vocabulary wholesale, keeping the dimension.
  pub fn with_vocabulary(self, vocabulary: VocabularyIndex) -> Self {
    Self { dimension: self.dimension, vocabulary: Arc::new(vocabulary) }
  }

  pub fn dimension(&self) -> usize { self.dimension }

  pub fn vocabulary(&self) -> &VocabularyIndex { &self.vocabulary }

  /// Embed arbitrary text (typically a query).
  pub fn embed_text(&self, text: &str) -> EmbeddedVector {
    EmbeddedVector { values: self.weights(text), source_item_id: None }
  }

  /// Embed `question + " " + answer` and tag the vector with the item id.
  pub fn embed_item(&self, item: &KnowledgeItem) -> EmbeddedVector {
    EmbeddedVector {
      values:         self.weights(&item.indexed_text()),
      source_item_id: Some(item.id),
    }
  }

  fn weights(&self, text: &str) -> Vec<f64> {
    let tokens = tokenize(text);

    let mut tf: HashMap<&str, f64> = HashMap::new();
    for token in &tokens {
      *tf.entry(token.as_str()).or_default() += 1.0;
    }
    // Max-normalised so long texts don't win on length alone.
    let max_tf = tf.values().copied().fold(0.0, f64::max);
    if max_tf > 0.0 {
      tf.values_mut().for_each(|v| *v /= max_tf);
    }

    let mut values = vec![0.0; self.dimension];
    for (slot, token) in values.iter_mut().zip(&tokens) {
      let weight = tf.get(token.as_str()).copied().unwrap_or(0.0);
      *slot = weight * self.vocabulary.idf(token);
    }

    let norm = values.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
      values.iter_mut().for_each(|v| *v /= norm);
    }
    values
  }
}
