//! Document-frequency table and IDF weights for one corpus.
//!
//! An index is built once per corpus load and never updated incrementally. A
//! reload builds a fresh index next to the old one.

use std::collections::{HashMap, HashSet};

use crate::{item::KnowledgeItem, tokenize::tokenize};

/// Term → document frequency and derived inverse document frequency.
#[derive(Debug, Clone, Default)]
pub struct VocabularyIndex {
  doc_count: usize,
  doc_freq:  HashMap<String, usize>,
  idf:       HashMap<String, f64>,
}

impl VocabularyIndex {
  /// Count, for every term, how many items contain it at least once, and
  /// derive `idf(t) = ln(N / df(t))`.
  pub fn build(corpus: &[KnowledgeItem]) -> Self {
    let mut doc_freq: HashMap<String, usize> = HashMap::new();

    for item in corpus {
      let terms: HashSet<String> =
        tokenize(&item.indexed_text()).into_iter().collect();
      for term in terms {
        *doc_freq.entry(term).or_default() += 1;
      }
    }

    let n = corpus.len() as f64;
    let idf = doc_freq
      .iter()
      .map(|(term, &df)| (term.clone(), (n / df as f64).ln()))
      .collect();

    Self { doc_count: corpus.len(), doc_freq, idf }
  }

  /// IDF weight for `term`; terms absent from the corpus weigh 0.0.
  pub fn idf(&self, term: &str) -> f64 { self.idf.get(term).copied().unwrap_or(0.0) }

  /// Number of corpus items containing `term`.
  pub fn doc_freq(&self, term: &str) -> usize {
    self.doc_freq.get(term).copied().unwrap_or(0)
  }

  pub fn contains(&self, term: &str) -> bool { self.doc_freq.contains_key(term) }

  /// Number of items the index was built from.
  pub fn doc_count(&self) -> usize { self.doc_count }

  /// Number of distinct terms.
  pub fn len(&self) -> usize { self.doc_freq.len() }

  pub fn is_empty(&self) -> bool { self.doc_freq.is_empty() }
}
