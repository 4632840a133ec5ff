//! Typed knowledge-base statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::item::{KnowledgeItem, Source};

/// Row counts reported by the relational store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreCounts {
  pub item_count:    u64,
  pub history_count: u64,
}

/// Snapshot of the active corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeStats {
  pub total_items:    usize,
  pub category_count: usize,
  pub active_source:  Source,
  pub per_category:   BTreeMap<String, usize>,
  /// Present only while the database is the active source.
  pub store_counts:   Option<StoreCounts>,
}

impl KnowledgeStats {
  pub fn from_items(
    items: &[KnowledgeItem],
    active_source: Source,
    store_counts: Option<StoreCounts>,
  ) -> Self {
    let mut per_category: BTreeMap<String, usize> = BTreeMap::new();
    for item in items {
      *per_category.entry(item.category.clone()).or_default() += 1;
    }

    Self {
      total_items: items.len(),
      category_count: per_category.len(),
      active_source,
      per_category,
      store_counts,
    }
  }
}
