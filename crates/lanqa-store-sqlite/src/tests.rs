//! Integration tests for `SqliteStore` against in-memory and on-disk databases.

use lanqa_core::{item::DATABASE_CATEGORY, store::RelationalStore};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn seeded() -> SqliteStore {
  let s = store().await;
  s.insert_item("兰州拉面哪里好吃".into(), "正宁路夜市".into())
    .await
    .unwrap();
  s.insert_item("黄河在哪".into(), "穿城而过".into())
    .await
    .unwrap();
  s.insert_item("白塔山怎么去".into(), "走中山桥过黄河".into())
    .await
    .unwrap();
  s
}

// ─── Connection ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn unconnected_store_reports_not_connected() {
  let s = SqliteStore::new("/nonexistent/never-opened.db");
  assert!(!s.test_connection().await);
  assert!(matches!(s.fetch_all_items().await, Err(Error::NotConnected)));
  assert!(matches!(s.counts().await, Err(Error::NotConnected)));
}

#[tokio::test]
async fn connect_to_missing_directory_fails() {
  let dir = tempfile::tempdir().unwrap();
  let s = SqliteStore::new(dir.path().join("missing").join("qa.db"));
  assert!(s.connect().await.is_err());
  assert!(!s.test_connection().await);
}

#[tokio::test]
async fn file_store_persists_across_opens() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("qa.db");

  let s = SqliteStore::open(&path).await.unwrap();
  s.insert_item("q".into(), "a".into()).await.unwrap();
  drop(s);

  let reopened = SqliteStore::open(&path).await.unwrap();
  assert_eq!(reopened.fetch_all_items().await.unwrap().len(), 1);
}

#[tokio::test]
async fn reconnect_reuses_existing_connection() {
  let s = seeded().await;
  s.connect().await.unwrap();
  // An in-memory database would be empty if a fresh connection were opened.
  assert_eq!(s.fetch_all_items().await.unwrap().len(), 3);
  assert!(s.test_connection().await);
}

// ─── Items ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn fetch_all_items_is_ordered_by_id() {
  let s = seeded().await;
  let items = s.fetch_all_items().await.unwrap();
  let ids: Vec<i64> = items.iter().map(|p| p.id).collect();
  assert_eq!(ids, vec![1, 2, 3]);
  assert_eq!(items[1].question, "黄河在哪");
  assert_eq!(items[1].clone().into_item().category, DATABASE_CATEGORY);
}

#[tokio::test]
async fn inserted_items_get_increasing_ids() {
  let s = store().await;
  let first = s.insert_item("q1".into(), "a1".into()).await.unwrap();
  let second = s.insert_item("q2".into(), "a2".into()).await.unwrap();
  assert!(second > first);

  let ids: Vec<i64> = s.fetch_all_items().await.unwrap().iter().map(|p| p.id).collect();
  assert_eq!(ids, vec![first, second]);
}

#[tokio::test]
async fn insert_before_connect_fails() {
  let s = SqliteStore::new("/nonexistent/never-opened.db");
  assert!(matches!(
    s.insert_item("q".into(), "a".into()).await,
    Err(Error::NotConnected)
  ));
}

// ─── History ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn history_is_returned_newest_first() {
  let s = store().await;
  for i in 0..5 {
    s.append_history(format!("q{i}"), format!("a{i}")).await.unwrap();
  }

  let history = s.fetch_history(3).await.unwrap();
  let questions: Vec<&str> = history.iter().map(|r| r.question.as_str()).collect();
  assert_eq!(questions, vec!["q4", "q3", "q2"]);
  assert!(history.iter().all(|r| r.id.is_some()));
  assert_eq!(history[0].timestamp.len(), "2024-01-01 00:00:00".len());
}

#[tokio::test]
async fn counts_reflect_items_and_history() {
  let s = seeded().await;
  s.append_history("q".into(), "a".into()).await.unwrap();

  let counts = s.counts().await.unwrap();
  assert_eq!(counts.item_count, 3);
  assert_eq!(counts.history_count, 1);
}
