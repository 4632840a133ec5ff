//! Router tests against an in-memory SQLite store, a temp-dir JSON store and a
//! scripted chat model.

use std::sync::{Arc, Mutex};

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use lanqa_core::{chat::ChatModel, item::Source, retriever::RetrievalSettings};
use lanqa_service::{QaService, ServiceConfig};
use lanqa_store_json::JsonStore;
use lanqa_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt as _;

use crate::api_router;

#[derive(Default)]
struct EchoChat {
  prompts: Mutex<Vec<String>>,
}

impl ChatModel for EchoChat {
  async fn call(&self, prompt: &str) -> String {
    self.prompts.lock().unwrap().push(prompt.to_owned());
    "echo".to_string()
  }

  async fn test_connection(&self) -> bool { true }
}

const KNOWLEDGE: &str = r#"{"knowledge_base": [
  {"id": 1, "question": "兰州拉面哪里好吃", "answer": "正宁路夜市", "category": "美食"},
  {"id": 2, "question": "黄河在哪", "answer": "穿城而过", "category": "地理"}
]}"#;

struct Fixture {
  _dir:    TempDir,
  service: Arc<QaService<SqliteStore, EchoChat>>,
  app:     Router,
}

async fn fixture() -> Fixture {
  let db = SqliteStore::open_in_memory().await.unwrap();
  db.insert_item("白塔山怎么去".into(), "走中山桥".into()).await.unwrap();
  fixture_with(db).await
}

async fn fixture_with(db: SqliteStore) -> Fixture {
  let dir = tempfile::tempdir().unwrap();
  let knowledge = dir.path().join("knowledge_base.json");
  std::fs::write(&knowledge, KNOWLEDGE).unwrap();
  let json = Arc::new(JsonStore::new(knowledge, dir.path().join("chat_history.json")));

  let config = ServiceConfig {
    retrieval: RetrievalSettings { dimension: 32, top_k: 3 },
    ..ServiceConfig::default()
  };
  let service = Arc::new(
    QaService::start(config, json, Some(Arc::new(db)), Arc::new(EchoChat::default()))
      .await
      .unwrap(),
  );
  let app = api_router(service.clone(), 50);
  Fixture { _dir: dir, service, app }
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
  (status, value)
}

// ── Ask ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn ask_returns_model_answer() {
  let f = fixture().await;
  let (status, body) = send(&f.app, "POST", "/ask", Some(json!({"question": "黄河在哪"}))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({"answer": "echo"}));
}

#[tokio::test]
async fn blank_question_is_rejected() {
  let f = fixture().await;
  let (status, body) = send(&f.app, "POST", "/ask", Some(json!({"question": "   "}))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("empty"));
}

// ── Reload ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn reload_switches_to_database() {
  let f = fixture().await;
  let (status, body) =
    send(&f.app, "POST", "/reload", Some(json!({"source": "database"}))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({"success": true, "active_source": "database"}));
  assert_eq!(f.service.active_source(), Source::Database);

  let (_, items) = send(&f.app, "GET", "/knowledge", None).await;
  assert_eq!(items.as_array().unwrap().len(), 1);
  assert_eq!(items[0]["category"], "数据库");
}

#[tokio::test]
async fn reload_reports_fallback_source() {
  let dir = tempfile::tempdir().unwrap();
  let unreachable = SqliteStore::new(dir.path().join("missing").join("qa.db"));
  let f = fixture_with(unreachable).await;

  let (status, body) =
    send(&f.app, "POST", "/reload", Some(json!({"source": "database"}))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({"success": true, "active_source": "json"}));
}

#[tokio::test]
async fn reload_with_unknown_source_is_rejected() {
  let f = fixture().await;
  let (status, body) = send(&f.app, "POST", "/reload", Some(json!({"source": "mysql"}))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("mysql"));
  assert_eq!(f.service.active_source(), Source::Json);
}

// ── Reads ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn knowledge_lists_and_searches() {
  let f = fixture().await;

  let (status, all) = send(&f.app, "GET", "/knowledge", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(all.as_array().unwrap().len(), 2);

  let (_, hits) = send(&f.app, "GET", "/knowledge?q=%E5%9C%B0%E7%90%86", None).await;
  let hits = hits.as_array().unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0]["id"], 2);
}

#[tokio::test]
async fn history_is_newest_first_and_limited() {
  let f = fixture().await;
  send(&f.app, "POST", "/ask", Some(json!({"question": "first"}))).await;
  send(&f.app, "POST", "/ask", Some(json!({"question": "second"}))).await;
  f.service.shutdown().await;

  let (status, body) = send(&f.app, "GET", "/history?limit=1", None).await;
  assert_eq!(status, StatusCode::OK);
  let records = body.as_array().unwrap();
  assert_eq!(records.len(), 1);
  assert_eq!(records[0]["question"], "second");
  assert_eq!(records[0]["answer"], "echo");

  let (_, body) = send(&f.app, "GET", "/history", None).await;
  assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn stats_reports_active_corpus() {
  let f = fixture().await;
  let (status, body) = send(&f.app, "GET", "/stats", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["total_items"], 2);
  assert_eq!(body["category_count"], 2);
  assert_eq!(body["active_source"], "json");
  assert_eq!(body["per_category"]["美食"], 1);
}

#[tokio::test]
async fn health_endpoints_report_ok() {
  let f = fixture().await;
  let (status, body) = send(&f.app, "GET", "/health/llm", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({"ok": true}));

  let (_, body) = send(&f.app, "GET", "/health/store", None).await;
  assert_eq!(body, json!({"ok": true}));
}
