//! Async HTTP client for an OpenAI-compatible chat-completion API.

use std::time::Duration;

use lanqa_core::chat::ChatModel;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Prompt used by [`ChatModel::test_connection`].
const PROBE_PROMPT: &str = "测试连接";

// ─── Configuration ───────────────────────────────────────────────────────────

/// Connection and sampling settings, deserialised from the `[llm]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
  /// Full URL of the `chat/completions` endpoint.
  pub api_url:      String,
  #[serde(default)]
  pub api_key:      String,
  pub model:        String,
  #[serde(default = "default_temperature")]
  pub temperature:  f64,
  #[serde(default = "default_max_tokens")]
  pub max_tokens:   u32,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
  /// System message sent ahead of every prompt.
  #[serde(default = "default_persona")]
  pub persona:      String,
}

fn default_temperature() -> f64 { 0.7 }

fn default_max_tokens() -> u32 { 1000 }

fn default_timeout_secs() -> u64 { 60 }

fn default_persona() -> String { "你是一个专业的兰州旅游专家".to_string() }

// ─── Wire format ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct Message {
  role:    String,
  content: String,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
  model:       &'a str,
  messages:    Vec<Message>,
  temperature: f64,
  max_tokens:  u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
  #[serde(default)]
  choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
  message: Message,
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Chat-completion client.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ChatClient {
  client: Client,
  config: ChatConfig,
}

impl ChatClient {
  pub fn new(config: ChatConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self { client, config })
  }

  pub fn config(&self) -> &ChatConfig { &self.config }

  /// `POST <api_url>` and return the first choice's content.
  pub async fn complete(&self, prompt: &str) -> Result<String> {
    let body = CompletionRequest {
      model:       &self.config.model,
      messages:    vec![
        Message { role: "system".into(), content: self.config.persona.clone() },
        Message { role: "user".into(), content: prompt.to_owned() },
      ],
      temperature: self.config.temperature,
      max_tokens:  self.config.max_tokens,
    };

    tracing::debug!(url = %self.config.api_url, model = %self.config.model, "calling chat API");

    // Providers disagree on the auth header, so send both.
    let resp = self
      .client
      .post(&self.config.api_url)
      .header("api-key", &self.config.api_key)
      .bearer_auth(&self.config.api_key)
      .json(&body)
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(Error::Status { status: status.as_u16(), body });
    }

    let payload: CompletionResponse = resp.json().await?;
    let answer = payload
      .choices
      .into_iter()
      .next()
      .map(|c| c.message.content)
      .filter(|content| !content.trim().is_empty())
      .ok_or(Error::EmptyAnswer)?;

    tracing::debug!(chars = answer.chars().count(), "chat API answered");
    Ok(answer)
  }
}

/// Render a failed completion as the answer string shown to the caller.
fn diagnostic(error: &Error) -> String {
  match error {
    Error::Status { status, body } => format!("API调用失败: {status} - {body}"),
    Error::EmptyAnswer => "未获取到有效回答".to_string(),
    Error::Http(e) => format!("调用API时发生错误: {e}"),
  }
}

impl ChatModel for ChatClient {
  async fn call(&self, prompt: &str) -> String {
    match self.complete(prompt).await {
      Ok(answer) => answer,
      Err(e) => {
        tracing::error!(error = %e, "chat completion failed");
        diagnostic(&e)
      }
    }
  }

  async fn test_connection(&self) -> bool {
    match self.complete(PROBE_PROMPT).await {
      Ok(_) => {
        tracing::info!(url = %self.config.api_url, "chat API reachable");
        true
      }
      Err(e) => {
        tracing::warn!(url = %self.config.api_url, error = %e, "chat API test failed");
        false
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use axum::{Json, Router, http::HeaderMap, http::StatusCode, routing::post};
  use serde_json::{Value, json};
  use tokio::net::TcpListener;

  use super::*;

  async fn ok_handler(headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    let auth = headers
      .get("authorization")
      .and_then(|v| v.to_str().ok())
      .unwrap_or_default()
      .to_string();
    let key = headers
      .get("api-key")
      .and_then(|v| v.to_str().ok())
      .unwrap_or_default()
      .to_string();
    let user = body["messages"][1]["content"].as_str().unwrap_or_default();
    let system = body["messages"][0]["content"].as_str().unwrap_or_default();
    Json(json!({
      "id": "x",
      "choices": [{
        "index": 0,
        "message": {
          "role": "assistant",
          "content": format!("{system}|{user}|{auth}|{key}|{}", body["model"].as_str().unwrap_or_default())
        },
        "finish_reason": "stop"
      }]
    }))
  }

  async fn failing_handler() -> (StatusCode, &'static str) {
    (StatusCode::SERVICE_UNAVAILABLE, "overloaded")
  }

  async fn empty_handler() -> Json<Value> { Json(json!({ "choices": [] })) }

  async fn serve() -> String {
    let app = Router::new()
      .route("/ok", post(ok_handler))
      .route("/fail", post(failing_handler))
      .route("/empty", post(empty_handler));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
  }

  fn client(api_url: String) -> ChatClient {
    ChatClient::new(ChatConfig {
      api_url,
      api_key:      "secret".into(),
      model:        "mimo-test".into(),
      temperature:  0.2,
      max_tokens:   64,
      timeout_secs: 5,
      persona:      "persona".into(),
    })
    .unwrap()
  }

  #[tokio::test]
  async fn call_returns_first_choice() {
    let base = serve().await;
    let answer = client(format!("{base}/ok")).call("hello").await;
    assert_eq!(answer, "persona|hello|Bearer secret|secret|mimo-test");
  }

  #[tokio::test]
  async fn non_success_status_becomes_diagnostic() {
    let base = serve().await;
    let c = client(format!("{base}/fail"));
    assert_eq!(c.call("hello").await, "API调用失败: 503 - overloaded");
    assert!(matches!(
      c.complete("hello").await,
      Err(Error::Status { status: 503, .. })
    ));
    assert!(!c.test_connection().await);
  }

  #[tokio::test]
  async fn empty_choices_becomes_diagnostic() {
    let base = serve().await;
    let c = client(format!("{base}/empty"));
    assert_eq!(c.call("hello").await, "未获取到有效回答");
    assert!(!c.test_connection().await);
  }

  #[tokio::test]
  async fn unreachable_endpoint_becomes_diagnostic() {
    // Bind and immediately drop a listener to get a port nobody serves.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let c = client(format!("http://{addr}/ok"));
    assert!(c.call("hello").await.starts_with("调用API时发生错误"));
    assert!(!c.test_connection().await);
  }

  #[tokio::test]
  async fn reachable_endpoint_passes_connection_test() {
    let base = serve().await;
    assert!(client(format!("{base}/ok")).test_connection().await);
  }

  #[test]
  fn config_defaults_apply() {
    let cfg: ChatConfig = serde_json::from_value(json!({
      "api_url": "http://localhost/v1/chat/completions",
      "model": "m"
    }))
    .unwrap();
    assert_eq!(cfg.max_tokens, 1000);
    assert_eq!(cfg.timeout_secs, 60);
    assert!((cfg.temperature - 0.7).abs() < f64::EPSILON);
    assert!(cfg.api_key.is_empty());
  }
}
