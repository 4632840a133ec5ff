//! lanqa server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), builds the stores,
//! the chat client and the question-answering service, and serves the JSON
//! API over HTTP.
//!
//! # Seeding the database
//!
//! To copy the JSON knowledge file into the SQLite `qa_pairs` table:
//!
//! ```
//! cargo run -p lanqa-server -- import
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use lanqa_llm::ChatClient;
use lanqa_server::AppConfig;
use lanqa_service::QaService;
use lanqa_store_json::JsonStore;
use lanqa_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "lanqa question-answering server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API (default).
  Serve,
  /// Copy the JSON knowledge items into the SQLite database and exit.
  Import,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let app_cfg = AppConfig::load(&cli.config)
    .with_context(|| format!("failed to load config from {:?}", cli.config))?;
  app_cfg.validate().context("invalid retrieval settings")?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(app_cfg).await,
    Command::Import => import(app_cfg).await,
  }
}

async fn serve(app_cfg: AppConfig) -> anyhow::Result<()> {
  let json = Arc::new(JsonStore::new(
    &app_cfg.knowledge.knowledge_path,
    &app_cfg.knowledge.history_path,
  ));

  // Connected lazily on the first reload, so an unreachable database only
  // triggers the JSON fallback instead of aborting startup.
  let database = app_cfg
    .database
    .enabled
    .then(|| Arc::new(SqliteStore::new(app_cfg.database_path())));

  let chat = ChatClient::new(app_cfg.llm.clone()).context("failed to build LLM client")?;

  let service = Arc::new(
    QaService::start(app_cfg.service_config(), json, database, Arc::new(chat))
      .await
      .context("failed to start service")?,
  );
  tracing::info!(
    source = %service.active_source(),
    items = service.knowledge().len(),
    "knowledge base ready"
  );

  let app = lanqa_api::api_router(service.clone(), app_cfg.knowledge.history_limit);
  let address = format!("{}:{}", app_cfg.server.host, app_cfg.server.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  service.shutdown().await;
  tracing::info!("shut down");
  Ok(())
}

async fn import(app_cfg: AppConfig) -> anyhow::Result<()> {
  let json = JsonStore::new(&app_cfg.knowledge.knowledge_path, &app_cfg.knowledge.history_path);
  let items = json
    .load_items()
    .await
    .context("failed to read knowledge file")?;

  let path = app_cfg.database_path();
  let store = SqliteStore::open(&path)
    .await
    .with_context(|| format!("failed to open store at {path:?}"))?;

  for item in &items {
    store
      .insert_item(item.question.clone(), item.answer.clone())
      .await
      .with_context(|| format!("failed to import item {}", item.id))?;
  }

  tracing::info!(items = items.len(), path = ?path, "imported knowledge items");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for ctrl-c");
  }
}
