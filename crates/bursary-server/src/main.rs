//! bursary-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered under
//! `BURSARY_*` environment variables, opens an in-process SQLite store, and
//! serves the pack API over HTTP.
//!
//! # Issuing tokens
//!
//! ```
//! cargo run -p bursary-server --bin server -- --issue-token <USER_UUID> [--admin]
//! ```
//!
//! # Loading listings
//!
//! ```
//! cargo run -p bursary-server --bin server -- --import-listings listings.json
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use bursary_ai::HttpCompletionClient;
use bursary_core::identity::Principal;
use bursary_server::{
  AppState, ServerConfig,
  auth::{generate_token, hash_token},
};
use bursary_store_sqlite::{ListingImport, SqliteStore};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(author, version, about = "Bursary pack server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Issue a bearer token for the given user id, print it once and exit.
  #[arg(long, value_name = "USER_UUID")]
  issue_token: Option<Uuid>,

  /// Grant the issued token the admin role.
  #[arg(long, requires = "issue_token")]
  admin: bool,

  /// Upsert accommodations and bursaries from a JSON file and exit.
  #[arg(long, value_name = "FILE", conflicts_with = "issue_token")]
  import_listings: Option<PathBuf>,
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

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("BURSARY"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  anyhow::ensure!(
    server_cfg.cache_ttl().is_some(),
    "cache_ttl_hours must be a positive number of hours, got {}",
    server_cfg.cache_ttl_hours
  );

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  // Open SQLite store.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // Helper mode: issue a token and exit.
  if let Some(user_id) = cli.issue_token {
    let token = generate_token();
    store
      .register_token(hash_token(&token), Principal { user_id, is_admin: cli.admin })
      .await
      .context("failed to register token")?;
    tracing::info!(%user_id, admin = cli.admin, "issued bearer token");
    println!("{token}");
    return Ok(());
  }

  // Helper mode: import listings and exit.
  if let Some(path) = cli.import_listings {
    let raw = std::fs::read_to_string(&path)
      .with_context(|| format!("failed to read {path:?}"))?;
    let import: ListingImport = serde_json::from_str(&raw)
      .with_context(|| format!("failed to parse listings in {path:?}"))?;
    let (accommodations, bursaries) = store
      .import_listings(&import)
      .await
      .context("failed to import listings")?;
    println!("imported {accommodations} accommodations and {bursaries} bursaries");
    return Ok(());
  }

  anyhow::ensure!(
    !server_cfg.completion_api_key.is_empty(),
    "completion_api_key is not configured (set BURSARY_COMPLETION_API_KEY)"
  );

  let completion = HttpCompletionClient::new(server_cfg.completion())
    .context("failed to build completion client")?;

  // Build application state.
  let state = AppState::new(Arc::new(store), Arc::new(completion), server_cfg.clone());

  let app = bursary_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
