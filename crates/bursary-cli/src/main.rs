//! `bursary`: request bursary packs from the command line.
//!
//! # Usage
//!
//! ```
//! bursary --url http://localhost:8080 --token <TOKEN> pack --city Pretoria --max-budget 4000 --nsfas-eligible true
//! bursary --config ~/.config/bursary/config.toml history --status failed
//! ```

mod client;
mod render;

use anyhow::{Context, Result};
use bursary_core::{
  ledger::RequestStatus,
  preferences::{AcademicPerformance, Preferences},
};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "bursary", about = "Request AI bursary packs from the bursary server")]
struct Args {
  /// Path to a TOML config file (url, token).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the bursary server (default: http://localhost:8080).
  #[arg(long, env = "BURSARY_URL")]
  url: Option<String>,

  /// Bearer token issued by `server --issue-token`.
  #[arg(long, env = "BURSARY_TOKEN")]
  token: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Generate packs for the given preferences.
  Pack(PackArgs),

  /// Show your past pack requests, newest first.
  History {
    /// Only show requests in this state (processing, completed, failed).
    #[arg(long)]
    status: Option<RequestStatus>,

    #[arg(long, default_value_t = 20)]
    limit: usize,
  },
}

#[derive(clap::Args, Debug)]
struct PackArgs {
  #[arg(long)]
  university: Option<String>,

  #[arg(long)]
  city: Option<String>,

  /// Maximum monthly rent in rand.
  #[arg(long)]
  max_budget: Option<f64>,

  #[arg(long)]
  field_of_study: Option<String>,

  /// excellent, good, average or below-average.
  #[arg(long)]
  academic_performance: Option<AcademicPerformance>,

  #[arg(long)]
  nsfas_eligible: Option<bool>,

  /// Background or diversity information to consider.
  #[arg(long)]
  diversity: Option<String>,

  /// Print the raw JSON response instead of the formatted packs.
  #[arg(long)]
  json: bool,
}

impl PackArgs {
  fn preferences(&self) -> Preferences {
    Preferences {
      university:           self.university.clone(),
      city:                 self.city.clone(),
      max_budget:           self.max_budget,
      field_of_study:       self.field_of_study.clone(),
      academic_performance: self.academic_performance,
      nsfas_eligible:       self.nsfas_eligible,
      diversity:            self.diversity.clone(),
    }
  }
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:   String,
  #[serde(default)]
  token: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:8080".to_string()),
    token: args
      .token
      .or_else(|| (!file_cfg.token.is_empty()).then(|| file_cfg.token.clone()))
      .unwrap_or_default(),
  };

  let client = ApiClient::new(api_config)?;

  match args.command {
    Command::Pack(pack) => {
      let resp = client.generate_pack(&pack.preferences()).await?;
      if pack.json {
        println!("{}", serde_json::to_string_pretty(&resp)?);
      } else {
        print!("{}", render::pack_response(&resp));
      }
    }
    Command::History { status, limit } => {
      let records = client.list_requests(status, limit).await?;
      print!("{}", render::history(&records));
    }
  }

  Ok(())
}
