//! `farmshift-server`: serve the scheduling API from a SQLite file.
//!
//! ```
//! farmshift-server                         # ./config.toml, if present
//! farmshift-server --config /etc/farmshift.toml --seed
//! farmshift-server --hash-password         # for a [[users]] entry
//! ```

use std::{io, path::PathBuf, sync::Arc};

use anyhow::{Context as _, Result};
use chrono::Local;
use clap::Parser;
use farmshift_server::{
  AppState, ServerConfig,
  auth::{AuthConfig, hash_password},
  seed::seed_demo,
};
use farmshift_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "FarmShift scheduling server")]
struct Cli {
  /// TOML file with host, port, store_path and [[users]].
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Read a password from stdin, print its argon2 hash, and exit.
  #[arg(long)]
  hash_password: bool,

  /// Populate an empty store with demo farms, workers and this week's shifts.
  #[arg(long)]
  seed: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.hash_password {
    let hash = hash_password(&prompt_password()?).map_err(|e| anyhow::anyhow!("hashing: {e}"))?;
    println!("{hash}");
    return Ok(());
  }

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let config = ServerConfig::load(&cli.config)
    .with_context(|| format!("loading {}", cli.config.display()))?;
  serve(config, cli.seed).await
}

async fn serve(config: ServerConfig, seed: bool) -> Result<()> {
  if config.users.is_empty() {
    tracing::warn!("no [[users]] configured; all requests will get 401");
  }

  let store = SqliteStore::open(&config.store_path)
    .await
    .with_context(|| format!("opening store {}", config.store_path.display()))?;
  if seed {
    seed_demo(&store, Local::now().date_naive()).await.context("seeding demo data")?;
  }

  let address = config.address();
  let state = AppState {
    store: Arc::new(store),
    auth:  Arc::new(AuthConfig { users: config.users }),
  };
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("binding {address}"))?;
  tracing::info!(%address, "serving");

  axum::serve(listener, farmshift_server::router(state)).await.context("serving")
}

fn prompt_password() -> Result<String> {
  eprint!("Password: ");
  let line = io::stdin().lines().next().transpose()?.unwrap_or_default();
  Ok(line.trim_end_matches('\r').to_owned())
}
