//! `farmshift` — terminal dashboard for the FarmShift scheduling server.
//!
//! # Usage
//!
//! ```
//! farmshift --url http://localhost:8080 --user admin --password secret
//! farmshift --role worker --user john --password secret
//! farmshift --config ~/.config/farmshift/config.toml --log farmshift.log
//! ```

mod app;
mod client;
mod ui;

use std::{
  fs::File,
  io,
  path::{Path, PathBuf},
  sync::Mutex,
  time::Duration,
};

use anyhow::{Context, Result};
use app::App;
use chrono::Local;
use clap::Parser;
use client::{ApiClient, ApiConfig, RemoteProvider};
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use farmshift_core::auth::{AuthenticationProvider, Credentials, Role};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "farmshift", about = "Terminal dashboard for FarmShift scheduling")]
struct Args {
  /// Path to a TOML config file (url, username, password, role).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the farmshift server (default: http://localhost:8080).
  #[arg(long, env = "FARMSHIFT_URL")]
  url: Option<String>,

  /// API username.
  #[arg(long, env = "FARMSHIFT_USER")]
  user: Option<String>,

  /// API password (plaintext).
  #[arg(long, env = "FARMSHIFT_PASSWORD")]
  password: Option<String>,

  /// Dashboard to open: admin or worker (default: admin).
  #[arg(long, env = "FARMSHIFT_ROLE")]
  role: Option<Role>,

  /// Append logs to this file. The terminal is owned by the UI, so nothing
  /// is logged without it.
  #[arg(long, value_name = "FILE", env = "FARMSHIFT_LOG")]
  log: Option<PathBuf>,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  username: String,
  #[serde(default)]
  password: String,
  #[serde(default)]
  role:     Option<Role>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(path) = &args.log {
    init_logging(path)?;
  }

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
    username: args
      .user
      .or_else(|| (!file_cfg.username.is_empty()).then(|| file_cfg.username.clone()))
      .unwrap_or_default(),
    password: args
      .password
      .or_else(|| (!file_cfg.password.is_empty()).then(|| file_cfg.password.clone()))
      .unwrap_or_default(),
  };
  let role = args.role.or(file_cfg.role).unwrap_or(Role::Admin);

  if api_config.username.is_empty() {
    anyhow::bail!("no username given; pass --user or set it in the config file");
  }

  // Sign in before touching the terminal so failures print normally.
  let client = ApiClient::new(api_config.clone())?;
  let provider = RemoteProvider::new(client.clone());
  let session = provider
    .authenticate(&Credentials {
      username: api_config.username,
      password: api_config.password,
      role,
    })
    .await
    .with_context(|| format!("signing in to {}", api_config.base_url))?;
  if session.role == Role::Worker && session.worker_id.is_none() {
    anyhow::bail!("{} is not linked to a worker record", session.username);
  }

  let mut app = App::new(client, session, Local::now().date_naive());

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Load initial data. A failed load is shown in the status bar, not fatal.
  app.refresh().await;

  // Run the event loop; restore terminal even on error.
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  provider.sign_out().await;
  run_result
}

fn init_logging(path: &Path) -> Result<()> {
  let file = File::options()
    .create(true)
    .append(true)
    .open(path)
    .with_context(|| format!("opening log file {}", path.display()))?;
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_ansi(false)
    .with_writer(Mutex::new(file))
    .init();
  Ok(())
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    match maybe_event {
      // Windows reports releases too; act on presses only.
      Some(Event::Key(key)) if key.kind == KeyEventKind::Press => {
        if !app.handle_key(key).await? {
          break;
        }
      }
      // Resize and everything else: the next iteration redraws.
      _ => {}
    }
  }

  Ok(())
}
