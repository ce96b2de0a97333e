//! FarmShift server: the JSON API behind HTTP Basic auth.
//!
//! Exposes an axum [`Router`] that mounts [`farmshift_api::api_router`] under
//! `/api` together with `/api/session`, which tells a dashboard who it signed
//! in as.

pub mod auth;
pub mod error;
pub mod seed;

pub use error::Error;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{Extension, Json, Router, middleware, routing::get};
use farmshift_core::{
  auth::{Role, Session},
  store::RecordStore,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use auth::{AuthConfig, require_auth};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  #[serde(default)]
  pub users:      Vec<UserConfig>,
}

/// One account allowed to sign in.
#[derive(Deserialize, Clone)]
pub struct UserConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  pub role:          Role,
  /// The worker record a worker account sees the schedule of.
  #[serde(default)]
  pub worker_id:     Option<Uuid>,
}

impl ServerConfig {
  /// Defaults, then the TOML file at `path` if it exists, then `FARMSHIFT_*`
  /// environment variables. A leading `~/` in `store_path` resolves against
  /// `$HOME`.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    let mut loaded: Self = config::Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 8080)?
      .set_default("store_path", "farmshift.db")?
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("FARMSHIFT"))
      .build()?
      .try_deserialize()?;
    loaded.store_path = under_home(loaded.store_path);
    Ok(loaded)
  }

  /// `host:port`, ready for binding.
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

fn under_home(path: PathBuf) -> PathBuf {
  if let (Ok(rest), Some(home)) = (path.strip_prefix("~"), std::env::var_os("HOME")) {
    return PathBuf::from(home).join(rest);
  }
  path
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through the router.
#[derive(Clone)]
pub struct AppState<S> {
  pub store: Arc<S>,
  pub auth:  Arc<AuthConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the server's axum [`Router`]. Every route requires authentication.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: RecordStore + 'static,
{
  let api = farmshift_api::api_router(state.store.clone()).route("/session", get(session));

  Router::new()
    .nest("/api", api)
    .layer(middleware::from_fn_with_state(state.auth.clone(), require_auth))
    .layer(TraceLayer::new_for_http())
}

/// `GET /api/session`
async fn session(Extension(session): Extension<Session>) -> Json<Session> { Json(session) }

// ─── Integration tests ────────────────────────────────────────────────────────
