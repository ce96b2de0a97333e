//! Authentication capability and the built-in mock provider.
//!
//! Dashboards depend only on [`AuthenticationProvider`]. The mock accepts any
//! credentials; the dashboard's remote provider asks the server to verify
//! them.

use std::{future::Future, time::Duration};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
  Admin,
  Worker,
}

#[derive(Debug, Clone)]
pub struct Credentials {
  pub username: String,
  pub password: String,
  /// The role the user asks to sign in as. Providers may ignore it.
  pub role:     Role,
}

/// An authenticated identity for the lifetime of one dashboard session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub username:  String,
  pub role:      Role,
  /// The worker record this user is, which scopes the worker dashboard.
  #[serde(default)]
  pub worker_id: Option<Uuid>,
}

pub trait AuthenticationProvider: Send + Sync {
  fn authenticate<'a>(
    &'a self,
    credentials: &'a Credentials,
  ) -> impl Future<Output = Result<Session>> + Send + 'a;

  fn sign_out(&self) -> impl Future<Output = ()> + Send + '_;
}

// ─── Mock provider ───────────────────────────────────────────────────────────

/// Accepts any non-empty username after a fixed delay and grants the
/// requested role. For demos and tests only.
#[derive(Debug, Clone)]
pub struct MockProvider {
  pub delay:     Duration,
  /// Worker id attached to worker-role sessions.
  pub worker_id: Option<Uuid>,
}

impl Default for MockProvider {
  fn default() -> Self { Self { delay: Duration::from_secs(1), worker_id: None } }
}

impl MockProvider {
  pub fn instant() -> Self { Self { delay: Duration::ZERO, ..Self::default() } }
}

impl AuthenticationProvider for MockProvider {
  async fn authenticate(&self, credentials: &Credentials) -> Result<Session> {
    tokio::time::sleep(self.delay).await;
    if credentials.username.trim().is_empty() {
      return Err(Error::Authentication("username is required".into()));
    }
    tracing::info!(username = %credentials.username, role = %credentials.role, "mock sign-in");
    Ok(Session {
      username:  credentials.username.clone(),
      role:      credentials.role,
      worker_id: match credentials.role {
        Role::Worker => self.worker_id,
        Role::Admin => None,
      },
    })
  }

  async fn sign_out(&self) {}
}

#[cfg(test)]
mod tests {
  use super::*;

  fn creds(username: &str, role: Role) -> Credentials {
    Credentials { username: username.into(), password: "anything".into(), role }
  }

  #[tokio::test]
  async fn mock_grants_requested_role() {
    let worker_id = Uuid::new_v4();
    let provider = MockProvider { worker_id: Some(worker_id), ..MockProvider::instant() };

    let admin = provider.authenticate(&creds("admin@farm", Role::Admin)).await.unwrap();
    assert_eq!(admin.role, Role::Admin);
    assert_eq!(admin.worker_id, None);

    let worker = provider.authenticate(&creds("john@farm", Role::Worker)).await.unwrap();
    assert_eq!(worker.worker_id, Some(worker_id));
  }

  #[tokio::test]
  async fn mock_rejects_blank_username() {
    let err = MockProvider::instant().authenticate(&creds("  ", Role::Admin)).await;
    assert!(matches!(err, Err(Error::Authentication(_))));
  }

  #[tokio::test(start_paused = true)]
  async fn mock_waits_its_delay() {
    let provider = MockProvider::default();
    let started = tokio::time::Instant::now();
    provider.authenticate(&creds("admin", Role::Admin)).await.unwrap();
    assert!(started.elapsed() >= Duration::from_secs(1));
  }
}
