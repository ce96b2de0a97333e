//! Async HTTP client wrapping the FarmShift JSON API.
//!
//! [`ApiClient`] implements [`RecordStore`], so the dashboard's repositories
//! talk to the server exactly as the server talks to SQLite.

use std::time::Duration;

use anyhow::Context as _;
use farmshift_core::{
  auth::{AuthenticationProvider, Credentials, Session},
  farm::{Farm, FarmPatch, NewFarm},
  shift::{NewShift, Shift, ShiftPatch},
  store::{RecordStore, ShiftQuery},
  worker::{NewWorker, Worker, WorkerPatch},
};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;
use uuid::Uuid;

/// Connection settings for the FarmShift API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub username: String,
  pub password: String,
}

#[derive(Debug, Error)]
pub enum ClientError {
  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),

  /// The server answered with a non-success status.
  #[error("{path} → {status}: {message}")]
  Status {
    path:    String,
    status:  StatusCode,
    message: String,
  },
}

/// Body of a non-success API response.
#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

/// Async HTTP client for the FarmShift JSON REST API.
///
/// Clones share the inner [`reqwest::Client`] connection pool.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> anyhow::Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  /// The same server with different credentials.
  pub fn with_credentials(&self, username: &str, password: &str) -> Self {
    Self {
      client: self.client.clone(),
      config: ApiConfig {
        base_url: self.config.base_url.clone(),
        username: username.to_owned(),
        password: password.to_owned(),
      },
    }
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  fn request(&self, method: Method, path: &str) -> RequestBuilder {
    let req = self.client.request(method, self.url(path));
    if self.config.username.is_empty() {
      req
    } else {
      req.basic_auth(&self.config.username, Some(&self.config.password))
    }
  }

  /// `GET /api/session`: who the configured credentials belong to.
  pub async fn session(&self) -> Result<Session, ClientError> {
    let resp = self.request(Method::GET, "/session").send().await?;
    json(resp).await
  }
}

// ─── Response helpers ────────────────────────────────────────────────────────

async fn success(resp: Response) -> Result<Response, ClientError> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let path = resp.url().path().to_owned();
  let message = match resp.json::<ErrorBody>().await {
    Ok(body) => body.error,
    Err(_) => status.canonical_reason().unwrap_or("error").to_owned(),
  };
  Err(ClientError::Status { path, status, message })
}

async fn json<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
  Ok(success(resp).await?.json().await?)
}

/// A 404 names an unknown id only if it carries the API's error body. A bare
/// 404 never reached a route, which usually means a wrong base URL.
async fn unknown_id(resp: Response) -> Result<(), ClientError> {
  let path = resp.url().path().to_owned();
  match resp.json::<ErrorBody>().await {
    Ok(_) => Ok(()),
    Err(_) => Err(ClientError::Status {
      path,
      status: StatusCode::NOT_FOUND,
      message: "no such route (check the server URL)".to_owned(),
    }),
  }
}

async fn optional<T: DeserializeOwned>(resp: Response) -> Result<Option<T>, ClientError> {
  if resp.status() == StatusCode::NOT_FOUND {
    return unknown_id(resp).await.map(|()| None);
  }
  json(resp).await.map(Some)
}

async fn deleted(resp: Response) -> Result<bool, ClientError> {
  if resp.status() == StatusCode::NOT_FOUND {
    return unknown_id(resp).await.map(|()| false);
  }
  success(resp).await?;
  Ok(true)
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for ApiClient {
  type Error = ClientError;

  // ── Farms ─────────────────────────────────────────────────────────────────

  /// `GET /api/farms`
  async fn list_farms(&self) -> Result<Vec<Farm>, ClientError> {
    json(self.request(Method::GET, "/farms").send().await?).await
  }

  /// `POST /api/farms`
  async fn insert_farm(&self, input: NewFarm) -> Result<Farm, ClientError> {
    json(self.request(Method::POST, "/farms").json(&input).send().await?).await
  }

  /// `PATCH /api/farms/<id>`
  async fn update_farm(&self, id: Uuid, patch: FarmPatch) -> Result<Option<Farm>, ClientError> {
    let path = format!("/farms/{id}");
    optional(self.request(Method::PATCH, &path).json(&patch).send().await?).await
  }

  /// `DELETE /api/farms/<id>`
  async fn delete_farm(&self, id: Uuid) -> Result<bool, ClientError> {
    deleted(self.request(Method::DELETE, &format!("/farms/{id}")).send().await?).await
  }

  // ── Workers ───────────────────────────────────────────────────────────────

  /// `GET /api/workers`
  async fn list_workers(&self) -> Result<Vec<Worker>, ClientError> {
    json(self.request(Method::GET, "/workers").send().await?).await
  }

  /// `POST /api/workers`
  async fn insert_worker(&self, input: NewWorker) -> Result<Worker, ClientError> {
    json(self.request(Method::POST, "/workers").json(&input).send().await?).await
  }

  /// `PATCH /api/workers/<id>`
  async fn update_worker(
    &self,
    id: Uuid,
    patch: WorkerPatch,
  ) -> Result<Option<Worker>, ClientError> {
    let path = format!("/workers/{id}");
    optional(self.request(Method::PATCH, &path).json(&patch).send().await?).await
  }

  /// `DELETE /api/workers/<id>`
  async fn delete_worker(&self, id: Uuid) -> Result<bool, ClientError> {
    deleted(self.request(Method::DELETE, &format!("/workers/{id}")).send().await?).await
  }

  // ── Shifts ────────────────────────────────────────────────────────────────

  /// `GET /api/shifts[?worker_id=&from=&to=]`
  async fn list_shifts(&self, query: &ShiftQuery) -> Result<Vec<Shift>, ClientError> {
    json(self.request(Method::GET, "/shifts").query(query).send().await?).await
  }

  /// `GET /api/shifts/<id>`
  async fn get_shift(&self, id: Uuid) -> Result<Option<Shift>, ClientError> {
    optional(self.request(Method::GET, &format!("/shifts/{id}")).send().await?).await
  }

  /// `POST /api/shifts`
  async fn insert_shift(&self, input: NewShift) -> Result<Shift, ClientError> {
    json(self.request(Method::POST, "/shifts").json(&input).send().await?).await
  }

  /// `PATCH /api/shifts/<id>`
  async fn update_shift(&self, id: Uuid, patch: ShiftPatch) -> Result<Option<Shift>, ClientError> {
    let path = format!("/shifts/{id}");
    optional(self.request(Method::PATCH, &path).json(&patch).send().await?).await
  }

  /// `DELETE /api/shifts/<id>`
  async fn delete_shift(&self, id: Uuid) -> Result<bool, ClientError> {
    deleted(self.request(Method::DELETE, &format!("/shifts/{id}")).send().await?).await
  }
}

// ─── Authentication ──────────────────────────────────────────────────────────

/// Signs in by asking the server who a set of credentials belongs to.
pub struct RemoteProvider {
  client: ApiClient,
}

impl RemoteProvider {
  pub fn new(client: ApiClient) -> Self { Self { client } }
}

impl AuthenticationProvider for RemoteProvider {
  async fn authenticate(&self, credentials: &Credentials) -> farmshift_core::Result<Session> {
    use farmshift_core::Error;

    let session = self
      .client
      .with_credentials(&credentials.username, &credentials.password)
      .session()
      .await
      .map_err(|e| match e {
        ClientError::Status { status, .. } if status == StatusCode::UNAUTHORIZED => {
          Error::Authentication("invalid username or password".into())
        }
        other => Error::backend(other),
      })?;

    if session.role != credentials.role {
      return Err(Error::Authentication(format!(
        "{} has no {} access",
        session.username, credentials.role
      )));
    }
    tracing::info!(username = %session.username, role = %session.role, "signed in");
    Ok(session)
  }

  async fn sign_out(&self) {
    tracing::info!("signed out");
  }
}
