//! [`WorkerRepository`] — the cached worker list of one session.

use std::sync::Arc;

use uuid::Uuid;

use super::CacheCell;
use crate::{
  Error, Result,
  store::RecordStore,
  worker::{NewWorker, Worker, WorkerPatch},
};

/// Workers, kept ascending by name.
pub struct WorkerRepository<S> {
  store: Arc<S>,
  cache: CacheCell<Worker>,
}

impl<S: RecordStore> WorkerRepository<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store, cache: CacheCell::new(|a: &Worker, b: &Worker| a.name.cmp(&b.name)) }
  }

  pub async fn fetch(&self) -> Result<Vec<Worker>> {
    self.cache.fetch("workers", self.store.list_workers()).await
  }

  pub async fn snapshot(&self) -> Vec<Worker> { self.cache.snapshot().await }

  pub async fn error(&self) -> Option<String> { self.cache.error().await }

  pub async fn is_loading(&self) -> bool { self.cache.is_loading().await }

  pub async fn get(&self, id: Uuid) -> Option<Worker> {
    self.cache.snapshot().await.into_iter().find(|w| w.id == id)
  }

  pub async fn create(&self, input: NewWorker) -> Result<Worker> {
    let store = &self.store;
    self
      .cache
      .mutate(
        "create worker",
        async move { store.insert_worker(input).await.map_err(Error::backend) },
        |items, worker| items.push(worker.clone()),
      )
      .await
  }

  pub async fn update(&self, id: Uuid, patch: WorkerPatch) -> Result<Worker> {
    let store = &self.store;
    self
      .cache
      .mutate(
        "update worker",
        async move {
          store
            .update_worker(id, patch)
            .await
            .map_err(Error::backend)?
            .ok_or(Error::NotFound(id))
        },
        |items, worker| match items.iter().position(|w| w.id == id) {
          Some(i) => items[i] = worker.clone(),
          None => items.push(worker.clone()),
        },
      )
      .await
  }

  /// Fails with a backend error while shifts still reference the worker.
  pub async fn delete(&self, id: Uuid) -> Result<()> {
    let store = &self.store;
    self
      .cache
      .mutate(
        "delete worker",
        async move {
          if store.delete_worker(id).await.map_err(Error::backend)? {
            Ok(())
          } else {
            Err(Error::NotFound(id))
          }
        },
        |items, ()| items.retain(|w| w.id != id),
      )
      .await
  }
}
