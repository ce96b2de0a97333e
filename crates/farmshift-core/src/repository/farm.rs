//! [`FarmRepository`] — the cached farm list of one session.

use std::sync::Arc;

use uuid::Uuid;

use super::CacheCell;
use crate::{
  Error, Result,
  farm::{Farm, FarmPatch, NewFarm},
  store::RecordStore,
};

/// Farms, kept ascending by name.
pub struct FarmRepository<S> {
  store: Arc<S>,
  cache: CacheCell<Farm>,
}

impl<S: RecordStore> FarmRepository<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store, cache: CacheCell::new(|a: &Farm, b: &Farm| a.name.cmp(&b.name)) }
  }

  pub async fn fetch(&self) -> Result<Vec<Farm>> {
    self.cache.fetch("farms", self.store.list_farms()).await
  }

  pub async fn snapshot(&self) -> Vec<Farm> { self.cache.snapshot().await }

  pub async fn error(&self) -> Option<String> { self.cache.error().await }

  pub async fn is_loading(&self) -> bool { self.cache.is_loading().await }

  /// Look up a cached farm by id.
  pub async fn get(&self, id: Uuid) -> Option<Farm> {
    self.cache.snapshot().await.into_iter().find(|f| f.id == id)
  }

  pub async fn create(&self, input: NewFarm) -> Result<Farm> {
    let store = &self.store;
    self
      .cache
      .mutate(
        "create farm",
        async move { store.insert_farm(input).await.map_err(Error::backend) },
        |items, farm| items.push(farm.clone()),
      )
      .await
  }

  pub async fn update(&self, id: Uuid, patch: FarmPatch) -> Result<Farm> {
    let store = &self.store;
    self
      .cache
      .mutate(
        "update farm",
        async move {
          store
            .update_farm(id, patch)
            .await
            .map_err(Error::backend)?
            .ok_or(Error::NotFound(id))
        },
        |items, farm| match items.iter().position(|f| f.id == id) {
          Some(i) => items[i] = farm.clone(),
          None => items.push(farm.clone()),
        },
      )
      .await
  }

  /// Fails with a backend error while shifts still reference the farm.
  pub async fn delete(&self, id: Uuid) -> Result<()> {
    let store = &self.store;
    self
      .cache
      .mutate(
        "delete farm",
        async move {
          if store.delete_farm(id).await.map_err(Error::backend)? {
            Ok(())
          } else {
            Err(Error::NotFound(id))
          }
        },
        |items, ()| items.retain(|f| f.id != id),
      )
      .await
  }
}
