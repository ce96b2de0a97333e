//! Repositories — in-memory caches with CRUD façades over a [`RecordStore`].
//!
//! Each repository owns one cached list, a single latest-error slot, and an
//! ordering guard. The cache lock is held only while reading or writing the
//! cache, never across a store call, so several operations can be in flight
//! at once. Completions apply in completion order, with one exception: a fetch
//! whose result arrives after a newer fetch was issued, or after any mutation
//! was applied, is discarded instead of overwriting the newer cache.
//!
//! [`RecordStore`]: crate::store::RecordStore

mod farm;
mod shift;
mod worker;

pub use farm::FarmRepository;
pub use shift::ShiftRepository;
pub use worker::WorkerRepository;

use std::{
  cmp::Ordering,
  future::Future,
  sync::atomic::{self, AtomicUsize},
};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{Error, Result};

// ─── Cache state ─────────────────────────────────────────────────────────────

struct CacheState<T> {
  items:      Vec<T>,
  /// Latest error message; overwritten by each failure, cleared by success.
  error:      Option<String>,
  /// Bumped on every applied cache write.
  generation: u64,
  /// Sequence number of the most recently issued fetch.
  fetch_seq:  u64,
}

/// What a fetch saw when it was issued.
#[derive(Debug, Clone, Copy)]
struct FetchTicket {
  seq:        u64,
  generation: u64,
}

impl<T> CacheState<T> {
  fn begin_fetch(&mut self) -> FetchTicket {
    self.fetch_seq += 1;
    FetchTicket { seq: self.fetch_seq, generation: self.generation }
  }

  /// A fetch may apply only if nothing has been issued or written since.
  fn is_current(&self, ticket: FetchTicket) -> bool {
    ticket.seq == self.fetch_seq && ticket.generation == self.generation
  }
}

// ─── Cache cell ──────────────────────────────────────────────────────────────

/// The shared machinery behind every repository: a sorted cached list guarded
/// by a mutex, plus the fetch/mutate protocol.
pub(crate) struct CacheCell<T> {
  state:     Mutex<CacheState<T>>,
  order:     fn(&T, &T) -> Ordering,
  /// Outstanding fetches. Kept outside the mutex so a fetch future dropped
  /// mid-await still gives its slot back.
  in_flight: AtomicUsize,
}

/// Holds one `in_flight` slot until dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
  fn enter(counter: &'a AtomicUsize) -> Self {
    counter.fetch_add(1, atomic::Ordering::SeqCst);
    Self(counter)
  }
}

impl Drop for InFlight<'_> {
  fn drop(&mut self) { self.0.fetch_sub(1, atomic::Ordering::SeqCst); }
}

impl<T: Clone> CacheCell<T> {
  pub(crate) fn new(order: fn(&T, &T) -> Ordering) -> Self {
    Self {
      state: Mutex::new(CacheState {
        items:      Vec::new(),
        error:      None,
        generation: 0,
        fetch_seq:  0,
      }),
      order,
      in_flight: AtomicUsize::new(0),
    }
  }

  /// Run a fetch and, if it is still current on completion, replace the
  /// whole cache with its result. Returns the cache as it stands afterwards.
  pub(crate) async fn fetch<F, E>(&self, entity: &'static str, op: F) -> Result<Vec<T>>
  where
    F: Future<Output = Result<Vec<T>, E>>,
    E: std::error::Error,
  {
    let loading = InFlight::enter(&self.in_flight);
    let ticket = self.state.lock().await.begin_fetch();
    let result = op.await;

    let mut state = self.state.lock().await;
    drop(loading);
    let current = state.is_current(ticket);

    match result {
      Ok(mut items) if current => {
        items.sort_by(self.order);
        state.items = items;
        state.generation += 1;
        state.error = None;
        Ok(state.items.clone())
      }
      Ok(_) => {
        debug!(entity, seq = ticket.seq, "discarding superseded fetch");
        Ok(state.items.clone())
      }
      Err(e) => {
        let err = Error::backend(e);
        warn!(entity, error = %err, current, "fetch failed");
        if current {
          state.error = Some(err.to_string());
        }
        Err(err)
      }
    }
  }

  /// Run a mutation; on success let `apply` edit the cache, then re-sort.
  pub(crate) async fn mutate<R, F>(
    &self,
    operation: &'static str,
    op: F,
    apply: impl FnOnce(&mut Vec<T>, &R),
  ) -> Result<R>
  where
    F: Future<Output = Result<R>>,
  {
    let result = op.await;

    let mut state = self.state.lock().await;
    match result {
      Ok(value) => {
        apply(&mut state.items, &value);
        state.items.sort_by(self.order);
        state.generation += 1;
        state.error = None;
        Ok(value)
      }
      Err(err) => {
        warn!(operation, error = %err, "mutation failed");
        state.error = Some(err.to_string());
        Err(err)
      }
    }
  }

  pub(crate) async fn snapshot(&self) -> Vec<T> { self.state.lock().await.items.clone() }

  pub(crate) async fn error(&self) -> Option<String> { self.state.lock().await.error.clone() }

  pub(crate) async fn is_loading(&self) -> bool {
    self.in_flight.load(atomic::Ordering::SeqCst) > 0
  }
}
