//! [`ShiftRepository`] — the cached, joined shift list of one session.

use std::sync::Arc;

use uuid::Uuid;

use super::CacheCell;
use crate::{
  Error, Result,
  shift::{NewShift, Shift, ShiftPatch, ShiftStatus},
  store::{RecordStore, ShiftQuery},
};

/// Shifts joined with worker and farm, kept ascending by date.
///
/// A repository built with [`ShiftRepository::for_worker`] scopes its fetches
/// to one worker; mutations that move a shift out of scope drop it from the
/// cache.
pub struct ShiftRepository<S> {
  store: Arc<S>,
  query: ShiftQuery,
  cache: CacheCell<Shift>,
}

impl<S: RecordStore> ShiftRepository<S> {
  /// A repository over every shift in the store.
  pub fn new(store: Arc<S>) -> Self { Self::with_query(store, ShiftQuery::default()) }

  /// A repository over the shifts of a single worker.
  pub fn for_worker(store: Arc<S>, worker_id: Uuid) -> Self {
    Self::with_query(store, ShiftQuery::for_worker(worker_id))
  }

  pub fn with_query(store: Arc<S>, query: ShiftQuery) -> Self {
    Self {
      store,
      query,
      cache: CacheCell::new(|a: &Shift, b: &Shift| a.shift_date.cmp(&b.shift_date)),
    }
  }

  pub fn query(&self) -> &ShiftQuery { &self.query }

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Replace the cache with a fresh read from the store.
  ///
  /// If another fetch was issued, or a mutation applied, while this one was
  /// outstanding, its result is discarded and the current cache is returned.
  pub async fn fetch(&self) -> Result<Vec<Shift>> {
    self.cache.fetch("shifts", self.store.list_shifts(&self.query)).await
  }

  pub async fn snapshot(&self) -> Vec<Shift> { self.cache.snapshot().await }

  pub async fn error(&self) -> Option<String> { self.cache.error().await }

  pub async fn is_loading(&self) -> bool { self.cache.is_loading().await }

  // ── Mutations ─────────────────────────────────────────────────────────

  pub async fn create(&self, input: NewShift) -> Result<Shift> {
    let store = &self.store;
    let query = &self.query;
    self
      .cache
      .mutate(
        "create shift",
        async move { store.insert_shift(input).await.map_err(Error::backend) },
        |items, shift| {
          if query.matches(shift) {
            items.push(shift.clone());
          }
        },
      )
      .await
  }

  pub async fn update(&self, id: Uuid, patch: ShiftPatch) -> Result<Shift> {
    let store = &self.store;
    let query = &self.query;
    self
      .cache
      .mutate(
        "update shift",
        async move {
          store
            .update_shift(id, patch)
            .await
            .map_err(Error::backend)?
            .ok_or(Error::NotFound(id))
        },
        |items, shift| {
          let pos = items.iter().position(|s| s.id == id);
          match (pos, query.matches(shift)) {
            (Some(i), true) => items[i] = shift.clone(),
            (Some(i), false) => {
              items.remove(i);
            }
            (None, true) => items.push(shift.clone()),
            (None, false) => {}
          }
        },
      )
      .await
  }

  pub async fn delete(&self, id: Uuid) -> Result<()> {
    let store = &self.store;
    self
      .cache
      .mutate(
        "delete shift",
        async move {
          if store.delete_shift(id).await.map_err(Error::backend)? {
            Ok(())
          } else {
            Err(Error::NotFound(id))
          }
        },
        |items, ()| items.retain(|s| s.id != id),
      )
      .await
  }

  /// Mark a shift as worked.
  pub async fn complete(&self, id: Uuid) -> Result<Shift> {
    self.update(id, ShiftPatch::status(ShiftStatus::Completed)).await
  }

  pub async fn cancel(&self, id: Uuid) -> Result<Shift> {
    self.update(id, ShiftPatch::status(ShiftStatus::Cancelled)).await
  }
}

#[cfg(test)]
mod tests {
  use std::{collections::BTreeSet, time::Duration};

  use chrono::NaiveDate;

  use super::*;
  use crate::{
    shift::ShiftType,
    testing::{GatedStore, MemoryStore},
    worker::NewWorker,
  };

  fn date(s: &str) -> NaiveDate { s.parse().unwrap() }

  async fn seeded() -> (Arc<MemoryStore>, Uuid, Uuid) {
    let store = Arc::new(MemoryStore::default());
    let john = store.insert_worker(NewWorker::new("John Doe")).await.unwrap().id;
    let sarah = store.insert_worker(NewWorker::new("Sarah Smith")).await.unwrap().id;
    (store, john, sarah)
  }

  fn ids(shifts: &[Shift]) -> BTreeSet<Uuid> { shifts.iter().map(|s| s.id).collect() }

  #[tokio::test]
  async fn fetch_sorts_ascending_by_date() {
    let (store, john, _) = seeded().await;
    for d in ["2024-06-03", "2024-06-01", "2024-06-02"] {
      store.insert_shift(NewShift::new(john, date(d), ShiftType::Morning)).await.unwrap();
    }

    let repo = ShiftRepository::new(store);
    let shifts = repo.fetch().await.unwrap();
    let dates: Vec<_> = shifts.iter().map(|s| s.shift_date).collect();
    assert_eq!(dates, vec![date("2024-06-01"), date("2024-06-02"), date("2024-06-03")]);
    assert_eq!(shifts[0].worker.name, "John Doe");
  }

  #[tokio::test]
  async fn create_inserts_at_date_position() {
    let (store, john, _) = seeded().await;
    let repo = ShiftRepository::new(store);
    repo.create(NewShift::new(john, date("2024-06-01"), ShiftType::Morning)).await.unwrap();
    repo.create(NewShift::new(john, date("2024-06-05"), ShiftType::Night)).await.unwrap();
    let mid = repo
      .create(NewShift::new(john, date("2024-06-03"), ShiftType::Evening))
      .await
      .unwrap();

    let cached = repo.snapshot().await;
    assert_eq!(cached.len(), 3);
    assert_eq!(cached[1].id, mid.id);
  }

  #[tokio::test]
  async fn create_then_fetch_round_trips_input() {
    let (store, john, _) = seeded().await;
    let repo = ShiftRepository::new(store);

    let mut input = NewShift::new(john, date("2024-06-02"), ShiftType::Evening);
    input.notes = Some("check the milking robot".into());
    let created = repo.create(input.clone()).await.unwrap();

    let fetched = repo.fetch().await.unwrap();
    let found = fetched.iter().find(|s| s.id == created.id).unwrap();
    assert_eq!(found.input(), input);
  }

  #[tokio::test]
  async fn cache_matches_fresh_fetch_after_mutations() {
    let (store, john, sarah) = seeded().await;
    let repo = ShiftRepository::new(store.clone());
    repo.fetch().await.unwrap();

    let a = repo.create(NewShift::new(john, date("2024-06-01"), ShiftType::Morning)).await.unwrap();
    let b = repo.create(NewShift::new(sarah, date("2024-06-02"), ShiftType::Night)).await.unwrap();
    repo.create(NewShift::new(john, date("2024-06-04"), ShiftType::Off)).await.unwrap();
    repo
      .update(b.id, ShiftPatch { shift_date: Some(date("2024-06-07")), ..Default::default() })
      .await
      .unwrap();
    repo.delete(a.id).await.unwrap();
    repo.complete(b.id).await.unwrap();

    let cached = repo.snapshot().await;
    let fresh = ShiftRepository::new(store).fetch().await.unwrap();
    assert_eq!(ids(&cached), ids(&fresh));
    assert_eq!(cached, fresh);
  }

  #[tokio::test]
  async fn update_missing_id_is_not_found() {
    let (store, _, _) = seeded().await;
    let repo = ShiftRepository::new(store);
    let missing = Uuid::new_v4();

    let err = repo.update(missing, ShiftPatch::status(ShiftStatus::Cancelled)).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(id) if id == missing));
    assert!(repo.error().await.is_some());

    let err = repo.delete(missing).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
  }

  #[tokio::test]
  async fn failed_create_leaves_cache_and_sets_error() {
    let (store, john, _) = seeded().await;
    store.insert_shift(NewShift::new(john, date("2024-06-01"), ShiftType::Morning)).await.unwrap();
    let repo = ShiftRepository::new(store.clone());
    let before = repo.fetch().await.unwrap();

    store.fail_next("connection reset");
    let err = repo
      .create(NewShift::new(john, date("2024-06-02"), ShiftType::Evening))
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Backend(_)));
    assert_eq!(repo.snapshot().await, before);
    assert_eq!(repo.error().await.as_deref(), Some("connection reset"));

    let after = repo.fetch().await.unwrap();
    assert_eq!(repo.error().await, None);
    assert_eq!(after, before);
  }

  #[tokio::test]
  async fn failed_fetch_keeps_previous_cache() {
    let (store, john, _) = seeded().await;
    store.insert_shift(NewShift::new(john, date("2024-06-01"), ShiftType::Morning)).await.unwrap();
    let repo = ShiftRepository::new(store.clone());
    let before = repo.fetch().await.unwrap();

    store.fail_next("timeout");
    assert!(repo.fetch().await.is_err());
    assert_eq!(repo.snapshot().await, before);
    assert_eq!(repo.error().await.as_deref(), Some("timeout"));
  }

  #[tokio::test]
  async fn unknown_worker_is_rejected_by_store() {
    let (store, _, _) = seeded().await;
    let repo = ShiftRepository::new(store);
    let err = repo
      .create(NewShift::new(Uuid::new_v4(), date("2024-06-01"), ShiftType::Morning))
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Backend(_)));
    assert!(repo.snapshot().await.is_empty());
  }

  #[tokio::test]
  async fn worker_scope_filters_fetch_and_mutations() {
    let (store, john, sarah) = seeded().await;
    store.insert_shift(NewShift::new(john, date("2024-06-01"), ShiftType::Morning)).await.unwrap();
    store.insert_shift(NewShift::new(sarah, date("2024-06-01"), ShiftType::Night)).await.unwrap();

    let repo = ShiftRepository::for_worker(store, john);
    let shifts = repo.fetch().await.unwrap();
    assert_eq!(shifts.len(), 1);
    assert!(shifts.iter().all(|s| s.worker_id == john));

    let theirs = repo.create(NewShift::new(sarah, date("2024-06-02"), ShiftType::Off)).await.unwrap();
    assert_eq!(repo.snapshot().await.len(), 1);

    // Reassigning one of John's shifts to Sarah drops it from his view.
    let mine = shifts[0].id;
    repo
      .update(mine, ShiftPatch { worker_id: Some(sarah), ..Default::default() })
      .await
      .unwrap();
    assert!(repo.snapshot().await.is_empty());

    // And reassigning Sarah's shift to John brings it in.
    repo
      .update(theirs.id, ShiftPatch { worker_id: Some(john), ..Default::default() })
      .await
      .unwrap();
    assert_eq!(ids(&repo.snapshot().await), BTreeSet::from([theirs.id]));
  }

  #[tokio::test]
  async fn fetch_overtaken_by_mutation_is_discarded() {
    let (inner, john, _) = seeded().await;
    inner.insert_shift(NewShift::new(john, date("2024-06-01"), ShiftType::Morning)).await.unwrap();
    let store = Arc::new(GatedStore::new(inner));
    let repo = ShiftRepository::new(store.clone());

    let gate = store.hold_next_list();
    let fetch = repo.fetch();
    let mutate = async {
      // The create completes while the fetch is parked in the store.
      let created = repo
        .create(NewShift::new(john, date("2024-06-02"), ShiftType::Evening))
        .await
        .unwrap();
      gate.release();
      created
    };
    let (fetched, created) = tokio::join!(fetch, mutate);

    // The stale fetch (which read only the first shift) must not clobber the
    // cache written by the create.
    let fetched = fetched.unwrap();
    assert_eq!(ids(&fetched), BTreeSet::from([created.id]));
    assert_eq!(repo.snapshot().await, fetched);

    // A fresh fetch afterwards sees both.
    assert_eq!(repo.fetch().await.unwrap().len(), 2);
  }

  #[tokio::test]
  async fn older_fetch_is_superseded_by_newer_fetch() {
    let (inner, john, _) = seeded().await;
    let store = Arc::new(GatedStore::new(inner.clone()));
    let repo = ShiftRepository::new(store.clone());

    let gate = store.hold_next_list();
    let first = repo.fetch();
    let second = async {
      // Written behind the repository's back, so only the second fetch sees it.
      inner.insert_shift(NewShift::new(john, date("2024-06-01"), ShiftType::Night)).await.unwrap();
      let result = repo.fetch().await;
      gate.release();
      result
    };
    let (first, second) = tokio::join!(first, second);

    assert_eq!(second.unwrap().len(), 1);
    // The first fetch read an empty table but arrived late; it reports the
    // cache the newer fetch left behind.
    assert_eq!(first.unwrap().len(), 1);
    assert_eq!(repo.snapshot().await.len(), 1);
    assert!(!repo.is_loading().await);
  }

  #[tokio::test]
  async fn superseded_fetch_failure_does_not_set_error() {
    let (inner, _, _) = seeded().await;
    let store = Arc::new(GatedStore::new(inner.clone()));
    let repo = ShiftRepository::new(store.clone());

    let gate = store.hold_next_list();
    inner.fail_next("stale failure");
    let first = repo.fetch();
    let second = async {
      let result = repo.fetch().await;
      gate.release();
      result
    };
    let (first, second) = tokio::join!(first, second);

    assert!(second.is_ok());
    assert!(first.is_err());
    assert_eq!(repo.error().await, None);
  }

  #[tokio::test]
  async fn abandoned_fetch_stops_loading() {
    let (inner, john, _) = seeded().await;
    inner.insert_shift(NewShift::new(john, date("2024-06-01"), ShiftType::Morning)).await.unwrap();
    let store = Arc::new(GatedStore::new(inner));
    let repo = ShiftRepository::new(store.clone());

    let _gate = store.hold_next_list();
    let timed_out = tokio::time::timeout(Duration::from_millis(20), repo.fetch()).await;
    assert!(timed_out.is_err());
    assert!(!repo.is_loading().await);
    assert!(repo.snapshot().await.is_empty());

    // The next fetch is unaffected by the abandoned one.
    assert_eq!(repo.fetch().await.unwrap().len(), 1);
    assert!(!repo.is_loading().await);
  }

  // ─── Generated sequences ───────────────────────────────────────────────

  mod sequences {
    use std::collections::BTreeMap;

    use chrono::TimeDelta;
    use proptest::{prelude::*, test_runner::Config};

    use super::*;

    #[derive(Debug, Clone)]
    enum Step {
      Create { worker: usize, offset: i64, shift_type: ShiftType },
      Move { pick: usize, offset: i64 },
      Reassign { pick: usize, worker: usize },
      Complete { pick: usize },
      Delete { pick: usize },
      Fetch,
    }

    fn any_step() -> impl Strategy<Value = Step> {
      prop_oneof![
        (0..2_usize, 0..30_i64, prop::sample::select(ShiftType::KNOWN.to_vec()))
          .prop_map(|(worker, offset, shift_type)| Step::Create { worker, offset, shift_type }),
        (any::<usize>(), 0..30_i64).prop_map(|(pick, offset)| Step::Move { pick, offset }),
        (any::<usize>(), 0..2_usize).prop_map(|(pick, worker)| Step::Reassign { pick, worker }),
        any::<usize>().prop_map(|pick| Step::Complete { pick }),
        any::<usize>().prop_map(|pick| Step::Delete { pick }),
        Just(Step::Fetch)
      ]
    }

    fn runtime() -> tokio::runtime::Runtime {
      tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap()
    }

    /// Run one step through `repo`. Targets are picked from the whole table,
    /// so a worker-scoped repository also sees shifts moving into its scope.
    async fn run<S: RecordStore>(
      repo: &ShiftRepository<S>,
      table: &MemoryStore,
      workers: [Uuid; 2],
      step: &Step,
    ) {
      let day = |offset: i64| date("2024-06-01") + TimeDelta::days(offset);
      let all = table.list_shifts(&ShiftQuery::default()).await.unwrap();
      let target = |pick: usize| (!all.is_empty()).then(|| all[pick % all.len()].id);

      match *step {
        Step::Create { worker, offset, shift_type } => {
          repo.create(NewShift::new(workers[worker], day(offset), shift_type)).await.unwrap();
        }
        Step::Move { pick, offset } => {
          if let Some(id) = target(pick) {
            let patch = ShiftPatch { shift_date: Some(day(offset)), ..Default::default() };
            repo.update(id, patch).await.unwrap();
          }
        }
        Step::Reassign { pick, worker } => {
          if let Some(id) = target(pick) {
            let patch = ShiftPatch { worker_id: Some(workers[worker]), ..Default::default() };
            repo.update(id, patch).await.unwrap();
          }
        }
        Step::Complete { pick } => {
          if let Some(id) = target(pick) {
            repo.complete(id).await.unwrap();
          }
        }
        Step::Delete { pick } => {
          if let Some(id) = target(pick) {
            repo.delete(id).await.unwrap();
          }
        }
        Step::Fetch => {
          repo.fetch().await.unwrap();
        }
      }
    }

    fn by_id(shifts: &[Shift]) -> BTreeMap<Uuid, Shift> {
      shifts.iter().map(|s| (s.id, s.clone())).collect()
    }

    fn repo_for<S: RecordStore>(store: Arc<S>, scoped: bool, john: Uuid) -> ShiftRepository<S> {
      if scoped { ShiftRepository::for_worker(store, john) } else { ShiftRepository::new(store) }
    }

    /// The cache holds exactly what a fresh fetch with the same query returns,
    /// kept in date order.
    async fn assert_matches_fresh<S: RecordStore>(repo: &ShiftRepository<S>, table: Arc<MemoryStore>) {
      let cached = repo.snapshot().await;
      let fresh = ShiftRepository::with_query(table, repo.query().clone()).fetch().await.unwrap();
      assert_eq!(by_id(&cached), by_id(&fresh));
      assert!(cached.windows(2).all(|p| p[0].shift_date <= p[1].shift_date));
    }

    proptest! {
      #![proptest_config(Config::with_cases(64))]

      #[test]
      fn cache_tracks_store_through_any_sequence(
        scoped in any::<bool>(),
        steps in prop::collection::vec(any_step(), 0..24)
      ) {
        runtime().block_on(async {
          let (store, john, sarah) = seeded().await;
          let repo = repo_for(store.clone(), scoped, john);
          for step in &steps {
            run(&repo, &store, [john, sarah], step).await;
          }
          assert_matches_fresh(&repo, store).await;
        });
      }

      #[test]
      fn parked_fetch_never_overwrites_newer_state(
        scoped in any::<bool>(),
        before in prop::collection::vec(any_step(), 0..8),
        during in prop::collection::vec(any_step(), 0..8)
      ) {
        runtime().block_on(async {
          let (inner, john, sarah) = seeded().await;
          let store = Arc::new(GatedStore::new(inner.clone()));
          let repo = repo_for(store.clone(), scoped, john);
          for step in &before {
            run(&repo, &inner, [john, sarah], step).await;
          }

          let gate = store.hold_next_list();
          let parked = repo.fetch();
          let interleaved = async {
            for step in &during {
              run(&repo, &inner, [john, sarah], step).await;
            }
            gate.release();
          };
          let (parked, ()) = tokio::join!(parked, interleaved);

          assert_eq!(parked.unwrap(), repo.snapshot().await);
          assert!(!repo.is_loading().await);
          assert_matches_fresh(&repo, inner).await;
        });
      }
    }
  }
}
