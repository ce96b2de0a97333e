//! Demo data for a fresh store: three farms, four workers, and a week of
//! rotating shifts starting today.

use chrono::{Days, NaiveDate};
use farmshift_core::{
  farm::NewFarm,
  shift::{NewShift, ShiftType},
  store::RecordStore,
  worker::NewWorker,
};

const FARMS: [(&str, &str, &str); 3] = [
  ("Dairy Farm A", "North Valley, Section 1", "Dairy"),
  ("Livestock Farm B", "West Pasture, Section 3", "Livestock"),
  ("Poultry Farm C", "East Wing, Section 2", "Poultry"),
];

const WORKERS: [(&str, &str, &str); 4] = [
  ("John Doe", "john@farm.com", "+1-555-0101"),
  ("Sarah Smith", "sarah@farm.com", "+1-555-0102"),
  ("Mike Johnson", "mike@farm.com", "+1-555-0103"),
  ("Emma Wilson", "emma@farm.com", "+1-555-0104"),
];

const ROTATION: [ShiftType; 4] =
  [ShiftType::Morning, ShiftType::Evening, ShiftType::Night, ShiftType::Off];

const DAYS: u64 = 7;

/// Load the demo data unless the store already has workers. Returns whether
/// anything was inserted.
pub async fn seed_demo<S: RecordStore>(store: &S, start: NaiveDate) -> Result<bool, S::Error> {
  if !store.list_workers().await?.is_empty() {
    tracing::info!("store already has workers, skipping seed");
    return Ok(false);
  }

  let mut farms = Vec::with_capacity(FARMS.len());
  for (name, location, kind) in FARMS {
    let farm = store
      .insert_farm(NewFarm {
        location:  Some(location.into()),
        farm_type: Some(kind.into()),
        ..NewFarm::new(name)
      })
      .await?;
    farms.push(farm);
  }

  let mut workers = Vec::with_capacity(WORKERS.len());
  for (name, email, phone) in WORKERS {
    let worker = store
      .insert_worker(NewWorker {
        email: Some(email.into()),
        phone: Some(phone.into()),
        ..NewWorker::new(name)
      })
      .await?;
    workers.push(worker);
  }

  let mut shifts = 0;
  for day in 0..DAYS {
    let Some(date) = start.checked_add_days(Days::new(day)) else { break };
    for (i, worker) in workers.iter().enumerate() {
      let shift_type = ROTATION[(i + day as usize) % ROTATION.len()];
      let mut input = NewShift::new(worker.id, date, shift_type);
      if let Some((start_time, end_time)) = shift_type.default_window() {
        input.farm_id = Some(farms[i % farms.len()].id);
        input.start_time = Some(start_time);
        input.end_time = Some(end_time);
      }
      store.insert_shift(input).await?;
      shifts += 1;
    }
  }

  tracing::info!(farms = farms.len(), workers = workers.len(), shifts, "seeded demo data");
  Ok(true)
}
