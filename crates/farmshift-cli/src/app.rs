//! Application state machine and event dispatcher.

use std::sync::Arc;

use chrono::{Days, Months, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use farmshift_core::{
  auth::{Role, Session},
  farm::{Farm, FarmPatch, NewFarm},
  form::{AssignmentForm, FormField},
  recurrence::RepeatPattern,
  repository::{FarmRepository, ShiftRepository, WorkerRepository},
  shift::{Shift, ShiftType},
  views::{self, CalendarEvent},
  worker::{NewWorker, Worker, WorkerPatch},
};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::client::ApiClient;

// ─── Tabs ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
  /// Admin: headline stats, today's shifts, and upcoming shifts.
  Overview,
  /// Worker: the signed-in worker's own shifts.
  Schedule,
  Calendar,
  Farms,
  Workers,
  /// Admin: the shift assignment form.
  Assign,
}

impl Tab {
  pub const ADMIN: [Tab; 5] = [Tab::Overview, Tab::Calendar, Tab::Farms, Tab::Workers, Tab::Assign];
  pub const WORKER: [Tab; 2] = [Tab::Schedule, Tab::Calendar];

  pub fn title(self) -> &'static str {
    match self {
      Tab::Overview => "Overview",
      Tab::Schedule => "My Shifts",
      Tab::Calendar => "Calendar",
      Tab::Farms => "Farms",
      Tab::Workers => "Workers",
      Tab::Assign => "Assign",
    }
  }

  /// Tabs whose keys go to text input rather than shortcuts.
  fn captures_text(self) -> bool { self == Tab::Assign }
}

// ─── Assignment form rows ─────────────────────────────────────────────────────

/// One focusable row of the assignment form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormRow {
  Field(FormField),
  Recurring,
}

pub const FORM_ROWS: [FormRow; 10] = [
  FormRow::Field(FormField::Worker),
  FormRow::Field(FormField::Farm),
  FormRow::Field(FormField::Date),
  FormRow::Field(FormField::ShiftType),
  FormRow::Field(FormField::StartTime),
  FormRow::Field(FormField::EndTime),
  FormRow::Field(FormField::Notes),
  FormRow::Recurring,
  FormRow::Field(FormField::Pattern),
  FormRow::Field(FormField::Occurrences),
];

// ─── Record editor ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKind {
  Farm,
  Worker,
}

/// Inline add/edit form for a farm or worker. Fields are name plus two
/// optional columns.
#[derive(Debug, Clone)]
pub struct Editor {
  pub kind:   EditorKind,
  /// `None` when adding.
  pub target: Option<Uuid>,
  pub fields: [String; 3],
  pub focus:  usize,
}

impl Editor {
  pub fn new(kind: EditorKind) -> Self {
    Self { kind, target: None, fields: Default::default(), focus: 0 }
  }

  pub fn edit_farm(farm: &Farm) -> Self {
    Self {
      kind:   EditorKind::Farm,
      target: Some(farm.id),
      fields: [
        farm.name.clone(),
        farm.location.clone().unwrap_or_default(),
        farm.farm_type.clone().unwrap_or_default(),
      ],
      focus:  0,
    }
  }

  pub fn edit_worker(worker: &Worker) -> Self {
    Self {
      kind:   EditorKind::Worker,
      target: Some(worker.id),
      fields: [
        worker.name.clone(),
        worker.email.clone().unwrap_or_default(),
        worker.phone.clone().unwrap_or_default(),
      ],
      focus:  0,
    }
  }

  pub fn labels(&self) -> [&'static str; 3] {
    match self.kind {
      EditorKind::Farm => ["Name", "Location", "Type"],
      EditorKind::Worker => ["Name", "Email", "Phone"],
    }
  }

  fn optional(&self, i: usize) -> Option<String> {
    Some(self.fields[i].trim().to_owned()).filter(|s| !s.is_empty())
  }

  fn name(&self) -> String { self.fields[0].trim().to_owned() }

  pub fn new_farm(&self) -> NewFarm {
    NewFarm { name: self.name(), location: self.optional(1), farm_type: self.optional(2) }
  }

  /// Every field is written, so a cleared field becomes null.
  pub fn farm_patch(&self) -> FarmPatch {
    FarmPatch {
      name:      Some(self.name()),
      location:  Some(self.optional(1)),
      farm_type: Some(self.optional(2)),
    }
  }

  pub fn new_worker(&self) -> NewWorker {
    NewWorker { name: self.name(), email: self.optional(1), phone: self.optional(2) }
  }

  pub fn worker_patch(&self) -> WorkerPatch {
    WorkerPatch {
      name:  Some(self.name()),
      email: Some(self.optional(1)),
      phone: Some(self.optional(2)),
    }
  }
}

// ─── Snapshot ─────────────────────────────────────────────────────────────────

/// Copies of the repository caches, taken after every operation so drawing
/// never has to await.
#[derive(Debug, Default)]
pub struct Snapshot {
  pub shifts:  Vec<Shift>,
  pub farms:   Vec<Farm>,
  pub workers: Vec<Worker>,
  pub loading: bool,
  pub error:   Option<String>,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state for one signed-in session.
pub struct App {
  pub session: Session,

  /// The date "today" views are computed for.
  pub today: NaiveDate,

  pub tab: Tab,

  pub shifts:  ShiftRepository<ApiClient>,
  pub farms:   FarmRepository<ApiClient>,
  pub workers: WorkerRepository<ApiClient>,

  pub data: Snapshot,

  /// Cursor within the current tab's list.
  pub cursor: usize,

  /// Selected day on the calendar tab.
  pub day: NaiveDate,

  /// Current fuzzy-filter string for the farm and worker lists.
  pub filter: String,

  /// Whether the user is typing a filter query.
  pub filter_active: bool,

  /// Open farm or worker editor, if any.
  pub editor: Option<Editor>,

  pub form:       AssignmentForm,
  /// Index into [`FORM_ROWS`].
  pub form_focus: usize,

  /// One-line status message shown in the status bar.
  pub status_msg: String,
}

impl App {
  /// Build the session's repositories over `client`. A worker session sees
  /// only its own shifts.
  pub fn new(client: ApiClient, session: Session, today: NaiveDate) -> Self {
    let store = Arc::new(client);
    let (tab, shifts) = match (session.role, session.worker_id) {
      (Role::Worker, Some(worker_id)) => {
        (Tab::Schedule, ShiftRepository::for_worker(store.clone(), worker_id))
      }
      _ => (Tab::Overview, ShiftRepository::new(store.clone())),
    };
    Self {
      session,
      today,
      tab,
      shifts,
      farms: FarmRepository::new(store.clone()),
      workers: WorkerRepository::new(store),
      data: Snapshot::default(),
      cursor: 0,
      day: today,
      filter: String::new(),
      filter_active: false,
      editor: None,
      form: AssignmentForm::new(),
      form_focus: 0,
      status_msg: String::new(),
    }
  }

  pub fn is_admin(&self) -> bool { self.session.role == Role::Admin }

  pub fn tabs(&self) -> &'static [Tab] {
    if self.is_admin() { &Tab::ADMIN } else { &Tab::WORKER }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Fetch everything this session shows. Failures land in the status bar;
  /// the previous data stays on screen.
  pub async fn refresh(&mut self) {
    self.status_msg.clear();
    if self.is_admin() {
      let (s, f, w) = tokio::join!(self.shifts.fetch(), self.farms.fetch(), self.workers.fetch());
      self.report(s.and(f).and(w).map(|_| ()));
    } else {
      let result = self.shifts.fetch().await;
      self.report(result.map(|_| ()));
    }
    self.sync().await;
  }

  /// Copy the repository caches into [`App::data`].
  pub async fn sync(&mut self) {
    self.data.shifts = self.shifts.snapshot().await;
    self.data.farms = self.farms.snapshot().await;
    self.data.workers = self.workers.snapshot().await;
    self.data.loading =
      self.shifts.is_loading().await || self.farms.is_loading().await || self.workers.is_loading().await;
    self.data.error = match self.shifts.error().await {
      Some(e) => Some(e),
      None => match self.farms.error().await {
        Some(e) => Some(e),
        None => self.workers.error().await,
      },
    };
    self.cursor = self.cursor.min(self.list_len().saturating_sub(1));
  }

  fn report(&mut self, result: farmshift_core::Result<()>) {
    match result {
      Ok(()) => debug!(role = %self.session.role, "refreshed"),
      Err(e) => {
        warn!(error = %e, "refresh failed");
        self.status_msg = format!("Error: {e}");
      }
    }
  }

  // ── Derived lists ─────────────────────────────────────────────────────────

  /// Shifts on or after today: the actionable list on the overview and
  /// schedule tabs.
  pub fn upcoming(&self) -> Vec<Shift> { views::upcoming_from(&self.data.shifts, self.today) }

  pub fn calendar_events(&self) -> Vec<CalendarEvent> {
    views::to_calendar_events(&self.data.shifts)
  }

  /// Events on the selected calendar day.
  pub fn day_events(&self) -> Vec<CalendarEvent> {
    let events = self.calendar_events();
    views::events_on(&events, self.day).into_iter().cloned().collect()
  }

  fn matches_filter(&self, haystacks: &[Option<&str>]) -> bool {
    if self.filter.is_empty() {
      return true;
    }
    let matcher = SkimMatcherV2::default();
    haystacks
      .iter()
      .flatten()
      .any(|h| matcher.fuzzy_match(h, &self.filter).is_some())
  }

  pub fn filtered_farms(&self) -> Vec<&Farm> {
    self
      .data
      .farms
      .iter()
      .filter(|f| self.matches_filter(&[Some(&f.name), f.location.as_deref(), f.farm_type.as_deref()]))
      .collect()
  }

  pub fn filtered_workers(&self) -> Vec<&Worker> {
    self
      .data
      .workers
      .iter()
      .filter(|w| self.matches_filter(&[Some(&w.name), w.email.as_deref()]))
      .collect()
  }

  fn list_len(&self) -> usize {
    match self.tab {
      Tab::Overview | Tab::Schedule => self.upcoming().len(),
      Tab::Calendar => self.day_events().len(),
      Tab::Farms => self.filtered_farms().len(),
      Tab::Workers => self.filtered_workers().len(),
      Tab::Assign => FORM_ROWS.len(),
    }
  }

  fn cursor_shift(&self) -> Option<Shift> { self.upcoming().into_iter().nth(self.cursor) }

  /// Display name for the worker whose id is in the form, if known.
  pub fn worker_name(&self, id: &str) -> Option<&str> {
    self.data.workers.iter().find(|w| w.id.to_string() == id).map(|w| w.name.as_str())
  }

  pub fn farm_name(&self, id: &str) -> Option<&str> {
    self.data.farms.iter().find(|f| f.id.to_string() == id).map(|f| f.name.as_str())
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    if self.editor.is_some() {
      self.handle_editor_key(key).await;
      return Ok(true);
    }

    if self.filter_active {
      self.handle_filter_key(key);
      return Ok(true);
    }

    // Tab switching works everywhere else.
    match key.code {
      KeyCode::Tab => {
        self.switch_tab(1);
        return Ok(true);
      }
      KeyCode::BackTab => {
        self.switch_tab(-1);
        return Ok(true);
      }
      _ => {}
    }

    if self.tab.captures_text() {
      self.handle_form_key(key).await;
      return Ok(true);
    }

    match key.code {
      KeyCode::Char('q') => return Ok(false),
      KeyCode::Char('r') => self.refresh().await,
      KeyCode::Down | KeyCode::Char('j') => {
        if self.cursor + 1 < self.list_len() {
          self.cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => self.cursor = self.cursor.saturating_sub(1),
      KeyCode::Char(c @ '1'..='9') => {
        let index = c as usize - '1' as usize;
        if let Some(tab) = self.tabs().get(index).copied() {
          self.open_tab(tab);
        }
      }
      _ => match self.tab {
        Tab::Overview | Tab::Schedule => self.handle_shift_key(key).await,
        Tab::Calendar => self.handle_calendar_key(key),
        Tab::Farms | Tab::Workers => self.handle_records_key(key).await,
        Tab::Assign => {}
      },
    }
    Ok(true)
  }

  fn switch_tab(&mut self, step: isize) {
    let tabs = self.tabs();
    let current = tabs.iter().position(|t| *t == self.tab).unwrap_or(0);
    let next = (current as isize + step).rem_euclid(tabs.len() as isize) as usize;
    self.open_tab(tabs[next]);
  }

  fn open_tab(&mut self, tab: Tab) {
    self.tab = tab;
    self.cursor = 0;
    self.filter.clear();
    if tab == Tab::Assign && self.form.date.is_empty() {
      self.form.date = self.today.to_string();
    }
  }

  async fn handle_shift_key(&mut self, key: KeyEvent) {
    let Some(shift) = self.cursor_shift() else { return };
    let result = match key.code {
      KeyCode::Char('c') => self.shifts.complete(shift.id).await.map(|_| "completed"),
      KeyCode::Char('x') if self.is_admin() => self.shifts.cancel(shift.id).await.map(|_| "cancelled"),
      KeyCode::Char('d') if self.is_admin() => self.shifts.delete(shift.id).await.map(|_| "deleted"),
      _ => return,
    };
    match result {
      Ok(what) => {
        self.status_msg = format!("Shift on {} {what}", shift.shift_date);
      }
      Err(e) => {
        warn!(shift = %shift.id, error = %e, "shift update failed");
        self.status_msg = format!("Error: {e}");
      }
    }
    self.sync().await;
  }

  fn handle_calendar_key(&mut self, key: KeyEvent) {
    let moved = match key.code {
      KeyCode::Left | KeyCode::Char('h') => self.day.checked_sub_days(Days::new(1)),
      KeyCode::Right | KeyCode::Char('l') => self.day.checked_add_days(Days::new(1)),
      KeyCode::Char('[') => self.day.checked_sub_days(Days::new(7)),
      KeyCode::Char(']') => self.day.checked_add_days(Days::new(7)),
      KeyCode::Char('{') | KeyCode::PageUp => self.day.checked_sub_months(Months::new(1)),
      KeyCode::Char('}') | KeyCode::PageDown => self.day.checked_add_months(Months::new(1)),
      KeyCode::Char('t') => Some(self.today),
      _ => None,
    };
    if let Some(day) = moved {
      self.day = day;
      self.cursor = 0;
    }
  }

  async fn handle_records_key(&mut self, key: KeyEvent) {
    let kind = if self.tab == Tab::Farms { EditorKind::Farm } else { EditorKind::Worker };
    match key.code {
      KeyCode::Char('/') => {
        self.filter_active = true;
        self.filter.clear();
        self.cursor = 0;
      }
      KeyCode::Char('a') => self.editor = Some(Editor::new(kind)),
      KeyCode::Char('e') | KeyCode::Enter => {
        let editor = match kind {
          EditorKind::Farm => self.filtered_farms().get(self.cursor).map(|f| Editor::edit_farm(f)),
          EditorKind::Worker => {
            self.filtered_workers().get(self.cursor).map(|w| Editor::edit_worker(w))
          }
        };
        self.editor = editor;
      }
      KeyCode::Char('d') => {
        let target = match kind {
          EditorKind::Farm => self.filtered_farms().get(self.cursor).map(|f| (f.id, f.name.clone())),
          EditorKind::Worker => {
            self.filtered_workers().get(self.cursor).map(|w| (w.id, w.name.clone()))
          }
        };
        let Some((id, name)) = target else { return };
        let result = match kind {
          EditorKind::Farm => self.farms.delete(id).await,
          EditorKind::Worker => self.workers.delete(id).await,
        };
        self.status_msg = match result {
          Ok(()) => format!("Deleted {name}"),
          Err(e) => format!("Error: {e}"),
        };
        self.sync().await;
      }
      _ => {}
    }
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
      }
      KeyCode::Enter => self.filter_active = false,
      KeyCode::Backspace => {
        self.filter.pop();
      }
      KeyCode::Char(c) => self.filter.push(c),
      _ => {}
    }
    self.cursor = 0;
  }

  async fn handle_editor_key(&mut self, key: KeyEvent) {
    let Some(editor) = self.editor.as_mut() else { return };
    match key.code {
      KeyCode::Esc => self.editor = None,
      KeyCode::Tab | KeyCode::Down => editor.focus = (editor.focus + 1) % editor.fields.len(),
      KeyCode::BackTab | KeyCode::Up => {
        editor.focus = (editor.focus + editor.fields.len() - 1) % editor.fields.len();
      }
      KeyCode::Backspace => {
        editor.fields[editor.focus].pop();
      }
      KeyCode::Char(c) => editor.fields[editor.focus].push(c),
      KeyCode::Enter => self.save_editor().await,
      _ => {}
    }
  }

  async fn save_editor(&mut self) {
    let Some(editor) = self.editor.clone() else { return };
    if editor.name().is_empty() {
      self.status_msg = "Name is required".into();
      return;
    }
    let result = match (editor.kind, editor.target) {
      (EditorKind::Farm, None) => self.farms.create(editor.new_farm()).await.map(|f| f.name),
      (EditorKind::Farm, Some(id)) => self.farms.update(id, editor.farm_patch()).await.map(|f| f.name),
      (EditorKind::Worker, None) => self.workers.create(editor.new_worker()).await.map(|w| w.name),
      (EditorKind::Worker, Some(id)) => {
        self.workers.update(id, editor.worker_patch()).await.map(|w| w.name)
      }
    };
    match result {
      Ok(name) => {
        self.status_msg = format!("Saved {name}");
        self.editor = None;
      }
      // Keep the editor open so the input isn't lost.
      Err(e) => self.status_msg = format!("Error: {e}"),
    }
    self.sync().await;
  }

  // ── Assignment form ───────────────────────────────────────────────────────

  pub fn form_row(&self) -> FormRow { FORM_ROWS[self.form_focus] }

  /// Pattern and occurrences are reachable only while recurring is on.
  fn last_form_row(&self) -> usize {
    if self.form.recurring {
      FORM_ROWS.len() - 1
    } else {
      FORM_ROWS.iter().position(|r| *r == FormRow::Recurring).unwrap_or(0)
    }
  }

  async fn handle_form_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Up => self.form_focus = self.form_focus.saturating_sub(1),
      KeyCode::Down => self.form_focus = (self.form_focus + 1).min(self.last_form_row()),
      KeyCode::Left => self.cycle_choice(-1),
      KeyCode::Right => self.cycle_choice(1),
      KeyCode::Esc => {
        self.form.reset();
        self.form.date = self.today.to_string();
        self.status_msg = "Form cleared".into();
      }
      KeyCode::Enter => self.submit_form().await,
      KeyCode::Char(' ') if self.form_row() == FormRow::Recurring => {
        self.form.recurring = !self.form.recurring;
      }
      KeyCode::Backspace => {
        if let FormRow::Field(field) = self.form_row() {
          self.form.field_mut(field).pop();
        }
      }
      KeyCode::Char(c) => {
        if let FormRow::Field(field) = self.form_row() {
          self.form.field_mut(field).push(c);
        }
      }
      _ => {}
    }
  }

  /// Step through the pick list of the focused row, if it has one.
  fn cycle_choice(&mut self, step: isize) {
    match self.form_row() {
      FormRow::Field(FormField::Worker) => {
        let ids: Vec<String> = self.data.workers.iter().map(|w| w.id.to_string()).collect();
        self.form.worker = cycle(&ids, &self.form.worker, step);
      }
      FormRow::Field(FormField::Farm) => {
        let ids: Vec<String> = self.data.farms.iter().map(|f| f.id.to_string()).collect();
        self.form.farm = cycle(&ids, &self.form.farm, step);
      }
      FormRow::Field(FormField::ShiftType) => {
        let types: Vec<String> = ShiftType::KNOWN.iter().map(ToString::to_string).collect();
        let next = cycle(&types, &self.form.shift_type, step);
        self.form.select_shift_type(ShiftType::parse_lenient(&next));
      }
      FormRow::Field(FormField::Pattern) => {
        let patterns: Vec<String> = RepeatPattern::ALL.iter().map(ToString::to_string).collect();
        self.form.pattern = cycle(&patterns, &self.form.pattern, step);
      }
      FormRow::Field(FormField::Date) => {
        let current = self.form.date.parse::<NaiveDate>().unwrap_or(self.today);
        let next = if step > 0 {
          current.checked_add_days(Days::new(1))
        } else {
          current.checked_sub_days(Days::new(1))
        };
        self.form.date = next.unwrap_or(current).to_string();
      }
      FormRow::Recurring => self.form.recurring = !self.form.recurring,
      FormRow::Field(_) => {}
    }
  }

  async fn submit_form(&mut self) {
    self.status_msg = "Assigning…".into();
    match self.form.submit(&self.shifts).await {
      Ok(created) => {
        self.status_msg = match created.as_slice() {
          [shift] => format!("Assigned {} on {}", shift.worker.name, shift.shift_date),
          _ => format!("Assigned {} shifts", created.len()),
        };
        self.form.date = self.today.to_string();
        self.form_focus = 0;
      }
      // Nothing was sent; the bare validation message reads better.
      Err(e) if e.requested == 0 => self.status_msg = format!("Error: {}", e.source),
      Err(e) => self.status_msg = format!("Error: {e}"),
    }
    self.sync().await;
  }
}

/// The option `step` places after `current`, wrapping. An unknown `current`
/// starts from the first (or last) option.
fn cycle(options: &[String], current: &str, step: isize) -> String {
  if options.is_empty() {
    return current.to_owned();
  }
  let len = options.len() as isize;
  let next = match options.iter().position(|o| o.eq_ignore_ascii_case(current)) {
    Some(i) => (i as isize + step).rem_euclid(len),
    None if step > 0 => 0,
    None => len - 1,
  };
  options[next as usize].clone()
}
