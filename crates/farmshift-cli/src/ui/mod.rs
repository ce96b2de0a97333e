//! TUI rendering — orchestrates all panes.

pub mod assign;
pub mod calendar;
pub mod overview;
pub mod records;
pub mod schedule;

use std::str::FromStr;

use farmshift_core::{
  shift::{Shift, ShiftStatus, ShiftType},
  views,
};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, Tab};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  // Vertical stack: header, tab bar, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Length(1), // tabs
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  draw_tabs(f, rows[1], app);
  match app.tab {
    Tab::Overview => overview::draw(f, rows[2], app),
    Tab::Schedule => schedule::draw(f, rows[2], app),
    Tab::Calendar => calendar::draw(f, rows[2], app),
    Tab::Farms | Tab::Workers => records::draw(f, rows[2], app),
    Tab::Assign => assign::draw(f, rows[2], app),
  }
  draw_status(f, rows[3], app);
}

// ─── Shared styling ───────────────────────────────────────────────────────────

/// Terminal color for a shift type, from its calendar hex color.
pub fn type_color(shift_type: ShiftType) -> Color {
  Color::from_str(views::shift_color(shift_type)).unwrap_or(Color::Gray)
}

pub fn status_style(status: ShiftStatus) -> Style {
  match status {
    ShiftStatus::Scheduled => Style::default(),
    ShiftStatus::Completed => Style::default().fg(Color::Green),
    ShiftStatus::Cancelled => {
      Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
    }
  }
}

pub fn pane(title: impl Into<String>) -> Block<'static> {
  Block::default()
    .title(format!(" {} ", title.into()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray))
}

pub fn cursor_style() -> Style {
  Style::default()
    .bg(Color::Blue)
    .fg(Color::White)
    .add_modifier(Modifier::BOLD)
}

pub fn dim(text: impl Into<String>) -> Span<'static> {
  Span::styled(text.into(), Style::default().fg(Color::DarkGray))
}

/// `05:00–13:00`, or blank for an untimed shift.
pub fn time_range(shift: &Shift) -> String {
  match (shift.start_time, shift.end_time) {
    (Some(start), Some(end)) => format!("{}–{}", start.format("%H:%M"), end.format("%H:%M")),
    (Some(start), None) => format!("{}–", start.format("%H:%M")),
    _ => String::new(),
  }
}

/// One line describing a shift: date, colored type, worker, farm, times.
pub fn shift_line(shift: &Shift, show_worker: bool) -> Line<'static> {
  let mut spans = vec![
    Span::raw(format!("{}  ", shift.shift_date.format("%a %d %b"))),
    Span::styled(
      format!("{:<8}", shift.shift_type.to_string()),
      Style::default().fg(type_color(shift.shift_type)).add_modifier(Modifier::BOLD),
    ),
  ];
  if show_worker {
    spans.push(Span::raw(format!("{:<16}", shift.worker.name)));
  }
  let farm = shift.farm.as_ref().map_or("Rest Day", |f| f.name.as_str());
  spans.push(Span::styled(format!("{farm:<20}"), status_style(shift.status)));
  spans.push(dim(time_range(shift)));
  if shift.status != ShiftStatus::Scheduled {
    spans.push(dim(format!("  [{}]", shift.status)));
  }
  Line::from(spans)
}

/// Centered grey placeholder for an empty pane.
pub fn draw_empty(f: &mut Frame, area: Rect, block: Block<'static>, message: &str) {
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(Line::from(dim(message.to_owned()))), inner);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let left = Span::styled(
    format!(" farmshift  {} ({})", app.session.username, app.session.role),
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let loading = if app.data.loading { "loading…  " } else { "" };
  let right = Span::styled(
    format!("{loading}{} ", app.today.format("%Y-%m-%d")),
    Style::default().fg(Color::Gray),
  );

  // Simple left-right header: pad the middle.
  let pad = area
    .width
    .saturating_sub(left.width() as u16)
    .saturating_sub(right.width() as u16);

  let line = Line::from(vec![left, Span::raw(" ".repeat(pad as usize)), right]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

fn draw_tabs(f: &mut Frame, area: Rect, app: &App) {
  let mut spans = Vec::new();
  for (i, tab) in app.tabs().iter().enumerate() {
    let style = if *tab == app.tab {
      Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(Color::Gray)
    };
    spans.push(Span::styled(format!(" {} {} ", i + 1, tab.title()), style));
    spans.push(Span::raw(" "));
  }
  f.render_widget(Paragraph::new(Line::from(spans)), area);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = if app.editor.is_some() {
    ("EDIT", "Tab/↑↓ field  Enter save  Esc cancel")
  } else if app.filter_active {
    ("SEARCH", "Type to filter  Esc clear  Enter keep")
  } else {
    match app.tab {
      Tab::Overview => ("ADMIN", "↑↓ select  c complete  x cancel  d delete  r refresh  q quit"),
      Tab::Schedule => ("WORKER", "↑↓ select  c complete  r refresh  q quit"),
      Tab::Calendar => ("CALENDAR", "←→ day  [ ] week  { } month  t today  ↑↓ event  q quit"),
      Tab::Farms | Tab::Workers => ("ADMIN", "↑↓ select  / search  a add  e edit  d delete  q quit"),
      Tab::Assign => ("ASSIGN", "↑↓ field  ←→ pick  Space recurring  Enter assign  Esc clear"),
    }
  };

  // Errors from the last load win over hints, messages over both.
  let status = if !app.status_msg.is_empty() {
    app.status_msg.clone()
  } else if let Some(error) = &app.data.error {
    format!("Error: {error}")
  } else {
    hints.to_string()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(format!("  {status}"), Style::default().fg(Color::Gray));

  let line = Line::from(vec![mode_span, hint_span]);
  f.render_widget(Paragraph::new(line).style(Style::default().bg(Color::Black)), area);
}
