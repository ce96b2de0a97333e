//! Worker dashboard — the signed-in worker's own shifts.

use farmshift_core::views;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  text::{Line, Span},
  widgets::{List, ListItem, ListState, Paragraph},
};

use super::{cursor_style, dim, draw_empty, pane, shift_line};
use crate::app::App;

/// How many shifts the "Next up" pane shows.
const NEXT_UP: usize = 4;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(3),
      Constraint::Length(NEXT_UP as u16 + 2),
      Constraint::Min(0),
    ])
    .split(area);

  let Some(worker_id) = app.session.worker_id else {
    draw_empty(f, area, pane("My Shifts"), "This account is not linked to a worker.");
    return;
  };

  let summary = views::worker_summary(&app.data.shifts, worker_id);
  let line = Line::from(vec![
    dim("Shifts "),
    Span::raw(summary.total_shifts.to_string()),
    dim("   Hours "),
    Span::raw(format!("{:.1}", summary.total_hours)),
    dim("   Farms "),
    Span::raw(summary.farms.to_string()),
  ]);
  f.render_widget(Paragraph::new(line).block(pane("Summary")), rows[0]);

  let upcoming = app.upcoming();
  let next = views::upcoming_for_worker(&upcoming, worker_id, NEXT_UP);
  if next.is_empty() {
    draw_empty(f, rows[1], pane("Next Up"), "No upcoming shifts.");
  } else {
    let items: Vec<ListItem> = next.iter().map(|s| ListItem::new(shift_line(s, false))).collect();
    f.render_widget(List::new(items).block(pane("Next Up")), rows[1]);
  }

  let block = pane(format!("Upcoming ({})", upcoming.len()));
  if upcoming.is_empty() {
    draw_empty(f, rows[2], block, "Nothing scheduled.");
    return;
  }
  let items: Vec<ListItem> = upcoming
    .iter()
    .map(|s| {
      let mut line = shift_line(s, false);
      if let Some(notes) = &s.notes {
        line.spans.push(dim(format!("  {notes}")));
      }
      ListItem::new(line)
    })
    .collect();
  let mut state = ListState::default();
  state.select(Some(app.cursor));
  f.render_stateful_widget(
    List::new(items).block(block).highlight_style(cursor_style()),
    rows[2],
    &mut state,
  );
}
