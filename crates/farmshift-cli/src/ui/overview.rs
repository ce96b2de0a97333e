//! Admin overview — stat cards, today's shifts, type breakdown, upcoming list.

use farmshift_core::views;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Modifier, Style},
  text::{Line, Span},
  widgets::{List, ListItem, ListState, Paragraph},
};

use super::{cursor_style, dim, draw_empty, pane, shift_line, type_color};
use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(4), Constraint::Length(8), Constraint::Min(0)])
    .split(area);

  draw_stats(f, rows[0], app);

  let middle = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
    .split(rows[1]);
  draw_today(f, middle[0], app);
  draw_counts(f, middle[1], app);

  draw_upcoming(f, rows[2], app);
}

fn draw_stats(f: &mut Frame, area: Rect, app: &App) {
  let stats = views::shift_stats(&app.data.shifts);
  let completion = stats
    .completion_rate
    .map_or_else(|| "–".to_owned(), |r| format!("{:.0}%", r * 100.0));
  let cards = [
    ("Total Shifts", stats.total_shifts.to_string()),
    ("Active Workers", stats.active_workers.to_string()),
    ("Farms in Operation", stats.farms_in_operation.to_string()),
    ("Completion", completion),
  ];

  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Ratio(1, 4); 4])
    .split(area);
  for ((label, value), col) in cards.into_iter().zip(cols.iter()) {
    let block = pane(label);
    let inner = block.inner(*col);
    f.render_widget(block, *col);
    f.render_widget(
      Paragraph::new(Line::from(Span::styled(value, Style::default().add_modifier(Modifier::BOLD)))),
      inner,
    );
  }
}

fn draw_today(f: &mut Frame, area: Rect, app: &App) {
  let today = views::todays_shifts(&app.data.shifts, app.today);
  let block = pane(format!("Today ({})", today.len()));
  if today.is_empty() {
    draw_empty(f, area, block, "No shifts scheduled today.");
    return;
  }
  let items: Vec<ListItem> = today.iter().map(|s| ListItem::new(shift_line(s, true))).collect();
  f.render_widget(List::new(items).block(block), area);
}

fn draw_counts(f: &mut Frame, area: Rect, app: &App) {
  let counts = views::count_by_type(&app.data.shifts);
  let max = counts.values().copied().max().unwrap_or(0).max(1);
  let block = pane("By Type");
  let bar_room = block.inner(area).width.saturating_sub(14) as usize;

  let lines: Vec<Line> = counts
    .iter()
    .map(|(shift_type, count)| {
      let width = count * bar_room / max;
      Line::from(vec![
        Span::raw(format!("{:<8}", shift_type.to_string())),
        Span::styled("█".repeat(width), Style::default().fg(type_color(*shift_type))),
        dim(format!(" {count}")),
      ])
    })
    .collect();
  f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_upcoming(f: &mut Frame, area: Rect, app: &App) {
  let upcoming = app.upcoming();
  let block = pane(format!("Upcoming ({})", upcoming.len()));
  if upcoming.is_empty() {
    draw_empty(f, area, block, "Nothing scheduled. Add shifts on the Assign tab.");
    return;
  }
  let items: Vec<ListItem> = upcoming.iter().map(|s| ListItem::new(shift_line(s, true))).collect();
  let mut state = ListState::default();
  state.select(Some(app.cursor));
  f.render_stateful_widget(
    List::new(items).block(block).highlight_style(cursor_style()),
    area,
    &mut state,
  );
}
