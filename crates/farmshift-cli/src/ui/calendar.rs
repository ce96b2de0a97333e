//! Month calendar with a day's events and the selected event's details.

use chrono::{Datelike, Days, NaiveDate, NaiveTime};
use farmshift_core::views::CalendarEvent;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{List, ListItem, ListState, Paragraph},
};

use super::{cursor_style, dim, draw_empty, pane, status_style, type_color};
use crate::app::App;

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Markers drawn per day before collapsing to a count.
const MAX_MARKERS: usize = 4;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
    .split(area);

  draw_month(f, cols[0], app);

  let right = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
    .split(cols[1]);

  let events = app.day_events();
  draw_day(f, right[0], app, &events);
  match events.get(app.cursor) {
    Some(event) => draw_details(f, right[1], event),
    None => draw_empty(f, right[1], pane("Details"), "Select an event."),
  }
}

/// The Monday on or before the first of `day`'s month.
fn grid_start(day: NaiveDate) -> NaiveDate {
  let first = day.with_day(1).unwrap_or(day);
  let offset = first.weekday().num_days_from_monday();
  first.checked_sub_days(Days::new(u64::from(offset))).unwrap_or(first)
}

fn draw_month(f: &mut Frame, area: Rect, app: &App) {
  let block = pane(app.day.format("%B %Y").to_string());
  let inner = block.inner(area);
  f.render_widget(block, area);

  let cell = (inner.width / 7).max(4) as usize;
  let events = app.calendar_events();

  let mut lines = vec![Line::from(
    WEEKDAYS.iter().map(|d| dim(format!("{d:<cell$}"))).collect::<Vec<_>>(),
  )];

  let mut week_start = grid_start(app.day);
  loop {
    let mut numbers = Vec::with_capacity(7);
    let mut markers = Vec::with_capacity(7);
    for offset in 0..7u64 {
      let Some(date) = week_start.checked_add_days(Days::new(offset)) else { break };
      let mut style = if date.month() == app.day.month() {
        Style::default()
      } else {
        Style::default().fg(Color::DarkGray)
      };
      if date == app.today {
        style = style.add_modifier(Modifier::UNDERLINED | Modifier::BOLD);
      }
      if date == app.day {
        style = cursor_style();
      }
      numbers.push(Span::styled(format!("{:>2}", date.day()), style));
      numbers.push(Span::raw(" ".repeat(cell.saturating_sub(2))));

      let on_day: Vec<&CalendarEvent> = events.iter().filter(|e| e.start == date).collect();
      let mut used = 0;
      if on_day.len() > MAX_MARKERS {
        let text = format!("{}×", on_day.len());
        used = text.chars().count();
        markers.push(Span::styled(text, Style::default().fg(Color::Gray)));
      } else {
        for event in &on_day {
          markers.push(Span::styled(
            "■",
            Style::default().fg(type_color(event.extended_props.shift_type)),
          ));
          used += 1;
        }
      }
      markers.push(Span::raw(" ".repeat(cell.saturating_sub(used))));
    }
    lines.push(Line::from(numbers));
    lines.push(Line::from(markers));

    match week_start.checked_add_days(Days::new(7)) {
      Some(next) if next.month() == app.day.month() => week_start = next,
      _ => break,
    }
  }

  f.render_widget(Paragraph::new(lines), inner);
}

fn draw_day(f: &mut Frame, area: Rect, app: &App, events: &[CalendarEvent]) {
  let block = pane(format!("{} ({})", app.day.format("%a %d %b"), events.len()));
  if events.is_empty() {
    draw_empty(f, area, block, "No shifts on this day.");
    return;
  }
  let items: Vec<ListItem> = events
    .iter()
    .map(|e| {
      ListItem::new(Line::from(vec![
        Span::styled("■ ", Style::default().fg(type_color(e.extended_props.shift_type))),
        Span::styled(e.title.clone(), status_style(e.extended_props.status)),
      ]))
    })
    .collect();
  let mut state = ListState::default();
  state.select(Some(app.cursor));
  f.render_stateful_widget(
    List::new(items).block(block).highlight_style(cursor_style()),
    area,
    &mut state,
  );
}

fn draw_details(f: &mut Frame, area: Rect, event: &CalendarEvent) {
  let details = &event.extended_props;
  let time =
    |t: Option<NaiveTime>| t.map_or_else(|| "-".to_owned(), |t| t.format("%H:%M").to_string());
  let row =
    |label: &str, value: String| Line::from(vec![dim(format!("{label:<10}")), Span::raw(value)]);

  let lines = vec![
    row("Worker", details.worker.clone()),
    row("Farm", details.farm.clone()),
    row("Location", details.location.clone()),
    Line::from(vec![
      dim(format!("{:<10}", "Type")),
      Span::styled(
        details.shift_type.to_string(),
        Style::default().fg(type_color(details.shift_type)).add_modifier(Modifier::BOLD),
      ),
    ]),
    row("Status", details.status.to_string()),
    row("Start", time(details.start_time)),
    row("End", time(details.end_time)),
    row("Notes", details.notes.clone()),
  ];
  f.render_widget(Paragraph::new(lines).block(pane("Details")), area);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn grid_starts_on_monday() {
    // June 2024 begins on a Saturday.
    let day = NaiveDate::from_ymd_opt(2024, 6, 18).unwrap();
    assert_eq!(grid_start(day), NaiveDate::from_ymd_opt(2024, 5, 27).unwrap());
    // July 2024 begins on a Monday.
    let day = NaiveDate::from_ymd_opt(2024, 7, 31).unwrap();
    assert_eq!(grid_start(day), NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
  }
}
