//! Shift assignment form.

use farmshift_core::{
  form::{FormField, FormState},
  shift::ShiftType,
};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::Paragraph,
};

use super::{dim, pane, type_color};
use crate::app::{App, FORM_ROWS, FormRow};

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
    .split(area);

  let lines: Vec<Line> = FORM_ROWS
    .iter()
    .enumerate()
    .filter(|(_, row)| app.form.recurring || !is_recurrence_field(**row))
    .map(|(i, row)| form_line(app, *row, i == app.form_focus))
    .collect();

  let title = match app.form.state() {
    FormState::Submitting => "Assign Shift (saving…)",
    FormState::Editing => "Assign Shift",
  };
  f.render_widget(Paragraph::new(lines).block(pane(title)), cols[0]);

  draw_help(f, cols[1], app);
}

fn is_recurrence_field(row: FormRow) -> bool {
  matches!(row, FormRow::Field(FormField::Pattern | FormField::Occurrences))
}

fn form_line(app: &App, row: FormRow, focused: bool) -> Line<'static> {
  let (label, value, required) = match row {
    FormRow::Recurring => {
      let mark = if app.form.recurring { "[x]" } else { "[ ]" };
      ("Recurring".to_owned(), mark.to_owned(), false)
    }
    FormRow::Field(field) => {
      let raw = app.form.field(field);
      // Worker and farm hold ids; show the name when it resolves.
      let shown = match field {
        FormField::Worker => app.worker_name(raw).unwrap_or(raw).to_owned(),
        FormField::Farm => app.farm_name(raw).unwrap_or(raw).to_owned(),
        _ => raw.to_owned(),
      };
      (capitalize(field.label()), shown, field.is_required())
    }
  };

  let marker = if focused { "▸ " } else { "  " };
  let star = if required { "*" } else { " " };
  let mut value_style = match row {
    FormRow::Field(FormField::ShiftType) => {
      Style::default().fg(type_color(ShiftType::parse_lenient(&value)))
    }
    _ => Style::default(),
  };
  if focused {
    value_style = value_style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
  }
  let cursor = if focused && row != FormRow::Recurring { "_" } else { "" };

  Line::from(vec![
    Span::styled(marker, Style::default().fg(Color::Yellow)),
    dim(format!("{:<16}{star} ", label)),
    Span::styled(format!("{value}{cursor}"), value_style),
  ])
}

fn capitalize(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

fn draw_help(f: &mut Frame, area: Rect, app: &App) {
  let mut lines = vec![
    Line::from(dim("←→ pick a worker, farm, date, type or pattern")),
    Line::from(dim("Picking a type fills empty times with its window:")),
  ];
  for shift_type in ShiftType::KNOWN {
    let window = shift_type.default_window().map_or_else(
      || "no times".to_owned(),
      |(start, end)| format!("{}–{}", start.format("%H:%M"), end.format("%H:%M")),
    );
    lines.push(Line::from(vec![
      Span::styled(format!("  {:<8}", shift_type.to_string()), Style::default().fg(type_color(shift_type))),
      dim(window),
    ]));
  }
  lines.push(Line::from(""));
  lines.push(Line::from(dim("Times are HH:MM. Occurrences: 1–366.")));

  if let Some(error) = app.form.error() {
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(error.to_owned(), Style::default().fg(Color::Red))));
  }

  f.render_widget(Paragraph::new(lines).block(pane("Help")), area);
}
