//! Farm and worker lists with the inline add/edit form.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{List, ListItem, ListState, Paragraph},
};

use super::{cursor_style, dim, draw_empty, pane};
use crate::app::{App, Editor, EditorKind, Tab};

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
    .split(area);

  draw_list(f, cols[0], app);
  match &app.editor {
    Some(editor) => draw_editor(f, cols[1], editor),
    None => draw_shift_count(f, cols[1], app),
  }
}

fn draw_list(f: &mut Frame, area: Rect, app: &App) {
  let (noun, total, rows): (&str, usize, Vec<(String, String)>) = match app.tab {
    Tab::Farms => (
      "Farms",
      app.data.farms.len(),
      app
        .filtered_farms()
        .into_iter()
        .map(|farm| {
          let extra = [farm.location.as_deref(), farm.farm_type.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" · ");
          (farm.name.clone(), extra)
        })
        .collect(),
    ),
    _ => (
      "Workers",
      app.data.workers.len(),
      app
        .filtered_workers()
        .into_iter()
        .map(|w| {
          let extra = [w.email.as_deref(), w.phone.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" · ");
          (w.name.clone(), extra)
        })
        .collect(),
    ),
  };

  // Title with count.
  let title = if app.filter_active || !app.filter.is_empty() {
    format!("{noun} ({}/{total})", rows.len())
  } else {
    format!("{noun} ({total})")
  };
  let block = pane(title);

  let mut inner = block.inner(area);
  f.render_widget(block, area);

  // Filter bar along the bottom edge.
  if (app.filter_active || !app.filter.is_empty()) && inner.height > 2 {
    let filter_area = Rect { y: inner.y + inner.height - 1, height: 1, ..inner };
    inner.height -= 1;
    let text = if app.filter_active { format!("/{}_", app.filter) } else { format!("/{}", app.filter) };
    f.render_widget(Paragraph::new(text).style(Style::default().fg(Color::Yellow)), filter_area);
  }

  if rows.is_empty() {
    let hint = if total == 0 { "Nothing here yet. Press a to add." } else { "No matches." };
    f.render_widget(Paragraph::new(Line::from(dim(hint))), inner);
    return;
  }

  let items: Vec<ListItem> = rows
    .into_iter()
    .map(|(name, extra)| {
      ListItem::new(Line::from(vec![
        Span::styled(format!("{name:<24}"), Style::default().add_modifier(Modifier::BOLD)),
        dim(extra),
      ]))
    })
    .collect();
  let mut state = ListState::default();
  state.select(Some(app.cursor));
  f.render_stateful_widget(List::new(items).highlight_style(cursor_style()), inner, &mut state);
}

/// How many loaded shifts reference the selected record.
fn draw_shift_count(f: &mut Frame, area: Rect, app: &App) {
  let selected = match app.tab {
    Tab::Farms => app.filtered_farms().get(app.cursor).map(|farm| {
      let n = app.data.shifts.iter().filter(|s| s.farm_id == Some(farm.id)).count();
      (farm.name.clone(), n)
    }),
    _ => app.filtered_workers().get(app.cursor).map(|w| {
      let n = app.data.shifts.iter().filter(|s| s.worker_id == w.id).count();
      (w.name.clone(), n)
    }),
  };
  let Some((name, n)) = selected else {
    draw_empty(f, area, pane("Detail"), "Select a record.");
    return;
  };
  let mut lines = vec![Line::from(Span::styled(name, Style::default().add_modifier(Modifier::BOLD)))];
  lines.push(Line::from(dim(format!("{n} shift(s) assigned"))));
  if n > 0 {
    lines.push(Line::from(dim("Delete its shifts before deleting it.")));
  }
  f.render_widget(Paragraph::new(lines).block(pane("Detail")), area);
}

fn draw_editor(f: &mut Frame, area: Rect, editor: &Editor) {
  let noun = match editor.kind {
    EditorKind::Farm => "Farm",
    EditorKind::Worker => "Worker",
  };
  let title = if editor.target.is_some() { format!("Edit {noun}") } else { format!("New {noun}") };

  let lines: Vec<Line> = editor
    .labels()
    .iter()
    .zip(editor.fields.iter())
    .enumerate()
    .map(|(i, (label, value))| {
      let focused = i == editor.focus;
      let value_style =
        if focused { Style::default().fg(Color::Yellow) } else { Style::default() };
      let cursor = if focused { "_" } else { "" };
      Line::from(vec![
        dim(format!("{label:<10}")),
        Span::styled(format!("{value}{cursor}"), value_style),
      ])
    })
    .collect();

  let block = pane(title).border_style(Style::default().fg(Color::Yellow));
  f.render_widget(Paragraph::new(lines).block(block), area);
}
