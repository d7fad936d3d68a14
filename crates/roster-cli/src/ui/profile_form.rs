//! Create / edit form pane: right panel.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::form::{Field, FormMode, ProfileForm};

/// Render `form` into `area`.
pub fn draw(f: &mut Frame, area: Rect, form: &ProfileForm) {
  let title = match &form.mode {
    FormMode::Create => " New profile ".to_string(),
    FormMode::Edit(p) => format!(" Edit {} ", p.username),
  };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));

  let mut lines = Vec::new();
  for field in Field::ALL {
    let focused = form.focus == field;
    let required = matches!(form.mode, FormMode::Create) && field != Field::Bio;

    let label = if required {
      format!("{} *", field.label())
    } else {
      field.label().to_string()
    };
    lines.push(Line::from(Span::styled(
      label,
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    )));

    let value = form.value(field);
    let (text, style) = if focused {
      (format!("> {value}_"), Style::default().fg(Color::White))
    } else {
      (format!("  {value}"), Style::default().fg(Color::Gray))
    };
    lines.push(Line::from(Span::styled(text, style)));

    if let Some(message) = form.error(field) {
      lines.push(Line::from(Span::styled(
        format!("  {message}"),
        Style::default().fg(Color::Red),
      )));
    }
    lines.push(Line::from(""));
  }

  for message in form.other_errors() {
    lines.push(Line::from(Span::styled(message, Style::default().fg(Color::Red))));
  }

  f.render_widget(
    Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
    area,
  );
}
