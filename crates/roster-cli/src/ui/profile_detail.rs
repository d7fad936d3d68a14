//! Profile detail pane: right panel.

use chrono::Local;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::client::Profile;

/// Render `profile` into `area`.
pub fn draw(f: &mut Frame, area: Rect, profile: &Profile) {
  let block = Block::default()
    .title(format!(" {} ", profile.username))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let created = profile
    .created_at
    .with_timezone(&Local)
    .format("%Y-%m-%d %H:%M")
    .to_string();

  let mut lines = vec![
    row("Username", &profile.username),
    row("Email", &profile.email),
    row("Joined", &created),
    row("ID", &profile.id),
    Line::from(""),
  ];

  match profile.bio.as_deref() {
    Some(bio) => {
      lines.push(label_line("Bio"));
      lines.extend(bio.lines().map(|l| Line::from(l.to_owned())));
    }
    None => lines.push(Line::from(Span::styled(
      "No bio.",
      Style::default().fg(Color::DarkGray),
    ))),
  }

  f.render_widget(
    Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
    area,
  );
}

fn label_style() -> Style {
  Style::default()
    .fg(Color::Cyan)
    .add_modifier(Modifier::BOLD)
}

fn label_line(label: &str) -> Line<'static> {
  Line::from(Span::styled(label.to_owned(), label_style()))
}

fn row(label: &str, value: &str) -> Line<'static> {
  Line::from(vec![
    Span::styled(format!("{label:<10}"), label_style()),
    Span::raw(value.to_owned()),
  ])
}
