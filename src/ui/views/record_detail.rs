use crate::api::Resource;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

/// Labelled fields of a single record
pub struct RecordDetailView<R: Resource> {
  record: R,
}

impl<R: Resource> RecordDetailView<R> {
  pub fn new(record: R) -> Self {
    Self { record }
  }

  fn lines(&self) -> Vec<Line<'static>> {
    let details = self.record.details();
    let label_width = details.iter().map(|(label, _)| label.len()).max().unwrap_or(0);

    details
      .into_iter()
      .map(|(label, value)| {
        Line::from(vec![
          Span::styled(
            format!("{:<width$}  ", label, width = label_width),
            Style::default().fg(Color::DarkGray),
          ),
          Span::raw(value),
        ])
      })
      .collect()
  }
}

impl<R: Resource> View for RecordDetailView<R> {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(format!(" {} #{} ", R::TITLE, self.record.id()))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let paragraph = Paragraph::new(self.lines())
      .block(block)
      .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
  }

  fn breadcrumb_label(&self) -> String {
    format!("#{}", self.record.id())
  }

  fn resource(&self) -> Option<&str> {
    Some(R::TITLE)
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}
