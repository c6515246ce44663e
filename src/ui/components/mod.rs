mod command_input;
mod input;
mod search_input;

pub use command_input::{CommandEvent, CommandInput};
pub use input::{InputResult, TextInput};
pub use search_input::{SearchEvent, SearchInput};

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear};

/// Generic result type for component key handling.
///
/// Components report back to their parent view with this instead of
/// component-specific result enums.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  /// Key was consumed, no event for parent to handle
  Handled,
  /// Key was consumed, here's an event for parent to process
  Event(T),
  /// Key was not consumed, parent should try next handler
  NotHandled,
}

/// Clear and frame an overlay at the top-left of `area`, returning its
/// inner area.
fn draw_overlay_frame(frame: &mut Frame, area: Rect, height: u16, title: &str) -> Rect {
  let width = (area.width * 60 / 100).clamp(30, 60).min(area.width);
  let overlay_area = Rect::new(
    area.x + 1,
    area.y + 1,
    width.saturating_sub(1),
    height.min(area.height.saturating_sub(1)),
  );

  frame.render_widget(Clear, overlay_area);

  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Yellow))
    .title(format!(" {} ", title));

  let inner = block.inner(overlay_area);
  frame.render_widget(block, overlay_area);
  inner
}

/// Prompt line: a coloured prefix, the typed text, and a block cursor.
fn prompt_line<'a>(prefix: &'a str, input: &TextInput) -> Line<'a> {
  let (before, after) = input.split_at_cursor();
  Line::from(vec![
    Span::styled(prefix, Style::default().fg(Color::Yellow)),
    Span::raw(before.to_string()),
    Span::styled("_", Style::default().fg(Color::Yellow)),
    Span::raw(after.to_string()),
  ])
}
