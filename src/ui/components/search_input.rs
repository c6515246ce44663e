use super::input::{InputResult, TextInput};
use super::{draw_overlay_frame, prompt_line, KeyResult};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Events emitted by search input that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
  /// Enter pressed with the final search text; empty clears the search
  Submitted(String),
  /// Escape pressed, applied search left as it was
  Cancelled,
}

/// Search prompt opened with `/`
#[derive(Debug, Clone, Default)]
pub struct SearchInput {
  input: TextInput,
  active: bool,
}

impl SearchInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Open the prompt, pre-filled with the search currently applied
  pub fn activate(&mut self, current: &str) {
    self.active = true;
    self.input.set_value(current);
  }

  /// Handle a key event
  /// Call this regardless of active state - it handles activation too
  pub fn handle_key(&mut self, key: KeyEvent, current: &str) -> KeyResult<SearchEvent> {
    if !self.active {
      if key.code == KeyCode::Char('/') {
        self.activate(current);
        return KeyResult::Handled;
      }
      return KeyResult::NotHandled;
    }

    match self.input.handle_key(key) {
      InputResult::Submitted(text) => {
        self.active = false;
        KeyResult::Event(SearchEvent::Submitted(text.trim().to_string()))
      }
      InputResult::Cancelled => {
        self.active = false;
        self.input.clear();
        KeyResult::Event(SearchEvent::Cancelled)
      }
      // The prompt is modal: swallow everything else
      InputResult::Consumed | InputResult::NotHandled => KeyResult::Handled,
    }
  }

  /// Render the search overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let inner = draw_overlay_frame(frame, area, 3, "Search");
    if inner.height == 0 {
      return;
    }

    frame.render_widget(Paragraph::new(prompt_line("/", &self.input)), inner);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[test]
  fn test_slash_activates_with_current_search() {
    let mut search = SearchInput::new();
    assert_eq!(search.handle_key(key(KeyCode::Char('/')), "bolt"), KeyResult::Handled);
    assert!(search.is_active());

    search.handle_key(key(KeyCode::Char('s')), "bolt");
    assert_eq!(
      search.handle_key(key(KeyCode::Enter), "bolt"),
      KeyResult::Event(SearchEvent::Submitted("bolts".to_string()))
    );
    assert!(!search.is_active());
  }

  #[test]
  fn test_inactive_passes_keys_through() {
    let mut search = SearchInput::new();
    assert_eq!(search.handle_key(key(KeyCode::Char('j')), ""), KeyResult::NotHandled);
  }

  #[test]
  fn test_escape_cancels() {
    let mut search = SearchInput::new();
    search.activate("nut");
    assert_eq!(
      search.handle_key(key(KeyCode::Esc), "nut"),
      KeyResult::Event(SearchEvent::Cancelled)
    );
    assert!(!search.is_active());
  }
}
