use crate::api::{ApiClient, Resource};
use crate::config::ListingConfig;
use crate::listing::{ListQuery, ListingOptions};
use crossterm::event::KeyEvent;
use ratatui::prelude::*;

/// A keyboard shortcut hint for display in the header
#[derive(Debug, Clone)]
pub struct ShortcutInfo {
  pub key: &'static str,
  pub label: &'static str,
  pub priority: u8, // Lower = shown first
}

impl ShortcutInfo {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self {
      key,
      label,
      priority: 100,
    }
  }

  pub const fn with_priority(mut self, priority: u8) -> Self {
    self.priority = priority;
    self
  }
}

/// Actions that a view can request in response to user input
pub enum ViewAction {
  /// No action needed
  None,
  /// Push a new view onto the stack
  Push(Box<dyn View>),
  /// Pop current view from stack (go back)
  Pop,
}

/// Trait for view behavior
///
/// Views handle their own input modes (search etc.) and return actions for
/// the App to execute: App → View → Components.
///
/// Views that load data own a `Listing` and poll it in `tick()`.
pub trait View {
  /// Handle a key event, returning an action for App to execute
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

  /// Render the view to the frame
  fn render(&mut self, frame: &mut Frame, area: Rect);

  /// Get the breadcrumb label for this view
  fn breadcrumb_label(&self) -> String;

  /// Resource shown by this view, for the header
  fn resource(&self) -> Option<&str> {
    None
  }

  /// True while the view has a text prompt open, so global keys like `:`
  /// are typed rather than intercepted
  fn input_active(&self) -> bool {
    false
  }

  /// Called on each tick to allow views to poll async work
  fn tick(&mut self) {}

  /// Get keyboard shortcuts to display in the header
  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}

/// Shared handles views need to build listings and talk to the backend
#[derive(Clone)]
pub struct ViewContext {
  pub api: ApiClient,
  pub listing: ListingConfig,
}

impl ViewContext {
  pub fn new(api: ApiClient, listing: ListingConfig) -> Self {
    Self { api, listing }
  }

  /// Listing options for collection `R` from the configured defaults
  pub fn listing_options<R: Resource>(&self) -> ListingOptions {
    ListingOptions::default()
      .with_initial_query(
        ListQuery::new()
          .with("page", 0)
          .with("limit", self.listing.page_size),
      )
      .with_cache(self.listing.enable_cache)
      .with_cache_ttl(self.listing.cache_ttl())
      .with_allowed_fields(R::QUERY_FIELDS)
  }
}
