//! The contract a backend collection must satisfy to be browsed.

use serde::de::DeserializeOwned;

/// A table column: header text and display width in cells.
#[derive(Debug, Clone, Copy)]
pub struct Column {
  pub title: &'static str,
  pub width: usize,
}

impl Column {
  pub const fn new(title: &'static str, width: usize) -> Self {
    Self { title, width }
  }
}

/// A paginated collection exposed by the backend.
pub trait Resource: Clone + Send + Sync + DeserializeOwned + 'static {
  /// Collection path relative to the API base URL (e.g. "warehouses")
  const PATH: &'static str;

  /// Human-readable plural name for titles and breadcrumbs
  const TITLE: &'static str;

  /// Query fields the backend accepts for this collection, besides paging
  const QUERY_FIELDS: &'static [&'static str];

  /// Columns shown in list views, in order
  const COLUMNS: &'static [Column];

  /// Backend identifier
  fn id(&self) -> u64;

  /// One cell per column in `COLUMNS`
  fn row(&self) -> Vec<String>;

  /// Labelled fields for the detail view
  fn details(&self) -> Vec<(&'static str, String)>;
}
