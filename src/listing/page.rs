use serde::{Deserialize, Serialize};

/// One page of a paginated collection, as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "R: Deserialize<'de>"))]
pub struct Page<R> {
  #[serde(default)]
  pub content: Vec<R>,
  /// Zero-based page index
  #[serde(default)]
  pub page: u64,
  #[serde(default)]
  pub size: u64,
  #[serde(default)]
  pub total_elements: u64,
  #[serde(default)]
  pub total_pages: u64,
}

impl<R> Page<R> {
  pub fn new(content: Vec<R>, page: u64, size: u64, total_elements: u64) -> Self {
    Self {
      content,
      page,
      size,
      total_elements,
      total_pages: pages_for(total_elements, size),
    }
  }

  pub fn has_next(&self) -> bool {
    self.page + 1 < self.total_pages
  }

  pub fn has_previous(&self) -> bool {
    self.page > 0
  }

  /// Push items to the end and grow the totals to match.
  pub(crate) fn push_items(&mut self, items: Vec<R>) -> bool {
    if items.is_empty() {
      return false;
    }
    self.total_elements += items.len() as u64;
    self.content.extend(items);
    self.total_pages = pages_for(self.total_elements, self.size);
    true
  }

  /// Remove the first item matching `predicate`.
  pub(crate) fn remove_first(&mut self, predicate: impl FnMut(&R) -> bool) -> bool {
    let Some(index) = self.content.iter().position(predicate) else {
      return false;
    };
    self.content.remove(index);
    self.total_elements = self.total_elements.saturating_sub(1);
    self.total_pages = pages_for(self.total_elements, self.size).max(1);
    true
  }

  /// Replace matching items in place; others are not touched.
  pub(crate) fn update_matching(
    &mut self,
    mut predicate: impl FnMut(&R) -> bool,
    mut updater: impl FnMut(&R) -> R,
  ) -> bool {
    let mut changed = false;
    for item in self.content.iter_mut() {
      if predicate(item) {
        *item = updater(item);
        changed = true;
      }
    }
    changed
  }
}

/// ceil(total / size), with a zero size treated as one.
fn pages_for(total: u64, size: u64) -> u64 {
  total.div_ceil(size.max(1))
}
