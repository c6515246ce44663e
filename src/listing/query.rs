//! Listing query parameters and their canonical cache key.

use color_eyre::{eyre::eyre, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// Fields every paginated listing understands, whatever the resource.
pub const PAGING_FIELDS: &[&str] = &["page", "limit", "size"];

/// A scalar query parameter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryValue {
  Null,
  Bool(bool),
  Int(i64),
  /// Decimal filters such as prices. Whole values collapse to `Int` on
  /// conversion, so `2.0` and `2` share a cache key.
  Float(f64),
  Text(String),
}

impl QueryValue {
  pub fn as_int(&self) -> Option<i64> {
    match self {
      QueryValue::Int(v) => Some(*v),
      _ => None,
    }
  }

  pub fn as_text(&self) -> Option<&str> {
    match self {
      QueryValue::Text(v) => Some(v),
      _ => None,
    }
  }

  /// Render for a URL query string. Null has no rendering.
  fn render(&self) -> Option<String> {
    match self {
      QueryValue::Null => None,
      QueryValue::Bool(v) => Some(v.to_string()),
      QueryValue::Int(v) => Some(v.to_string()),
      QueryValue::Float(v) => Some(v.to_string()),
      QueryValue::Text(v) => Some(v.clone()),
    }
  }

  fn to_json(&self) -> serde_json::Value {
    match self {
      QueryValue::Null => serde_json::Value::Null,
      QueryValue::Bool(v) => serde_json::Value::Bool(*v),
      QueryValue::Int(v) => serde_json::Value::from(*v),
      // Non-finite values have no JSON form
      QueryValue::Float(v) => serde_json::Number::from_f64(*v)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null),
      QueryValue::Text(v) => serde_json::Value::String(v.clone()),
    }
  }
}

impl From<bool> for QueryValue {
  fn from(v: bool) -> Self {
    QueryValue::Bool(v)
  }
}

impl From<i64> for QueryValue {
  fn from(v: i64) -> Self {
    QueryValue::Int(v)
  }
}

impl From<i32> for QueryValue {
  fn from(v: i32) -> Self {
    QueryValue::Int(i64::from(v))
  }
}

impl From<u32> for QueryValue {
  fn from(v: u32) -> Self {
    QueryValue::Int(i64::from(v))
  }
}

impl From<f64> for QueryValue {
  fn from(v: f64) -> Self {
    let whole = v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64;
    if whole {
      QueryValue::Int(v as i64)
    } else {
      QueryValue::Float(v)
    }
  }
}

impl From<&str> for QueryValue {
  fn from(v: &str) -> Self {
    QueryValue::Text(v.to_string())
  }
}

impl From<String> for QueryValue {
  fn from(v: String) -> Self {
    QueryValue::Text(v)
  }
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
  fn from(v: Option<T>) -> Self {
    v.map(Into::into).unwrap_or(QueryValue::Null)
  }
}

/// The parameters describing a requested slice of a paginated resource.
///
/// Keys are kept sorted, so two queries holding the same pairs are equal
/// (and share a cache key) no matter the order they were built in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ListQuery(BTreeMap<String, QueryValue>);

impl ListQuery {
  pub fn new() -> Self {
    Self::default()
  }

  /// Builder-style insert.
  pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
    self.set(key, value);
    self
  }

  pub fn set(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
    self.0.insert(key.into(), value.into());
  }

  pub fn get(&self, key: &str) -> Option<&QueryValue> {
    self.0.get(key)
  }

  /// Zero-based page index, if the query carries one.
  pub fn page(&self) -> Option<i64> {
    self.get("page").and_then(QueryValue::as_int)
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// Shallow merge: fields in `partial` replace ours, the rest are kept.
  /// A null in `partial` unsets the field, so clearing a filter gets back
  /// the query (and cache key) it had before the filter was applied.
  pub fn merge(&mut self, partial: ListQuery) {
    for (key, value) in partial.0 {
      match value {
        QueryValue::Null => {
          self.0.remove(&key);
        }
        value => {
          self.0.insert(key, value);
        }
      }
    }
  }

  /// Canonical key: the key-sorted JSON object of this query.
  pub fn cache_key(&self) -> String {
    let object: serde_json::Map<String, serde_json::Value> = self
      .0
      .iter()
      .map(|(k, v)| (k.clone(), v.to_json()))
      .collect();
    serde_json::Value::Object(object).to_string()
  }

  /// Key/value pairs for a URL query string, nulls omitted.
  pub fn params(&self) -> Vec<(String, String)> {
    self
      .0
      .iter()
      .filter_map(|(k, v)| v.render().map(|v| (k.clone(), v)))
      .collect()
  }

  /// Reject fields that are neither paging fields nor in `allowed`.
  pub fn validate(&self, allowed: &[&str]) -> Result<()> {
    let unknown: Vec<&str> = self
      .0
      .keys()
      .map(String::as_str)
      .filter(|k| !PAGING_FIELDS.contains(k) && !allowed.contains(k))
      .collect();

    if unknown.is_empty() {
      Ok(())
    } else {
      Err(eyre!("Unsupported query fields: {}", unknown.join(", ")))
    }
  }
}

impl<K: Into<String>, V: Into<QueryValue>> FromIterator<(K, V)> for ListQuery {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_cache_key_ignores_insertion_order() {
    let a = ListQuery::new()
      .with("page", 0)
      .with("search", "bolt")
      .with("limit", 10);
    let b = ListQuery::new()
      .with("limit", 10)
      .with("page", 0)
      .with("search", "bolt");

    assert_eq!(a.cache_key(), b.cache_key());
    assert_eq!(a, b);
  }

  #[test]
  fn test_cache_key_is_sorted_json() {
    let query: ListQuery = [("page", 0), ("limit", 10)].into_iter().collect();
    assert_eq!(query.cache_key(), r#"{"limit":10,"page":0}"#);
  }

  #[test]
  fn test_cache_key_distinguishes_value_types() {
    let text = ListQuery::new().with("page", "1");
    let int = ListQuery::new().with("page", 1);
    assert_ne!(text.cache_key(), int.cache_key());
  }

  #[test]
  fn test_merge_keeps_unspecified_fields() {
    let mut query = ListQuery::new().with("page", 0).with("size", 2);
    query.merge(ListQuery::new().with("page", 1));

    assert_eq!(query.page(), Some(1));
    assert_eq!(query.get("size"), Some(&QueryValue::Int(2)));
  }

  #[test]
  fn test_params_skip_null() {
    let query = ListQuery::new()
      .with("page", 2)
      .with("search", None::<String>)
      .with("active", true);

    assert_eq!(
      query.params(),
      vec![
        ("active".to_string(), "true".to_string()),
        ("page".to_string(), "2".to_string()),
      ]
    );
  }

  #[test]
  fn test_validate_allows_paging_fields() {
    let query = ListQuery::new().with("page", 0).with("limit", 10);
    assert!(query.validate(&[]).is_ok());
  }

  #[test]
  fn test_validate_rejects_unknown_fields() {
    let query = ListQuery::new().with("search", "x").with("colour", "red");
    let err = query.validate(&["search"]).unwrap_err();
    assert!(err.to_string().contains("colour"));
  }

  #[test]
  fn test_merge_null_unsets_field() {
    let mut query = ListQuery::new().with("page", 0).with("limit", 10);
    let before = query.cache_key();

    query.merge(ListQuery::new().with("search", "bolt").with("page", 0));
    assert_ne!(query.cache_key(), before);

    query.merge(ListQuery::new().with("search", None::<String>).with("page", 0));
    assert_eq!(query.get("search"), None);
    assert_eq!(query.cache_key(), before);
  }

  #[test]
  fn test_decimal_values() {
    let query = ListQuery::new().with("maxPrice", 12.5);
    assert_eq!(query.get("maxPrice"), Some(&QueryValue::Float(12.5)));
    assert_eq!(query.cache_key(), r#"{"maxPrice":12.5}"#);
    assert_eq!(query.params(), vec![("maxPrice".to_string(), "12.5".to_string())]);

    let whole = ListQuery::new().with("maxPrice", 2.0);
    assert_eq!(whole.cache_key(), ListQuery::new().with("maxPrice", 2).cache_key());
  }
}
