//! Records served by the warehouse backend.
//!
//! Wire names are camelCase; optional fields default when missing and
//! unknown fields are ignored.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt::Display;

use super::resource::{Column, Resource};

/// Render an optional value, "-" when absent
fn opt<T: Display>(value: &Option<T>) -> String {
  value
    .as_ref()
    .map(|v| v.to_string())
    .unwrap_or_else(|| "-".to_string())
}

fn timestamp(value: &Option<DateTime<Utc>>) -> String {
  value
    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
    .unwrap_or_else(|| "-".to_string())
}

// ============================================================================
// Facilities
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
  pub id: u64,
  pub name: String,
  #[serde(default)]
  pub location: String,
  pub capacity: Option<u64>,
  pub manager: Option<String>,
}

impl Resource for Warehouse {
  const PATH: &'static str = "warehouses";
  const TITLE: &'static str = "Warehouses";
  const QUERY_FIELDS: &'static [&'static str] = &["search", "sort"];
  const COLUMNS: &'static [Column] = &[
    Column::new("ID", 6),
    Column::new("Name", 24),
    Column::new("Location", 24),
    Column::new("Capacity", 10),
  ];

  fn id(&self) -> u64 {
    self.id
  }

  fn row(&self) -> Vec<String> {
    vec![
      self.id.to_string(),
      self.name.clone(),
      self.location.clone(),
      opt(&self.capacity),
    ]
  }

  fn details(&self) -> Vec<(&'static str, String)> {
    vec![
      ("Name", self.name.clone()),
      ("Location", self.location.clone()),
      ("Capacity", opt(&self.capacity)),
      ("Manager", opt(&self.manager)),
    ]
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
  pub id: u64,
  pub name: String,
  pub warehouse_id: Option<u64>,
  pub temperature: Option<f64>,
  #[serde(default)]
  pub climate_controlled: bool,
}

impl Resource for Room {
  const PATH: &'static str = "rooms";
  const TITLE: &'static str = "Rooms";
  const QUERY_FIELDS: &'static [&'static str] = &["search", "sort", "warehouseId"];
  const COLUMNS: &'static [Column] = &[
    Column::new("ID", 6),
    Column::new("Name", 24),
    Column::new("Warehouse", 10),
    Column::new("Temp", 8),
  ];

  fn id(&self) -> u64 {
    self.id
  }

  fn row(&self) -> Vec<String> {
    vec![
      self.id.to_string(),
      self.name.clone(),
      opt(&self.warehouse_id),
      opt(&self.temperature),
    ]
  }

  fn details(&self) -> Vec<(&'static str, String)> {
    vec![
      ("Name", self.name.clone()),
      ("Warehouse", opt(&self.warehouse_id)),
      ("Temperature", opt(&self.temperature)),
      ("Climate controlled", self.climate_controlled.to_string()),
    ]
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rack {
  pub id: u64,
  pub code: String,
  pub room_id: Option<u64>,
  pub capacity: Option<u64>,
  pub occupied: Option<u64>,
}

impl Resource for Rack {
  const PATH: &'static str = "racks";
  const TITLE: &'static str = "Racks";
  const QUERY_FIELDS: &'static [&'static str] = &["search", "sort", "roomId"];
  const COLUMNS: &'static [Column] = &[
    Column::new("ID", 6),
    Column::new("Code", 12),
    Column::new("Room", 8),
    Column::new("Occupied", 10),
    Column::new("Capacity", 10),
  ];

  fn id(&self) -> u64 {
    self.id
  }

  fn row(&self) -> Vec<String> {
    vec![
      self.id.to_string(),
      self.code.clone(),
      opt(&self.room_id),
      opt(&self.occupied),
      opt(&self.capacity),
    ]
  }

  fn details(&self) -> Vec<(&'static str, String)> {
    vec![
      ("Code", self.code.clone()),
      ("Room", opt(&self.room_id)),
      ("Occupied", opt(&self.occupied)),
      ("Capacity", opt(&self.capacity)),
    ]
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
  pub id: u64,
  pub name: String,
  #[serde(rename = "type", default)]
  pub kind: String,
  pub status: Option<String>,
  pub room_id: Option<u64>,
}

impl Resource for Equipment {
  const PATH: &'static str = "equipment";
  const TITLE: &'static str = "Equipment";
  const QUERY_FIELDS: &'static [&'static str] = &["search", "sort", "status", "roomId"];
  const COLUMNS: &'static [Column] = &[
    Column::new("ID", 6),
    Column::new("Name", 24),
    Column::new("Type", 14),
    Column::new("Status", 12),
  ];

  fn id(&self) -> u64 {
    self.id
  }

  fn row(&self) -> Vec<String> {
    vec![
      self.id.to_string(),
      self.name.clone(),
      self.kind.clone(),
      opt(&self.status),
    ]
  }

  fn details(&self) -> Vec<(&'static str, String)> {
    vec![
      ("Name", self.name.clone()),
      ("Type", self.kind.clone()),
      ("Status", opt(&self.status)),
      ("Room", opt(&self.room_id)),
    ]
  }
}

// ============================================================================
// Stock
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: u64,
  pub sku: String,
  pub name: String,
  pub category: Option<String>,
  #[serde(default)]
  pub quantity: i64,
  pub unit_price: Option<f64>,
  pub rack_id: Option<u64>,
}

impl Resource for Product {
  const PATH: &'static str = "products";
  const TITLE: &'static str = "Products";
  const QUERY_FIELDS: &'static [&'static str] = &["search", "sort", "category", "rackId"];
  const COLUMNS: &'static [Column] = &[
    Column::new("ID", 6),
    Column::new("SKU", 12),
    Column::new("Name", 28),
    Column::new("Category", 14),
    Column::new("Qty", 8),
  ];

  fn id(&self) -> u64 {
    self.id
  }

  fn row(&self) -> Vec<String> {
    vec![
      self.id.to_string(),
      self.sku.clone(),
      self.name.clone(),
      opt(&self.category),
      self.quantity.to_string(),
    ]
  }

  fn details(&self) -> Vec<(&'static str, String)> {
    vec![
      ("SKU", self.sku.clone()),
      ("Name", self.name.clone()),
      ("Category", opt(&self.category)),
      ("Quantity", self.quantity.to_string()),
      (
        "Unit price",
        self
          .unit_price
          .map(|p| format!("{:.2}", p))
          .unwrap_or_else(|| "-".to_string()),
      ),
      ("Rack", opt(&self.rack_id)),
    ]
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inbound {
  pub id: u64,
  pub reference: String,
  pub supplier: Option<String>,
  #[serde(default)]
  pub status: String,
  #[serde(default)]
  pub quantity: u64,
  pub received_at: Option<DateTime<Utc>>,
}

impl Resource for Inbound {
  const PATH: &'static str = "inbounds";
  const TITLE: &'static str = "Inbound";
  const QUERY_FIELDS: &'static [&'static str] = &["search", "sort", "status"];
  const COLUMNS: &'static [Column] = &[
    Column::new("ID", 6),
    Column::new("Reference", 16),
    Column::new("Supplier", 20),
    Column::new("Status", 12),
    Column::new("Received", 16),
  ];

  fn id(&self) -> u64 {
    self.id
  }

  fn row(&self) -> Vec<String> {
    vec![
      self.id.to_string(),
      self.reference.clone(),
      opt(&self.supplier),
      self.status.clone(),
      timestamp(&self.received_at),
    ]
  }

  fn details(&self) -> Vec<(&'static str, String)> {
    vec![
      ("Reference", self.reference.clone()),
      ("Supplier", opt(&self.supplier)),
      ("Status", self.status.clone()),
      ("Quantity", self.quantity.to_string()),
      ("Received", timestamp(&self.received_at)),
    ]
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outbound {
  pub id: u64,
  pub reference: String,
  pub customer: Option<String>,
  #[serde(default)]
  pub status: String,
  #[serde(default)]
  pub quantity: u64,
  pub shipped_at: Option<DateTime<Utc>>,
}

impl Resource for Outbound {
  const PATH: &'static str = "outbounds";
  const TITLE: &'static str = "Outbound";
  const QUERY_FIELDS: &'static [&'static str] = &["search", "sort", "status"];
  const COLUMNS: &'static [Column] = &[
    Column::new("ID", 6),
    Column::new("Reference", 16),
    Column::new("Customer", 20),
    Column::new("Status", 12),
    Column::new("Shipped", 16),
  ];

  fn id(&self) -> u64 {
    self.id
  }

  fn row(&self) -> Vec<String> {
    vec![
      self.id.to_string(),
      self.reference.clone(),
      opt(&self.customer),
      self.status.clone(),
      timestamp(&self.shipped_at),
    ]
  }

  fn details(&self) -> Vec<(&'static str, String)> {
    vec![
      ("Reference", self.reference.clone()),
      ("Customer", opt(&self.customer)),
      ("Status", self.status.clone()),
      ("Quantity", self.quantity.to_string()),
      ("Shipped", timestamp(&self.shipped_at)),
    ]
  }
}

// ============================================================================
// Accounts
// ============================================================================

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
  Admin,
  WarehouseManager,
  InventoryStaff,
  #[serde(other)]
  Unknown,
}

impl Role {
  pub fn label(self) -> &'static str {
    match self {
      Role::Admin => "Admin",
      Role::WarehouseManager => "Warehouse manager",
      Role::InventoryStaff => "Inventory staff",
      Role::Unknown => "Unknown",
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id: u64,
  pub username: String,
  #[serde(default)]
  pub email: String,
  pub role: Role,
  #[serde(default)]
  pub active: bool,
}

impl Resource for User {
  const PATH: &'static str = "users";
  const TITLE: &'static str = "Users";
  const QUERY_FIELDS: &'static [&'static str] = &["search", "sort", "role"];
  const COLUMNS: &'static [Column] = &[
    Column::new("ID", 6),
    Column::new("Username", 18),
    Column::new("Email", 28),
    Column::new("Role", 18),
  ];

  fn id(&self) -> u64 {
    self.id
  }

  fn row(&self) -> Vec<String> {
    vec![
      self.id.to_string(),
      self.username.clone(),
      self.email.clone(),
      self.role.label().to_string(),
    ]
  }

  fn details(&self) -> Vec<(&'static str, String)> {
    vec![
      ("Username", self.username.clone()),
      ("Email", self.email.clone()),
      ("Role", self.role.label().to_string()),
      ("Active", self.active.to_string()),
    ]
  }
}
