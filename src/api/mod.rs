//! REST transport for the warehouse backend and the records it serves.

mod client;
mod resource;
pub mod types;

pub use client::ApiClient;
pub use resource::{Column, Resource};
