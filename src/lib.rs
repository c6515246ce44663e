//! Terminal dashboard for a warehouse-management REST backend.
//!
//! Each collection is browsed through a [`listing::Listing`], a paginated
//! view over the backend with query-keyed caching, cancellation of
//! superseded fetches and local edits.

pub mod api;
pub mod app;
pub mod commands;
pub mod config;
pub mod event;
pub mod listing;
pub mod logging;
pub mod ui;
