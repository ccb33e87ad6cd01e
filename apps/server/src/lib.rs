//! Quill Search - faceted search service for the Quill blogging platform
//!
//! - Multi-facet, multi-sort, paginated search over published posts
//! - Grouped autocomplete over titles, tags, categories and authors
//! - Per-user search history recorded in the background
//! - PostgreSQL or in-memory storage behind async store traits

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod request_context;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
pub use state::AppState;
