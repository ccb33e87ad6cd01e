//! Request handlers for API endpoints
//!
//! Handlers parse the request, call one service and shape the JSON
//! response. Identity arrives as an explicit `AuthenticatedActor` argument.

pub mod health;
pub mod history;
pub mod metrics;
pub mod search;

pub use health::{health_check, root};
pub use history::{clear_history, list_history, popular};
pub use metrics::metrics_handler;
pub use search::{search, suggestions};
