//! Service layer - business logic between handlers and stores

pub mod history;
pub mod metrics;
pub mod search;
pub mod suggestions;

pub use history::{HistoryPage, HistoryRecorder, HistoryService, RecordOutcome};
pub use metrics::MetricsService;
pub use search::{SearchResultPage, SearchService};
pub use suggestions::SuggestionService;
