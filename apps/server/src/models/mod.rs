//! Domain models for the search subsystem

pub mod content;
pub mod history;
pub mod suggestion;

pub use content::{
    AuthorRef, CategoryRef, ContentRecord, ContentStatus, ContentSummary, TagRef, UserRecord,
};
pub use history::{FiltersSnapshot, NewHistoryRecord, PopularQuery, SearchHistoryRecord};
pub use suggestion::{Suggestion, SuggestionSet};
