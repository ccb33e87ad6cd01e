//! Autocomplete suggestion groups

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One autocomplete entry: enough to render a label and navigate to the target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: Uuid,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

/// Four independent suggestion groups, never merged into one ranking
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionSet {
    pub blogs: Vec<Suggestion>,
    pub tags: Vec<Suggestion>,
    pub categories: Vec<Suggestion>,
    pub authors: Vec<Suggestion>,
}

impl SuggestionSet {
    pub fn is_empty(&self) -> bool {
        self.blogs.is_empty()
            && self.tags.is_empty()
            && self.categories.is_empty()
            && self.authors.is_empty()
    }
}
