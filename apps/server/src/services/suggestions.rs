//! Autocomplete over blog titles, tags, categories and authors.
//!
//! The four groups are looked up concurrently and returned side by side;
//! they are never merged into one ranking.

use crate::config::SuggestionsConfig;
use crate::db::traits::DirectoryStore;
use crate::models::{Suggestion, SuggestionSet};
use crate::Result;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub struct SuggestionService {
    store: Arc<dyn DirectoryStore>,
    config: SuggestionsConfig,
}

impl SuggestionService {
    pub fn new(store: Arc<dyn DirectoryStore>, config: SuggestionsConfig) -> Self {
        Self { store, config }
    }

    /// Suggestions for a partial query.
    ///
    /// Prefixes shorter than `min_query_length` characters (after trimming)
    /// return an empty set without touching the store. `limit_per_type`
    /// defaults to the configured value and is clamped to the configured max.
    pub async fn suggest(&self, prefix: &str, limit_per_type: Option<u32>) -> Result<SuggestionSet> {
        let needle = prefix.trim();
        if needle.chars().count() < self.config.min_query_length {
            crate::metrics::SUGGESTIONS_TOTAL
                .with_label_values(&["short_circuit"])
                .inc();
            return Ok(SuggestionSet::default());
        }

        let limit = limit_per_type
            .unwrap_or(self.config.default_limit_per_type)
            .clamp(1, self.config.max_limit_per_type.max(1));
        let timeout = Duration::from_millis(self.config.lookup_timeout_ms);
        let store = self.store.as_ref();

        let outcome = tokio::try_join!(
            bounded("blogs", timeout, limit, store.blog_titles(needle, limit)),
            bounded("tags", timeout, limit, store.tags(needle, limit)),
            bounded("categories", timeout, limit, store.categories(needle, limit)),
            bounded("authors", timeout, limit, store.authors(needle, limit)),
        );

        let (blogs, tags, categories, authors) = match outcome {
            Ok(groups) => groups,
            Err(e) => {
                crate::metrics::SUGGESTIONS_TOTAL
                    .with_label_values(&["error"])
                    .inc();
                return Err(e);
            }
        };

        let set = SuggestionSet {
            blogs,
            tags,
            categories,
            authors,
        };
        let outcome = if set.is_empty() { "no_match" } else { "served" };
        crate::metrics::SUGGESTIONS_TOTAL
            .with_label_values(&[outcome])
            .inc();

        Ok(set)
    }
}

/// Apply the per-group timeout and cap
async fn bounded<F>(group: &'static str, timeout: Duration, limit: u32, lookup: F) -> Result<Vec<Suggestion>>
where
    F: Future<Output = Result<Vec<Suggestion>>>,
{
    match tokio::time::timeout(timeout, lookup).await {
        Ok(found) => {
            let mut found = found?;
            found.truncate(limit as usize);
            Ok(found)
        }
        Err(_) => {
            crate::metrics::SUGGESTION_TIMEOUTS_TOTAL
                .with_label_values(&[group])
                .inc();
            tracing::warn!(group, timeout_ms = timeout.as_millis() as u64, "Suggestion lookup timed out");
            Ok(Vec::new())
        }
    }
}
