//! Search service - faceted content search
//!
//! Orchestrates one search request by:
//! - Building the published-only filter from the parsed query
//! - Running the page query and the count query concurrently over that filter
//! - Handing the outcome to the history recorder for signed-in callers

use crate::{
    db::search::{ContentFilter, PageInfo, SearchQuery},
    db::traits::ContentStore,
    models::{ContentSummary, FiltersSnapshot},
    services::history::HistoryRecorder,
    Error, Result,
};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// One page of search results plus the totals for the whole match set
#[derive(Debug, Clone)]
pub struct SearchResultPage {
    pub items: Vec<ContentSummary>,
    pub page: PageInfo,
}

pub struct SearchService {
    store: Arc<dyn ContentStore>,
    recorder: HistoryRecorder,
}

impl SearchService {
    pub fn new(store: Arc<dyn ContentStore>, recorder: HistoryRecorder) -> Self {
        Self { store, recorder }
    }

    pub fn recorder(&self) -> &HistoryRecorder {
        &self.recorder
    }

    /// Run a search.
    ///
    /// `actor` is the signed-in caller, if any. When present and the query
    /// text is not blank, a history record is enqueued after the results are
    /// known; recording never delays or fails the search.
    pub async fn search(&self, query: &SearchQuery, actor: Option<Uuid>) -> Result<SearchResultPage> {
        let start = Instant::now();
        let sort = query.sort.as_str();
        let filter = ContentFilter::from_query(query);
        let order = query.sort.order();
        let pagination = query.pagination;

        let outcome = tokio::try_join!(
            self.store.find(&filter, order, pagination),
            self.store.count(&filter)
        );

        let (items, total) = match outcome {
            Ok(found) => found,
            Err(e) => {
                crate::metrics::SEARCH_TOTAL
                    .with_label_values(&[sort, "error"])
                    .inc();
                tracing::error!(error = %e, "Search query failed");
                return Err(match e {
                    Error::Store(_) => e,
                    other => Error::Store(other.to_string()),
                });
            }
        };

        let page = PageInfo::new(total, pagination);

        crate::metrics::SEARCH_TOTAL
            .with_label_values(&[sort, "success"])
            .inc();
        crate::metrics::SEARCH_RESULTS
            .with_label_values(&[sort])
            .observe(total as f64);
        crate::metrics::SEARCH_DURATION_SECONDS
            .with_label_values(&[sort])
            .observe(start.elapsed().as_secs_f64());

        tracing::debug!(
            total,
            returned = items.len(),
            page = page.page,
            sort,
            "Search completed"
        );

        if let Some(user_id) = actor {
            self.recorder
                .record(user_id, &query.text, FiltersSnapshot::from(query), total);
        }

        Ok(SearchResultPage { items, page })
    }
}
