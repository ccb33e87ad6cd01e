//! Core traits for the collections search reads from and writes to
//!
//! The blog, tag, category and user collections belong to the wider
//! platform; search only needs the read contracts below. Search history is
//! owned by this service. Any backend (PostgreSQL, in-memory, a proxy to
//! another service) can implement these traits.

use crate::{
    db::search::{ContentFilter, Pagination, SortOrder},
    models::{ContentSummary, NewHistoryRecord, PopularQuery, SearchHistoryRecord, Suggestion},
    Result,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Read access to blog content
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch one page of matching content in the given order
    ///
    /// # Arguments
    /// * `filter` - The predicate; always restricted to published content
    /// * `order` - Primary ordering (ties broken by id)
    /// * `pagination` - Offset/limit to apply
    async fn find(
        &self,
        filter: &ContentFilter,
        order: SortOrder,
        pagination: Pagination,
    ) -> Result<Vec<ContentSummary>>;

    /// Count all content matching `filter`, ignoring pagination
    async fn count(&self, filter: &ContentFilter) -> Result<u64>;
}

/// Name lookups used for autocomplete.
///
/// Each method is a case-insensitive substring match on the entity's display
/// field, returning at most `limit` entries ordered by label.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// Titles of published blog posts
    async fn blog_titles(&self, needle: &str, limit: u32) -> Result<Vec<Suggestion>>;

    async fn tags(&self, needle: &str, limit: u32) -> Result<Vec<Suggestion>>;

    async fn categories(&self, needle: &str, limit: u32) -> Result<Vec<Suggestion>>;

    /// Users matched on display name or username
    async fn authors(&self, needle: &str, limit: u32) -> Result<Vec<Suggestion>>;
}

/// Storage for per-user search history
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Persist a new record and return it with its assigned id
    async fn insert(&self, record: NewHistoryRecord) -> Result<SearchHistoryRecord>;

    /// One page of a user's records, newest first
    async fn list(&self, user_id: Uuid, pagination: Pagination) -> Result<Vec<SearchHistoryRecord>>;

    async fn count_for_user(&self, user_id: Uuid) -> Result<u64>;

    /// Delete every record owned by `user_id`, returning how many were removed
    async fn delete_for_user(&self, user_id: Uuid) -> Result<u64>;

    /// Keep only the newest `keep` records for `user_id`, returning how many were removed
    async fn prune_user(&self, user_id: Uuid, keep: u32) -> Result<u64>;

    /// Most frequent query texts since `since`, grouped case-insensitively
    async fn popular(&self, since: DateTime<Utc>, limit: u32) -> Result<Vec<PopularQuery>>;
}
