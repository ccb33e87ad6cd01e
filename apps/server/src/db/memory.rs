//! In-memory store implementing every store trait.
//!
//! Used when `storage.backend = "memory"` (local development, demos) and by
//! the integration tests. Content filtering goes through
//! [`ContentFilter::matches`] and ordering through [`SortOrder::compare`], so
//! it returns the same rows in the same order as the SQL backend.

use crate::db::search::{ContentFilter, Pagination, SortOrder};
use crate::db::traits::{ContentStore, DirectoryStore, HistoryStore};
use crate::models::{
    CategoryRef, ContentRecord, ContentStatus, ContentSummary, NewHistoryRecord, PopularQuery,
    SearchHistoryRecord, Suggestion, TagRef, UserRecord,
};
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    content: RwLock<Vec<ContentRecord>>,
    users: RwLock<Vec<UserRecord>>,
    categories: RwLock<Vec<CategoryRef>>,
    tags: RwLock<Vec<TagRef>>,
    history: RwLock<Vec<SearchHistoryRecord>>,
    directory_lookups: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_content(&self, record: ContentRecord) {
        self.content.write().await.push(record);
    }

    pub async fn insert_user(&self, user: UserRecord) {
        self.users.write().await.push(user);
    }

    pub async fn insert_category(&self, category: CategoryRef) {
        self.categories.write().await.push(category);
    }

    pub async fn insert_tag(&self, tag: TagRef) {
        self.tags.write().await.push(tag);
    }

    /// How many directory lookups (any suggestion group) have been served
    pub fn directory_lookups(&self) -> u64 {
        self.directory_lookups.load(Ordering::Relaxed)
    }

    fn note_lookup(&self) {
        self.directory_lookups.fetch_add(1, Ordering::Relaxed);
    }

    async fn matching(&self, filter: &ContentFilter) -> Vec<ContentRecord> {
        self.content
            .read()
            .await
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect()
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn take_sorted(mut found: Vec<Suggestion>, limit: u32) -> Vec<Suggestion> {
    found.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.id.cmp(&b.id)));
    found.truncate(limit as usize);
    found
}

fn paginate<T>(items: Vec<T>, pagination: Pagination) -> Vec<T> {
    let offset = usize::try_from(pagination.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(pagination.limit()).unwrap_or(usize::MAX);
    items.into_iter().skip(offset).take(limit).collect()
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn find(
        &self,
        filter: &ContentFilter,
        order: SortOrder,
        pagination: Pagination,
    ) -> Result<Vec<ContentSummary>> {
        let mut found = self.matching(filter).await;
        found.sort_by(|a, b| order.compare(a, b));
        Ok(paginate(found, pagination)
            .iter()
            .map(ContentRecord::summary)
            .collect())
    }

    async fn count(&self, filter: &ContentFilter) -> Result<u64> {
        Ok(self.matching(filter).await.len() as u64)
    }
}

#[async_trait]
impl DirectoryStore for MemoryStore {
    async fn blog_titles(&self, needle: &str, limit: u32) -> Result<Vec<Suggestion>> {
        self.note_lookup();
        let found = self
            .content
            .read()
            .await
            .iter()
            .filter(|r| r.status == ContentStatus::Published && contains_ci(&r.title, needle))
            .map(|r| Suggestion {
                id: r.id,
                label: r.title.clone(),
                slug: Some(r.slug.clone()),
            })
            .collect();
        Ok(take_sorted(found, limit))
    }

    async fn tags(&self, needle: &str, limit: u32) -> Result<Vec<Suggestion>> {
        self.note_lookup();
        let found = self
            .tags
            .read()
            .await
            .iter()
            .filter(|t| contains_ci(&t.name, needle))
            .map(|t| Suggestion {
                id: t.id,
                label: t.name.clone(),
                slug: Some(t.slug.clone()),
            })
            .collect();
        Ok(take_sorted(found, limit))
    }

    async fn categories(&self, needle: &str, limit: u32) -> Result<Vec<Suggestion>> {
        self.note_lookup();
        let found = self
            .categories
            .read()
            .await
            .iter()
            .filter(|c| contains_ci(&c.name, needle))
            .map(|c| Suggestion {
                id: c.id,
                label: c.name.clone(),
                slug: Some(c.slug.clone()),
            })
            .collect();
        Ok(take_sorted(found, limit))
    }

    async fn authors(&self, needle: &str, limit: u32) -> Result<Vec<Suggestion>> {
        self.note_lookup();
        let found = self
            .users
            .read()
            .await
            .iter()
            .filter(|u| {
                contains_ci(&u.name, needle)
                    || u.username.as_deref().is_some_and(|n| contains_ci(n, needle))
            })
            .map(|u| Suggestion {
                id: u.id,
                label: u.name.clone(),
                slug: u.username.clone(),
            })
            .collect();
        Ok(take_sorted(found, limit))
    }
}

/// Newest first; records with equal timestamps come latest-insert first,
/// matching the `seq` tiebreak of the SQL store
fn newest_first<'a>(
    records: impl DoubleEndedIterator<Item = &'a SearchHistoryRecord>,
) -> Vec<&'a SearchHistoryRecord> {
    let mut ordered: Vec<_> = records.rev().collect();
    ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    ordered
}

#[async_trait]
impl HistoryStore for MemoryStore {
    async fn insert(&self, record: NewHistoryRecord) -> Result<SearchHistoryRecord> {
        let stored = record.into_record(Uuid::new_v4());
        self.history.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn list(&self, user_id: Uuid, pagination: Pagination) -> Result<Vec<SearchHistoryRecord>> {
        let history = self.history.read().await;
        let owned: Vec<SearchHistoryRecord> =
            newest_first(history.iter().filter(|r| r.user_id == user_id))
                .into_iter()
                .cloned()
                .collect();
        Ok(paginate(owned, pagination))
    }

    async fn count_for_user(&self, user_id: Uuid) -> Result<u64> {
        Ok(self
            .history
            .read()
            .await
            .iter()
            .filter(|r| r.user_id == user_id)
            .count() as u64)
    }

    async fn delete_for_user(&self, user_id: Uuid) -> Result<u64> {
        let mut history = self.history.write().await;
        let before = history.len();
        history.retain(|r| r.user_id != user_id);
        Ok((before - history.len()) as u64)
    }

    async fn prune_user(&self, user_id: Uuid, keep: u32) -> Result<u64> {
        let mut history = self.history.write().await;
        let owned = newest_first(history.iter().filter(|r| r.user_id == user_id));
        if owned.len() <= keep as usize {
            return Ok(0);
        }
        let evict: Vec<Uuid> = owned[keep as usize..].iter().map(|r| r.id).collect();

        let before = history.len();
        history.retain(|r| !evict.contains(&r.id));
        Ok((before - history.len()) as u64)
    }

    async fn popular(&self, since: DateTime<Utc>, limit: u32) -> Result<Vec<PopularQuery>> {
        let mut counts: HashMap<String, i64> = HashMap::new();
        for record in self.history.read().await.iter() {
            let query = record.query.trim().to_lowercase();
            if record.created_at >= since && !query.is_empty() {
                *counts.entry(query).or_default() += 1;
            }
        }

        let mut popular: Vec<PopularQuery> = counts
            .into_iter()
            .map(|(query, count)| PopularQuery { query, count })
            .collect();
        popular.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.query.cmp(&b.query)));
        popular.truncate(limit as usize);
        Ok(popular)
    }
}
