//! Persisted search history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::search::{SearchQuery, SortMode};

/// The facet values a search ran with (pagination deliberately excluded)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FiltersSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Uuid>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    pub sort: SortMode,
}

impl From<&SearchQuery> for FiltersSnapshot {
    fn from(query: &SearchQuery) -> Self {
        Self {
            category: query.category,
            tags: query.tags.clone(),
            author: query.author,
            start_date: query.date_range.start,
            end_date: query.date_range.end,
            sort: query.sort,
        }
    }
}

/// A stored search, owned by the user who ran it. Never updated after insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistoryRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub query: String,
    pub filters: FiltersSnapshot,
    pub result_count: i64,
    pub created_at: DateTime<Utc>,
}

/// A record waiting to be persisted by the history recorder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHistoryRecord {
    pub user_id: Uuid,
    pub query: String,
    pub filters: FiltersSnapshot,
    pub result_count: i64,
    pub created_at: DateTime<Utc>,
}

impl NewHistoryRecord {
    pub fn into_record(self, id: Uuid) -> SearchHistoryRecord {
        SearchHistoryRecord {
            id,
            user_id: self.user_id,
            query: self.query,
            filters: self.filters,
            result_count: self.result_count,
            created_at: self.created_at,
        }
    }
}

/// An aggregated query text and how often it was searched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularQuery {
    pub query: String,
    pub count: i64,
}
