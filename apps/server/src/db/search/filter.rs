//! Content filter built from a search request.
//!
//! A [`ContentFilter`] is the single predicate a search runs with: the page
//! query and the count query of one request are both driven by the same
//! value. Stores interpret it either by rendering SQL (see
//! `query_builder`) or by evaluating [`ContentFilter::matches`].
//!
//! The filter is always restricted to published content; there is no way to
//! construct one that is not.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::params::SearchQuery;
use crate::models::{ContentRecord, ContentStatus, TagRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFilter {
    text: Option<String>,
    category: Option<Uuid>,
    tags: Vec<String>,
    author: Option<Uuid>,
    created_from: Option<DateTime<Utc>>,
    created_to: Option<DateTime<Utc>>,
}

impl ContentFilter {
    /// Every published item
    pub fn published() -> Self {
        Self {
            text: None,
            category: None,
            tags: Vec::new(),
            author: None,
            created_from: None,
            created_to: None,
        }
    }

    pub fn from_query(query: &SearchQuery) -> Self {
        let text = Some(query.text.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        Self {
            text,
            category: query.category,
            tags: query.tags.iter().map(|t| t.to_lowercase()).collect(),
            author: query.author,
            created_from: query.date_range.start,
            created_to: query.date_range.end,
        }
    }

    /// Always `Published`; drafts and archived posts are never searchable
    pub fn status(&self) -> ContentStatus {
        ContentStatus::Published
    }

    /// Case-insensitive substring matched against title, body and excerpt
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn category(&self) -> Option<Uuid> {
        self.category
    }

    /// Lowercased tag ids, names or slugs; a post matches if it carries any of them
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn author(&self) -> Option<Uuid> {
        self.author
    }

    /// Inclusive lower bound on creation time
    pub fn created_from(&self) -> Option<DateTime<Utc>> {
        self.created_from
    }

    /// Inclusive upper bound on creation time
    pub fn created_to(&self) -> Option<DateTime<Utc>> {
        self.created_to
    }

    /// Evaluate the filter against one record
    pub fn matches(&self, record: &ContentRecord) -> bool {
        if record.status != self.status() {
            return false;
        }

        if let Some(text) = &self.text {
            let needle = text.to_lowercase();
            let hit = record.title.to_lowercase().contains(&needle)
                || record.content.to_lowercase().contains(&needle)
                || record.excerpt.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }

        if let Some(category) = self.category {
            if record.category.as_ref().map(|c| c.id) != Some(category) {
                return false;
            }
        }

        if !self.tags.is_empty()
            && !record
                .tags
                .iter()
                .any(|tag| self.tags.iter().any(|wanted| tag_matches(tag, wanted)))
        {
            return false;
        }

        if let Some(author) = self.author {
            if record.author.id != author {
                return false;
            }
        }

        if let Some(from) = self.created_from {
            if record.created_at < from {
                return false;
            }
        }

        if let Some(to) = self.created_to {
            if record.created_at > to {
                return false;
            }
        }

        true
    }
}

/// `wanted` is already lowercased
fn tag_matches(tag: &TagRef, wanted: &str) -> bool {
    tag.id.to_string() == wanted
        || tag.name.to_lowercase() == wanted
        || tag.slug.to_lowercase() == wanted
}
