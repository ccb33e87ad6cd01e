//! Sort policy: maps the `sort` token onto a concrete ordering

use crate::models::ContentRecord;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Newest first
    #[default]
    Recent,
    Oldest,
    /// Most viewed first
    Popular,
    /// Most liked first
    Likes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    CreatedAt,
    Views,
    Likes,
}

/// Primary ordering. Ties are always broken by id ascending so that paging
/// through an unchanged collection is deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub key: SortKey,
    pub ascending: bool,
}

impl SortMode {
    /// Resolve a client token.
    ///
    /// Missing or blank tokens mean `recent`. Unknown tokens fall back to
    /// `recent` unless `strict` is set, in which case they are rejected.
    pub fn parse(token: Option<&str>, strict: bool) -> Result<Self> {
        let token = token.map(str::trim).unwrap_or_default();
        if token.is_empty() {
            return Ok(Self::Recent);
        }

        match token.to_ascii_lowercase().as_str() {
            "recent" => Ok(Self::Recent),
            "oldest" => Ok(Self::Oldest),
            "popular" => Ok(Self::Popular),
            "likes" => Ok(Self::Likes),
            _ if strict => Err(crate::Error::Validation(format!(
                "Unsupported sort: '{token}'. Expected one of: recent, oldest, popular, likes"
            ))),
            _ => {
                tracing::debug!(sort = %token, "Unknown sort token, using 'recent'");
                Ok(Self::Recent)
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Recent => "recent",
            SortMode::Oldest => "oldest",
            SortMode::Popular => "popular",
            SortMode::Likes => "likes",
        }
    }

    pub fn order(&self) -> SortOrder {
        match self {
            SortMode::Recent => SortOrder {
                key: SortKey::CreatedAt,
                ascending: false,
            },
            SortMode::Oldest => SortOrder {
                key: SortKey::CreatedAt,
                ascending: true,
            },
            SortMode::Popular => SortOrder {
                key: SortKey::Views,
                ascending: false,
            },
            SortMode::Likes => SortOrder {
                key: SortKey::Likes,
                ascending: false,
            },
        }
    }
}

impl SortOrder {
    /// Column of the `blogs` table this ordering sorts on
    pub fn column(&self) -> &'static str {
        match self.key {
            SortKey::CreatedAt => "b.created_at",
            SortKey::Views => "b.views",
            SortKey::Likes => "b.likes",
        }
    }

    pub fn direction(&self) -> &'static str {
        if self.ascending {
            "ASC"
        } else {
            "DESC"
        }
    }

    /// Compare two records the way the SQL `ORDER BY` would
    pub fn compare(&self, a: &ContentRecord, b: &ContentRecord) -> Ordering {
        let primary = match self.key {
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            SortKey::Views => a.views.cmp(&b.views),
            SortKey::Likes => a.likes.cmp(&b.likes),
        };
        let primary = if self.ascending {
            primary
        } else {
            primary.reverse()
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }

}
