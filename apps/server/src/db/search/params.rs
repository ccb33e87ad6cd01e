//! Search parameter parsing and validation
//!
//! Turns the raw query-string values of a search request into a typed
//! [`SearchQuery`]:
//! - `q` free text (trimmed; blank means no text filter)
//! - `category`, `author` ids
//! - `tags` comma-separated tag ids, names or slugs (match-any)
//! - `startDate` / `endDate` inclusive creation-date bounds
//! - `sort` mode, `page` and `limit`

use crate::config::SearchConfig;
use crate::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::paging::Pagination;
use super::sort::SortMode;

/// Search parameters exactly as they arrive on the query string.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RawSearchParams {
    #[validate(length(max = 200, message = "Search query must be at most 200 characters"))]
    pub q: Option<String>,
    pub category: Option<String>,
    #[validate(length(max = 1000, message = "tags must be at most 1000 characters"))]
    pub tags: Option<String>,
    pub author: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Inclusive creation-date window; either side may be open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// A fully parsed search request.
///
/// Every facet is independently optional; a query with nothing set matches
/// every published item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Trimmed free text; empty means "no text filter"
    pub text: String,
    pub category: Option<Uuid>,
    /// Requested tags in request order, deduplicated
    pub tags: Vec<String>,
    pub author: Option<Uuid>,
    pub date_range: DateRange,
    pub sort: SortMode,
    pub pagination: Pagination,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            text: String::new(),
            category: None,
            tags: Vec::new(),
            author: None,
            date_range: DateRange::default(),
            sort: SortMode::default(),
            pagination: Pagination::default(),
        }
    }
}

impl SearchQuery {
    /// Parse and validate raw request parameters.
    ///
    /// Out-of-range paging values are clamped; non-numeric paging values,
    /// malformed ids and unparseable dates are rejected.
    pub fn from_raw(raw: &RawSearchParams, config: &SearchConfig) -> Result<Self> {
        raw.validate()
            .map_err(|e| crate::Error::Validation(validation_message(&e)))?;

        let text = raw.q.as_deref().map(str::trim).unwrap_or_default().to_string();
        let category = parse_id("category", raw.category.as_deref())?;
        let author = parse_id("author", raw.author.as_deref())?;
        let tags = parse_tags(raw.tags.as_deref());

        let date_range = DateRange {
            start: parse_date_bound("startDate", raw.start_date.as_deref(), Bound::Start)?,
            end: parse_date_bound("endDate", raw.end_date.as_deref(), Bound::End)?,
        };

        let sort = SortMode::parse(raw.sort.as_deref(), config.strict_sort)?;
        let pagination = Pagination::from_raw(
            raw.page.as_deref(),
            raw.limit.as_deref(),
            config.default_page_size,
            config.max_page_size,
        )?;

        Ok(Self {
            text,
            category,
            tags,
            author,
            date_range,
            sort,
            pagination,
        })
    }
}

/// Flatten validator output into one client-facing message
pub(crate) fn validation_message(errors: &validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid {field}"))
            })
        })
        .collect();
    messages.sort();
    messages.join("; ")
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_id(field: &str, value: Option<&str>) -> Result<Option<Uuid>> {
    let Some(value) = non_blank(value) else {
        return Ok(None);
    };
    Uuid::parse_str(value)
        .map(Some)
        .map_err(|_| crate::Error::Validation(format!("Invalid {field}: '{value}' is not a valid id")))
}

/// Split a comma-separated tag list, dropping blanks and repeats
pub(crate) fn parse_tags(value: Option<&str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in value.unwrap_or_default().split(',') {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        if !out.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            out.push(tag.to_string());
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Start,
    End,
}

/// Accepts RFC 3339 timestamps, `YYYY-MM-DDTHH:MM:SS` (taken as UTC) and plain
/// `YYYY-MM-DD` dates. A plain end date covers that whole day.
fn parse_date_bound(field: &str, value: Option<&str>, bound: Bound) -> Result<Option<DateTime<Utc>>> {
    let Some(value) = non_blank(value) else {
        return Ok(None);
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(Some(naive.and_utc()));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let time = match bound {
            Bound::Start => NaiveTime::MIN,
            Bound::End => NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)
                .unwrap_or(NaiveTime::MIN),
        };
        return Ok(Some(date.and_time(time).and_utc()));
    }

    Err(crate::Error::Validation(format!(
        "Invalid {field}: '{value}' is not an ISO 8601 date or timestamp"
    )))
}
