//! Offset pagination and page metadata

use crate::Result;

/// A clamped, 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
        }
    }
}

impl Pagination {
    /// Clamp arbitrary integers into a valid request: both values are at
    /// least 1 and `page_size` never exceeds `max_page_size`.
    pub fn new(page: i64, page_size: i64, max_page_size: u32) -> Self {
        let max_page_size = max_page_size.max(1);
        Self {
            page: page.clamp(1, i64::from(u32::MAX)) as u32,
            page_size: page_size.clamp(1, i64::from(max_page_size)) as u32,
        }
    }

    /// Parse `page`/`limit` query values.
    ///
    /// Missing or blank values take the defaults; values that are not
    /// integers are rejected; integers out of range are clamped.
    pub fn from_raw(
        page: Option<&str>,
        limit: Option<&str>,
        default_page_size: u32,
        max_page_size: u32,
    ) -> Result<Self> {
        let page = parse_int("page", page)?.unwrap_or(1);
        let page_size = parse_int("limit", limit)?.unwrap_or(i64::from(default_page_size));
        Ok(Self::new(page, page_size, max_page_size))
    }

    /// Rows to skip: `(page - 1) * page_size`
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }
}

pub(crate) fn parse_int(field: &str, value: Option<&str>) -> Result<Option<i64>> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    value.parse::<i64>().map(Some).map_err(|_| {
        crate::Error::Validation(format!("Invalid {field}: '{value}' is not an integer"))
    })
}

/// Page metadata for a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    /// `ceil(total / page_size)`; zero when there are no matches
    pub total_pages: u64,
}

impl PageInfo {
    pub fn new(total: u64, pagination: Pagination) -> Self {
        let page_size = u64::from(pagination.page_size.max(1));
        Self {
            total,
            page: pagination.page,
            page_size: pagination.page_size,
            total_pages: total.div_ceil(page_size),
        }
    }
}
