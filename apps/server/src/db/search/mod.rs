//! Search building blocks: request parsing, the content filter, sort policy,
//! pagination and SQL rendering.

pub(crate) mod escape;
pub mod filter;
pub mod paging;
pub mod params;
pub mod query_builder;
pub mod sort;

pub use filter::ContentFilter;
pub use paging::{PageInfo, Pagination};
pub use params::{DateRange, RawSearchParams, SearchQuery};
pub use query_builder::{BindValue, QueryBuilder};
pub use sort::{SortKey, SortMode, SortOrder};
