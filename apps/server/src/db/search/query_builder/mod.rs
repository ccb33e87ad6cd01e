//! SQL query builder for content searches.
//!
//! Renders a [`ContentFilter`] into one `WHERE` clause with positional bind
//! parameters. The page query ([`QueryBuilder::build_sql`]) and the count
//! query ([`QueryBuilder::build_count_sql`]) are both assembled from that
//! same clause, so they can never disagree about which rows match.

use super::escape::contains_pattern;
use super::filter::ContentFilter;
use super::paging::Pagination;
use super::sort::SortOrder;
use chrono::{DateTime, Utc};
use uuid::Uuid;

mod bind;

use bind::push_bind;

/// Bind values for `sqlx` queries.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Text(String),
    TextArray(Vec<String>),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    BigInt(i64),
}

const SELECT_COLUMNS: &str = "b.id, b.title, b.slug, b.excerpt, b.views, b.likes, \
     b.created_at, b.updated_at, \
     u.id AS author_id, u.name AS author_name, u.avatar AS author_avatar, \
     c.id AS category_id, c.name AS category_name, c.slug AS category_slug, \
     COALESCE((SELECT jsonb_agg(jsonb_build_object('id', t.id, 'name', t.name, 'slug', t.slug) ORDER BY t.name) \
               FROM blog_tags bt JOIN tags t ON t.id = bt.tag_id \
               WHERE bt.blog_id = b.id), '[]'::jsonb) AS tags";

#[derive(Debug, Clone)]
pub struct QueryBuilder {
    conditions: Vec<String>,
    binds: Vec<BindValue>,
    order: Option<SortOrder>,
    pagination: Option<Pagination>,
}

impl QueryBuilder {
    /// Build the shared `WHERE` clause for a filter
    pub fn for_filter(filter: &ContentFilter) -> Self {
        let mut conditions = Vec::new();
        let mut binds = Vec::new();

        let idx = push_bind(&mut binds, BindValue::Text(filter.status().as_str().to_string()));
        conditions.push(format!("b.status = ${idx}"));

        if let Some(text) = filter.text() {
            let idx = push_bind(&mut binds, BindValue::Text(contains_pattern(text)));
            conditions.push(format!(
                "(b.title ILIKE ${idx} ESCAPE '\\' OR b.content ILIKE ${idx} ESCAPE '\\' OR b.excerpt ILIKE ${idx} ESCAPE '\\')"
            ));
        }

        if let Some(category) = filter.category() {
            let idx = push_bind(&mut binds, BindValue::Uuid(category));
            conditions.push(format!("b.category_id = ${idx}"));
        }

        if !filter.tags().is_empty() {
            let idx = push_bind(&mut binds, BindValue::TextArray(filter.tags().to_vec()));
            conditions.push(format!(
                "EXISTS (SELECT 1 FROM blog_tags bt JOIN tags t ON t.id = bt.tag_id \
                 WHERE bt.blog_id = b.id \
                 AND (t.id::text = ANY(${idx}) OR lower(t.name) = ANY(${idx}) OR lower(t.slug) = ANY(${idx})))"
            ));
        }

        if let Some(author) = filter.author() {
            let idx = push_bind(&mut binds, BindValue::Uuid(author));
            conditions.push(format!("b.author_id = ${idx}"));
        }

        if let Some(from) = filter.created_from() {
            let idx = push_bind(&mut binds, BindValue::Timestamp(from));
            conditions.push(format!("b.created_at >= ${idx}"));
        }

        if let Some(to) = filter.created_to() {
            let idx = push_bind(&mut binds, BindValue::Timestamp(to));
            conditions.push(format!("b.created_at <= ${idx}"));
        }

        Self {
            conditions,
            binds,
            order: None,
            pagination: None,
        }
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    fn where_clause(&self) -> String {
        self.conditions.join(" AND ")
    }

    /// Page query: joined author/category/tags, ordered, limited
    pub fn build_sql(&self) -> (String, Vec<BindValue>) {
        let mut binds = self.binds.clone();
        let mut sql = format!(
            "SELECT {SELECT_COLUMNS} FROM blogs b \
             JOIN users u ON u.id = b.author_id \
             LEFT JOIN categories c ON c.id = b.category_id \
             WHERE {}",
            self.where_clause()
        );

        if let Some(order) = self.order {
            sql.push_str(&format!(
                " ORDER BY {} {}, b.id ASC",
                order.column(),
                order.direction()
            ));
        }

        if let Some(pagination) = self.pagination {
            let limit = push_bind(&mut binds, BindValue::BigInt(to_i64(pagination.limit())));
            let offset = push_bind(&mut binds, BindValue::BigInt(to_i64(pagination.offset())));
            sql.push_str(&format!(" LIMIT ${limit} OFFSET ${offset}"));
        }

        (sql, binds)
    }

    /// Count query over the identical `WHERE` clause, ignoring order and paging
    pub fn build_count_sql(&self) -> (String, Vec<BindValue>) {
        (
            format!(
                "SELECT COUNT(*) FROM blogs b WHERE {}",
                self.where_clause()
            ),
            self.binds.clone(),
        )
    }
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
