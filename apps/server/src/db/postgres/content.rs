use super::{bind_query, bind_scalar, count_to_u64};
use crate::db::search::escape::contains_pattern;
use crate::db::search::{ContentFilter, Pagination, QueryBuilder, SortOrder};
use crate::db::traits::{ContentStore, DirectoryStore};
use crate::models::{AuthorRef, CategoryRef, ContentSummary, Suggestion, TagRef};
use crate::Result;
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

/// Reads the platform's `blogs`, `tags`, `categories` and `users` tables
#[derive(Clone)]
pub struct PostgresContentStore {
    pool: PgPool,
}

impl PostgresContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn lookup(&self, sql: &str, needle: &str, limit: u32) -> Result<Vec<Suggestion>> {
        let rows = sqlx::query(sql)
            .bind(contains_pattern(needle))
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| -> Result<Suggestion> {
                Ok(Suggestion {
                    id: row.try_get("id")?,
                    label: row.try_get("label")?,
                    slug: row.try_get("slug")?,
                })
            })
            .collect()
    }
}

fn summary_from_row(row: &PgRow) -> Result<ContentSummary> {
    let category_id: Option<uuid::Uuid> = row.try_get("category_id")?;
    let category = match category_id {
        Some(id) => Some(CategoryRef {
            id,
            name: row.try_get("category_name")?,
            slug: row.try_get("category_slug")?,
        }),
        None => None,
    };
    let Json(tags): Json<Vec<TagRef>> = row.try_get("tags")?;

    Ok(ContentSummary {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        slug: row.try_get("slug")?,
        excerpt: row.try_get("excerpt")?,
        author: AuthorRef {
            id: row.try_get("author_id")?,
            name: row.try_get("author_name")?,
            avatar: row.try_get("author_avatar")?,
        },
        category,
        tags,
        views: row.try_get("views")?,
        likes: row.try_get("likes")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl ContentStore for PostgresContentStore {
    async fn find(
        &self,
        filter: &ContentFilter,
        order: SortOrder,
        pagination: Pagination,
    ) -> Result<Vec<ContentSummary>> {
        let (sql, bind_values) = QueryBuilder::for_filter(filter)
            .with_order(order)
            .with_pagination(pagination)
            .build_sql();

        let mut query = sqlx::query(&sql);
        for value in bind_values {
            query = bind_query(query, value);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(summary_from_row).collect()
    }

    async fn count(&self, filter: &ContentFilter) -> Result<u64> {
        let (sql, bind_values) = QueryBuilder::for_filter(filter).build_count_sql();

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for value in bind_values {
            query = bind_scalar(query, value);
        }

        let total = query.fetch_one(&self.pool).await?;
        Ok(count_to_u64(total))
    }
}

#[async_trait]
impl DirectoryStore for PostgresContentStore {
    async fn blog_titles(&self, needle: &str, limit: u32) -> Result<Vec<Suggestion>> {
        self.lookup(
            "SELECT id, title AS label, slug FROM blogs \
             WHERE status = 'published' AND title ILIKE $1 ESCAPE '\\' \
             ORDER BY title ASC, id ASC LIMIT $2",
            needle,
            limit,
        )
        .await
    }

    async fn tags(&self, needle: &str, limit: u32) -> Result<Vec<Suggestion>> {
        self.lookup(
            "SELECT id, name AS label, slug FROM tags \
             WHERE name ILIKE $1 ESCAPE '\\' \
             ORDER BY name ASC, id ASC LIMIT $2",
            needle,
            limit,
        )
        .await
    }

    async fn categories(&self, needle: &str, limit: u32) -> Result<Vec<Suggestion>> {
        self.lookup(
            "SELECT id, name AS label, slug FROM categories \
             WHERE name ILIKE $1 ESCAPE '\\' \
             ORDER BY name ASC, id ASC LIMIT $2",
            needle,
            limit,
        )
        .await
    }

    async fn authors(&self, needle: &str, limit: u32) -> Result<Vec<Suggestion>> {
        self.lookup(
            "SELECT id, name AS label, username AS slug FROM users \
             WHERE name ILIKE $1 ESCAPE '\\' OR username ILIKE $1 ESCAPE '\\' \
             ORDER BY name ASC, id ASC LIMIT $2",
            needle,
            limit,
        )
        .await
    }
}
