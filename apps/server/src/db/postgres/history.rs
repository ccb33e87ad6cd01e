use super::count_to_u64;
use crate::db::search::Pagination;
use crate::db::traits::HistoryStore;
use crate::models::{FiltersSnapshot, NewHistoryRecord, PopularQuery, SearchHistoryRecord};
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// `search_history` table
#[derive(Clone)]
pub struct PostgresHistoryStore {
    pool: PgPool,
}

impl PostgresHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn record_from_row(row: &PgRow) -> Result<SearchHistoryRecord> {
    let Json(filters): Json<FiltersSnapshot> = row.try_get("filters")?;
    Ok(SearchHistoryRecord {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        query: row.try_get("query")?,
        filters,
        result_count: row.try_get("result_count")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl HistoryStore for PostgresHistoryStore {
    async fn insert(&self, record: NewHistoryRecord) -> Result<SearchHistoryRecord> {
        let row = sqlx::query(
            "INSERT INTO search_history (id, user_id, query, filters, result_count, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, user_id, query, filters, result_count, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(record.user_id)
        .bind(&record.query)
        .bind(Json(&record.filters))
        .bind(record.result_count)
        .bind(record.created_at)
        .fetch_one(&self.pool)
        .await?;

        record_from_row(&row)
    }

    async fn list(&self, user_id: Uuid, pagination: Pagination) -> Result<Vec<SearchHistoryRecord>> {
        let rows = sqlx::query(
            "SELECT id, user_id, query, filters, result_count, created_at \
             FROM search_history WHERE user_id = $1 \
             ORDER BY created_at DESC, seq DESC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(i64::try_from(pagination.limit()).unwrap_or(i64::MAX))
        .bind(i64::try_from(pagination.offset()).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(record_from_row).collect()
    }

    async fn count_for_user(&self, user_id: Uuid) -> Result<u64> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM search_history WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count_to_u64(total))
    }

    async fn delete_for_user(&self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM search_history WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn prune_user(&self, user_id: Uuid, keep: u32) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM search_history WHERE user_id = $1 AND id NOT IN ( \
                 SELECT id FROM search_history WHERE user_id = $1 \
                 ORDER BY created_at DESC, seq DESC LIMIT $2)",
        )
        .bind(user_id)
        .bind(i64::from(keep))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn popular(&self, since: DateTime<Utc>, limit: u32) -> Result<Vec<PopularQuery>> {
        let rows = sqlx::query(
            "SELECT lower(btrim(query)) AS query, COUNT(*) AS count \
             FROM search_history \
             WHERE created_at >= $1 AND btrim(query) <> '' \
             GROUP BY lower(btrim(query)) \
             ORDER BY COUNT(*) DESC, lower(btrim(query)) ASC LIMIT $2",
        )
        .bind(since)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<PopularQuery> {
                Ok(PopularQuery {
                    query: row.try_get("query")?,
                    count: row.try_get("count")?,
                })
            })
            .collect()
    }
}
