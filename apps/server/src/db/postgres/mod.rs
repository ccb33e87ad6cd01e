//! PostgreSQL-backed stores

mod content;
mod history;

pub use content::PostgresContentStore;
pub use history::PostgresHistoryStore;

use crate::config::DatabaseConfig;
use crate::db::search::BindValue;
use crate::Result;
use sqlx::postgres::{PgArguments, PgPoolOptions};
use sqlx::{Executor, PgPool};
use std::time::Duration;

/// Open the connection pool and, if configured, apply pending migrations
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    let statement_timeout_ms = config.statement_timeout_seconds.saturating_mul(1000);

    let pool = PgPoolOptions::new()
        .min_connections(config.pool_min_size)
        .max_connections(config.pool_max_size)
        .acquire_timeout(Duration::from_secs(config.pool_timeout_seconds))
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                if statement_timeout_ms > 0 {
                    let sql = format!("SET statement_timeout = {statement_timeout_ms}");
                    conn.execute(sql.as_str()).await?;
                }
                Ok(())
            })
        })
        .connect(&config.url)
        .await?;

    tracing::info!(
        max_connections = config.pool_max_size,
        "Database pool initialized"
    );

    if config.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    Ok(pool)
}

fn bind_query<'q>(
    query: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    value: BindValue,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match value {
        BindValue::Text(v) => query.bind(v),
        BindValue::TextArray(vs) => query.bind(vs),
        BindValue::Uuid(v) => query.bind(v),
        BindValue::Timestamp(v) => query.bind(v),
        BindValue::BigInt(v) => query.bind(v),
    }
}

fn bind_scalar<'q, O>(
    query: sqlx::query::QueryScalar<'q, sqlx::Postgres, O, PgArguments>,
    value: BindValue,
) -> sqlx::query::QueryScalar<'q, sqlx::Postgres, O, PgArguments> {
    match value {
        BindValue::Text(v) => query.bind(v),
        BindValue::TextArray(vs) => query.bind(vs),
        BindValue::Uuid(v) => query.bind(v),
        BindValue::Timestamp(v) => query.bind(v),
        BindValue::BigInt(v) => query.bind(v),
    }
}

pub(crate) fn count_to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}
