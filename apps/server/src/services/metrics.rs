//! Metrics service for collecting application metrics

use sqlx::PgPool;

/// Service for collecting application metrics
pub struct MetricsService {
    pool: Option<PgPool>,
    storage_backend: &'static str,
}

impl MetricsService {
    pub fn new(pool: Option<PgPool>, storage_backend: &'static str) -> Self {
        Self {
            pool,
            storage_backend,
        }
    }

    pub fn storage_backend(&self) -> &'static str {
        self.storage_backend
    }

    /// Update database connection pool metrics
    pub fn update_db_connection_metrics(&self) {
        let Some(pool) = &self.pool else {
            return;
        };
        let pool_size = pool.size();
        let idle = pool.num_idle() as u32;

        crate::metrics::DB_CONNECTIONS_ACTIVE.set(i64::from(pool_size.saturating_sub(idle)));
        crate::metrics::DB_CONNECTIONS_IDLE.set(i64::from(idle));
    }

    /// Collect all custom application metrics
    pub fn collect_custom_metrics(&self, server_version: &str) -> String {
        let mut output = String::new();

        self.update_db_connection_metrics();

        output.push_str("# HELP quill_search_server_info Search server information\n");
        output.push_str("# TYPE quill_search_server_info gauge\n");
        output.push_str(&format!(
            "quill_search_server_info{{version=\"{}\",storage=\"{}\"}} 1\n",
            server_version, self.storage_backend
        ));

        output
    }
}
