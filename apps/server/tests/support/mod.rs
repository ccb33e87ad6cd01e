pub mod builders;
pub mod fixtures;
pub mod store;

use anyhow::Context as _;
use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, HeaderName, HeaderValue, Method, Request, StatusCode},
    Router,
};
use futures::FutureExt as _;
use jsonwebtoken::{encode, EncodingKey, Header};
use quill_search::{
    api::create_router,
    config::StorageBackend,
    db::MemoryStore,
    state::{AppState, Stores},
    Config,
};
use serde_json::{json, Value};
use sqlx::Connection as _;
use std::sync::Arc;
use tower::ServiceExt as _;
use uuid::Uuid;

// Re-export commonly used items
pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
pub use store::TestStore;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: TestStore,
    /// Per-test schema and the server it lives on (Postgres runs only)
    schema: Option<(String, String)>,
}

impl TestApp {
    pub async fn new() -> anyhow::Result<Self> {
        Self::new_with_config(|_| {}).await
    }

    /// App over a fresh in-memory store
    pub async fn new_with_config(configure: impl FnOnce(&mut Config)) -> anyhow::Result<Self> {
        let shared = shared::shared().await?;
        let mut config = shared.base_config.clone();
        configure(&mut config);
        config.storage.backend = StorageBackend::Memory;

        // Every test gets its own store; nothing is shared between tests.
        let store = Arc::new(MemoryStore::new());
        let state = AppState::with_stores(config, Stores::memory(store.clone()), None);
        let router = create_router(state.clone());

        Ok(Self {
            router,
            state,
            store: TestStore::Memory(store),
            schema: None,
        })
    }

    /// App over Postgres at `admin_url`, migrated into a schema of its own
    pub async fn new_postgres(
        admin_url: &str,
        configure: impl FnOnce(&mut Config),
    ) -> anyhow::Result<Self> {
        let shared = shared::shared().await?;
        let schema = format!("test_{}", Uuid::new_v4().simple());

        let mut conn = sqlx::PgConnection::connect(admin_url)
            .await
            .context("connect to test database")?;
        let create = format!("CREATE SCHEMA \"{schema}\"");
        sqlx::query(&create)
            .execute(&mut conn)
            .await
            .context("create test schema")?;
        conn.close().await.ok();

        let mut config = shared.base_config.clone();
        configure(&mut config);
        config.storage.backend = StorageBackend::Postgres;
        config.database.url = with_search_path(admin_url, &schema)?;
        config.database.pool_min_size = 0;
        config.database.pool_max_size = 4;
        config.database.run_migrations = true;

        let state = AppState::new(config).await.context("build postgres state")?;
        let pool = state
            .db_pool
            .clone()
            .context("postgres state carries a pool")?;
        let router = create_router(state.clone());

        Ok(Self {
            router,
            state,
            store: TestStore::Postgres(pool),
            schema: Some((schema, admin_url.to_string())),
        })
    }

    pub fn backend(&self) -> StorageBackend {
        self.state.config.storage.backend
    }

    /// Drop the per-test schema, if any
    async fn cleanup(&self) -> anyhow::Result<()> {
        let Some((schema, admin_url)) = &self.schema else {
            return Ok(());
        };
        if let Some(pool) = &self.state.db_pool {
            pool.close().await;
        }

        let mut conn = sqlx::PgConnection::connect(admin_url)
            .await
            .context("connect to test database")?;
        let drop = format!("DROP SCHEMA IF EXISTS \"{schema}\" CASCADE");
        sqlx::query(&drop)
            .execute(&mut conn)
            .await
            .context("drop test schema")?;
        conn.close().await.ok();
        Ok(())
    }

    /// Wait for the history worker to drain its queue
    pub async fn settle(&self) {
        self.state.flush_history().await;
    }

    /// A bearer token for `user_id`, signed with the test secret
    pub fn token_for(&self, user_id: Uuid) -> anyhow::Result<String> {
        self.token_expiring_at(user_id, chrono::Utc::now().timestamp() + 3600)
    }

    /// Like [`Self::token_for`], with an explicit `exp` claim
    pub fn token_expiring_at(&self, user_id: Uuid, exp: i64) -> anyhow::Result<String> {
        let secret = self
            .state
            .config
            .auth
            .jwt_secret
            .clone()
            .context("test config carries a jwt secret")?;
        let claims = json!({
            "sub": user_id.to_string(),
            "exp": exp,
        });
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .context("sign test token")
    }

    pub async fn request(
        &self,
        method: Method,
        path_and_query: &str,
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        self.request_with_extra_headers(method, path_and_query, &[])
            .await
    }

    /// Request on behalf of `user_id`
    pub async fn request_as(
        &self,
        user_id: Uuid,
        method: Method,
        path_and_query: &str,
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        let authorization = format!("Bearer {}", self.token_for(user_id)?);
        self.request_with_extra_headers(
            method,
            path_and_query,
            &[("authorization", authorization.as_str())],
        )
        .await
    }

    pub async fn request_with_extra_headers(
        &self,
        method: Method,
        path_and_query: &str,
        extra_headers: &[(&str, &str)],
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        let mut request = Request::builder()
            .method(method)
            .uri(path_and_query)
            .header("host", "example.org")
            .header("accept", "application/json")
            .body(Body::empty())
            .context("build request")?;

        for (name, value) in extra_headers {
            request.headers_mut().insert(
                name.parse::<HeaderName>().context("parse header name")?,
                value.parse::<HeaderValue>().context("parse header value")?,
            );
        }

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .context("dispatch request")?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .context("read response body")?;

        Ok((status, headers, body))
    }

    /// GET returning the parsed JSON body
    pub async fn get_json(&self, path_and_query: &str) -> anyhow::Result<(StatusCode, Value)> {
        let (status, _headers, body) = self.request(Method::GET, path_and_query).await?;
        Ok((status, parse_json(&body)?))
    }

    pub async fn get_json_as(
        &self,
        user_id: Uuid,
        path_and_query: &str,
    ) -> anyhow::Result<(StatusCode, Value)> {
        let (status, _headers, body) = self.request_as(user_id, Method::GET, path_and_query).await?;
        Ok((status, parse_json(&body)?))
    }
}

type TestFuture<'a> =
    std::pin::Pin<Box<dyn std::future::Future<Output = anyhow::Result<()>> + 'a>>;

pub async fn with_test_app<F>(f: F) -> anyhow::Result<()>
where
    F: for<'a> FnOnce(&'a TestApp) -> TestFuture<'a>,
{
    with_test_app_with_config(|_| {}, f).await
}

/// Run `f` against the in-memory backend
pub async fn with_test_app_with_config<C, F>(configure: C, f: F) -> anyhow::Result<()>
where
    C: FnOnce(&mut Config),
    F: for<'a> FnOnce(&'a TestApp) -> TestFuture<'a>,
{
    let app = TestApp::new_with_config(configure).await?;
    let result = std::panic::AssertUnwindSafe(f(&app)).catch_unwind().await;
    finish(app, result).await
}

/// Run `f` against the in-memory backend, then against Postgres when
/// `database.test_database_url` is configured
pub async fn with_each_backend<F>(f: F) -> anyhow::Result<()>
where
    F: for<'a> Fn(&'a TestApp) -> TestFuture<'a>,
{
    with_each_backend_with_config(|_| {}, f).await
}

pub async fn with_each_backend_with_config<C, F>(configure: C, f: F) -> anyhow::Result<()>
where
    C: Fn(&mut Config),
    F: for<'a> Fn(&'a TestApp) -> TestFuture<'a>,
{
    let app = TestApp::new_with_config(&configure).await?;
    let result = std::panic::AssertUnwindSafe(f(&app)).catch_unwind().await;
    finish(app, result).await.context("memory backend")?;

    let Some(admin_url) = shared::shared().await?.test_database_url.clone() else {
        tracing::info!("database.test_database_url not set; skipping the postgres run");
        return Ok(());
    };

    let app = TestApp::new_postgres(&admin_url, &configure).await?;
    let result = std::panic::AssertUnwindSafe(f(&app)).catch_unwind().await;
    finish(app, result).await.context("postgres backend")
}

async fn finish(
    app: TestApp,
    result: std::thread::Result<anyhow::Result<()>>,
) -> anyhow::Result<()> {
    // Drain the history worker so no write outlives the test.
    app.settle().await;
    let cleanup = app.cleanup().await;

    match result {
        Ok(r) => r.and(cleanup),
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

/// Point every pooled connection at `schema` through the `options` parameter
fn with_search_path(url: &str, schema: &str) -> anyhow::Result<String> {
    let mut url = url::Url::parse(url).context("parse test database url")?;
    url.query_pairs_mut()
        .append_pair("options", &format!("-c search_path={schema}"));
    Ok(url.to_string())
}
