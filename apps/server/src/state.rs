//! Shared application state handed to every handler

use crate::{
    auth::AuthManager,
    config::{Config, StorageBackend},
    db::{
        postgres, ContentStore, DirectoryStore, HistoryStore, MemoryStore, PostgresContentStore,
        PostgresHistoryStore,
    },
    services::{HistoryRecorder, HistoryService, MetricsService, SearchService, SuggestionService},
    Result,
};
use sqlx::PgPool;
use std::sync::Arc;

/// The three collections the services run against
#[derive(Clone)]
pub struct Stores {
    pub content: Arc<dyn ContentStore>,
    pub directory: Arc<dyn DirectoryStore>,
    pub history: Arc<dyn HistoryStore>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        let content = Arc::new(PostgresContentStore::new(pool.clone()));
        Self {
            content: content.clone(),
            directory: content,
            history: Arc::new(PostgresHistoryStore::new(pool)),
        }
    }

    /// Every collection served by one in-memory store
    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            content: store.clone(),
            directory: store.clone(),
            history: store,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: AuthManager,
    pub search_service: Arc<SearchService>,
    pub suggestion_service: Arc<SuggestionService>,
    pub history_service: Arc<HistoryService>,
    pub metrics_service: Arc<MetricsService>,
    pub db_pool: Option<PgPool>,
}

impl AppState {
    /// Build state for the configured storage backend
    pub async fn new(config: Config) -> Result<Self> {
        match config.storage.backend {
            StorageBackend::Postgres => {
                let pool = postgres::connect(&config.database).await?;
                let stores = Stores::postgres(pool.clone());
                Ok(Self::with_stores(config, stores, Some(pool)))
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on restart");
                let stores = Stores::memory(Arc::new(MemoryStore::new()));
                Ok(Self::with_stores(config, stores, None))
            }
        }
    }

    /// Wire services over explicit stores. Spawns the history worker, so it
    /// must run inside a Tokio runtime.
    pub fn with_stores(config: Config, stores: Stores, db_pool: Option<PgPool>) -> Self {
        let recorder = HistoryRecorder::spawn(stores.history.clone(), &config.history);
        let storage = match config.storage.backend {
            StorageBackend::Postgres => "postgres",
            StorageBackend::Memory => "memory",
        };

        Self {
            auth: AuthManager::new(&config.auth),
            search_service: Arc::new(SearchService::new(stores.content, recorder)),
            suggestion_service: Arc::new(SuggestionService::new(
                stores.directory,
                config.suggestions.clone(),
            )),
            history_service: Arc::new(HistoryService::new(stores.history, config.history.clone())),
            metrics_service: Arc::new(MetricsService::new(db_pool.clone(), storage)),
            db_pool,
            config: Arc::new(config),
        }
    }

    /// Wait for queued history records to be persisted
    pub async fn flush_history(&self) {
        self.search_service.recorder().flush().await;
    }
}
