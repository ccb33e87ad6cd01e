//! Search history: background recording and owner-scoped management.
//!
//! Recording is best-effort and must not fail or slow down the search that
//! triggered it. [`HistoryRecorder::record`] only enqueues onto a bounded
//! channel; a spawned worker persists records and applies the per-user
//! retention cap. Store failures are logged and counted, never returned.

use crate::config::HistoryConfig;
use crate::db::search::{PageInfo, Pagination};
use crate::db::traits::HistoryStore;
use crate::models::{FiltersSnapshot, NewHistoryRecord, PopularQuery, SearchHistoryRecord};
use crate::Result;
use chrono::{Duration, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Notify};
use uuid::Uuid;

enum HistoryMessage {
    Record(NewHistoryRecord),
    Flush(oneshot::Sender<()>),
}

/// What happened to a record handed to [`HistoryRecorder::record`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Blank query text or recording disabled; nothing was enqueued
    Skipped,
    Queued,
    /// The queue was full; a background task will enqueue it
    Deferred,
    /// The worker is gone; the record was discarded
    Dropped,
}

/// Records still waiting for queue room after a full `try_send`
#[derive(Default)]
struct DeferredSends {
    pending: AtomicUsize,
    drained: Notify,
}

impl DeferredSends {
    fn finish_one(&self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.drained.notify_waiters();
        }
    }

    async fn wait_drained(&self) {
        loop {
            let drained = self.drained.notified();
            if self.pending.load(Ordering::SeqCst) == 0 {
                return;
            }
            drained.await;
        }
    }
}

#[derive(Clone)]
pub struct HistoryRecorder {
    sender: Option<mpsc::Sender<HistoryMessage>>,
    deferred: Arc<DeferredSends>,
}

impl HistoryRecorder {
    /// Spawn the persistence worker. Must be called inside a Tokio runtime.
    pub fn spawn(store: Arc<dyn HistoryStore>, config: &HistoryConfig) -> Self {
        if !config.enabled {
            tracing::info!("Search history recording disabled");
            return Self::disabled();
        }

        let (sender, mut receiver) = mpsc::channel::<HistoryMessage>(config.queue_capacity.max(1));
        let keep = config.max_records_per_user;

        tokio::spawn(async move {
            while let Some(message) = receiver.recv().await {
                match message {
                    HistoryMessage::Record(record) => persist(store.as_ref(), record, keep).await,
                    HistoryMessage::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
            tracing::debug!("Search history worker stopped");
        });

        tracing::info!(
            queue_capacity = config.queue_capacity,
            max_records_per_user = keep,
            "Search history recording initialized"
        );

        Self {
            sender: Some(sender),
            deferred: Arc::default(),
        }
    }

    /// A recorder that skips everything
    pub fn disabled() -> Self {
        Self {
            sender: None,
            deferred: Arc::default(),
        }
    }

    /// Enqueue one history record. Never blocks on the store.
    pub fn record(
        &self,
        user_id: Uuid,
        query_text: &str,
        filters: FiltersSnapshot,
        result_count: u64,
    ) -> RecordOutcome {
        let Some(sender) = &self.sender else {
            return RecordOutcome::Skipped;
        };

        let query = query_text.trim();
        if query.is_empty() {
            return RecordOutcome::Skipped;
        }

        let record = NewHistoryRecord {
            user_id,
            query: query.to_string(),
            filters,
            result_count: i64::try_from(result_count).unwrap_or(i64::MAX),
            created_at: Utc::now(),
        };

        match sender.try_send(HistoryMessage::Record(record)) {
            Ok(()) => RecordOutcome::Queued,
            Err(mpsc::error::TrySendError::Full(message)) => {
                let sender = sender.clone();
                let deferred = self.deferred.clone();
                deferred.pending.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(async move {
                    if sender.send(message).await.is_err() {
                        tracing::warn!("Search history queue closed; dropping record");
                        crate::metrics::HISTORY_FAILURES_TOTAL
                            .with_label_values(&["queue_closed"])
                            .inc();
                    }
                    deferred.finish_one();
                });
                RecordOutcome::Deferred
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!("Search history queue closed; dropping record");
                crate::metrics::HISTORY_FAILURES_TOTAL
                    .with_label_values(&["queue_closed"])
                    .inc();
                RecordOutcome::Dropped
            }
        }
    }

    /// Wait until every record handed over before this call, deferred ones
    /// included, has been processed
    pub async fn flush(&self) {
        let Some(sender) = &self.sender else {
            return;
        };
        // Deferred records must be in the queue ahead of the flush marker.
        self.deferred.wait_drained().await;
        let (done, wait) = oneshot::channel();
        if sender.send(HistoryMessage::Flush(done)).await.is_ok() {
            let _ = wait.await;
        }
    }
}

async fn persist(store: &dyn HistoryStore, record: NewHistoryRecord, keep: u32) {
    let user_id = record.user_id;
    match store.insert(record).await {
        Ok(stored) => {
            crate::metrics::HISTORY_WRITES_TOTAL.inc();
            tracing::debug!(history_id = %stored.id, user_id = %user_id, "Search history recorded");
        }
        Err(e) => {
            crate::metrics::HISTORY_FAILURES_TOTAL
                .with_label_values(&["store_error"])
                .inc();
            tracing::warn!(user_id = %user_id, error = %e, "Failed to persist search history");
            return;
        }
    }

    if keep == 0 {
        return;
    }

    match store.prune_user(user_id, keep).await {
        Ok(0) => {}
        Ok(pruned) => tracing::debug!(user_id = %user_id, pruned, "Pruned search history"),
        Err(e) => {
            tracing::warn!(user_id = %user_id, error = %e, "Failed to prune search history")
        }
    }
}

/// One page of a user's history
#[derive(Debug, Clone)]
pub struct HistoryPage {
    pub records: Vec<SearchHistoryRecord>,
    pub page: PageInfo,
}

/// Owner-scoped reads and bulk deletion
pub struct HistoryService {
    store: Arc<dyn HistoryStore>,
    config: HistoryConfig,
}

impl HistoryService {
    pub fn new(store: Arc<dyn HistoryStore>, config: HistoryConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// The user's records, newest first
    pub async fn list(&self, user_id: Uuid, pagination: Pagination) -> Result<HistoryPage> {
        let (records, total) = tokio::try_join!(
            self.store.list(user_id, pagination),
            self.store.count_for_user(user_id)
        )?;

        Ok(HistoryPage {
            records,
            page: PageInfo::new(total, pagination),
        })
    }

    /// Delete every record the user owns; returns the number removed
    pub async fn clear_all(&self, user_id: Uuid) -> Result<u64> {
        let deleted = self.store.delete_for_user(user_id).await?;
        tracing::info!(user_id = %user_id, deleted, "Search history cleared");
        Ok(deleted)
    }

    /// Most frequent query texts across all users in the last `window_days` days.
    ///
    /// `None` arguments take the configured defaults; both are clamped.
    pub async fn popular(
        &self,
        limit: Option<u32>,
        window_days: Option<u32>,
    ) -> Result<Vec<PopularQuery>> {
        let limit = limit
            .unwrap_or(self.config.popular_default_limit)
            .clamp(1, self.config.popular_max_limit.max(1));
        let days = window_days
            .unwrap_or(self.config.popular_window_days)
            .clamp(1, 365);
        let since = Utc::now() - Duration::days(i64::from(days));

        self.store.popular(since, limit).await
    }
}
