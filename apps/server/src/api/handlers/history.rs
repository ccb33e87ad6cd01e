//! Search history handlers
//!
//! - GET    /api/search/history  the caller's history, newest first
//! - DELETE /api/search/history  clear the caller's history
//! - GET    /api/search/popular  most searched queries (public, aggregated)

use crate::{
    auth::AuthenticatedActor,
    api::extractors::ApiQuery,
    db::search::{paging::parse_int, Pagination},
    models::{PopularQuery, SearchHistoryRecord},
    state::AppState,
    Result,
};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct RawHistoryParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub search_history: Vec<SearchHistoryRecord>,
    pub total_pages: u64,
    pub current_page: u32,
    pub total: u64,
}

/// GET /api/search/history
pub async fn list_history(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    ApiQuery(raw): ApiQuery<RawHistoryParams>,
) -> Result<Json<HistoryResponse>> {
    let config = state.history_service.config();
    let pagination = Pagination::from_raw(
        raw.page.as_deref(),
        raw.limit.as_deref(),
        config.default_page_size,
        config.max_page_size,
    )?;

    let history = state.history_service.list(actor.user_id, pagination).await?;

    Ok(Json(HistoryResponse {
        search_history: history.records,
        total_pages: history.page.total_pages,
        current_page: history.page.page,
        total: history.page.total,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearHistoryResponse {
    pub message: String,
    pub deleted_count: u64,
}

/// DELETE /api/search/history
pub async fn clear_history(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
) -> Result<Json<ClearHistoryResponse>> {
    let deleted_count = state.history_service.clear_all(actor.user_id).await?;

    Ok(Json(ClearHistoryResponse {
        message: "Search history cleared".to_string(),
        deleted_count,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct RawPopularParams {
    pub limit: Option<String>,
    pub days: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularResponse {
    pub popular_searches: Vec<PopularQuery>,
}

/// GET /api/search/popular
pub async fn popular(
    State(state): State<AppState>,
    ApiQuery(raw): ApiQuery<RawPopularParams>,
) -> Result<Json<PopularResponse>> {
    let limit = parse_int("limit", raw.limit.as_deref())?.map(clamp_u32);
    let days = parse_int("days", raw.days.as_deref())?.map(clamp_u32);

    let popular_searches = state.history_service.popular(limit, days).await?;
    Ok(Json(PopularResponse { popular_searches }))
}

fn clamp_u32(value: i64) -> u32 {
    u32::try_from(value.max(1)).unwrap_or(u32::MAX)
}
