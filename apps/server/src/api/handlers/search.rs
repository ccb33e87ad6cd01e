//! Search and autocomplete handlers
//!
//! - GET /api/search              faceted search (optional auth)
//! - GET /api/search/suggestions  grouped autocomplete (public)

use crate::{
    api::extractors::ApiQuery,
    auth::AuthenticatedActor,
    db::search::{paging::parse_int, params::validation_message, RawSearchParams, SearchQuery},
    models::{ContentSummary, SuggestionSet},
    state::AppState,
    Error, Result,
};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub blogs: Vec<ContentSummary>,
    pub total_pages: u64,
    pub current_page: u32,
    pub total: u64,
}

/// GET /api/search
#[tracing::instrument(skip_all, fields(sort = tracing::field::Empty))]
pub async fn search(
    State(state): State<AppState>,
    actor: Option<AuthenticatedActor>,
    ApiQuery(raw): ApiQuery<RawSearchParams>,
) -> Result<Json<SearchResponse>> {
    let query = SearchQuery::from_raw(&raw, &state.config.search)?;
    tracing::Span::current().record("sort", query.sort.as_str());

    let actor_id = actor.map(|AuthenticatedActor(a)| a.user_id);
    let result = state.search_service.search(&query, actor_id).await?;

    Ok(Json(SearchResponse {
        blogs: result.items,
        total_pages: result.page.total_pages,
        current_page: result.page.page,
        total: result.page.total,
    }))
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct RawSuggestionParams {
    #[validate(length(max = 100, message = "Suggestion query must be at most 100 characters"))]
    pub q: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: SuggestionSet,
}

/// GET /api/search/suggestions
pub async fn suggestions(
    State(state): State<AppState>,
    ApiQuery(raw): ApiQuery<RawSuggestionParams>,
) -> Result<Json<SuggestionsResponse>> {
    raw.validate()
        .map_err(|e| Error::Validation(validation_message(&e)))?;

    let limit = parse_int("limit", raw.limit.as_deref())?
        .map(|l| u32::try_from(l.max(1)).unwrap_or(u32::MAX));

    let suggestions = state
        .suggestion_service
        .suggest(raw.q.as_deref().unwrap_or_default(), limit)
        .await?;

    Ok(Json(SuggestionsResponse { suggestions }))
}
