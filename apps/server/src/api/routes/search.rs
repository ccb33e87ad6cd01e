//! Search API Routes
//!
//! Mounted under `/api/search`. Suggestions and popular searches are public,
//! the search itself resolves identity when it can, and history requires a
//! verified token.

use crate::api::handlers;
use crate::auth::{auth_middleware, optional_auth_middleware};
use crate::state::AppState;
use axum::{middleware::from_fn_with_state, routing::get, Router};

pub fn search_routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/suggestions", get(handlers::suggestions))
        .route("/popular", get(handlers::popular));

    let search = Router::new()
        .route("/", get(handlers::search))
        .route_layer(from_fn_with_state(state.clone(), optional_auth_middleware));

    let history = Router::new()
        .route(
            "/history",
            get(handlers::list_history).delete(handlers::clear_history),
        )
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    public.merge(search).merge(history)
}
