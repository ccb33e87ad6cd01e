//! Per-request context injected by the request-id middleware.

use axum::http::Extensions;

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
}

impl RequestContext {
    /// Request id for log lines emitted outside the request span
    pub fn request_id(extensions: &Extensions) -> &str {
        extensions
            .get::<RequestContext>()
            .map(|c| c.request_id.as_str())
            .unwrap_or("-")
    }
}
