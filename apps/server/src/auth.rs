//! Caller identity.
//!
//! Tokens are issued by the platform's account service; this server only
//! verifies them. A bearer token is an HS256 JWT whose `sub` (or legacy
//! `id`) claim is the user's UUID. Requests without a token are anonymous.
//! A token that fails verification is rejected by [`auth_middleware`] and
//! downgraded to anonymous by [`optional_auth_middleware`].

use axum::{
    extract::{FromRequestParts, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::{config::AuthConfig, request_context::RequestContext, state::AppState};

/// The signed-in caller, attached to the request by [`auth_middleware`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
}

#[derive(Debug, Clone)]
pub enum AuthError {
    MissingToken,
    InvalidToken(String),
    Misconfigured(String),
}

impl AuthError {
    fn status(&self) -> StatusCode {
        match self {
            Self::MissingToken | Self::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            Self::Misconfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::MissingToken => "Authentication required".to_string(),
            Self::InvalidToken(msg) => format!("Invalid bearer token: {msg}"),
            Self::Misconfigured(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let Self::Misconfigured(detail) = &self {
            tracing::error!(detail = %detail, "Authentication misconfigured");
        }

        let status = self.status();
        let mut response = (status, axum::Json(json!({ "message": self.message() }))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                header::HeaderValue::from_static("Bearer"),
            );
        }
        response
    }
}

#[derive(Clone)]
pub struct AuthManager {
    enabled: bool,
    key: Option<Arc<DecodingKey>>,
    validation: Validation,
}

impl AuthManager {
    pub fn new(config: &AuthConfig) -> Self {
        let key = config
            .jwt_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|secret| Arc::new(DecodingKey::from_secret(secret.as_bytes())));

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;
        validation.leeway = config.leeway_seconds;
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            enabled: config.enabled,
            key,
            validation,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Resolve the caller from request headers.
    ///
    /// `Ok(None)` means anonymous (no `Authorization` header, or auth disabled).
    pub fn authenticate_headers(&self, headers: &HeaderMap) -> Result<Option<Actor>, AuthError> {
        if !self.enabled {
            return Ok(None);
        }

        let Some(authz) = headers.get(header::AUTHORIZATION) else {
            return Ok(None);
        };

        let authz = authz.to_str().map_err(|_| {
            AuthError::InvalidToken("Authorization header is not valid UTF-8".to_string())
        })?;

        let token = authz
            .strip_prefix("Bearer ")
            .or_else(|| authz.strip_prefix("bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AuthError::InvalidToken("Authorization header must be 'Bearer <token>'".to_string())
            })?;

        let key = self
            .key
            .as_ref()
            .ok_or_else(|| AuthError::Misconfigured("auth.jwt_secret is not set".to_string()))?;

        let token_data = decode::<serde_json::Value>(token, key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        actor_from_claims(&token_data.claims).map(Some)
    }
}

fn actor_from_claims(claims: &serde_json::Value) -> Result<Actor, AuthError> {
    let subject = claims
        .get("sub")
        .and_then(|v| v.as_str())
        .or_else(|| claims.get("id").and_then(|v| v.as_str()))
        .ok_or_else(|| AuthError::InvalidToken("token carries no subject".to_string()))?;

    let user_id = Uuid::parse_str(subject)
        .map_err(|_| AuthError::InvalidToken("token subject is not a user id".to_string()))?;

    Ok(Actor { user_id })
}

/// Extractor for the actor attached by middleware.
///
/// Use `Option<AuthenticatedActor>` in handlers for optional auth.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedActor(pub Actor);

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedActor
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Actor>()
            .copied()
            .map(AuthenticatedActor)
            .ok_or(AuthError::MissingToken)
    }
}

/// Middleware attaching the [`Actor`] to the request, or rejecting a bad token.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    if !state.auth.enabled() || req.method() == axum::http::Method::OPTIONS {
        return next.run(req).await;
    }

    match state.auth.authenticate_headers(req.headers()) {
        Ok(actor) => {
            attach(&mut req, actor);
            next.run(req).await
        }
        Err(err) => {
            tracing::debug!(
                request_id = RequestContext::request_id(req.extensions()),
                error = %err.message(),
                "Rejected bearer token"
            );
            err.into_response()
        }
    }
}

/// Like [`auth_middleware`], but a token that fails verification leaves the
/// caller anonymous instead of answering 401.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    if !state.auth.enabled() {
        return next.run(req).await;
    }

    match state.auth.authenticate_headers(req.headers()) {
        Ok(actor) => attach(&mut req, actor),
        Err(AuthError::Misconfigured(detail)) => {
            tracing::error!(detail = %detail, "Authentication misconfigured");
        }
        Err(err) => {
            tracing::debug!(
                request_id = RequestContext::request_id(req.extensions()),
                error = %err.message(),
                "Ignoring unverifiable bearer token"
            );
        }
    }
    next.run(req).await
}

fn attach(req: &mut axum::extract::Request, actor: Option<Actor>) {
    if let Some(actor) = actor {
        tracing::Span::current().record("user_id", tracing::field::display(actor.user_id));
        req.extensions_mut().insert::<Actor>(actor);
    }
}
