/**
 * Authentication Middleware
 *
 * Guards the routes the route table marks as requiring a session. The
 * session token is read from the session cookie (or an `Authorization:
 * Bearer` header), verified, and the resulting `Principal` is attached to
 * the request extensions.
 *
 * A rejected request never reaches its handler, so no store call and no
 * broadcast happen for it.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use crate::backend::auth::sessions::Principal;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

/// Verify the session and attach the `Principal`.
///
/// Returns 401 `{ "error": "unauthorized access" }` if the credential is
/// missing, malformed, forged or expired.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let token = state.sessions.extract_credential(request.headers()).ok_or_else(|| {
        tracing::warn!("[Auth] No session credential on {} {}", request.method(), request.uri().path());
        BackendError::unauthorized()
    })?;

    let principal = state.sessions.verify(&token).map_err(|e| {
        tracing::warn!("[Auth] Invalid session token: {:?}", e.kind());
        BackendError::unauthorized()
    })?;

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

/// Axum extractor for the verified principal.
///
/// Only succeeds behind `require_session`; anywhere else it rejects with 401.
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Principal>().cloned().ok_or_else(|| {
            tracing::warn!("[Auth] Principal not found in request extensions");
            BackendError::unauthorized()
        })
    }
}
