/**
 * Session Token Handlers
 *
 * `POST /jwt` signs the posted claims and installs the session cookie;
 * `POST /logout` clears it. Neither requires an existing session.
 *
 * # Example Request
 *
 * ```http
 * POST /jwt HTTP/1.1
 * Content-Type: application/json
 *
 * {"email":"a@x.com","name":"Ada"}
 * ```
 *
 * # Example Response
 *
 * ```http
 * HTTP/1.1 200 OK
 * Set-Cookie: token=eyJ...; HttpOnly; Path=/; Max-Age=86400; SameSite=Strict
 *
 * {"success":true}
 * ```
 */

use axum::{extract::State, http::header::SET_COOKIE, response::Json};
use serde_json::{Map, Value};

use crate::backend::auth::handlers::types::SuccessResponse;
use crate::backend::auth::sessions::SessionManager;
use crate::backend::error::{BackendError, ValidJson};

/// POST /jwt
pub async fn issue_token(
    State(sessions): State<SessionManager>,
    ValidJson(claims): ValidJson<Map<String, Value>>,
) -> Result<([(axum::http::HeaderName, String); 1], Json<SuccessResponse>), BackendError> {
    let email = match claims.get("email") {
        Some(Value::String(email)) if !email.trim().is_empty() => email.clone(),
        _ => return Err(BackendError::validation("email", "email claim is required")),
    };

    let token = sessions.issue(&email, claims)?;
    tracing::info!("[Auth] Session issued for {}", email);

    Ok(([(SET_COOKIE, sessions.session_cookie(&token))], Json(SuccessResponse::ok())))
}

/// POST /logout
pub async fn logout(
    State(sessions): State<SessionManager>,
) -> ([(axum::http::HeaderName, String); 1], Json<SuccessResponse>) {
    ([(SET_COOKIE, sessions.clear_cookie())], Json(SuccessResponse::ok()))
}
