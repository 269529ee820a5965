/**
 * Error Conversion
 *
 * `IntoResponse` for `BackendError`, plus wrappers around the axum
 * extractors the handlers use (`ValidJson`, `ValidPath`, `ValidQuery`,
 * `ValidUpgrade`). Each turns its extractor's plain-text rejection into a
 * `BackendError`, so every failed request gets the same JSON shape:
 *
 * ```json
 * { "error": "Error message", "status": 400 }
 * ```
 */

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        ws::{rejection::WebSocketUpgradeRejection, WebSocketUpgrade},
        FromRequest, FromRequestParts, Path, Query, Request,
    },
    http::request::Parts,
    response::{IntoResponse, Response},
    Json,
};
use crate::backend::error::types::BackendError;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!("[Error] {} -> {}", self, status);
        } else {
            tracing::warn!("[Error] {} -> {}", self, status);
        }

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}

/// `Json<T>` whose rejection is a `BackendError::Validation`
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(BackendError::validation("body", rejection.body_text())),
        }
    }
}

/// `Path<T>` whose rejection is a `BackendError::Validation`
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidPath<T>
where
    Path<T>: FromRequestParts<S, Rejection = PathRejection>,
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(rejection) => Err(BackendError::validation("path", rejection.body_text())),
        }
    }
}

/// `Query<T>` whose rejection is a `BackendError::Validation`
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(BackendError::validation("query", rejection.body_text())),
        }
    }
}

/// `WebSocketUpgrade` whose rejection is a `BackendError::Upgrade`
pub struct ValidUpgrade(pub WebSocketUpgrade);

impl<S> FromRequestParts<S> for ValidUpgrade
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        WebSocketUpgrade::from_request_parts(parts, state)
            .await
            .map(Self)
            .map_err(|rejection: WebSocketUpgradeRejection| BackendError::Upgrade {
                status: rejection.status(),
                message: rejection.body_text(),
            })
    }
}
