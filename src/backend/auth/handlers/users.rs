//! User record handlers: create-if-missing and role lookup

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};

use crate::backend::auth::sessions::Principal;
use crate::backend::error::{BackendError, ValidJson, ValidPath};
use crate::backend::server::state::AppState;
use crate::backend::store::bounded;
use crate::shared::user::{NewUser, RoleResponse, User};

/// POST /users
///
/// Returns the stored record: 201 when it was created, 200 when a user with
/// that email already existed (the posted profile is then ignored).
pub async fn create_user(
    State(state): State<AppState>,
    ValidJson(new_user): ValidJson<NewUser>,
) -> Result<(StatusCode, Json<User>), BackendError> {
    new_user.validate()?;

    let result = bounded(
        state.config.store_timeout(),
        state.users.insert_if_absent(new_user.into_user()),
    )
    .await?;

    let status = if result.was_created() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    let user = result.into_user();
    tracing::info!("[Auth] User {} ({})", user.email, status);
    Ok((status, Json(user)))
}

/// GET /users/role/{email}
///
/// A principal may only read its own role.
pub async fn user_role(
    State(state): State<AppState>,
    principal: Principal,
    ValidPath(email): ValidPath<String>,
) -> Result<Json<RoleResponse>, BackendError> {
    if principal.email != email {
        tracing::warn!("[Auth] {} asked for the role of {}", principal.email, email);
        return Err(BackendError::forbidden());
    }

    let user = bounded(state.config.store_timeout(), state.users.find_by_email(&email)).await?;
    Ok(Json(RoleResponse {
        role: user.and_then(|u| u.role),
    }))
}
