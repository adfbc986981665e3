// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User registration and role routes.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use parcelhub_core::{Role, User};
use serde::{Deserialize, Serialize};

use crate::auth::{Authenticated, Verified};
use crate::error::ApiResult;
use crate::server::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SaveUserRequest {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SaveUserResponse {
    pub created: bool,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: Role,
}

/// POST /auth/save-user
///
/// The body is optional; the email always comes from the verified token.
pub async fn save_user(
    State(state): State<AppState>,
    Verified(identity): Verified,
    body: Result<Json<SaveUserRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SaveUserResponse>)> {
    let body = match body {
        Ok(Json(body)) => body,
        Err(JsonRejection::MissingJsonContentType(_)) => SaveUserRequest::default(),
        Err(rejection) => return Err(rejection.into()),
    };
    let saved = state.services.users.save_user(&identity, body.name).await?;
    let status = if saved.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(SaveUserResponse {
            created: saved.created,
            user: saved.user,
        }),
    ))
}

/// GET /users/{email}/role
pub async fn role_of(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(email): Path<String>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state.services.users.role_of(&caller, &email).await?;
    Ok(Json(RoleResponse { role }))
}

/// PATCH /users/{id}/role
pub async fn set_role(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<String>,
    body: Result<Json<SetRoleRequest>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let Json(body) = body?;
    Ok(Json(
        state
            .services
            .users
            .set_role(&caller, &id, body.role)
            .await?,
    ))
}
