//! Server endpoints.

use std::future::Future;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{patch, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::middleware::CurrentProfile;
use crate::db::store::NewServerRequest;
use crate::error::{ApiError, StoreError};
use crate::models::server::{Server, UpdateServer};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/servers", post(create_server))
        .route(
            "/servers/{server_id}",
            patch(update_server).delete(delete_server),
        )
        .route("/servers/{server_id}/invite-code", patch(regenerate_invite_code))
        .route("/servers/{server_id}/leave", patch(leave_server))
}

const MAX_NAME_LEN: usize = 100;

const INVITE_CODE_ATTEMPTS: usize = 3;

fn require_server_id(server_id: &str) -> Result<&str, ApiError> {
    let server_id = server_id.trim();
    if server_id.is_empty() {
        return Err(ApiError::bad_request("Server ID Missing"));
    }
    Ok(server_id)
}

fn validate_name(name: &str) -> Result<String, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("Server name is required"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ApiError::bad_request(
            "Server name must be 100 characters or fewer",
        ));
    }
    Ok(name.to_string())
}

/// Run `write` with freshly generated invite codes until one is not already taken.
async fn with_fresh_invite_code<T, F, Fut>(mut write: F) -> Result<T, StoreError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let mut attempt = 1;
    loop {
        match write(huddle_common::generate_invite_code()).await {
            Err(StoreError::Conflict) if attempt < INVITE_CODE_ATTEMPTS => {
                tracing::warn!(attempt, "invite code collision, retrying");
                attempt += 1;
            }
            result => return result,
        }
    }
}

// ---------------------------------------------------------------------------
// POST /api/servers
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateServerRequest {
    pub name: String,
    #[serde(default, alias = "imageUrl")]
    pub image_url: String,
}

#[utoipa::path(
    post,
    path = "/api/servers",
    tag = "Servers",
    security(("bearer" = [])),
    request_body = CreateServerRequest,
    responses(
        (status = 201, description = "Server created", body = Server),
        (status = 400, description = "Invalid name", body = String),
        (status = 401, description = "Unauthorized", body = String),
        (status = 409, description = "No free invite code found", body = String),
        (status = 500, description = "Internal error", body = String),
    ),
)]
pub async fn create_server(
    CurrentProfile(profile): CurrentProfile,
    State(state): State<AppState>,
    Json(body): Json<CreateServerRequest>,
) -> Result<(StatusCode, Json<Server>), ApiError> {
    let name = validate_name(&body.name)?;

    let server = with_fresh_invite_code(|invite_code| {
        let store = &state.store;
        let request = NewServerRequest {
            owner_profile_id: profile.id.clone(),
            name: name.clone(),
            image_url: body.image_url.clone(),
            invite_code,
        };
        async move { store.create_server(&request).await }
    })
    .await
    .map_err(|err| ApiError::from_store("SERVERS_POST", err))?;

    tracing::info!(server_id = %server.id, profile_id = %profile.id, "server created");

    Ok((StatusCode::CREATED, Json(server)))
}

// ---------------------------------------------------------------------------
// PATCH /api/servers/:server_id
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateServerRequest {
    pub name: Option<String>,
    #[serde(alias = "imageUrl")]
    pub image_url: Option<String>,
}

#[utoipa::path(
    patch,
    path = "/api/servers/{server_id}",
    tag = "Servers",
    security(("bearer" = [])),
    params(("server_id" = String, Path, description = "Server ID")),
    request_body = UpdateServerRequest,
    responses(
        (status = 200, description = "Server updated", body = Server),
        (status = 400, description = "Server ID Missing", body = String),
        (status = 401, description = "Unauthorized", body = String),
        (status = 404, description = "Not the owner, or no such server", body = String),
        (status = 500, description = "Internal error", body = String),
    ),
)]
pub async fn update_server(
    CurrentProfile(profile): CurrentProfile,
    State(state): State<AppState>,
    Path(server_id): Path<String>,
    Json(body): Json<UpdateServerRequest>,
) -> Result<Json<Server>, ApiError> {
    let server_id = require_server_id(&server_id)?;
    let name = body.name.as_deref().map(validate_name).transpose()?;

    let changes = UpdateServer {
        name,
        image_url: body.image_url,
        updated_at: Utc::now(),
    };

    let server = state
        .store
        .update_server(server_id, &profile.id, &changes)
        .await
        .map_err(|err| ApiError::from_store("SERVERS_ID_PATCH", err))?;

    Ok(Json(server))
}

// ---------------------------------------------------------------------------
// DELETE /api/servers/:server_id
// ---------------------------------------------------------------------------

#[utoipa::path(
    delete,
    path = "/api/servers/{server_id}",
    tag = "Servers",
    security(("bearer" = [])),
    params(("server_id" = String, Path, description = "Server ID")),
    responses(
        (status = 200, description = "Server and its channels deleted", body = Server),
        (status = 400, description = "Server ID Missing", body = String),
        (status = 401, description = "Unauthorized", body = String),
        (status = 404, description = "Not the owner, or no such server", body = String),
        (status = 500, description = "Internal error", body = String),
    ),
)]
pub async fn delete_server(
    CurrentProfile(profile): CurrentProfile,
    State(state): State<AppState>,
    Path(server_id): Path<String>,
) -> Result<Json<Server>, ApiError> {
    let server_id = require_server_id(&server_id)?;

    let server = state
        .store
        .delete_server(server_id, &profile.id)
        .await
        .map_err(|err| ApiError::from_store("SERVER_ID_DELETE", err))?;

    tracing::info!(server_id = %server.id, profile_id = %profile.id, "server deleted");

    Ok(Json(server))
}

// ---------------------------------------------------------------------------
// PATCH /api/servers/:server_id/invite-code
// ---------------------------------------------------------------------------

#[utoipa::path(
    patch,
    path = "/api/servers/{server_id}/invite-code",
    tag = "Servers",
    security(("bearer" = [])),
    params(("server_id" = String, Path, description = "Server ID")),
    responses(
        (status = 200, description = "Invite code replaced", body = Server),
        (status = 400, description = "Server ID Missing", body = String),
        (status = 401, description = "Unauthorized", body = String),
        (status = 404, description = "Not the owner, or no such server", body = String),
        (status = 409, description = "No free invite code found", body = String),
        (status = 500, description = "Internal error", body = String),
    ),
)]
pub async fn regenerate_invite_code(
    CurrentProfile(profile): CurrentProfile,
    State(state): State<AppState>,
    Path(server_id): Path<String>,
) -> Result<Json<Server>, ApiError> {
    let server_id = require_server_id(&server_id)?;

    let server = with_fresh_invite_code(|invite_code| {
        let store = &state.store;
        let profile_id = &profile.id;
        async move {
            store
                .set_invite_code(server_id, profile_id, &invite_code)
                .await
        }
    })
    .await
    .map_err(|err| ApiError::from_store("SERVER_ID_INVITE_CODE", err))?;

    Ok(Json(server))
}

// ---------------------------------------------------------------------------
// PATCH /api/servers/:server_id/leave
// ---------------------------------------------------------------------------

#[utoipa::path(
    patch,
    path = "/api/servers/{server_id}/leave",
    tag = "Servers",
    security(("bearer" = [])),
    params(("server_id" = String, Path, description = "Server ID")),
    responses(
        (status = 200, description = "Membership removed", body = Server),
        (status = 400, description = "Server ID Missing", body = String),
        (status = 401, description = "Unauthorized", body = String),
        (status = 404, description = "Owner, non-member, or no such server", body = String),
        (status = 500, description = "Internal error", body = String),
    ),
)]
pub async fn leave_server(
    CurrentProfile(profile): CurrentProfile,
    State(state): State<AppState>,
    Path(server_id): Path<String>,
) -> Result<Json<Server>, ApiError> {
    let server_id = require_server_id(&server_id)?;

    let server = state
        .store
        .leave_server(server_id, &profile.id)
        .await
        .map_err(|err| ApiError::from_store("SERVER_ID_LEAVE", err))?;

    tracing::info!(server_id = %server.id, profile_id = %profile.id, "left server");

    Ok(Json(server))
}
