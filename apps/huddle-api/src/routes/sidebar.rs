use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;

use crate::auth::middleware::MaybeProfile;
use crate::error::ApiError;
use crate::sidebar;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/servers/{server_id}/sidebar", get(get_sidebar))
}

#[utoipa::path(
    get,
    path = "/api/servers/{server_id}/sidebar",
    tag = "Servers",
    security(("bearer" = [])),
    params(("server_id" = String, Path, description = "Server ID")),
    responses(
        (status = 200, description = "Sidebar view", body = sidebar::SidebarView),
        (status = 307, description = "Signed out or unknown server; redirect to `/`"),
        (status = 500, description = "Internal error", body = String),
    ),
)]
pub async fn get_sidebar(
    MaybeProfile(profile): MaybeProfile,
    State(state): State<AppState>,
    Path(server_id): Path<String>,
) -> Result<Response, ApiError> {
    let outcome = sidebar::load_sidebar(state.store.as_ref(), profile.as_ref(), &server_id)
        .await
        .map_err(|err| ApiError::from_store("SERVER_SIDEBAR", err))?;

    Ok(outcome.respond(&state.config.sign_in_url))
}
