pub mod health;
pub mod invite;
pub mod profile;
pub mod servers;
pub mod sidebar;

use axum::Router;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(invite::router())
        .nest(
            "/api",
            profile::router()
                .merge(servers::router())
                .merge(sidebar::router()),
        )
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        invite::invite_page,
        profile::initial_profile,
        profile::get_profile,
        servers::create_server,
        servers::update_server,
        servers::delete_server,
        servers::regenerate_invite_code,
        servers::leave_server,
        sidebar::get_sidebar,
    ),
    components(
        schemas(
            crate::models::profile::Profile,
            crate::models::server::Server,
            crate::models::member::Member,
            crate::models::member::MemberRole,
            crate::models::member::MemberWithProfile,
            crate::models::channel::Channel,
            crate::models::channel::ChannelType,
            crate::sidebar::SidebarView,
            crate::sidebar::SearchGroup,
            crate::sidebar::SearchItem,
            crate::sidebar::SearchKind,
            health::HealthResponse,
            servers::CreateServerRequest,
            servers::UpdateServerRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Profile", description = "Signed-in identity"),
        (name = "Servers", description = "Server management and sidebar"),
        (name = "Invites", description = "Joining servers by invite link"),
    ),
)]
pub struct ApiDoc;
