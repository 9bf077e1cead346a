//! Server sidebar assembly.

use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::store::{ServerTree, Store};
use crate::error::StoreError;
use crate::models::channel::{Channel, ChannelType};
use crate::models::member::{MemberRole, MemberWithProfile};
use crate::models::profile::Profile;
use crate::models::server::Server;
use crate::outcome::PageOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Channel,
    Member,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SearchItem {
    pub id: String,
    pub name: String,
    /// Icon name for the client's icon set. Guests have none.
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SearchGroup {
    pub label: String,
    #[serde(rename = "type")]
    pub kind: SearchKind,
    pub data: Vec<SearchItem>,
}

/// Everything the server sidebar renders.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SidebarView {
    pub server: Server,
    /// The viewer's role, if they are a member.
    pub role: Option<MemberRole>,
    pub is_admin: bool,
    pub is_moderator: bool,
    pub text_channels: Vec<Channel>,
    pub audio_channels: Vec<Channel>,
    pub video_channels: Vec<Channel>,
    /// Members other than the viewer.
    pub members: Vec<MemberWithProfile>,
    pub search: Vec<SearchGroup>,
}

impl IntoResponse for SidebarView {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

pub fn channel_icon(kind: ChannelType) -> &'static str {
    match kind {
        ChannelType::Text => "hash",
        ChannelType::Audio => "mic",
        ChannelType::Video => "video",
    }
}

pub fn role_icon(role: MemberRole) -> Option<&'static str> {
    match role {
        MemberRole::Guest => None,
        MemberRole::Moderator => Some("shield-check"),
        MemberRole::Admin => Some("shield-alert"),
    }
}

/// Load and assemble the sidebar for `server_id` as seen by `profile`.
///
/// Without a profile, or for an unknown server, the viewer is sent to `/`.
pub async fn load_sidebar(
    store: &dyn Store,
    profile: Option<&Profile>,
    server_id: &str,
) -> Result<PageOutcome<SidebarView>, StoreError> {
    let Some(profile) = profile else {
        return Ok(PageOutcome::redirect("/"));
    };

    let Some(tree) = store.load_server_tree(server_id).await? else {
        tracing::debug!(%server_id, "sidebar for unknown server");
        return Ok(PageOutcome::redirect("/"));
    };

    Ok(PageOutcome::Rendered(assemble(tree, profile)))
}

/// Partition channels by type and split the viewer out of the member list.
///
/// Channels with an unrecognized type land in no bucket.
pub fn assemble(tree: ServerTree, viewer: &Profile) -> SidebarView {
    let ServerTree {
        server,
        channels,
        members,
    } = tree;

    let mut text_channels = Vec::new();
    let mut audio_channels = Vec::new();
    let mut video_channels = Vec::new();
    for channel in channels {
        match channel.kind() {
            Some(ChannelType::Text) => text_channels.push(channel),
            Some(ChannelType::Audio) => audio_channels.push(channel),
            Some(ChannelType::Video) => video_channels.push(channel),
            None => {
                tracing::debug!(
                    channel_id = %channel.id,
                    type_ = channel.type_,
                    "unrecognized channel type"
                );
            }
        }
    }

    let role = members
        .iter()
        .find(|m| m.member.profile_id == viewer.id)
        .map(|m| m.member.role());
    let members: Vec<MemberWithProfile> = members
        .into_iter()
        .filter(|m| m.member.profile_id != viewer.id)
        .collect();

    let search = vec![
        channel_group("Text Channels", &text_channels),
        channel_group("Voice Channels", &audio_channels),
        channel_group("Video Channels", &video_channels),
        SearchGroup {
            label: "Members".to_string(),
            kind: SearchKind::Member,
            data: members
                .iter()
                .map(|m| SearchItem {
                    id: m.member.id.clone(),
                    name: m.profile.name.clone(),
                    icon: role_icon(m.member.role()).map(str::to_string),
                })
                .collect(),
        },
    ];

    SidebarView {
        server,
        role,
        is_admin: role.is_some_and(MemberRole::is_admin),
        is_moderator: role.is_some_and(MemberRole::is_moderator),
        text_channels,
        audio_channels,
        video_channels,
        members,
        search,
    }
}

fn channel_group(label: &str, channels: &[Channel]) -> SearchGroup {
    SearchGroup {
        label: label.to_string(),
        kind: SearchKind::Channel,
        data: channels
            .iter()
            .map(|c| SearchItem {
                id: c.id.clone(),
                name: c.name.clone(),
                icon: c.kind().map(|kind| channel_icon(kind).to_string()),
            })
            .collect(),
    }
}
