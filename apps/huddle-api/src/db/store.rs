use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::channel::Channel;
use crate::models::member::MemberWithProfile;
use crate::models::profile::{Profile, ProfileSeed};
use crate::models::server::{Server, UpdateServer};

/// Result of joining a server through its invite code.
#[derive(Debug, Clone)]
pub struct Joined {
    pub server: Server,
    /// False when a membership for the profile already existed.
    pub created: bool,
}

/// A server with everything the sidebar needs.
#[derive(Debug, Clone)]
pub struct ServerTree {
    pub server: Server,
    /// Oldest first.
    pub channels: Vec<Channel>,
    /// Admins first, then moderators, then guests.
    pub members: Vec<MemberWithProfile>,
}

/// Input for creating a server.
#[derive(Debug, Clone)]
pub struct NewServerRequest {
    pub owner_profile_id: String,
    pub name: String,
    pub image_url: String,
    pub invite_code: String,
}

/// Persistence for profiles, servers, members and channels.
///
/// Backed by PostgreSQL in production and an in-memory map in tests. Every operation that
/// touches more than one row is atomic.
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_profile_by_user_id(&self, user_id: &str) -> Result<Option<Profile>, StoreError>;

    /// Insert a profile for `seed.user_id` unless one exists, and return the stored row.
    async fn upsert_profile(&self, seed: &ProfileSeed) -> Result<Profile, StoreError>;

    /// The server with this invite code, only if `profile_id` is already a member of it.
    async fn find_server_with_member(
        &self,
        invite_code: &str,
        profile_id: &str,
    ) -> Result<Option<Server>, StoreError>;

    /// Add `profile_id` as a guest of the server with this invite code.
    ///
    /// Inserting is conditional on no membership existing, so concurrent joins by the same
    /// profile produce one member. `NotFound` when no server has the code.
    async fn join_by_invite_code(
        &self,
        invite_code: &str,
        profile_id: &str,
    ) -> Result<Joined, StoreError>;

    /// Create a server with an admin membership for its owner and a `general` text channel.
    ///
    /// `Conflict` when another server already has the invite code.
    async fn create_server(&self, request: &NewServerRequest) -> Result<Server, StoreError>;

    /// Apply `changes` to a server owned by `owner_profile_id`.
    async fn update_server(
        &self,
        server_id: &str,
        owner_profile_id: &str,
        changes: &UpdateServer,
    ) -> Result<Server, StoreError>;

    /// Replace the invite code of a server owned by `owner_profile_id`.
    ///
    /// `Conflict` when another server already has the code.
    async fn set_invite_code(
        &self,
        server_id: &str,
        owner_profile_id: &str,
        invite_code: &str,
    ) -> Result<Server, StoreError>;

    /// Delete a server's channels and then the server itself, scoped to its owner.
    ///
    /// Both deletes commit together; on `NotFound` nothing changes.
    async fn delete_server(
        &self,
        server_id: &str,
        owner_profile_id: &str,
    ) -> Result<Server, StoreError>;

    /// Remove a non-owner's membership. `NotFound` for owners and non-members.
    async fn leave_server(&self, server_id: &str, profile_id: &str) -> Result<Server, StoreError>;

    async fn load_server_tree(&self, server_id: &str) -> Result<Option<ServerTree>, StoreError>;
}
