//! In-memory store for tests and database-less development runs.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use huddle_common::PrefixedId;
use parking_lot::Mutex;

use crate::db::store::{Joined, NewServerRequest, ServerTree, Store};
use crate::error::StoreError;
use crate::models::channel::{Channel, ChannelType};
use crate::models::member::{Member, MemberRole, MemberWithProfile};
use crate::models::profile::{Profile, ProfileSeed};
use crate::models::server::{Server, UpdateServer};

#[derive(Default)]
struct Tables {
    profiles: Vec<Profile>,
    servers: Vec<Server>,
    members: Vec<Member>,
    channels: Vec<Channel>,
}

/// Every operation runs under a single lock, which makes multi-row operations atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    calls: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store operations invoked so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of operations that changed at least one row.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn members_of(&self, server_id: &str) -> Vec<Member> {
        self.tables
            .lock()
            .members
            .iter()
            .filter(|m| m.server_id == server_id)
            .cloned()
            .collect()
    }

    pub fn channels_of(&self, server_id: &str) -> Vec<Channel> {
        self.tables
            .lock()
            .channels
            .iter()
            .filter(|c| c.server_id == server_id)
            .cloned()
            .collect()
    }

    pub fn profile(&self, user_id: &str) -> Option<Profile> {
        self.tables
            .lock()
            .profiles
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned()
    }

    pub fn server(&self, server_id: &str) -> Option<Server> {
        self.tables
            .lock()
            .servers
            .iter()
            .find(|s| s.id == server_id)
            .cloned()
    }

    /// Seed a channel row directly, bypassing any endpoint.
    pub fn insert_channel(&self, server_id: &str, profile_id: &str, name: &str, type_: i16) -> Channel {
        let now = Utc::now();
        let channel = Channel {
            id: Channel::generate_id(),
            name: name.to_string(),
            type_,
            profile_id: profile_id.to_string(),
            server_id: server_id.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().channels.push(channel.clone());
        channel
    }

    /// Seed a membership row directly, bypassing the invite workflow.
    pub fn insert_member(&self, server_id: &str, profile_id: &str, role: MemberRole) -> Member {
        let member = new_member(server_id, profile_id, role);
        self.tables.lock().members.push(member.clone());
        member
    }

    fn call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn wrote(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

fn new_member(server_id: &str, profile_id: &str, role: MemberRole) -> Member {
    let now = Utc::now();
    Member {
        id: Member::generate_id(),
        role: role.as_i16(),
        profile_id: profile_id.to_string(),
        server_id: server_id.to_string(),
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_profile_by_user_id(&self, user_id: &str) -> Result<Option<Profile>, StoreError> {
        self.call();
        let tables = self.tables.lock();
        Ok(tables.profiles.iter().find(|p| p.user_id == user_id).cloned())
    }

    async fn upsert_profile(&self, seed: &ProfileSeed) -> Result<Profile, StoreError> {
        self.call();
        let mut tables = self.tables.lock();
        if let Some(existing) = tables.profiles.iter().find(|p| p.user_id == seed.user_id) {
            return Ok(existing.clone());
        }

        let now = Utc::now();
        let profile = Profile {
            id: Profile::generate_id(),
            user_id: seed.user_id.clone(),
            name: seed.name.clone(),
            image_url: seed.image_url.clone(),
            email: seed.email.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.profiles.push(profile.clone());
        self.wrote();
        Ok(profile)
    }

    async fn find_server_with_member(
        &self,
        invite_code: &str,
        profile_id: &str,
    ) -> Result<Option<Server>, StoreError> {
        self.call();
        let tables = self.tables.lock();
        let server = tables.servers.iter().find(|s| {
            s.invite_code == invite_code
                && tables
                    .members
                    .iter()
                    .any(|m| m.server_id == s.id && m.profile_id == profile_id)
        });
        Ok(server.cloned())
    }

    async fn join_by_invite_code(
        &self,
        invite_code: &str,
        profile_id: &str,
    ) -> Result<Joined, StoreError> {
        self.call();
        let mut tables = self.tables.lock();
        let server = tables
            .servers
            .iter()
            .find(|s| s.invite_code == invite_code)
            .cloned()
            .ok_or(StoreError::NotFound)?;

        let exists = tables
            .members
            .iter()
            .any(|m| m.server_id == server.id && m.profile_id == profile_id);
        if !exists {
            tables
                .members
                .push(new_member(&server.id, profile_id, MemberRole::Guest));
            self.wrote();
        }

        Ok(Joined {
            server,
            created: !exists,
        })
    }

    async fn create_server(&self, request: &NewServerRequest) -> Result<Server, StoreError> {
        self.call();
        let mut tables = self.tables.lock();
        if tables
            .servers
            .iter()
            .any(|s| s.invite_code == request.invite_code)
        {
            return Err(StoreError::Conflict);
        }

        let now = Utc::now();
        let server = Server {
            id: Server::generate_id(),
            name: request.name.clone(),
            image_url: request.image_url.clone(),
            invite_code: request.invite_code.clone(),
            profile_id: request.owner_profile_id.clone(),
            created_at: now,
            updated_at: now,
        };

        tables.channels.push(Channel {
            id: Channel::generate_id(),
            name: "general".to_string(),
            type_: ChannelType::Text.as_i16(),
            profile_id: request.owner_profile_id.clone(),
            server_id: server.id.clone(),
            created_at: now,
            updated_at: now,
        });
        tables.members.push(new_member(
            &server.id,
            &request.owner_profile_id,
            MemberRole::Admin,
        ));
        tables.servers.push(server.clone());
        self.wrote();

        Ok(server)
    }

    async fn update_server(
        &self,
        server_id: &str,
        owner_profile_id: &str,
        changes: &UpdateServer,
    ) -> Result<Server, StoreError> {
        self.call();
        let mut tables = self.tables.lock();
        let server = tables
            .servers
            .iter_mut()
            .find(|s| s.id == server_id && s.profile_id == owner_profile_id)
            .ok_or(StoreError::NotFound)?;

        changes.apply(server);
        self.wrote();
        Ok(server.clone())
    }

    async fn set_invite_code(
        &self,
        server_id: &str,
        owner_profile_id: &str,
        invite_code: &str,
    ) -> Result<Server, StoreError> {
        self.call();
        let mut tables = self.tables.lock();
        let index = tables
            .servers
            .iter()
            .position(|s| s.id == server_id && s.profile_id == owner_profile_id)
            .ok_or(StoreError::NotFound)?;

        if tables
            .servers
            .iter()
            .any(|s| s.invite_code == invite_code && s.id != server_id)
        {
            return Err(StoreError::Conflict);
        }

        let server = &mut tables.servers[index];
        server.invite_code = invite_code.to_string();
        server.updated_at = Utc::now();
        self.wrote();
        Ok(server.clone())
    }

    async fn delete_server(
        &self,
        server_id: &str,
        owner_profile_id: &str,
    ) -> Result<Server, StoreError> {
        self.call();
        let mut tables = self.tables.lock();
        let index = tables
            .servers
            .iter()
            .position(|s| s.id == server_id && s.profile_id == owner_profile_id)
            .ok_or(StoreError::NotFound)?;

        tables.channels.retain(|c| c.server_id != server_id);
        tables.members.retain(|m| m.server_id != server_id);
        let server = tables.servers.remove(index);
        self.wrote();
        Ok(server)
    }

    async fn leave_server(&self, server_id: &str, profile_id: &str) -> Result<Server, StoreError> {
        self.call();
        let mut tables = self.tables.lock();
        let server = tables
            .servers
            .iter()
            .find(|s| s.id == server_id && s.profile_id != profile_id)
            .cloned()
            .ok_or(StoreError::NotFound)?;

        let before = tables.members.len();
        tables
            .members
            .retain(|m| !(m.server_id == server_id && m.profile_id == profile_id));
        if tables.members.len() == before {
            return Err(StoreError::NotFound);
        }

        self.wrote();
        Ok(server)
    }

    async fn load_server_tree(&self, server_id: &str) -> Result<Option<ServerTree>, StoreError> {
        self.call();
        let tables = self.tables.lock();
        let Some(server) = tables.servers.iter().find(|s| s.id == server_id).cloned() else {
            return Ok(None);
        };

        let mut channels: Vec<Channel> = tables
            .channels
            .iter()
            .filter(|c| c.server_id == server_id)
            .cloned()
            .collect();
        channels.sort_by_key(|c| c.created_at);

        let mut members: Vec<MemberWithProfile> = tables
            .members
            .iter()
            .filter(|m| m.server_id == server_id)
            .filter_map(|m| {
                let profile = tables.profiles.iter().find(|p| p.id == m.profile_id)?;
                Some(MemberWithProfile {
                    member: m.clone(),
                    profile: profile.clone(),
                })
            })
            .collect();
        members.sort_by_key(|m| (m.member.role, m.member.created_at));

        Ok(Some(ServerTree {
            server,
            channels,
            members,
        }))
    }
}
