//! PostgreSQL store built on diesel-async.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, OptionalExtension};
use diesel_async::pooled_connection::deadpool::Pool;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::{AsyncConnection, AsyncPgConnection};
use huddle_common::PrefixedId;
use scoped_futures::ScopedFutureExt;

use crate::db::schema::{channels, members, profiles, servers};
use crate::db::store::{Joined, NewServerRequest, ServerTree, Store};
use crate::error::StoreError;
use crate::models::channel::{Channel, ChannelType, NewChannel};
use crate::models::member::{Member, MemberRole, MemberWithProfile, NewMember};
use crate::models::profile::{NewProfile, Profile, ProfileSeed};
use crate::models::server::{NewServer, Server, UpdateServer};

pub type DbPool = Pool<AsyncPgConnection>;

const MAX_CONNECTIONS: usize = 20;

pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Build a connection pool for `database_url`.
    pub fn connect(database_url: &str) -> Self {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
        let pool = Pool::builder(manager)
            .max_size(MAX_CONNECTIONS)
            .build()
            .expect("failed to build connection pool");

        tracing::info!(max_size = MAX_CONNECTIONS, "database pool created");

        Self::new(pool)
    }
}

/// The only unique constraint these writes can trip is `servers.invite_code`.
fn conflict_on_unique(err: diesel::result::Error) -> StoreError {
    match err {
        diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            StoreError::Conflict
        }
        err => StoreError::Database(err),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_profile_by_user_id(&self, user_id: &str) -> Result<Option<Profile>, StoreError> {
        let mut conn = self.pool.get().await?;

        let profile = diesel_async::RunQueryDsl::get_result(
            profiles::table
                .filter(profiles::user_id.eq(user_id))
                .select(Profile::as_select()),
            &mut conn,
        )
        .await
        .optional()?;

        Ok(profile)
    }

    async fn upsert_profile(&self, seed: &ProfileSeed) -> Result<Profile, StoreError> {
        let mut conn = self.pool.get().await?;
        let now = Utc::now();
        let id = Profile::generate_id();

        diesel_async::RunQueryDsl::execute(
            diesel::insert_into(profiles::table)
                .values(NewProfile {
                    id: &id,
                    user_id: &seed.user_id,
                    name: &seed.name,
                    image_url: &seed.image_url,
                    email: &seed.email,
                    created_at: now,
                    updated_at: now,
                })
                .on_conflict(profiles::user_id)
                .do_nothing(),
            &mut conn,
        )
        .await?;

        let profile = diesel_async::RunQueryDsl::get_result(
            profiles::table
                .filter(profiles::user_id.eq(&seed.user_id))
                .select(Profile::as_select()),
            &mut conn,
        )
        .await?;

        Ok(profile)
    }

    async fn find_server_with_member(
        &self,
        invite_code: &str,
        profile_id: &str,
    ) -> Result<Option<Server>, StoreError> {
        let mut conn = self.pool.get().await?;

        let server = diesel_async::RunQueryDsl::get_result(
            servers::table
                .inner_join(members::table)
                .filter(servers::invite_code.eq(invite_code))
                .filter(members::profile_id.eq(profile_id))
                .select(Server::as_select()),
            &mut conn,
        )
        .await
        .optional()?;

        Ok(server)
    }

    async fn join_by_invite_code(
        &self,
        invite_code: &str,
        profile_id: &str,
    ) -> Result<Joined, StoreError> {
        let invite_code = invite_code.to_string();
        let profile_id = profile_id.to_string();
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, StoreError, _>(|conn| {
            async move {
                let server: Server = diesel_async::RunQueryDsl::get_result(
                    servers::table
                        .filter(servers::invite_code.eq(&invite_code))
                        .select(Server::as_select()),
                    conn,
                )
                .await
                .optional()?
                .ok_or(StoreError::NotFound)?;

                let now = Utc::now();
                let member_id = Member::generate_id();

                // Unique (profile_id, server_id) turns a concurrent duplicate into a no-op.
                let inserted = diesel_async::RunQueryDsl::execute(
                    diesel::insert_into(members::table)
                        .values(NewMember {
                            id: &member_id,
                            role: MemberRole::Guest.as_i16(),
                            profile_id: &profile_id,
                            server_id: &server.id,
                            created_at: now,
                            updated_at: now,
                        })
                        .on_conflict((members::profile_id, members::server_id))
                        .do_nothing(),
                    conn,
                )
                .await?;

                Ok(Joined {
                    server,
                    created: inserted == 1,
                })
            }
            .scope_boxed()
        })
        .await
    }

    async fn create_server(&self, request: &NewServerRequest) -> Result<Server, StoreError> {
        let request = request.clone();
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, StoreError, _>(|conn| {
            async move {
                let now = Utc::now();
                let server_id = Server::generate_id();
                let member_id = Member::generate_id();
                let channel_id = Channel::generate_id();

                // 1. Insert server.
                let server: Server = diesel_async::RunQueryDsl::get_result(
                    diesel::insert_into(servers::table)
                        .values(NewServer {
                            id: &server_id,
                            name: &request.name,
                            image_url: &request.image_url,
                            invite_code: &request.invite_code,
                            profile_id: &request.owner_profile_id,
                            created_at: now,
                            updated_at: now,
                        })
                        .returning(Server::as_returning()),
                    conn,
                )
                .await
                .map_err(conflict_on_unique)?;

                // 2. Insert #general channel.
                diesel_async::RunQueryDsl::execute(
                    diesel::insert_into(channels::table).values(NewChannel {
                        id: &channel_id,
                        name: "general",
                        type_: ChannelType::Text.as_i16(),
                        profile_id: &request.owner_profile_id,
                        server_id: &server_id,
                        created_at: now,
                        updated_at: now,
                    }),
                    conn,
                )
                .await?;

                // 3. Insert owner as admin.
                diesel_async::RunQueryDsl::execute(
                    diesel::insert_into(members::table).values(NewMember {
                        id: &member_id,
                        role: MemberRole::Admin.as_i16(),
                        profile_id: &request.owner_profile_id,
                        server_id: &server_id,
                        created_at: now,
                        updated_at: now,
                    }),
                    conn,
                )
                .await?;

                Ok(server)
            }
            .scope_boxed()
        })
        .await
    }

    async fn update_server(
        &self,
        server_id: &str,
        owner_profile_id: &str,
        changes: &UpdateServer,
    ) -> Result<Server, StoreError> {
        let mut conn = self.pool.get().await?;

        diesel_async::RunQueryDsl::get_result(
            diesel::update(
                servers::table
                    .filter(servers::id.eq(server_id))
                    .filter(servers::profile_id.eq(owner_profile_id)),
            )
            .set(changes)
            .returning(Server::as_returning()),
            &mut conn,
        )
        .await
        .optional()?
        .ok_or(StoreError::NotFound)
    }

    async fn set_invite_code(
        &self,
        server_id: &str,
        owner_profile_id: &str,
        invite_code: &str,
    ) -> Result<Server, StoreError> {
        let mut conn = self.pool.get().await?;

        diesel_async::RunQueryDsl::get_result(
            diesel::update(
                servers::table
                    .filter(servers::id.eq(server_id))
                    .filter(servers::profile_id.eq(owner_profile_id)),
            )
            .set((
                servers::invite_code.eq(invite_code),
                servers::updated_at.eq(Utc::now()),
            ))
            .returning(Server::as_returning()),
            &mut conn,
        )
        .await
        .optional()
        .map_err(conflict_on_unique)?
        .ok_or(StoreError::NotFound)
    }

    async fn delete_server(
        &self,
        server_id: &str,
        owner_profile_id: &str,
    ) -> Result<Server, StoreError> {
        let server_id = server_id.to_string();
        let owner_profile_id = owner_profile_id.to_string();
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, StoreError, _>(|conn| {
            async move {
                let removed = diesel_async::RunQueryDsl::execute(
                    diesel::delete(channels::table.filter(channels::server_id.eq(&server_id))),
                    conn,
                )
                .await?;

                // A non-owner matches zero rows here and the channel delete rolls back.
                let server: Server = diesel_async::RunQueryDsl::get_result(
                    diesel::delete(
                        servers::table
                            .filter(servers::id.eq(&server_id))
                            .filter(servers::profile_id.eq(&owner_profile_id)),
                    )
                    .returning(Server::as_returning()),
                    conn,
                )
                .await
                .optional()?
                .ok_or(StoreError::NotFound)?;

                tracing::debug!(server_id = %server.id, channels = removed, "server deleted");

                Ok(server)
            }
            .scope_boxed()
        })
        .await
    }

    async fn leave_server(&self, server_id: &str, profile_id: &str) -> Result<Server, StoreError> {
        let mut conn = self.pool.get().await?;

        // Owners never match.
        let server: Server = diesel_async::RunQueryDsl::get_result(
            servers::table
                .filter(servers::id.eq(server_id))
                .filter(servers::profile_id.ne(profile_id))
                .select(Server::as_select()),
            &mut conn,
        )
        .await
        .optional()?
        .ok_or(StoreError::NotFound)?;

        let removed = diesel_async::RunQueryDsl::execute(
            diesel::delete(
                members::table
                    .filter(members::server_id.eq(server_id))
                    .filter(members::profile_id.eq(profile_id)),
            ),
            &mut conn,
        )
        .await?;

        if removed == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(server)
    }

    async fn load_server_tree(&self, server_id: &str) -> Result<Option<ServerTree>, StoreError> {
        let mut conn = self.pool.get().await?;

        let Some(server) = diesel_async::RunQueryDsl::get_result(
            servers::table.find(server_id).select(Server::as_select()),
            &mut conn,
        )
        .await
        .optional()?
        else {
            return Ok(None);
        };

        let channel_list: Vec<Channel> = diesel_async::RunQueryDsl::load(
            channels::table
                .filter(channels::server_id.eq(server_id))
                .order((channels::created_at.asc(), channels::id.asc()))
                .select(Channel::as_select()),
            &mut conn,
        )
        .await?;

        let rows: Vec<(Member, Profile)> = diesel_async::RunQueryDsl::load(
            members::table
                .inner_join(profiles::table)
                .filter(members::server_id.eq(server_id))
                .order((members::role.asc(), members::created_at.asc()))
                .select((Member::as_select(), Profile::as_select())),
            &mut conn,
        )
        .await?;

        Ok(Some(ServerTree {
            server,
            channels: channel_list,
            members: rows
                .into_iter()
                .map(|(member, profile)| MemberWithProfile { member, profile })
                .collect(),
        }))
    }
}
