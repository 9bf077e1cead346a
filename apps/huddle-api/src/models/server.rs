use chrono::{DateTime, Utc};
use diesel::prelude::*;
use huddle_common::id::{prefix, PrefixedId};
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::schema::servers;

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, ToSchema)]
#[diesel(table_name = servers)]
pub struct Server {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub invite_code: String,
    /// Owning profile.
    pub profile_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PrefixedId for Server {
    const PREFIX: &'static str = prefix::SERVER;
}

#[derive(Debug, Insertable)]
#[diesel(table_name = servers)]
pub struct NewServer<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub image_url: &'a str,
    pub invite_code: &'a str,
    pub profile_id: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial server update. `None` fields are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = servers)]
pub struct UpdateServer {
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl UpdateServer {
    pub fn apply(&self, server: &mut Server) {
        if let Some(name) = &self.name {
            server.name = name.clone();
        }
        if let Some(image_url) = &self.image_url {
            server.image_url = image_url.clone();
        }
        server.updated_at = self.updated_at;
    }
}
