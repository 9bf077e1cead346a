use chrono::{DateTime, Utc};
use diesel::prelude::*;
use huddle_common::id::{prefix, PrefixedId};
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::schema::profiles;

/// A signed-in user's application identity.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, ToSchema)]
#[diesel(table_name = profiles)]
pub struct Profile {
    pub id: String,
    /// Subject identifier assigned by the identity provider.
    pub user_id: String,
    pub name: String,
    pub image_url: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PrefixedId for Profile {
    const PREFIX: &'static str = prefix::PROFILE;
}

#[derive(Debug, Insertable)]
#[diesel(table_name = profiles)]
pub struct NewProfile<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub name: &'a str,
    pub image_url: &'a str,
    pub email: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Identity attributes used to create a profile on first sign-in.
#[derive(Debug, Clone)]
pub struct ProfileSeed {
    pub user_id: String,
    pub name: String,
    pub image_url: String,
    pub email: String,
}
