use chrono::{DateTime, Utc};
use diesel::prelude::*;
use huddle_common::id::{prefix, PrefixedId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::schema::members;
use crate::models::profile::Profile;

/// Role a member holds within a server.
///
/// Stored as a small integer in declaration order, so ascending order lists admins first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    Admin,
    Moderator,
    Guest,
}

impl MemberRole {
    pub fn as_i16(self) -> i16 {
        match self {
            MemberRole::Admin => 0,
            MemberRole::Moderator => 1,
            MemberRole::Guest => 2,
        }
    }

    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            0 => Some(MemberRole::Admin),
            1 => Some(MemberRole::Moderator),
            2 => Some(MemberRole::Guest),
            _ => None,
        }
    }

    pub fn is_admin(self) -> bool {
        self == MemberRole::Admin
    }

    /// Moderators and admins.
    pub fn is_moderator(self) -> bool {
        matches!(self, MemberRole::Admin | MemberRole::Moderator)
    }
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, ToSchema)]
#[diesel(table_name = members)]
pub struct Member {
    pub id: String,
    pub role: i16,
    pub profile_id: String,
    pub server_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    /// Unknown stored values read as guest.
    pub fn role(&self) -> MemberRole {
        MemberRole::from_i16(self.role).unwrap_or(MemberRole::Guest)
    }
}

impl PrefixedId for Member {
    const PREFIX: &'static str = prefix::MEMBER;
}

#[derive(Debug, Insertable)]
#[diesel(table_name = members)]
pub struct NewMember<'a> {
    pub id: &'a str,
    pub role: i16,
    pub profile_id: &'a str,
    pub server_id: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A member row joined with its profile.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MemberWithProfile {
    #[serde(flatten)]
    pub member: Member,
    pub profile: Profile,
}
