use chrono::{DateTime, Utc};
use diesel::prelude::*;
use huddle_common::id::{prefix, PrefixedId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::schema::channels;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChannelType {
    Text,
    Audio,
    Video,
}

impl ChannelType {
    pub fn as_i16(self) -> i16 {
        match self {
            ChannelType::Text => 0,
            ChannelType::Audio => 1,
            ChannelType::Video => 2,
        }
    }

    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            0 => Some(ChannelType::Text),
            1 => Some(ChannelType::Audio),
            2 => Some(ChannelType::Video),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, ToSchema)]
#[diesel(table_name = channels)]
pub struct Channel {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub type_: i16,
    /// Creator.
    pub profile_id: String,
    pub server_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Channel {
    /// `None` for stored values this build does not know about.
    pub fn kind(&self) -> Option<ChannelType> {
        ChannelType::from_i16(self.type_)
    }
}

impl PrefixedId for Channel {
    const PREFIX: &'static str = prefix::CHANNEL;
}

#[derive(Debug, Insertable)]
#[diesel(table_name = channels)]
pub struct NewChannel<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub type_: i16,
    pub profile_id: &'a str,
    pub server_id: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
