use crate::error::ModelError;
use crate::model::participant::ParticipantId;
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length of generated room codes.
pub const ROOM_CODE_LEN: usize = 8;

pub const MAX_ROOM_ID_LEN: usize = 32;

/// Short, human-shareable room token. Always stored uppercase, so two ids that
/// differ only in case compare equal.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomId(String);

impl RoomId {
    pub fn generate() -> Self {
        let code: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(ROOM_CODE_LEN)
            .map(char::from)
            .collect();
        Self(code.to_ascii_uppercase())
    }

    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        let trimmed = raw.trim();
        let valid = !trimmed.is_empty()
            && trimmed.len() <= MAX_ROOM_ID_LEN
            && trimmed.chars().all(|c| c.is_ascii_alphanumeric());

        if !valid {
            return Err(ModelError::InvalidRoomId(raw.to_owned()));
        }

        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl FromStr for RoomId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<RoomId> for String {
    fn from(id: RoomId) -> Self {
        id.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Debug listing entry returned by `list-rooms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: RoomId,
    pub member_count: usize,
    pub members: Vec<ParticipantId>,
}
