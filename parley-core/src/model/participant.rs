use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

const MAX_PARTICIPANT_ID_LEN: usize = 64;

/// Ephemeral participant identifier, generated client-side once per session.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        let valid = !raw.is_empty()
            && raw.len() <= MAX_PARTICIPANT_ID_LEN
            && raw.chars().all(|c| c.is_ascii_graphic());

        if !valid {
            return Err(ModelError::InvalidParticipantId(raw.to_owned()));
        }

        Ok(Self(raw.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ParticipantId {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for ParticipantId {
    type Error = ModelError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ParticipantId> for String {
    fn from(id: ParticipantId) -> Self {
        id.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
