use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid room id: {0:?}")]
    InvalidRoomId(String),

    #[error("invalid participant id: {0:?}")]
    InvalidParticipantId(String),

    #[error("malformed frame: {0}")]
    MalformedFrame(#[from] serde_json::Error),
}
