use parley_core::RoomId;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RendezvousError {
    #[error("room {room_id} is full")]
    RoomFull { room_id: RoomId },

    #[error("rendezvous service is not running")]
    ServiceUnavailable,

    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
