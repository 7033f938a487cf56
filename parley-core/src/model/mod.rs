mod message;
mod participant;
mod room;
mod signaling;

pub use message::{ChatFrame, ChatMessage, Origin};
pub use participant::ParticipantId;
pub use room::{MAX_ROOM_ID_LEN, ROOM_CODE_LEN, RoomId, RoomSummary};
pub use signaling::{
    ClientSignal, DescriptionKind, IceServerConfig, PathCandidate, ServerSignal,
    SessionDescription,
};
