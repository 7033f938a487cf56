pub use parley_core::model::{ChatMessage, ParticipantId, RoomId};

pub mod model {
    pub use parley_core::model::*;
}

pub mod utils {
    pub use parley_core::utils::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use parley_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use parley_client::*;
}
