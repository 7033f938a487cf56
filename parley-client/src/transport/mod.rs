mod backend;
mod transport_config;
mod transport_event;
mod webrtc_backend;

pub use backend::*;
pub use transport_config::*;
pub use transport_event::*;
pub use webrtc_backend::*;
