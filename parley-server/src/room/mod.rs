mod rendezvous;
mod room;
mod room_command;
mod room_registry;

pub use rendezvous::*;
pub use room::*;
pub use room_command::*;
pub use room_registry::*;
