mod engine;
mod error;
mod messages;
mod rendezvous;
mod transport;

pub use engine::*;
pub use error::*;
pub use messages::*;
pub use rendezvous::*;
pub use transport::*;
