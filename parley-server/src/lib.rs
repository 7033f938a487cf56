mod config;
mod error;
mod http;
mod room;
mod server;
mod signaling;

pub use config::*;
pub use error::*;
pub use http::*;
pub use room::*;
pub use server::*;
pub use signaling::*;
