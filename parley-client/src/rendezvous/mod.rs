mod connector;
mod ws_connector;

pub use connector::*;
pub use ws_connector::*;
