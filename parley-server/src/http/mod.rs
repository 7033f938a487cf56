mod health;
mod router;

pub use health::*;
pub use router::*;
