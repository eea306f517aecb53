pub mod error;
pub mod config;
pub mod transport;
pub mod session;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
