pub mod client;
pub mod config;
pub mod error;
pub mod nickname;
pub mod protocol;
pub mod server;

pub use crate::config::ServerConfig;
pub use crate::server::Server;
