pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod session;
pub mod storage;
pub mod transfer;
pub mod utils;

pub use client::ShareClient;
pub use config::ServerConfig;
pub use server::Server;
