pub mod config;
pub mod engine;
pub mod enforcement;
pub mod handler;
pub mod init;
pub mod logger;
pub mod message;
pub mod stats;
pub mod transport;
