pub mod config;
pub mod error;
pub mod types;
pub mod stats;
pub mod extension;
pub mod session;
