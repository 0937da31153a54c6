#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod errors;
pub mod models;
pub mod providers;
pub mod retry;
pub mod transport;
