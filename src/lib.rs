// Library interface for testing

// Declare all modules
pub mod auth;
pub mod board;
pub mod config;
pub mod hash;
pub mod pages;
pub mod scheme;
pub mod serve;
pub mod sessions;

/// Error type shared by fallible operations across the crate
pub type DynError = Box<dyn std::error::Error + Send + Sync>;
