//! Error handling
//!
//! Defines error types and handling policy for the FTP client.

pub mod handlers;
pub mod types;

pub use types::*;

/// Result alias used across the client
pub type Result<T> = std::result::Result<T, FtpClientError>;
