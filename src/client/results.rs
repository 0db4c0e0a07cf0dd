//! Client result types
//!
//! Defines result structures returned by control session operations.

use crate::protocol::Reply;

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub username: String,
    pub reply: Reply,
}

/// Result of a disconnect; `reply` is the answer to QUIT when one arrived
#[derive(Debug, Clone)]
pub struct DisconnectResult {
    pub reply: Option<Reply>,
}
