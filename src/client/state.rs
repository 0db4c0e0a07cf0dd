//! Module `state`
//!
//! Defines the `SessionState` struct holding what the client knows about
//! its control session: peer address, login status and transfer type.

use std::net::SocketAddr;

use crate::transfer::TransferType;

/// Represents the state of an FTP control session.
///
/// Reset to its default whenever the control connection goes away.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    peer_addr: Option<SocketAddr>,
    username: Option<String>,
    is_logged_in: bool,
    transfer_type: TransferType,
}

impl SessionState {
    /// Clears everything learned during the session.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // --------------------
    // Getter methods
    // --------------------

    /// Returns the server's control address if connected.
    pub fn peer_addr(&self) -> Option<&SocketAddr> {
        self.peer_addr.as_ref()
    }

    /// Returns the user name of the last successful login.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.is_logged_in
    }

    pub fn transfer_type(&self) -> TransferType {
        self.transfer_type
    }

    // --------------------
    // Setter methods
    // --------------------

    pub fn set_peer_addr(&mut self, addr: Option<SocketAddr>) {
        self.peer_addr = addr;
    }

    /// Records the login outcome; a failed login forgets the user name.
    pub fn set_logged_in(&mut self, username: Option<String>) {
        self.is_logged_in = username.is_some();
        self.username = username;
    }

    pub fn set_transfer_type(&mut self, transfer_type: TransferType) {
        self.transfer_type = transfer_type;
    }
}
