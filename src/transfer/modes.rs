//! FTP Transfer modes
//!
//! Representation types (TYPE A / TYPE I) and the kinds of data transfer.

use std::fmt;

/// Representation type negotiated with TYPE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferType {
    #[default]
    Ascii,
    Binary,
}

impl TransferType {
    /// Argument of the TYPE command
    pub fn type_code(self) -> char {
        match self {
            TransferType::Ascii => 'A',
            TransferType::Binary => 'I',
        }
    }
}

impl fmt::Display for TransferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferType::Ascii => write!(f, "ascii"),
            TransferType::Binary => write!(f, "binary"),
        }
    }
}

/// Which data command a transfer drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    /// RETR
    Retrieve,
    /// STOR
    Store,
    /// NLST
    List,
    /// LIST
    ListLong,
}

impl TransferKind {
    /// Whether bytes flow from the server to the client
    pub fn is_inbound(self) -> bool {
        !matches!(self, TransferKind::Store)
    }
}
