//! Error types
//!
//! Defines domain-specific error types for each layer of the FTP client.

use std::fmt;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::protocol::Reply;

/// Errors produced while reading or parsing a control-channel reply
#[derive(Debug)]
pub enum ReplyError {
    ConnectionClosed,
    ReadFailed(io::Error),
    LineTooLong(usize),
    TooManyLines(usize),
    InvalidLineFormat(String),
    InvalidReplyCode(String),
    LineIsNotUtf8,
    TimedOut(&'static str),
}

impl fmt::Display for ReplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplyError::ConnectionClosed => write!(f, "Connection closed by remote host"),
            ReplyError::ReadFailed(e) => write!(f, "Failed to read reply: {}", e),
            ReplyError::LineTooLong(max) => write!(f, "Reply line exceeds {} bytes", max),
            ReplyError::TooManyLines(max) => write!(f, "Reply exceeds {} lines", max),
            ReplyError::InvalidLineFormat(l) => write!(f, "Invalid reply line: {}", l),
            ReplyError::InvalidReplyCode(c) => write!(f, "Invalid reply code: {}", c),
            ReplyError::LineIsNotUtf8 => write!(f, "Reply line is not valid UTF-8"),
            ReplyError::TimedOut(stage) => write!(f, "Timed out while waiting to {}", stage),
        }
    }
}

impl std::error::Error for ReplyError {}

/// Connection-level errors on the control or data channel
#[derive(Debug)]
pub enum ConnectionError {
    ConnectFailed(String, io::Error),
    BindFailed(SocketAddr, io::Error),
    AcceptFailed(io::Error),
    SendFailed(io::Error),
    LocalAddress(io::Error),
    TimedOut(&'static str),
    UnsupportedAddress(IpAddr),
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::ConnectFailed(addr, e) => {
                write!(f, "Failed to connect to {}: {}", addr, e)
            }
            ConnectionError::BindFailed(addr, e) => write!(f, "Failed to bind to {}: {}", addr, e),
            ConnectionError::AcceptFailed(e) => {
                write!(f, "Failed to accept data connection: {}", e)
            }
            ConnectionError::SendFailed(e) => write!(f, "Failed to send command: {}", e),
            ConnectionError::LocalAddress(e) => {
                write!(f, "Failed to read control socket address: {}", e)
            }
            ConnectionError::TimedOut(stage) => write!(f, "Timed out while waiting to {}", stage),
            ConnectionError::UnsupportedAddress(ip) => {
                write!(f, "Active mode requires an IPv4 control address, got {}", ip)
            }
        }
    }
}

impl std::error::Error for ConnectionError {}

/// Errors raised inside the data-connection byte loop
#[derive(Debug)]
pub enum TransferError {
    DataStream(io::Error),
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::DataStream(e) => write!(f, "Data connection failed: {}", e),
        }
    }
}

impl std::error::Error for TransferError {}

/// General FTP client error that encompasses all error types
#[derive(Debug)]
pub enum FtpClientError {
    NotConnected,
    AlreadyConnected(String),
    Connection(ConnectionError),
    ProtocolRejected { command: String, reply: Reply },
    LoginFailed(Option<Reply>),
    LocalIo { path: PathBuf, source: io::Error },
    Transfer(TransferError),
    UnexpectedDisconnect(Option<Reply>),
    Reply(ReplyError),
    InvalidArgument(String),
}

impl FtpClientError {
    pub fn local_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        FtpClientError::LocalIo {
            path: path.into(),
            source,
        }
    }

    pub fn rejected(command: impl Into<String>, reply: Reply) -> Self {
        FtpClientError::ProtocolRejected {
            command: command.into(),
            reply,
        }
    }

    /// The server reply carried by this error, if any
    pub fn reply(&self) -> Option<&Reply> {
        match self {
            FtpClientError::ProtocolRejected { reply, .. } => Some(reply),
            FtpClientError::LoginFailed(reply) | FtpClientError::UnexpectedDisconnect(reply) => {
                reply.as_ref()
            }
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            FtpClientError::Connection(ConnectionError::TimedOut(_))
        )
    }
}

impl fmt::Display for FtpClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FtpClientError::NotConnected => write!(f, "Not connected."),
            FtpClientError::AlreadyConnected(addr) => {
                write!(f, "Already connected to {}, use disconnect first.", addr)
            }
            FtpClientError::Connection(e) => write!(f, "Connection error: {}", e),
            FtpClientError::ProtocolRejected { command, reply } => {
                write!(f, "{} rejected: {}", command, reply)
            }
            FtpClientError::LoginFailed(_) => write!(f, "Login failed."),
            FtpClientError::LocalIo { path, source } => {
                write!(f, "Local file error on {}: {}", path.display(), source)
            }
            FtpClientError::Transfer(e) => write!(f, "Transfer error: {}", e),
            FtpClientError::UnexpectedDisconnect(_) => {
                write!(f, "Connection closed by remote host.")
            }
            FtpClientError::Reply(e) => write!(f, "Reply error: {}", e),
            FtpClientError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
        }
    }
}

impl std::error::Error for FtpClientError {}

impl From<ConnectionError> for FtpClientError {
    fn from(error: ConnectionError) -> Self {
        FtpClientError::Connection(error)
    }
}

impl From<TransferError> for FtpClientError {
    fn from(error: TransferError) -> Self {
        FtpClientError::Transfer(error)
    }
}

impl From<ReplyError> for FtpClientError {
    fn from(error: ReplyError) -> Self {
        match error {
            ReplyError::ConnectionClosed => FtpClientError::UnexpectedDisconnect(None),
            e => FtpClientError::Reply(e),
        }
    }
}
