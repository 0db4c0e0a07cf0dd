//! Error handlers
//!
//! Classifies client errors by how far their effects reach.

use crate::error::types::{ConnectionError, FtpClientError};
use log::{error, warn};

/// Log an FTP client error at a level matching its severity
pub fn log_error(err: &FtpClientError) {
    if tears_down_session(err) {
        error!("FTP Client Error: {}", err);
    } else {
        warn!("FTP Client Error: {}", err);
    }
}

/// Whether the control session stays usable after this error
pub fn is_recoverable(err: &FtpClientError) -> bool {
    !tears_down_session(err)
}

/// Whether this error has closed the control connection
pub fn tears_down_session(err: &FtpClientError) -> bool {
    matches!(
        err,
        FtpClientError::UnexpectedDisconnect(_)
            | FtpClientError::Reply(_)
            | FtpClientError::Connection(ConnectionError::SendFailed(_))
    )
}
