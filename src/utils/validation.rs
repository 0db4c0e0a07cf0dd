//! Input validation utilities
//!
//! Checks arguments before they are placed on the control connection.

use crate::error::FtpClientError;

const MAX_ARGUMENT_LEN: usize = 512;

/// Whether a command line can be sent as a single control-channel line
pub fn is_single_line(input: &str) -> bool {
    !input.contains('\0') && !input.contains('\r') && !input.contains('\n')
}

/// Validate that input is not empty and doesn't contain dangerous characters
pub fn is_valid_argument(input: &str) -> bool {
    !input.trim().is_empty() && input.len() <= MAX_ARGUMENT_LEN && is_single_line(input)
}

/// Returns the argument unchanged, or `InvalidArgument` naming `what`
pub fn require_argument(what: &str, input: &str) -> Result<String, FtpClientError> {
    if is_valid_argument(input) {
        Ok(input.to_string())
    } else {
        Err(FtpClientError::InvalidArgument(format!(
            "{what} must be a non-empty single line"
        )))
    }
}
