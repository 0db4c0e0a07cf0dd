//! FTP Reply handling
//!
//! Defines reply codes, the `Reply` value and its classification.

use std::fmt;

/// Standard FTP reply codes
pub const WAIT_READY: u16 = 120;
pub const OK: u16 = 200;
pub const READY: u16 = 220;
pub const CLOSING_CONTROL: u16 = 221;
pub const TRANSFER_COMPLETE: u16 = 226;
pub const LOGIN_SUCCESS: u16 = 230;
pub const PASSWORD_REQUIRED: u16 = 331;
pub const SERVICE_CLOSING: u16 = 421;

/// Reply category, taken from the leading digit of the code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyClass {
    Preliminary,
    Success,
    Intermediate,
    TransientFailure,
    PermanentFailure,
}

/// A complete control-channel reply
///
/// Multi-line replies keep every line; `text()` returns the first one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    code: u16,
    lines: Vec<String>,
}

impl Reply {
    pub fn new(code: u16, text: impl Into<String>) -> Self {
        Self {
            code,
            lines: vec![text.into()],
        }
    }

    pub(crate) fn multi_line(code: u16, lines: Vec<String>) -> Self {
        Self { code, lines }
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn text(&self) -> &str {
        self.lines.first().map(String::as_str).unwrap_or("")
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_multi_line(&self) -> bool {
        self.lines.len() > 1
    }

    pub fn class(&self) -> ReplyClass {
        match self.code / 100 {
            1 => ReplyClass::Preliminary,
            2 => ReplyClass::Success,
            3 => ReplyClass::Intermediate,
            4 => ReplyClass::TransientFailure,
            _ => ReplyClass::PermanentFailure,
        }
    }

    pub fn is_preliminary(&self) -> bool {
        self.class() == ReplyClass::Preliminary
    }

    pub fn is_success(&self) -> bool {
        self.class() == ReplyClass::Success
    }

    /// 4xx or 5xx
    pub fn is_failure(&self) -> bool {
        matches!(
            self.class(),
            ReplyClass::TransientFailure | ReplyClass::PermanentFailure
        )
    }

    /// Whether the server is closing the control connection with this reply.
    ///
    /// `221` is only expected in answer to QUIT, so callers handling QUIT
    /// must not consult this.
    pub fn is_closing(&self) -> bool {
        match self.code {
            SERVICE_CLOSING | CLOSING_CONTROL => true,
            _ => {
                self.class() == ReplyClass::PermanentFailure
                    && self.text().trim_start().starts_with("Closing")
            }
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lines.split_last() {
            Some((last, [])) => write!(f, "{} {}", self.code, last),
            Some((last, rest)) => {
                for (i, line) in rest.iter().enumerate() {
                    if i == 0 {
                        writeln!(f, "{}-{}", self.code, line)?;
                    } else {
                        writeln!(f, "{}", line)?;
                    }
                }
                write!(f, "{} {}", self.code, last)
            }
            None => write!(f, "{}", self.code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_by_leading_digit() {
        assert_eq!(Reply::new(150, "Opening").class(), ReplyClass::Preliminary);
        assert_eq!(Reply::new(226, "Done").class(), ReplyClass::Success);
        assert_eq!(Reply::new(331, "Password").class(), ReplyClass::Intermediate);
        assert_eq!(Reply::new(425, "No data").class(), ReplyClass::TransientFailure);
        assert_eq!(Reply::new(550, "Missing").class(), ReplyClass::PermanentFailure);
        assert!(Reply::new(450, "Busy").is_failure());
        assert!(!Reply::new(200, "OK").is_failure());
    }

    #[test]
    fn closing_replies() {
        assert!(Reply::new(421, "Service not available").is_closing());
        assert!(Reply::new(550, "Closing control connection").is_closing());
        assert!(!Reply::new(550, "No such file").is_closing());
        assert!(!Reply::new(226, "Closing data connection").is_closing());
    }

    #[test]
    fn display_multi_line() {
        let reply = Reply::multi_line(
            230,
            vec!["Welcome".into(), " motd".into(), "Logged in".into()],
        );
        assert_eq!(reply.to_string(), "230-Welcome\n motd\n230 Logged in");
        assert_eq!(reply.text(), "Welcome");
        assert_eq!(Reply::new(200, "OK").to_string(), "200 OK");
    }
}
