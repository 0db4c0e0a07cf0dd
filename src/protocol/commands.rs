//! Module `commands`
//!
//! Defines the FTP commands the client sends on the control connection
//! and their rendering into wire text.

use std::fmt;

/// Represents an FTP command issued by the client.
///
/// Commands that take arguments store them as `String` variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    USER(String),
    PASS(String),
    QUIT,
    TYPE(char),      // 'A' or 'I'
    CWD(String),     // Change working directory
    MKD(String),     // Make directory
    XPWD,            // Print working directory
    DELE(String),    // Delete file
    RNFR(String),    // Rename from
    RNTO(String),    // Rename to
    OPTS(String),    // e.g. "UTF8 ON"
    PORT(String),    // h1,h2,h3,h4,p1,p2
    RETR(String),    // Retrieve/download file
    STOR(String),    // Store/upload file
    NLST(Option<String>),
    LIST(Option<String>),
}

impl Command {
    /// The command verb, used as context in error reports
    pub fn name(&self) -> &'static str {
        match self {
            Command::USER(_) => "USER",
            Command::PASS(_) => "PASS",
            Command::QUIT => "QUIT",
            Command::TYPE(_) => "TYPE",
            Command::CWD(_) => "CWD",
            Command::MKD(_) => "MKD",
            Command::XPWD => "XPWD",
            Command::DELE(_) => "DELE",
            Command::RNFR(_) => "RNFR",
            Command::RNTO(_) => "RNTO",
            Command::OPTS(_) => "OPTS",
            Command::PORT(_) => "PORT",
            Command::RETR(_) => "RETR",
            Command::STOR(_) => "STOR",
            Command::NLST(_) => "NLST",
            Command::LIST(_) => "LIST",
        }
    }

    fn argument(&self) -> Option<&str> {
        match self {
            Command::USER(a)
            | Command::PASS(a)
            | Command::CWD(a)
            | Command::MKD(a)
            | Command::DELE(a)
            | Command::RNFR(a)
            | Command::RNTO(a)
            | Command::OPTS(a)
            | Command::PORT(a)
            | Command::RETR(a)
            | Command::STOR(a) => Some(a),
            Command::NLST(a) | Command::LIST(a) => a.as_deref(),
            _ => None,
        }
    }

    /// Wire text without the trailing CRLF
    pub fn to_line(&self) -> String {
        match self {
            Command::TYPE(t) => format!("TYPE {t}"),
            cmd => match cmd.argument() {
                Some(arg) => format!("{} {}", cmd.name(), arg),
                None => cmd.name().to_string(),
            },
        }
    }

    /// Wire bytes including CRLF
    pub fn to_wire(&self) -> Vec<u8> {
        let mut buf = self.to_line().into_bytes();
        buf.extend_from_slice(b"\r\n");
        buf
    }
}

/// Renders the command for logs, masking the password
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::PASS(_) => write!(f, "PASS ****"),
            cmd => write!(f, "{}", cmd.to_line()),
        }
    }
}
