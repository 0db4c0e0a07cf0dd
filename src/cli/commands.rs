//! Operator commands
//!
//! Turns a line typed at the `ftp>` prompt into a `CliCommand`. Missing
//! arguments stay `None`; the dispatcher prompts for them.

/// A command typed by the operator
#[derive(Debug, PartialEq)]
pub enum CliCommand {
    Open {
        host: Option<String>,
        port: Option<String>,
    },
    User {
        name: Option<String>,
        password: Option<String>,
    },
    Close,
    Quit,
    Ascii,
    Binary,
    Cd(Option<String>),
    Delete(Option<String>),
    Mkdir(Option<String>),
    Pwd,
    Rename {
        from: Option<String>,
        to: Option<String>,
    },
    Get {
        remote: Option<String>,
        local: Option<String>,
    },
    Put {
        local: Option<String>,
        remote: Option<String>,
    },
    Ls {
        remote: Option<String>,
        local: Option<String>,
    },
    Dir {
        remote: Option<String>,
        local: Option<String>,
    },
    Lcd(Option<String>),
    Connected,
    Empty,
    Unknown(String),
}

// Parse an operator line into a CliCommand
pub fn parse_command(raw: &str) -> CliCommand {
    let trimmed = raw.trim();
    let mut parts = trimmed.split_whitespace();
    let cmd = parts.next().unwrap_or("").to_ascii_lowercase();
    let mut arg = || parts.next().map(str::to_string);

    match cmd.as_str() {
        "" => CliCommand::Empty,
        "open" => CliCommand::Open {
            host: arg(),
            port: arg(),
        },
        "user" => CliCommand::User {
            name: arg(),
            password: arg(),
        },
        "close" | "disconnect" => CliCommand::Close,
        "quit" | "bye" => CliCommand::Quit,
        "ascii" => CliCommand::Ascii,
        "binary" => CliCommand::Binary,
        "cd" => CliCommand::Cd(arg()),
        "delete" => CliCommand::Delete(arg()),
        "mkdir" => CliCommand::Mkdir(arg()),
        "pwd" => CliCommand::Pwd,
        "rename" => CliCommand::Rename {
            from: arg(),
            to: arg(),
        },
        "get" => CliCommand::Get {
            remote: arg(),
            local: arg(),
        },
        "put" => CliCommand::Put {
            local: arg(),
            remote: arg(),
        },
        "ls" => CliCommand::Ls {
            remote: arg(),
            local: arg(),
        },
        "dir" => CliCommand::Dir {
            remote: arg(),
            local: arg(),
        },
        "lcd" => CliCommand::Lcd(arg()),
        "connected" => CliCommand::Connected,
        _ => CliCommand::Unknown(trimmed.to_string()),
    }
}

/// Parses the `port` argument of `open`.
pub fn parse_port(raw: &str) -> Option<u16> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}
