//! Interactive dispatcher
//!
//! Reads operator lines, prompts for missing arguments, calls into the
//! control session and prints what came back. This is the only layer that
//! talks to the terminal.

use log::debug;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::cli::commands::{CliCommand, parse_command, parse_port};
use crate::client::ControlSession;
use crate::error::handlers::{is_recoverable, log_error};
use crate::error::{FtpClientError, Result};
use crate::protocol::Reply;
use crate::transfer::{TransferSummary, TransferType};

const OPEN_USAGE: &str = "Usage: open host name [port]";

/// Whether the read loop keeps going after a command
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Drives one control session from operator input.
///
/// `input` is any async line source and `output` any writer, so the whole
/// loop can run against in-memory buffers.
pub struct Dispatcher<R, W> {
    session: ControlSession,
    input: R,
    output: W,
    home_dir: PathBuf,
}

impl<R, W> Dispatcher<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(session: ControlSession, input: R, output: W) -> Self {
        let home_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            session,
            input,
            output,
            home_dir,
        }
    }

    pub fn session(&self) -> &ControlSession {
        &self.session
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Runs the `ftp>` loop until `quit`/`bye` or end of input.
    pub async fn run(&mut self) -> io::Result<()> {
        loop {
            let Some(line) = self.prompt("ftp> ").await? else {
                if self.session.is_connected() {
                    self.quit().await?;
                }
                break;
            };
            if self.execute(&line).await? == Flow::Quit {
                break;
            }
        }
        Ok(())
    }

    /// Runs a single operator line.
    pub async fn execute(&mut self, line: &str) -> io::Result<Flow> {
        let command = parse_command(line);
        debug!("Operator command: {:?}", command);

        match command {
            CliCommand::Empty => {}
            CliCommand::Quit => {
                if self.session.is_connected() {
                    self.quit().await?;
                }
                return Ok(Flow::Quit);
            }
            CliCommand::Close => match self.session.disconnect().await {
                Ok(result) => {
                    if let Some(reply) = result.reply {
                        self.print_reply(&reply)?;
                    }
                }
                Err(e) => self.report(e)?,
            },
            CliCommand::Open { host, port } => self.open(host, port).await?,
            CliCommand::User { name, password } => {
                if self.require_connection()? {
                    self.login(None, name, password).await?;
                }
            }
            CliCommand::Ascii => {
                let result = self.session.set_mode(TransferType::Ascii).await;
                self.show_reply(result)?;
            }
            CliCommand::Binary => {
                let result = self.session.set_mode(TransferType::Binary).await;
                self.show_reply(result)?;
            }
            CliCommand::Cd(path) => {
                if self.require_connection()? {
                    let path = self.ask(path, "Remote directory ").await?;
                    let result = self.session.change_directory(&path).await;
                    self.show_reply(result)?;
                }
            }
            CliCommand::Delete(name) => {
                if self.require_connection()? {
                    let name = self.ask(name, "Remote file ").await?;
                    let result = self.session.delete(&name).await;
                    self.show_reply(result)?;
                }
            }
            CliCommand::Mkdir(path) => {
                if self.require_connection()? {
                    let path = self.ask(path, "Remote directory ").await?;
                    let result = self.session.make_directory(&path).await;
                    self.show_reply(result)?;
                }
            }
            CliCommand::Pwd => {
                let result = self.session.print_working_directory().await;
                self.show_reply(result)?;
            }
            CliCommand::Rename { from, to } => {
                if self.require_connection()? {
                    let from = self.ask(from, "From name ").await?;
                    let to = self.ask(to, "To name ").await?;
                    let result = self.session.rename(&from, &to).await;
                    self.show_reply(result)?;
                }
            }
            CliCommand::Get { remote, local } => {
                if self.require_connection()? {
                    let (remote, local) = match remote {
                        Some(remote) => (remote, local.unwrap_or_default()),
                        None => {
                            let remote = self.ask(None, "Remote file ").await?;
                            (remote, self.ask(local, "Local file ").await?)
                        }
                    };
                    let local = if local.trim().is_empty() {
                        remote.clone()
                    } else {
                        local
                    };
                    let result = self.session.download(&remote, Path::new(&local)).await;
                    self.show_transfer(result, "received")?;
                }
            }
            CliCommand::Put { local, remote } => {
                if self.require_connection()? {
                    let (local, remote) = match local {
                        Some(local) => (local, remote.unwrap_or_default()),
                        None => {
                            let local = self.ask(None, "Local file ").await?;
                            (local, self.ask(remote, "Remote file ").await?)
                        }
                    };
                    let remote = if remote.trim().is_empty() {
                        local_file_name(&local)
                    } else {
                        remote
                    };
                    let result = self.session.upload(Path::new(&local), &remote).await;
                    self.show_transfer(result, "sent")?;
                }
            }
            CliCommand::Ls { remote, local } => {
                let local = local.map(PathBuf::from);
                let result = self
                    .session
                    .list(remote.as_deref(), local.as_deref())
                    .await;
                self.show_transfer(result, "received")?;
            }
            CliCommand::Dir { remote, local } => {
                let local = local.map(PathBuf::from);
                let result = self
                    .session
                    .list_long(remote.as_deref(), local.as_deref())
                    .await;
                self.show_transfer(result, "received")?;
            }
            CliCommand::Lcd(dir) => self.change_local_directory(dir)?,
            CliCommand::Connected => {
                let connected = self.session.is_connected();
                writeln!(self.output, "{}", connected)?;
            }
            CliCommand::Unknown(_) => writeln!(self.output, "Invalid command.")?,
        }
        Ok(Flow::Continue)
    }

    /// `open [host [port]]`: connects, then logs in straight away.
    pub async fn open(&mut self, host: Option<String>, port: Option<String>) -> io::Result<()> {
        if self.session.is_connected() {
            let current = self
                .session
                .state()
                .peer_addr()
                .map(|addr| addr.to_string())
                .unwrap_or_else(|| "server".to_string());
            return self.report(FtpClientError::AlreadyConnected(current));
        }

        let (host, port) = match host {
            Some(host) => (host, port),
            None => {
                let line = self.prompt("To ").await?.unwrap_or_default();
                let parts: Vec<&str> = line.split_whitespace().collect();
                match parts.as_slice() {
                    [host] => (host.to_string(), None),
                    [host, port] => (host.to_string(), Some(port.to_string())),
                    _ => {
                        writeln!(self.output, "{}", OPEN_USAGE)?;
                        return Ok(());
                    }
                }
            }
        };

        let port = match port {
            None => self.session.config().default_port,
            Some(raw) => match parse_port(&raw) {
                Some(port) => port,
                None => {
                    writeln!(self.output, "{}: bad port number\n{}", host, OPEN_USAGE)?;
                    return Ok(());
                }
            },
        };

        match self.session.connect(&host, port).await {
            Ok(greeting) => {
                writeln!(self.output, "Connected to {}.", host)?;
                self.print_reply(&greeting)?;
                self.login(Some(&host), None, None).await
            }
            Err(e) => self.report(e),
        }
    }

    async fn login(
        &mut self,
        host: Option<&str>,
        name: Option<String>,
        password: Option<String>,
    ) -> io::Result<()> {
        let name = match name {
            Some(name) => name,
            None => {
                let text = match host {
                    Some(host) => format!("User ({}:(none)): ", host),
                    None => "Username: ".to_string(),
                };
                self.prompt(&text).await?.unwrap_or_default()
            }
        };
        if name.trim().is_empty() {
            return self.report(FtpClientError::LoginFailed(None));
        }
        let password = match password {
            Some(password) => password,
            None => self.prompt("Password: ").await?.unwrap_or_default(),
        };

        match self.session.authenticate(name.trim(), &password).await {
            Ok(result) => self.print_reply(&result.reply),
            Err(e) => self.report(e),
        }
    }

    async fn quit(&mut self) -> io::Result<()> {
        match self.session.disconnect().await {
            Ok(result) => match result.reply {
                Some(reply) => self.print_reply(&reply),
                None => Ok(()),
            },
            Err(e) => self.report(e),
        }
    }

    fn change_local_directory(&mut self, dir: Option<String>) -> io::Result<()> {
        let target = dir.map(PathBuf::from).unwrap_or_else(|| self.home_dir.clone());
        match std::env::set_current_dir(&target).and_then(|_| std::env::current_dir()) {
            Ok(cwd) => writeln!(self.output, "{}", cwd.display()),
            Err(e) => {
                debug!("lcd {} failed: {}", target.display(), e);
                writeln!(self.output, "{}: File not found", target.display())
            }
        }
    }

    async fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// The given argument, or whatever the operator types at `text`
    async fn ask(&mut self, given: Option<String>, text: &str) -> io::Result<String> {
        match given {
            Some(value) => Ok(value),
            None => Ok(self
                .prompt(text)
                .await?
                .unwrap_or_default()
                .trim()
                .to_string()),
        }
    }

    fn require_connection(&mut self) -> io::Result<bool> {
        if self.session.is_connected() {
            return Ok(true);
        }
        self.report(FtpClientError::NotConnected)?;
        Ok(false)
    }

    fn print_reply(&mut self, reply: &Reply) -> io::Result<()> {
        writeln!(self.output, "{}", reply)
    }

    fn show_reply(&mut self, result: Result<Reply>) -> io::Result<()> {
        match result {
            Ok(reply) => self.print_reply(&reply),
            Err(e) => self.report(e),
        }
    }

    fn show_transfer(&mut self, result: Result<TransferSummary>, direction: &str) -> io::Result<()> {
        let summary = match result {
            Ok(summary) => summary,
            Err(e) => return self.report(e),
        };
        if let Some(listing) = &summary.listing {
            self.output.write_all(listing)?;
        }
        self.print_reply(&summary.reply)?;
        writeln!(
            self.output,
            "ftp: {} bytes {} in {:.2}Seconds {:.2}KBytes/sec.",
            summary.bytes,
            direction,
            summary.elapsed_secs(),
            summary.throughput_kbps()
        )
    }

    /// Prints an error the way the operator expects to see it: server
    /// replies verbatim, everything else as its message.
    fn report(&mut self, err: FtpClientError) -> io::Result<()> {
        log_error(&err);
        match &err {
            FtpClientError::ProtocolRejected { reply, .. } => self.print_reply(reply),
            FtpClientError::LoginFailed(reply) | FtpClientError::UnexpectedDisconnect(reply) => {
                if let Some(reply) = reply {
                    self.print_reply(reply)?;
                }
                writeln!(self.output, "{}", err)
            }
            _ => {
                writeln!(self.output, "{}", err)?;
                if !is_recoverable(&err) {
                    writeln!(self.output, "Connection closed.")?;
                }
                Ok(())
            }
        }
    }
}

/// Remote name for `put` when none is given: the local file's name
fn local_file_name(local: &str) -> String {
    Path::new(local)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| local.to_string())
}
