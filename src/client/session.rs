//! Control session management
//!
//! Owns the control connection and keeps command and reply in lock-step:
//! every command sent is answered by exactly one reply before the next
//! command may go out.

use log::{debug, info, warn};
use std::net::SocketAddr;
use tokio::io::{AsyncWriteExt, BufStream};
use tokio::net::TcpStream;

use crate::client::SessionState;
use crate::client::results::{DisconnectResult, LoginResult};
use crate::config::ClientConfig;
use crate::error::{ConnectionError, FtpClientError, ReplyError, Result};
use crate::protocol::responses::{LOGIN_SUCCESS, PASSWORD_REQUIRED, READY, WAIT_READY};
use crate::protocol::{Command, Reply, read_reply};
use crate::utils::network::display_target;
use crate::utils::validation::is_single_line;

/// A control connection to one FTP server.
///
/// The session is owned by the caller and passed by `&mut` into every
/// operation. It is connected exactly while it holds a stream.
pub struct ControlSession {
    config: ClientConfig,
    stream: Option<BufStream<TcpStream>>,
    state: SessionState,
}

impl ControlSession {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            stream: None,
            state: SessionState::default(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Local end of the control connection
    pub fn local_addr(&self) -> Result<SocketAddr> {
        let stream = self.stream.as_ref().ok_or(FtpClientError::NotConnected)?;
        stream
            .get_ref()
            .local_addr()
            .map_err(|e| ConnectionError::LocalAddress(e).into())
    }

    /// Opens the control connection and waits for the server greeting.
    ///
    /// Only a `220` greeting makes the session usable. `OPTS UTF8 ON` is sent
    /// right after; the server may decline it.
    pub async fn connect(&mut self, host: &str, port: u16) -> Result<Reply> {
        if self.is_connected() {
            let current = self
                .state
                .peer_addr()
                .map(|addr| addr.to_string())
                .unwrap_or_else(|| "server".to_string());
            return Err(FtpClientError::AlreadyConnected(current));
        }

        let target = display_target(host, port);
        let stream =
            match tokio::time::timeout(self.config.connect_timeout(), TcpStream::connect((host, port)))
                .await
            {
                Ok(Ok(stream)) => stream,
                Ok(Err(e)) => {
                    warn!("Failed to connect to {}: {}", target, e);
                    return Err(ConnectionError::ConnectFailed(target, e).into());
                }
                Err(_) => {
                    warn!("Timed out connecting to {}", target);
                    return Err(ConnectionError::TimedOut("connect").into());
                }
            };

        info!("Control connection established to {}", target);
        self.state.set_peer_addr(stream.peer_addr().ok());
        self.stream = Some(BufStream::new(stream));

        let greeting = loop {
            let reply = self.receive_reply("read greeting").await?;
            if reply.code() != WAIT_READY {
                break reply;
            }
            debug!("Server not ready yet: {}", reply);
        };

        if greeting.code() != READY {
            warn!("Server {} refused the session: {}", target, greeting);
            self.teardown("greeting refused");
            return Err(FtpClientError::rejected("connect", greeting));
        }

        let reply = self.send_command(&Command::OPTS("UTF8 ON".into())).await?;
        if reply.is_success() {
            debug!("UTF-8 enabled on {}", target);
        } else {
            debug!("Server declined UTF-8: {}", reply);
        }

        Ok(greeting)
    }

    /// Logs in with USER/PASS.
    ///
    /// Succeeds only when PASS is answered with `230`. A failed login leaves
    /// the session connected but not logged in.
    pub async fn authenticate(&mut self, user: &str, password: &str) -> Result<LoginResult> {
        if !self.is_connected() {
            return Err(FtpClientError::NotConnected);
        }
        if user.trim().is_empty() {
            return Err(FtpClientError::LoginFailed(None));
        }

        self.state.set_logged_in(None);

        let reply = self.send_command(&Command::USER(user.to_string())).await?;
        if reply.code() != PASSWORD_REQUIRED {
            warn!("USER {} not accepted: {}", user, reply);
            return Err(FtpClientError::LoginFailed(Some(reply)));
        }

        let reply = self.send_command(&Command::PASS(password.to_string())).await?;
        if reply.code() != LOGIN_SUCCESS {
            warn!("Login failed for {}: {}", user, reply);
            return Err(FtpClientError::LoginFailed(Some(reply)));
        }

        info!("Logged in as {}", user);
        self.state.set_logged_in(Some(user.to_string()));
        Ok(LoginResult {
            username: user.to_string(),
            reply,
        })
    }

    /// Sends one command and returns its reply.
    ///
    /// A reply announcing that the server closes the connection tears the
    /// session down and is returned as `UnexpectedDisconnect`.
    pub async fn send_command(&mut self, command: &Command) -> Result<Reply> {
        if !self.is_connected() {
            return Err(FtpClientError::NotConnected);
        }
        let line = command.to_line();
        if !is_single_line(&line) {
            return Err(FtpClientError::InvalidArgument(format!(
                "{} argument contains a line break",
                command.name()
            )));
        }

        debug!("-> {}", command);
        let wire = command.to_wire();
        let sent = match self.stream.as_mut() {
            Some(stream) => match stream.write_all(&wire).await {
                Ok(()) => stream.flush().await,
                Err(e) => Err(e),
            },
            None => return Err(FtpClientError::NotConnected),
        };
        if let Err(e) = sent {
            self.teardown("send failed");
            return Err(ConnectionError::SendFailed(e).into());
        }

        let reply = self.receive_reply("read reply").await?;
        if *command != Command::QUIT {
            self.check_closing(reply)
        } else {
            Ok(reply)
        }
    }

    /// Reads the next reply without sending anything.
    ///
    /// Used for the second reply of a data transfer, after the data
    /// connection is done.
    pub(crate) async fn read_reply(&mut self) -> Result<Reply> {
        let reply = self.receive_reply("read transfer reply").await?;
        self.check_closing(reply)
    }

    /// Sends QUIT and closes the control connection.
    ///
    /// Returns `NotConnected` when there is nothing to close, so calling it
    /// twice is harmless.
    pub async fn disconnect(&mut self) -> Result<DisconnectResult> {
        if !self.is_connected() {
            return Err(FtpClientError::NotConnected);
        }

        let reply = match self.send_command(&Command::QUIT).await {
            Ok(reply) => Some(reply),
            Err(e) => {
                debug!("QUIT did not complete cleanly: {}", e);
                None
            }
        };
        self.teardown("quit");
        Ok(DisconnectResult { reply })
    }

    async fn receive_reply(&mut self, stage: &'static str) -> Result<Reply> {
        let limits = self.config.reply_limits();
        let timeout = self.config.reply_timeout();
        let stream = self.stream.as_mut().ok_or(FtpClientError::NotConnected)?;

        let result = match tokio::time::timeout(timeout, read_reply(stream, limits)).await {
            Ok(result) => result,
            Err(_) => Err(ReplyError::TimedOut(stage)),
        };

        match result {
            Ok(reply) => {
                debug!("<- {}", reply);
                Ok(reply)
            }
            Err(e) => {
                // lock-step is lost once a reply cannot be read
                self.teardown(stage);
                Err(e.into())
            }
        }
    }

    fn check_closing(&mut self, reply: Reply) -> Result<Reply> {
        if reply.is_closing() {
            warn!("Server is closing the control connection: {}", reply);
            self.teardown("closing reply");
            return Err(FtpClientError::UnexpectedDisconnect(Some(reply)));
        }
        Ok(reply)
    }

    /// Drops the control connection and forgets all session state.
    fn teardown(&mut self, reason: &str) {
        if self.stream.take().is_some() {
            info!("Control connection closed ({})", reason);
        }
        self.state.reset();
    }
}
