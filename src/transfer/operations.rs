//! Transfer operations
//!
//! Drives one RETR, STOR, NLST or LIST exchange from PORT negotiation to
//! the closing reply.
//!
//! ```text
//! Idle -> PortNegotiated -> CommandIssued -> Rejected
//!                                         -> AwaitingData -> Transferring -> Finalizing -> Completed
//!                                                                                       -> Failed
//! ```
//!
//! Whenever the data side is abandoned after the server accepted the data
//! command, the pending reply is still read so the control connection
//! stays in lock-step.

use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::client::ControlSession;
use crate::error::{FtpClientError, Result};
use crate::protocol::{Command, Reply};
use crate::transfer::file_ops::{
    TransferSink, probe_destination, probe_source, receive_into, send_from,
};
use crate::transfer::{ActiveDataChannel, TransferKind, TransferSummary};
use crate::utils::validation::require_argument;

/// Progress of a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    Idle,
    PortNegotiated,
    CommandIssued,
    Rejected,
    AwaitingData,
    Transferring,
    Finalizing,
    Completed,
    Failed,
}

/// One data transfer over an active-mode data connection
#[derive(Debug)]
pub struct TransferOperation {
    kind: TransferKind,
    remote: Option<String>,
    local: Option<PathBuf>,
    state: TransferState,
}

impl TransferOperation {
    /// RETR `remote` into `local`
    pub fn download(remote: &str, local: &Path) -> Self {
        Self::new(TransferKind::Retrieve, Some(remote), Some(local))
    }

    /// STOR `local` as `remote`
    pub fn upload(local: &Path, remote: &str) -> Self {
        Self::new(TransferKind::Store, Some(remote), Some(local))
    }

    /// NLST, into `local` or into memory
    pub fn list(remote: Option<&str>, local: Option<&Path>) -> Self {
        Self::new(TransferKind::List, remote, local)
    }

    /// LIST, into `local` or into memory
    pub fn list_long(remote: Option<&str>, local: Option<&Path>) -> Self {
        Self::new(TransferKind::ListLong, remote, local)
    }

    fn new(kind: TransferKind, remote: Option<&str>, local: Option<&Path>) -> Self {
        Self {
            kind,
            remote: remote.map(str::to_string),
            local: local.map(Path::to_path_buf),
            state: TransferState::Idle,
        }
    }

    pub fn kind(&self) -> TransferKind {
        self.kind
    }

    pub fn state(&self) -> TransferState {
        self.state
    }

    fn advance(&mut self, next: TransferState) {
        debug!("{:?} transfer: {:?} -> {:?}", self.kind, self.state, next);
        self.state = next;
    }

    fn data_command(&self) -> Result<Command> {
        let remote = self.remote.as_deref();
        Ok(match self.kind {
            TransferKind::Retrieve => {
                Command::RETR(require_argument("remote file", remote.unwrap_or(""))?)
            }
            TransferKind::Store => {
                Command::STOR(require_argument("remote file", remote.unwrap_or(""))?)
            }
            TransferKind::List => Command::NLST(optional_argument(remote)?),
            TransferKind::ListLong => Command::LIST(optional_argument(remote)?),
        })
    }

    /// The server finished the command without opening a data connection.
    fn empty_summary(&self, reply: Reply) -> TransferSummary {
        TransferSummary {
            kind: self.kind,
            bytes: 0,
            elapsed: Duration::ZERO,
            reply,
            listing: (self.kind.is_inbound() && self.local.is_none()).then(Vec::new),
        }
    }

    /// Runs the transfer to completion on `session`.
    pub async fn execute(mut self, session: &mut ControlSession) -> Result<TransferSummary> {
        if !session.is_connected() {
            return Err(FtpClientError::NotConnected);
        }
        let command = self.data_command()?;

        let result = if self.kind.is_inbound() {
            self.run_inbound(session, command).await
        } else {
            self.run_upload(session, command).await
        };

        match &result {
            Ok(summary) => {
                self.advance(TransferState::Completed);
                info!(
                    "{:?} complete: {} bytes in {:.2}s ({:.2} KB/s)",
                    self.kind,
                    summary.bytes,
                    summary.elapsed_secs(),
                    summary.throughput_kbps()
                );
            }
            Err(e @ FtpClientError::ProtocolRejected { .. }) => {
                if self.state != TransferState::Rejected {
                    self.advance(TransferState::Rejected);
                }
                info!("{:?} transfer rejected: {}", self.kind, e);
            }
            Err(e) => {
                self.advance(TransferState::Failed);
                warn!("{:?} transfer failed: {}", self.kind, e);
            }
        }
        result
    }

    async fn run_inbound(
        &mut self,
        session: &mut ControlSession,
        command: Command,
    ) -> Result<TransferSummary> {
        let chunk_size = session.config().chunk_size;

        let channel = ActiveDataChannel::negotiate(session).await?;
        self.advance(TransferState::PortNegotiated);

        let reply = session.send_command(&command).await?;
        self.advance(TransferState::CommandIssued);

        if reply.is_success() {
            channel.close();
            return Ok(self.empty_summary(reply));
        }
        if !reply.is_preliminary() {
            channel.close();
            self.advance(TransferState::Rejected);
            return Err(FtpClientError::rejected(command.name(), reply));
        }
        self.advance(TransferState::AwaitingData);

        let mut sink = match &self.local {
            Some(path) => match probe_destination(path).await {
                Ok(file) => TransferSink::file(path, file),
                Err(e) => {
                    // refuse the data connection; the server answers on the control channel
                    channel.close();
                    drain_reply(session, &e).await?;
                    return Err(e);
                }
            },
            None => TransferSink::buffer(),
        };

        let mut data = match channel.accept().await {
            Ok(stream) => stream,
            Err(e) => {
                drain_reply(session, &e).await?;
                return Err(e);
            }
        };
        self.advance(TransferState::Transferring);

        let start = Instant::now();
        let received = receive_into(&mut data, &mut sink, chunk_size).await;
        let elapsed = start.elapsed();
        drop(data);
        self.advance(TransferState::Finalizing);

        let bytes = match received {
            Ok(bytes) => bytes,
            Err(e) => {
                drain_reply(session, &e).await?;
                return Err(e);
            }
        };

        let reply = session.read_reply().await?;
        if reply.is_failure() {
            return Err(FtpClientError::rejected(command.name(), reply));
        }

        Ok(TransferSummary {
            kind: self.kind,
            bytes,
            elapsed,
            reply,
            listing: sink.into_buffer(),
        })
    }

    async fn run_upload(
        &mut self,
        session: &mut ControlSession,
        command: Command,
    ) -> Result<TransferSummary> {
        let chunk_size = session.config().chunk_size;
        let path = self
            .local
            .clone()
            .ok_or_else(|| FtpClientError::InvalidArgument("local file is required".into()))?;

        // checked before anything goes on the wire
        let mut file = probe_source(&path).await?;

        let channel = ActiveDataChannel::negotiate(session).await?;
        self.advance(TransferState::PortNegotiated);

        let reply = session.send_command(&command).await?;
        self.advance(TransferState::CommandIssued);

        if reply.is_success() {
            channel.close();
            return Ok(self.empty_summary(reply));
        }
        if !reply.is_preliminary() {
            channel.close();
            self.advance(TransferState::Rejected);
            return Err(FtpClientError::rejected(command.name(), reply));
        }
        self.advance(TransferState::AwaitingData);

        let mut data = match channel.accept().await {
            Ok(stream) => stream,
            Err(e) => {
                drain_reply(session, &e).await?;
                return Err(e);
            }
        };
        self.advance(TransferState::Transferring);

        let start = Instant::now();
        let sent = send_from(&mut file, &path, &mut data, chunk_size).await;
        let elapsed = start.elapsed();
        drop(data);
        self.advance(TransferState::Finalizing);

        let bytes = match sent {
            Ok(bytes) => bytes,
            Err(e) => {
                drain_reply(session, &e).await?;
                return Err(e);
            }
        };

        let reply = session.read_reply().await?;
        if reply.is_failure() {
            return Err(FtpClientError::rejected(command.name(), reply));
        }

        Ok(TransferSummary {
            kind: self.kind,
            bytes,
            elapsed,
            reply,
            listing: None,
        })
    }
}

fn optional_argument(remote: Option<&str>) -> Result<Option<String>> {
    match remote {
        Some(name) if !name.trim().is_empty() => Ok(Some(require_argument("remote path", name)?)),
        _ => Ok(None),
    }
}

/// Reads and discards the reply the server sends after an abandoned data
/// connection.
///
/// Any error here has torn the session down and takes precedence over
/// `cause`, so a closed session is never reported as recoverable.
async fn drain_reply(session: &mut ControlSession, cause: &FtpClientError) -> Result<()> {
    if !session.is_connected() {
        return Ok(());
    }
    match session.read_reply().await {
        Ok(reply) => {
            debug!("Discarded reply after aborted transfer ({}): {}", cause, reply);
            Ok(())
        }
        Err(e) => {
            warn!("Session lost after aborted transfer ({}): {}", cause, e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    #[test]
    fn data_commands() {
        let op = TransferOperation::download("a.txt", Path::new("b.txt"));
        assert_eq!(op.data_command().unwrap(), Command::RETR("a.txt".into()));

        let op = TransferOperation::upload(Path::new("b.txt"), "a.txt");
        assert_eq!(op.data_command().unwrap(), Command::STOR("a.txt".into()));

        let op = TransferOperation::list(None, None);
        assert_eq!(op.data_command().unwrap(), Command::NLST(None));

        let op = TransferOperation::list_long(Some("pub"), None);
        assert_eq!(op.data_command().unwrap(), Command::LIST(Some("pub".into())));
    }

    #[test]
    fn empty_remote_name_is_rejected() {
        let op = TransferOperation::download("", Path::new("b.txt"));
        assert!(matches!(
            op.data_command(),
            Err(FtpClientError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn execute_requires_connection() {
        let mut session = ControlSession::new(ClientConfig::default());
        let op = TransferOperation::download("a.txt", Path::new("b.txt"));
        assert_eq!(op.state(), TransferState::Idle);
        assert!(matches!(
            op.execute(&mut session).await,
            Err(FtpClientError::NotConnected)
        ));
    }
}
