//! Client operations
//!
//! The operations a caller performs on a connected session. Each returns
//! the server reply or a transfer summary and never prints.

use log::info;
use std::path::Path;

use crate::client::ControlSession;
use crate::error::{FtpClientError, Result};
use crate::protocol::responses::OK;
use crate::protocol::{Command, Reply};
use crate::transfer::{TransferOperation, TransferSummary, TransferType};
use crate::utils::validation::require_argument;

impl ControlSession {
    /// Sends a command that has no data connection; 4xx/5xx become
    /// `ProtocolRejected`.
    async fn run_simple(&mut self, command: Command) -> Result<Reply> {
        let reply = self.send_command(&command).await?;
        if reply.is_failure() {
            return Err(FtpClientError::rejected(command.name(), reply));
        }
        Ok(reply)
    }

    /// CWD
    pub async fn change_directory(&mut self, path: &str) -> Result<Reply> {
        self.ensure_connected()?;
        let path = require_argument("remote directory", path)?;
        self.run_simple(Command::CWD(path)).await
    }

    /// MKD
    pub async fn make_directory(&mut self, path: &str) -> Result<Reply> {
        self.ensure_connected()?;
        let path = require_argument("remote directory", path)?;
        self.run_simple(Command::MKD(path)).await
    }

    /// XPWD
    pub async fn print_working_directory(&mut self) -> Result<Reply> {
        self.run_simple(Command::XPWD).await
    }

    /// DELE
    pub async fn delete(&mut self, name: &str) -> Result<Reply> {
        self.ensure_connected()?;
        let name = require_argument("remote file", name)?;
        self.run_simple(Command::DELE(name)).await
    }

    /// RNFR followed by RNTO. RNTO is not sent when RNFR is refused.
    pub async fn rename(&mut self, from: &str, to: &str) -> Result<Reply> {
        self.ensure_connected()?;
        let from = require_argument("from name", from)?;
        let to = require_argument("to name", to)?;
        self.run_simple(Command::RNFR(from)).await?;
        self.run_simple(Command::RNTO(to)).await
    }

    /// TYPE A / TYPE I. The session's transfer type changes only on `200`.
    pub async fn set_mode(&mut self, transfer_type: TransferType) -> Result<Reply> {
        let reply = self
            .run_simple(Command::TYPE(transfer_type.type_code()))
            .await?;
        if reply.code() == OK {
            info!("Transfer type set to {}", transfer_type);
            self.state_mut().set_transfer_type(transfer_type);
        }
        Ok(reply)
    }

    /// RETR `remote` into the local file `local`
    pub async fn download(&mut self, remote: &str, local: &Path) -> Result<TransferSummary> {
        TransferOperation::download(remote, local).execute(self).await
    }

    /// STOR the local file `local` as `remote`
    pub async fn upload(&mut self, local: &Path, remote: &str) -> Result<TransferSummary> {
        TransferOperation::upload(local, remote).execute(self).await
    }

    /// NLST; without `local` the listing is returned in the summary
    pub async fn list(
        &mut self,
        remote: Option<&str>,
        local: Option<&Path>,
    ) -> Result<TransferSummary> {
        TransferOperation::list(remote, local).execute(self).await
    }

    /// LIST; without `local` the listing is returned in the summary
    pub async fn list_long(
        &mut self,
        remote: Option<&str>,
        local: Option<&Path>,
    ) -> Result<TransferSummary> {
        TransferOperation::list_long(remote, local).execute(self).await
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(FtpClientError::NotConnected)
        }
    }
}
