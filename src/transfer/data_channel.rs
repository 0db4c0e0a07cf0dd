//! Module `data_channel`
//!
//! Active-mode data connections: announces a local port with PORT, listens
//! on it and accepts the single connection the server opens back for one
//! transfer.

use log::{debug, info, warn};
use rand::Rng;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::ops::RangeInclusive;
use std::time::Duration;
use tokio::net::{TcpListener, TcpSocket, TcpStream};

use crate::client::ControlSession;
use crate::error::{ConnectionError, FtpClientError, Result};
use crate::protocol::Command;
use crate::protocol::responses::OK;
use crate::utils::network::active_mode_ip;

/// Formats the PORT argument `h1,h2,h3,h4,p1,p2`.
pub fn format_port_argument(ip: Ipv4Addr, port: u16) -> String {
    let [h1, h2, h3, h4] = ip.octets();
    format!("{},{},{},{},{},{}", h1, h2, h3, h4, port / 256, port % 256)
}

/// Picks a pseudo-random data port from `range`.
pub fn pick_data_port(range: RangeInclusive<u16>) -> u16 {
    rand::rng().random_range(range)
}

/// A listening socket announced to the server with PORT.
///
/// Lives for one transfer. `accept` consumes it, and dropping it without
/// accepting closes the listener, so the socket is released on every path.
#[derive(Debug)]
pub struct ActiveDataChannel {
    listener: TcpListener,
    local_addr: SocketAddr,
    accept_timeout: Duration,
}

impl ActiveDataChannel {
    /// Negotiates a data port on a random port from the configured range.
    pub async fn negotiate(session: &mut ControlSession) -> Result<Self> {
        let port = pick_data_port(session.config().data_port_range());
        Self::negotiate_on_port(session, port).await
    }

    /// Sends PORT for `port` on the control socket's local address and, once
    /// the server answers `200`, starts listening there.
    ///
    /// Nothing is bound if the server refuses the PORT command.
    pub async fn negotiate_on_port(session: &mut ControlSession, port: u16) -> Result<Self> {
        let local_ip = active_mode_ip(session.local_addr()?.ip())?;

        let reply = session
            .send_command(&Command::PORT(format_port_argument(local_ip, port)))
            .await?;
        if reply.code() != OK {
            warn!("PORT {} refused: {}", port, reply);
            return Err(FtpClientError::rejected("PORT", reply));
        }

        let local_addr = SocketAddr::new(IpAddr::V4(local_ip), port);
        let listener = bind_listener(local_addr)?;
        debug!("Listening for data connection on {}", local_addr);

        Ok(Self {
            listener,
            local_addr,
            accept_timeout: session.config().data_accept_timeout(),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Waits for the server to connect back, up to the accept timeout.
    ///
    /// The listener is closed before this returns, whatever the outcome.
    pub async fn accept(self) -> Result<TcpStream> {
        let Self {
            listener,
            local_addr,
            accept_timeout,
        } = self;

        let result = tokio::time::timeout(accept_timeout, listener.accept()).await;
        drop(listener);

        match result {
            Ok(Ok((stream, peer_addr))) => {
                info!(
                    "Data connection accepted from {} on {}",
                    peer_addr, local_addr
                );
                Ok(stream)
            }
            Ok(Err(e)) => {
                warn!("Failed to accept data connection on {}: {}", local_addr, e);
                Err(ConnectionError::AcceptFailed(e).into())
            }
            Err(_) => {
                warn!(
                    "No data connection on {} within {:?}",
                    local_addr, accept_timeout
                );
                Err(ConnectionError::TimedOut("accept data connection").into())
            }
        }
    }

    /// Closes the listener without accepting.
    pub fn close(self) {
        debug!("Closing data listener on {}", self.local_addr);
    }
}

/// Binds a listener with a backlog of one; only the server's single data
/// connection is expected.
fn bind_listener(addr: SocketAddr) -> Result<TcpListener> {
    let socket = TcpSocket::new_v4().map_err(|e| ConnectionError::BindFailed(addr, e))?;
    socket
        .set_reuseaddr(true)
        .map_err(|e| ConnectionError::BindFailed(addr, e))?;
    socket
        .bind(addr)
        .map_err(|e| ConnectionError::BindFailed(addr, e))?;
    let listener = socket
        .listen(1)
        .map_err(|e| ConnectionError::BindFailed(addr, e))?;
    Ok(listener)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_argument_splits_port_into_bytes() {
        assert_eq!(
            format_port_argument(Ipv4Addr::new(192, 168, 1, 5), 43981),
            "192,168,1,5,171,205"
        );
        assert_eq!(
            format_port_argument(Ipv4Addr::new(127, 0, 0, 1), 1024),
            "127,0,0,1,4,0"
        );
        assert_eq!(
            format_port_argument(Ipv4Addr::new(10, 0, 0, 1), 65535),
            "10,0,0,1,255,255"
        );
    }

    #[test]
    fn port_command_line() {
        let cmd = Command::PORT(format_port_argument(Ipv4Addr::new(192, 168, 1, 5), 43981));
        assert_eq!(cmd.to_line(), "PORT 192,168,1,5,171,205");
    }

    #[test]
    fn picked_ports_stay_in_range() {
        for _ in 0..1000 {
            let port = pick_data_port(1024..=65535);
            assert!(port >= 1024);
        }
        assert_eq!(pick_data_port(40000..=40000), 40000);
    }

    #[tokio::test]
    async fn negotiate_requires_connection() {
        let mut session = ControlSession::new(crate::config::ClientConfig::default());
        assert!(matches!(
            ActiveDataChannel::negotiate(&mut session).await,
            Err(FtpClientError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn accept_times_out_and_releases_port() {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let listener = bind_listener(addr).unwrap();
        let local_addr = listener.local_addr().unwrap();
        let channel = ActiveDataChannel {
            listener,
            local_addr,
            accept_timeout: Duration::from_millis(50),
        };

        let err = channel.accept().await.unwrap_err();
        assert!(err.is_timeout());
        assert!(TcpStream::connect(local_addr).await.is_err());
    }
}
