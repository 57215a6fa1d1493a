//! Connection supervisor
//!
//! Owns the listening socket and dispatches every accepted connection to
//! its own task. Tasks share nothing but the read-only [`RelayContext`].

use crate::config::{Config, ServerConfig};
use crate::error::RelayError;
use crate::socks::{handle_client, RelayContext};
use anyhow::{anyhow, Context, Result};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Pending-connection backlog for the listener
const LISTEN_BACKLOG: u32 = 1024;

/// Pause before accepting again after running out of descriptors or memory
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Bound SOCKS5 relay server
pub struct Server {
    /// Listening socket
    listener: TcpListener,
    /// Settings shared with every connection task
    ctx: Arc<RelayContext>,
}

impl Server {
    /// Bind the listener described by `config`
    pub async fn bind(config: ServerConfig) -> Result<Self> {
        config.validate().map_err(|e| anyhow!(e))?;
        let addr = config.bind_socket_addr().map_err(|e| anyhow!(e))?;

        let socket = match addr {
            SocketAddr::V4(_) => TcpSocket::new_v4(),
            SocketAddr::V6(_) => TcpSocket::new_v6(),
        }
        .context("Failed to create listener socket")?;
        socket
            .set_reuseaddr(true)
            .context("Failed to set SO_REUSEADDR")?;
        socket
            .bind(addr)
            .with_context(|| format!("Failed to bind {}", addr))?;
        let listener = socket
            .listen(LISTEN_BACKLOG)
            .with_context(|| format!("Failed to listen on {}", addr))?;

        let local_addr = listener.local_addr()?;
        let ctx = Arc::new(RelayContext::new(config, local_addr));

        Ok(Server { listener, ctx })
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.ctx.listen_addr
    }

    /// Accept connections until shutdown or a fatal listener error
    ///
    /// Sessions already running are not interrupted by shutdown.
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<bool>) -> Result<()> {
        info!("SOCKS5 relay listening on {}", self.local_addr());

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => self.spawn_connection(stream, addr),
                        Err(e) if is_resource_exhausted(&e) => {
                            error!("Accept failed: {}, retrying in {:?}", e, ACCEPT_BACKOFF);
                            if backoff(&mut shutdown_rx).await {
                                info!("Shutdown signal received, stopping listener");
                                break;
                            }
                        }
                        Err(e) if is_transient_accept_error(&e) => {
                            warn!("Failed to accept connection: {}", e);
                        }
                        Err(e) => {
                            error!("Listener error: {}", e);
                            return Err(e).context("Listener failed");
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received, stopping listener");
                    break;
                }
            }
        }

        info!("Server stopped");
        Ok(())
    }

    fn spawn_connection(&self, stream: TcpStream, addr: SocketAddr) {
        self.ctx.socket_opts.hint(&stream);
        let ctx = self.ctx.clone();

        tokio::spawn(async move {
            info!("New connection from {}", addr);

            match handle_client(stream, addr, &ctx).await {
                Ok(summary) => debug!("Connection {} finished: {:?}", addr, summary),
                Err(e) => log_connection_error(addr, &e),
            }

            info!("Connection {} closed", addr);
        });
    }
}

fn log_connection_error(addr: SocketAddr, err: &RelayError) {
    match err {
        RelayError::DestinationUnreachable { .. }
        | RelayError::MalformedRequest(_)
        | RelayError::CommandNotSupported(_)
        | RelayError::NoAcceptableMethod => warn!("Connection {} failed: {}", addr, err),
        _ => debug!("Connection {} ended: {}", addr, err),
    }
}

/// Accept errors after which the listener is still usable
fn is_transient_accept_error(err: &io::Error) -> bool {
    is_resource_exhausted(err)
        || matches!(
            err.kind(),
            io::ErrorKind::ConnectionAborted
                | io::ErrorKind::ConnectionReset
                | io::ErrorKind::Interrupted
                | io::ErrorKind::WouldBlock
        )
}

/// Out of file descriptors, socket buffers or memory
fn is_resource_exhausted(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::OutOfMemory {
        return true;
    }
    #[cfg(unix)]
    {
        matches!(
            err.raw_os_error(),
            Some(libc::EMFILE | libc::ENFILE | libc::ENOBUFS | libc::ENOMEM)
        )
    }
    #[cfg(not(unix))]
    {
        false
    }
}

/// Sleep for [`ACCEPT_BACKOFF`]; `true` if shutdown arrived first
async fn backoff(shutdown_rx: &mut broadcast::Receiver<bool>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(ACCEPT_BACKOFF) => false,
        _ = shutdown_rx.recv() => true,
    }
}

/// Bind and run a server from a full configuration
pub async fn run_server(config: Config, shutdown_rx: broadcast::Receiver<bool>) -> Result<()> {
    let server = Server::bind(config.server).await?;
    server.run(shutdown_rx).await
}
