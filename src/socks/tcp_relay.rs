//! Bidirectional relay for an established session
//!
//! Copies bytes between the client and target sockets until either side
//! closes, a socket fails, or neither side produces data for the idle
//! window. There is no half-close continuation: the first EOF ends the
//! whole session.

use crate::error::RelayResult;
use crate::socks::connect::Session;
use std::fmt;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

/// Why a relay session ended without a socket error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Client sent EOF
    ClientClosed,
    /// Target sent EOF
    TargetClosed,
    /// No data from either side within the idle window
    IdleTimeout,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::ClientClosed => write!(f, "client closed"),
            Termination::TargetClosed => write!(f, "target closed"),
            Termination::IdleTimeout => write!(f, "idle timeout"),
        }
    }
}

/// Traffic and outcome of a finished session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaySummary {
    /// Bytes forwarded client -> target
    pub client_to_target: u64,
    /// Bytes forwarded target -> client
    pub target_to_client: u64,
    /// Session lifetime
    pub duration: Duration,
    /// How the session ended
    pub reason: Termination,
}

enum Ready {
    Client(std::io::Result<usize>),
    Target(std::io::Result<usize>),
}

/// Relay a session to completion
///
/// Both sockets are owned by the session and are closed before this
/// returns, whichever way the loop ends. `idle_timeout` bounds both the wait
/// for data and each forwarding write, so a peer that stops reading cannot
/// hold the session open.
pub async fn run_session<C, T>(
    session: Session<C, T>,
    idle_timeout: Duration,
    buffer_size: usize,
) -> RelayResult<RelaySummary>
where
    C: AsyncRead + AsyncWrite + Unpin,
    T: AsyncRead + AsyncWrite + Unpin,
{
    let Session {
        mut client,
        mut target,
        client_addr,
        request,
        started_at,
    } = session;

    let mut client_to_target = 0u64;
    let mut target_to_client = 0u64;

    let result = relay_loop(
        &mut client,
        &mut target,
        idle_timeout,
        buffer_size,
        &mut client_to_target,
        &mut target_to_client,
    )
    .await;

    drop(client);
    drop(target);

    let duration = started_at.elapsed();

    match result {
        Ok(reason) => {
            info!(
                "Session {} -> {} ended ({}): {} bytes up, {} bytes down in {:?}",
                client_addr,
                request.target(),
                reason,
                client_to_target,
                target_to_client,
                duration
            );
            Ok(RelaySummary {
                client_to_target,
                target_to_client,
                duration,
                reason,
            })
        }
        Err(e) => {
            debug!(
                "Session {} -> {} failed after {:?}: {}",
                client_addr,
                request.target(),
                duration,
                e
            );
            Err(e.into())
        }
    }
}

async fn relay_loop<C, T>(
    client: &mut C,
    target: &mut T,
    idle_timeout: Duration,
    buffer_size: usize,
    client_to_target: &mut u64,
    target_to_client: &mut u64,
) -> std::io::Result<Termination>
where
    C: AsyncRead + AsyncWrite + Unpin,
    T: AsyncRead + AsyncWrite + Unpin,
{
    let mut client_buf = vec![0u8; buffer_size];
    let mut target_buf = vec![0u8; buffer_size];

    loop {
        let ready = tokio::time::timeout(idle_timeout, async {
            tokio::select! {
                r = client.read(&mut client_buf) => Ready::Client(r),
                r = target.read(&mut target_buf) => Ready::Target(r),
            }
        })
        .await;

        match ready {
            Err(_) => return Ok(Termination::IdleTimeout),
            Ok(Ready::Client(r)) => {
                let n = r?;
                if n == 0 {
                    return Ok(Termination::ClientClosed);
                }
                if !write_chunk(target, &client_buf[..n], idle_timeout).await? {
                    return Ok(Termination::IdleTimeout);
                }
                *client_to_target += n as u64;
                debug!("Forwarded {} bytes to target", n);
            }
            Ok(Ready::Target(r)) => {
                let n = r?;
                if n == 0 {
                    return Ok(Termination::TargetClosed);
                }
                if !write_chunk(client, &target_buf[..n], idle_timeout).await? {
                    return Ok(Termination::IdleTimeout);
                }
                *target_to_client += n as u64;
                debug!("Forwarded {} bytes to client", n);
            }
        }
    }
}

/// Write and flush one chunk; `false` if it did not complete within `limit`
async fn write_chunk<W>(dst: &mut W, data: &[u8], limit: Duration) -> std::io::Result<bool>
where
    W: AsyncWrite + Unpin,
{
    let write = async {
        dst.write_all(data).await?;
        dst.flush().await
    };
    match tokio::time::timeout(limit, write).await {
        Ok(result) => result.map(|_| true),
        Err(_) => Ok(false),
    }
}
