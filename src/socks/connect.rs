//! CONNECT negotiation
//!
//! Reads the connection request, opens the destination socket and answers
//! the client. A successful negotiation yields a [`Session`] that owns both
//! sockets.

use crate::error::{RelayError, RelayResult};
use crate::socks::command::{read_request, send_success};
use crate::socks::context::RelayContext;
use crate::socks::types::{ConnectionRequest, SocksCommand};
use crate::transport::connect_with_timeout;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::Instant as Deadline;
use tracing::{debug, info, warn};

/// A negotiated client/target pair
///
/// Owns both sockets exclusively; dropping the session closes them.
#[derive(Debug)]
pub struct Session<C, T = TcpStream> {
    /// Client-side socket
    pub client: C,
    /// Destination-side socket
    pub target: T,
    /// Client peer address
    pub client_addr: SocketAddr,
    /// Request that produced this session
    pub request: ConnectionRequest,
    /// When the session was established
    pub started_at: Instant,
}

impl<C, T> Session<C, T> {
    /// Create a session from two connected sockets
    pub fn new(
        client: C,
        target: T,
        client_addr: SocketAddr,
        request: ConnectionRequest,
    ) -> Self {
        Session {
            client,
            target,
            client_addr,
            request,
            started_at: Instant::now(),
        }
    }
}

/// A failed negotiation
///
/// Hands the client socket back so the caller can attempt a failure reply.
/// Any destination socket opened during the attempt is already closed.
#[derive(Debug)]
pub struct NegotiationFailure<C> {
    /// Why negotiation failed
    pub error: RelayError,
    /// The still-open client socket
    pub client: C,
}

/// Run the request phase on a client that has completed method negotiation
///
/// # Protocol Flow
///
/// 1. Read one request frame before `deadline`
/// 2. Decode it (optionally rejecting non-CONNECT commands)
/// 3. Connect to the destination within the connect timeout
/// 4. Send the 10-byte success reply
pub async fn negotiate<C>(
    mut client: C,
    client_addr: SocketAddr,
    ctx: &RelayContext,
    deadline: Deadline,
) -> Result<Session<C>, NegotiationFailure<C>>
where
    C: AsyncRead + AsyncWrite + Unpin,
{
    match open_target(&mut client, ctx, deadline).await {
        Ok((request, target)) => Ok(Session::new(client, target, client_addr, request)),
        Err(error) => Err(NegotiationFailure { error, client }),
    }
}

async fn open_target<C>(
    client: &mut C,
    ctx: &RelayContext,
    deadline: Deadline,
) -> RelayResult<(ConnectionRequest, TcpStream)>
where
    C: AsyncRead + AsyncWrite + Unpin,
{
    let config = &ctx.config;

    let request = tokio::time::timeout_at(deadline, read_request(client))
        .await
        .map_err(|_| RelayError::Timeout("reading connection request".to_string()))??;

    info!("SOCKS5 request: {}", request);

    if config.socks.connect_only && request.command != SocksCommand::Connect {
        warn!("Rejecting {} request", request.command);
        return Err(RelayError::CommandNotSupported(request.command.to_byte()));
    }

    let target = connect_with_timeout(
        &request.address,
        request.port,
        config.connect_timeout(),
        &ctx.socket_opts,
    )
    .await
    .map_err(|source| RelayError::DestinationUnreachable {
        target: request.target(),
        source,
    })?;

    info!("Connected to target {}", request.target());

    let bound = bound_addr(&target, ctx);
    // `target` is dropped (closed) if the reply cannot be written.
    send_success(client, bound).await?;

    debug!("Sent success reply, bound {}", bound);

    Ok((request, target))
}

/// Address reported in the success reply
fn bound_addr(target: &TcpStream, ctx: &RelayContext) -> SocketAddrV4 {
    if !ctx.config.report_bound_addr {
        return ctx.default_bound_addr();
    }
    match target.local_addr() {
        Ok(SocketAddr::V4(addr)) => addr,
        Ok(SocketAddr::V6(addr)) => SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, addr.port()),
        Err(_) => ctx.default_bound_addr(),
    }
}
