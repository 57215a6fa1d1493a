//! Per-connection SOCKS5 pipeline
//!
//! Runs method negotiation, the CONNECT request and the relay in order on a
//! single accepted client socket.

use crate::error::{RelayError, RelayResult};
use crate::socks::auth::negotiate_method;
use crate::socks::command::send_failure;
use crate::socks::connect::{negotiate, NegotiationFailure};
use crate::socks::context::RelayContext;
use crate::socks::tcp_relay::{run_session, RelaySummary};
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::Instant;
use tracing::debug;

/// Handle SOCKS5 on an accepted client stream
///
/// # Protocol Flow
///
/// 1. Method negotiation (always "no authentication")
/// 2. Connection request and destination connect
/// 3. Bidirectional relay until EOF, error or idle timeout
///
/// If the request phase fails with a reportable error, a 10-byte failure
/// reply is written on a best-effort basis. The client socket, and the
/// target socket if one was opened, are closed before this returns.
pub async fn handle_client<S>(
    mut stream: S,
    client_addr: SocketAddr,
    ctx: &RelayContext,
) -> RelayResult<RelaySummary>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let config = &ctx.config;
    // Handshake and request share one deadline.
    let deadline = Instant::now() + config.request_timeout();

    let greeting = tokio::time::timeout_at(
        deadline,
        negotiate_method(&mut stream, &config.socks),
    )
    .await
    .map_err(|_| RelayError::Timeout("reading handshake".to_string()))??;

    debug!(
        "Handshake with {} complete, {} method(s) offered",
        client_addr,
        greeting.methods.len()
    );

    let session = match negotiate(stream, client_addr, ctx, deadline).await {
        Ok(session) => session,
        Err(NegotiationFailure { error, mut client }) => {
            if let Some(code) = error.failure_reply() {
                if let Err(e) = send_failure(&mut client, code).await {
                    debug!("Failed to send failure reply to {}: {}", client_addr, e);
                }
            }
            return Err(error);
        }
    };

    run_session(session, config.idle_timeout(), config.buffer_size).await
}
