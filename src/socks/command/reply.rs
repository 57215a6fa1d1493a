//! SOCKS5 reply builder
//!
//! Constructs SOCKS5 reply messages. Replies always carry an IPv4-shaped
//! bound address so they are exactly ten bytes long.

use crate::error::ReplyCode;
use crate::socks::consts::*;
use std::io;
use std::net::{Ipv4Addr, SocketAddrV4};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Build reply bytes without sending
///
/// # SOCKS5 Reply Format
///
/// ```text
/// +----+-----+-------+------+----------+----------+
/// |VER | REP |  RSV  | ATYP | BND.ADDR | BND.PORT |
/// +----+-----+-------+------+----------+----------+
/// | 1  |  1  | X'00' |  1   |    4     |    2     |
/// +----+-----+-------+------+----------+----------+
/// ```
pub fn build_reply(reply_code: ReplyCode, bind_addr: SocketAddrV4) -> [u8; REPLY_LEN] {
    let mut reply = [0u8; REPLY_LEN];
    reply[0] = SOCKS5_VERSION;
    reply[1] = reply_code.into();
    reply[2] = SOCKS5_RESERVED;
    reply[3] = SOCKS5_ADDR_TYPE_IPV4;
    reply[4..8].copy_from_slice(&bind_addr.ip().octets());
    reply[8..10].copy_from_slice(&bind_addr.port().to_be_bytes());
    reply
}

/// Build and send a SOCKS5 reply
pub async fn send_reply<S>(
    stream: &mut S,
    reply_code: ReplyCode,
    bind_addr: SocketAddrV4,
) -> io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    stream.write_all(&build_reply(reply_code, bind_addr)).await?;
    stream.flush().await
}

/// Send a success reply reporting `bind_addr`
pub async fn send_success<S>(stream: &mut S, bind_addr: SocketAddrV4) -> io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    send_reply(stream, ReplyCode::Succeeded, bind_addr).await
}

/// Send a failure reply with an unspecified bound address
pub async fn send_failure<S>(stream: &mut S, reply_code: ReplyCode) -> io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    send_reply(stream, reply_code, SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0)).await
}
