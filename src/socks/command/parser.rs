//! SOCKS5 request parser
//!
//! Decodes connection requests from the client.

use crate::error::{RelayError, RelayResult};
use crate::helper::read_full;
use crate::socks::consts::*;
use crate::socks::types::{AddressType, ConnectionRequest, SocksCommand};
use std::net::{Ipv4Addr, Ipv6Addr};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Decode a SOCKS5 request from a byte buffer
///
/// # SOCKS5 Request Format
///
/// ```text
/// +----+-----+-------+------+----------+----------+
/// |VER | CMD |  RSV  | ATYP | DST.ADDR | DST.PORT |
/// +----+-----+-------+------+----------+----------+
/// | 1  |  1  | X'00' |  1   | Variable |    2     |
/// +----+-----+-------+------+----------+----------+
/// ```
///
/// `VER`, `CMD` and `RSV` are not validated. Trailing bytes past the
/// request are ignored; `raw_length` reports where the request ends.
pub fn parse_request(data: &[u8]) -> RelayResult<ConnectionRequest> {
    if data.len() < REQUEST_HEADER_LEN + 1 {
        return Err(truncated(data.len(), REQUEST_HEADER_LEN + 1));
    }

    let command = SocksCommand::from_byte(data[1]);
    let atyp = data[3];
    let address_type = AddressType::from_byte(atyp).ok_or_else(|| {
        RelayError::MalformedRequest(format!("unsupported address type: {}", atyp))
    })?;

    let (address, port_offset) = match address_type {
        AddressType::IPv4 => {
            if data.len() < IPV4_REQUEST_LEN {
                return Err(truncated(data.len(), IPV4_REQUEST_LEN));
            }
            let octets: [u8; 4] = [data[4], data[5], data[6], data[7]];
            (Ipv4Addr::from(octets).to_string(), 8)
        }
        AddressType::DomainName => {
            let len = data[4] as usize;
            let needed = 5 + len + 2;
            if data.len() < needed {
                return Err(truncated(data.len(), needed));
            }
            let name = &data[5..5 + len];
            if !name.is_ascii() {
                return Err(RelayError::MalformedRequest(
                    "domain name is not ASCII".to_string(),
                ));
            }
            (String::from_utf8_lossy(name).into_owned(), 5 + len)
        }
        AddressType::IPv6 => {
            if data.len() < IPV6_REQUEST_LEN {
                return Err(truncated(data.len(), IPV6_REQUEST_LEN));
            }
            let mut octets = [0u8; 16];
            octets.copy_from_slice(&data[4..20]);
            (Ipv6Addr::from(octets).to_string(), 20)
        }
    };

    let port = u16::from_be_bytes([data[port_offset], data[port_offset + 1]]);

    Ok(ConnectionRequest {
        command,
        address_type,
        address,
        port,
        raw_length: port_offset + 2,
    })
}

/// Read exactly one request frame from the stream and decode it
///
/// Only the bytes belonging to the request are consumed. EOF before the
/// first byte yields `NoRequestData`; EOF inside the frame or an unknown
/// address type yields `MalformedRequest`.
pub async fn read_request<S>(stream: &mut S) -> RelayResult<ConnectionRequest>
where
    S: AsyncRead + Unpin,
{
    let mut frame = vec![0u8; REQUEST_HEADER_LEN];
    let n = read_full(stream, &mut frame).await?;
    if n == 0 {
        return Err(RelayError::NoRequestData);
    }
    if n < REQUEST_HEADER_LEN {
        return Err(truncated(n, REQUEST_HEADER_LEN));
    }

    let remaining = match AddressType::from_byte(frame[3]) {
        Some(AddressType::IPv4) => IPV4_REQUEST_LEN - REQUEST_HEADER_LEN,
        Some(AddressType::IPv6) => IPV6_REQUEST_LEN - REQUEST_HEADER_LEN,
        Some(AddressType::DomainName) => {
            let len = match stream.read_u8().await {
                Ok(len) => len,
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    return Err(truncated(frame.len(), frame.len() + 1));
                }
                Err(e) => return Err(e.into()),
            };
            frame.push(len);
            len as usize + 2
        }
        None => {
            return Err(RelayError::MalformedRequest(format!(
                "unsupported address type: {}",
                frame[3]
            )))
        }
    };

    let start = frame.len();
    frame.resize(start + remaining, 0);
    let n = read_full(stream, &mut frame[start..]).await?;
    frame.truncate(start + n);

    let request = parse_request(&frame)?;

    tracing::debug!("Parsed SOCKS5 request: {}", request);

    Ok(request)
}

fn truncated(got: usize, needed: usize) -> RelayError {
    RelayError::MalformedRequest(format!(
        "truncated request: {} bytes, need {}",
        got, needed
    ))
}
