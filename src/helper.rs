//! Helper utilities for Socksrelay
//!
//! This module provides common utility functions used throughout the application.

use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Default buffer size for IO operations
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Default destination connect timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default relay idle timeout in seconds
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 60;

/// Read until `buf` is full or the peer reaches EOF
///
/// Unlike `read_exact`, EOF is not an error: the number of bytes actually
/// read is returned so callers can tell an empty stream from a truncated one.
pub async fn read_full<S>(stream: &mut S, buf: &mut [u8]) -> io::Result<usize>
where
    S: AsyncRead + Unpin + ?Sized,
{
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..]).await? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

/// Lowercase hex rendering for debug logs
pub fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
