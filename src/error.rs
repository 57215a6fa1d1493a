//! Error types for Socksrelay
//!
//! This module defines the per-connection error kinds and the SOCKS5 reply
//! codes they map to.

use std::io;
use thiserror::Error;

/// Error raised while serving a single client connection
///
/// Every variant is local to one connection's task; none of them ever
/// reaches the accept loop.
#[derive(Error, Debug)]
pub enum RelayError {
    /// Greeting was empty or shorter than 3 bytes
    #[error("Handshake too short")]
    HandshakeTooShort,

    /// Client closed before sending a connection request
    #[error("No request data received")]
    NoRequestData,

    /// Unsupported address type or truncated request
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// Connect to the requested destination failed
    #[error("Destination {target} unreachable: {source}")]
    DestinationUnreachable {
        /// Requested destination, `host:port`
        target: String,
        /// Underlying connect/resolve error
        #[source]
        source: io::Error,
    },

    /// Peer closed in the middle of a protocol message
    #[error("Peer closed connection")]
    PeerClosed,

    /// Any other socket failure
    #[error("Socket error: {0}")]
    Socket(#[from] io::Error),

    /// A protocol phase exceeded its deadline
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Client did not offer "no authentication" (strict mode only)
    #[error("No acceptable authentication method")]
    NoAcceptableMethod,

    /// Non-CONNECT command (strict mode only)
    #[error("Command not supported: {0}")]
    CommandNotSupported(u8),
}

impl RelayError {
    /// Reply code to send to the client before teardown, if any
    ///
    /// `None` means the connection is torn down silently.
    pub fn failure_reply(&self) -> Option<ReplyCode> {
        match self {
            RelayError::MalformedRequest(_) | RelayError::DestinationUnreachable { .. } => {
                Some(ReplyCode::ConnectionRefused)
            }
            RelayError::CommandNotSupported(_) => Some(ReplyCode::CommandNotSupported),
            _ => None,
        }
    }
}

/// Result alias for connection-level operations
pub type RelayResult<T> = Result<T, RelayError>;

/// Reply codes for SOCKS5 protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReplyCode {
    /// Command succeeded
    Succeeded = 0x00,
    /// General SOCKS server failure
    GeneralFailure = 0x01,
    /// Connection not allowed by ruleset
    ConnectionNotAllowed = 0x02,
    /// Network unreachable
    NetworkUnreachable = 0x03,
    /// Host unreachable
    HostUnreachable = 0x04,
    /// Connection refused
    ConnectionRefused = 0x05,
    /// TTL expired
    TtlExpired = 0x06,
    /// Command not supported
    CommandNotSupported = 0x07,
    /// Address type not supported
    AddressTypeNotSupported = 0x08,
}

impl From<ReplyCode> for u8 {
    fn from(code: ReplyCode) -> Self {
        code as u8
    }
}

impl TryFrom<u8> for ReplyCode {
    type Error = RelayError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(ReplyCode::Succeeded),
            0x01 => Ok(ReplyCode::GeneralFailure),
            0x02 => Ok(ReplyCode::ConnectionNotAllowed),
            0x03 => Ok(ReplyCode::NetworkUnreachable),
            0x04 => Ok(ReplyCode::HostUnreachable),
            0x05 => Ok(ReplyCode::ConnectionRefused),
            0x06 => Ok(ReplyCode::TtlExpired),
            0x07 => Ok(ReplyCode::CommandNotSupported),
            0x08 => Ok(ReplyCode::AddressTypeNotSupported),
            _ => Err(RelayError::MalformedRequest(format!(
                "unknown reply code: {}",
                value
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_code_from_u8_valid() {
        assert_eq!(ReplyCode::try_from(0x00).unwrap(), ReplyCode::Succeeded);
        assert_eq!(ReplyCode::try_from(0x01).unwrap(), ReplyCode::GeneralFailure);
        assert_eq!(
            ReplyCode::try_from(0x05).unwrap(),
            ReplyCode::ConnectionRefused
        );
        assert_eq!(
            ReplyCode::try_from(0x07).unwrap(),
            ReplyCode::CommandNotSupported
        );
        assert_eq!(
            ReplyCode::try_from(0x08).unwrap(),
            ReplyCode::AddressTypeNotSupported
        );
    }

    #[test]
    fn test_reply_code_from_u8_invalid() {
        assert!(ReplyCode::try_from(0x09).is_err());
        assert!(ReplyCode::try_from(0xFF).is_err());
    }

    #[test]
    fn test_reply_code_to_u8() {
        assert_eq!(u8::from(ReplyCode::Succeeded), 0x00);
        assert_eq!(u8::from(ReplyCode::ConnectionRefused), 0x05);
        assert_eq!(u8::from(ReplyCode::CommandNotSupported), 0x07);
    }

    #[test]
    fn test_failure_reply_mapping() {
        let err = RelayError::MalformedRequest("bad atyp".to_string());
        assert_eq!(err.failure_reply(), Some(ReplyCode::ConnectionRefused));

        let err = RelayError::DestinationUnreachable {
            target: "127.0.0.1:9".to_string(),
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        };
        assert_eq!(err.failure_reply(), Some(ReplyCode::ConnectionRefused));

        let err = RelayError::CommandNotSupported(0x02);
        assert_eq!(err.failure_reply(), Some(ReplyCode::CommandNotSupported));

        assert_eq!(RelayError::HandshakeTooShort.failure_reply(), None);
        assert_eq!(RelayError::NoRequestData.failure_reply(), None);
        assert_eq!(RelayError::PeerClosed.failure_reply(), None);
        assert_eq!(RelayError::NoAcceptableMethod.failure_reply(), None);
        assert_eq!(
            RelayError::Timeout("request".to_string()).failure_reply(),
            None
        );
    }

    #[test]
    fn test_relay_error_display() {
        assert_eq!(
            format!("{}", RelayError::HandshakeTooShort),
            "Handshake too short"
        );
        assert_eq!(
            format!("{}", RelayError::MalformedRequest("atyp 2".to_string())),
            "Malformed request: atyp 2"
        );
        assert_eq!(
            format!("{}", RelayError::CommandNotSupported(0x03)),
            "Command not supported: 3"
        );

        let err = RelayError::DestinationUnreachable {
            target: "example.com:80".to_string(),
            source: io::Error::new(io::ErrorKind::TimedOut, "timed out"),
        };
        assert_eq!(
            format!("{}", err),
            "Destination example.com:80 unreachable: timed out"
        );
    }

    #[test]
    fn test_relay_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "broken");
        let err: RelayError = io_err.into();
        assert!(matches!(err, RelayError::Socket(_)));
    }
}
