//! SOCKS5 protocol constants
//!
//! Defines the wire constants used by the relay.

/// SOCKS5 protocol version
pub const SOCKS5_VERSION: u8 = 0x05;

// Authentication methods
/// No authentication required
pub const SOCKS5_AUTH_METHOD_NONE: u8 = 0x00;
/// No acceptable methods
pub const SOCKS5_AUTH_METHOD_NOT_ACCEPTABLE: u8 = 0xFF;

// Commands
/// TCP CONNECT command
pub const SOCKS5_CMD_TCP_CONNECT: u8 = 0x01;
/// TCP BIND command (not implemented)
pub const SOCKS5_CMD_TCP_BIND: u8 = 0x02;
/// UDP ASSOCIATE command (not implemented)
pub const SOCKS5_CMD_UDP_ASSOCIATE: u8 = 0x03;

// Address types
/// IPv4 address
pub const SOCKS5_ADDR_TYPE_IPV4: u8 = 0x01;
/// Domain name
pub const SOCKS5_ADDR_TYPE_DOMAIN: u8 = 0x03;
/// IPv6 address
pub const SOCKS5_ADDR_TYPE_IPV6: u8 = 0x04;

// Reserved byte
/// Reserved byte value (always 0x00)
pub const SOCKS5_RESERVED: u8 = 0x00;

// Message sizes
/// Smallest acceptable greeting: VER NMETHODS METHOD
pub const MIN_HANDSHAKE_LEN: usize = 3;
/// Request header: VER CMD RSV ATYP
pub const REQUEST_HEADER_LEN: usize = 4;
/// Full IPv4 request length
pub const IPV4_REQUEST_LEN: usize = 10;
/// Full IPv6 request length
pub const IPV6_REQUEST_LEN: usize = 22;
/// Reply length (always IPv4-shaped)
pub const REPLY_LEN: usize = 10;
