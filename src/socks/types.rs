//! SOCKS5 type definitions
//!
//! Defines the core types used in SOCKS5 protocol handling.

use super::consts::*;
use std::fmt;

/// SOCKS5 command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocksCommand {
    /// TCP CONNECT - establish a TCP connection to target
    Connect,
    /// TCP BIND (not implemented)
    Bind,
    /// UDP ASSOCIATE (not implemented)
    UdpAssociate,
    /// Any other command byte
    Unknown(u8),
}

impl SocksCommand {
    /// Parse a command byte into SocksCommand
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            SOCKS5_CMD_TCP_CONNECT => SocksCommand::Connect,
            SOCKS5_CMD_TCP_BIND => SocksCommand::Bind,
            SOCKS5_CMD_UDP_ASSOCIATE => SocksCommand::UdpAssociate,
            other => SocksCommand::Unknown(other),
        }
    }

    /// Convert SocksCommand to byte
    pub fn to_byte(self) -> u8 {
        match self {
            SocksCommand::Connect => SOCKS5_CMD_TCP_CONNECT,
            SocksCommand::Bind => SOCKS5_CMD_TCP_BIND,
            SocksCommand::UdpAssociate => SOCKS5_CMD_UDP_ASSOCIATE,
            SocksCommand::Unknown(byte) => byte,
        }
    }
}

impl fmt::Display for SocksCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocksCommand::Connect => write!(f, "CONNECT"),
            SocksCommand::Bind => write!(f, "BIND"),
            SocksCommand::UdpAssociate => write!(f, "UDP ASSOCIATE"),
            SocksCommand::Unknown(byte) => write!(f, "UNKNOWN(0x{:02x})", byte),
        }
    }
}

/// Destination address encoding selected by ATYP
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressType {
    /// 4-byte IPv4 address
    IPv4,
    /// Length-prefixed host name
    DomainName,
    /// 16-byte IPv6 address
    IPv6,
}

impl AddressType {
    /// Parse an ATYP byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            SOCKS5_ADDR_TYPE_IPV4 => Some(AddressType::IPv4),
            SOCKS5_ADDR_TYPE_DOMAIN => Some(AddressType::DomainName),
            SOCKS5_ADDR_TYPE_IPV6 => Some(AddressType::IPv6),
            _ => None,
        }
    }
}

/// Decoded SOCKS5 connection request
///
/// `address` is a dotted quad, a bare host name or an IPv6 literal,
/// consistent with `address_type`. `raw_length` is the number of bytes the
/// request occupied on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRequest {
    /// Requested command (not validated by the parser)
    pub command: SocksCommand,
    /// Address encoding
    pub address_type: AddressType,
    /// Destination host in textual form
    pub address: String,
    /// Destination port, host order
    pub port: u16,
    /// Bytes consumed by the request
    pub raw_length: usize,
}

impl ConnectionRequest {
    /// `host:port` form used in logs and errors; IPv6 hosts are bracketed
    pub fn target(&self) -> String {
        match self.address_type {
            AddressType::IPv6 => format!("[{}]:{}", self.address, self.port),
            _ => format!("{}:{}", self.address, self.port),
        }
    }
}

impl fmt::Display for ConnectionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.command, self.target())
    }
}
