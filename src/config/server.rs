//! Server configuration types
//!
//! Defines the main configuration structures for the relay server.

use super::TcpConfig;
use crate::helper::{
    DEFAULT_BUFFER_SIZE, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_IDLE_TIMEOUT_SECS,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Default listen address
fn default_bind_addr() -> String {
    "127.1.1.1:1000".to_string()
}

/// Default destination connect timeout in seconds
fn default_connect_timeout() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

/// Default relay idle timeout in seconds
fn default_idle_timeout() -> u64 {
    DEFAULT_IDLE_TIMEOUT_SECS
}

/// Default handshake + request deadline in seconds
fn default_request_timeout() -> u64 {
    10
}

/// Default relay chunk size
fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

/// Root configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        self.server.validate()
    }
}

/// Relay server configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// Listen address (e.g., "127.1.1.1:1000")
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Destination connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// Relay idle timeout in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout: u64,

    /// Deadline for reading the greeting and the request, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Relay read chunk size in bytes
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Report the target socket's real local address in the success reply
    #[serde(default)]
    pub report_bound_addr: bool,

    /// SOCKS5 negotiation options
    #[serde(default)]
    pub socks: SocksConfig,

    /// TCP socket options for client and target sockets
    #[serde(default)]
    pub tcp: TcpConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: default_bind_addr(),
            connect_timeout: default_connect_timeout(),
            idle_timeout: default_idle_timeout(),
            request_timeout: default_request_timeout(),
            buffer_size: default_buffer_size(),
            report_bound_addr: false,
            socks: SocksConfig::default(),
            tcp: TcpConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Parsed listen address
    pub fn bind_socket_addr(&self) -> Result<SocketAddr, String> {
        self.bind_addr
            .parse()
            .map_err(|e| format!("Invalid bind address '{}': {}", self.bind_addr, e))
    }

    /// Destination connect timeout
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    /// Relay idle timeout
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout)
    }

    /// Handshake + request deadline
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        self.bind_socket_addr()?;
        if self.connect_timeout == 0 {
            return Err("connect_timeout must be greater than zero".to_string());
        }
        if self.idle_timeout == 0 {
            return Err("idle_timeout must be greater than zero".to_string());
        }
        if self.request_timeout == 0 {
            return Err("request_timeout must be greater than zero".to_string());
        }
        if self.buffer_size == 0 {
            return Err("buffer_size must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// SOCKS5 negotiation options
///
/// Both switches default to off, which accepts any offered method list and
/// treats every command as CONNECT.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SocksConfig {
    /// Refuse clients that do not offer "no authentication"
    #[serde(default)]
    pub strict_methods: bool,

    /// Reply "command not supported" to anything but CONNECT
    #[serde(default)]
    pub connect_only: bool,
}
