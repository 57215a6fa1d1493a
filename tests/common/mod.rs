//! Test utilities for Socksrelay
//!
//! This module provides common test utilities used across integration tests.

#![allow(dead_code)]

use socksrelay::config::ServerConfig;
use socksrelay::server::Server;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Create a test TCP listener on an available port
pub async fn create_test_listener() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// A loopback port with nothing listening on it
pub async fn closed_port() -> u16 {
    let (listener, addr) = create_test_listener().await;
    drop(listener);
    addr.port()
}

/// Running relay server handle
pub struct TestServer {
    /// Address the relay listens on
    pub addr: SocketAddr,
    /// Sends the shutdown signal
    pub shutdown_tx: broadcast::Sender<bool>,
    /// Accept-loop task
    pub handle: JoinHandle<anyhow::Result<()>>,
}

impl TestServer {
    /// Connect a fresh client to the relay
    pub async fn connect(&self) -> TcpStream {
        TcpStream::connect(self.addr).await.unwrap()
    }

    /// Stop the accept loop and wait for it
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        self.handle.await.unwrap().unwrap();
    }
}

/// Test configuration builder
pub struct TestConfigBuilder {
    config: ServerConfig,
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        TestConfigBuilder {
            config: ServerConfig {
                bind_addr: "127.0.0.1:0".to_string(),
                connect_timeout: 5,
                request_timeout: 5,
                ..Default::default()
            },
        }
    }
}

impl TestConfigBuilder {
    /// Create a new test config builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set idle timeout in seconds
    pub fn idle_timeout(mut self, secs: u64) -> Self {
        self.config.idle_timeout = secs;
        self
    }

    /// Set request timeout in seconds
    pub fn request_timeout(mut self, secs: u64) -> Self {
        self.config.request_timeout = secs;
        self
    }

    /// Reject clients that do not offer "no authentication"
    pub fn strict_methods(mut self, strict: bool) -> Self {
        self.config.socks.strict_methods = strict;
        self
    }

    /// Reject non-CONNECT commands
    pub fn connect_only(mut self, connect_only: bool) -> Self {
        self.config.socks.connect_only = connect_only;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ServerConfig {
        self.config
    }

    /// Bind and start a relay with this configuration
    pub async fn spawn(self) -> TestServer {
        let server = Server::bind(self.config).await.unwrap();
        let addr = server.local_addr();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = tokio::spawn(server.run(shutdown_rx));
        TestServer {
            addr,
            shutdown_tx,
            handle,
        }
    }
}

/// Mock SOCKS5 messages
pub mod socks5_mock {
    use socksrelay::socks::*;

    /// Create a no-auth method selection request
    pub fn create_auth_request_no_auth() -> Vec<u8> {
        vec![SOCKS5_VERSION, 1, SOCKS5_AUTH_METHOD_NONE]
    }

    /// Create a method selection request offering only username/password
    pub fn create_auth_request_password_only() -> Vec<u8> {
        vec![SOCKS5_VERSION, 1, 0x02]
    }

    /// Create a request with an arbitrary command to an IPv4 address
    pub fn create_request_ipv4(cmd: u8, ip: [u8; 4], port: u16) -> Vec<u8> {
        let mut request = vec![SOCKS5_VERSION, cmd, SOCKS5_RESERVED, SOCKS5_ADDR_TYPE_IPV4];
        request.extend_from_slice(&ip);
        request.extend_from_slice(&port.to_be_bytes());
        request
    }

    /// Create a connect command to IPv4 address
    pub fn create_connect_ipv4(ip: [u8; 4], port: u16) -> Vec<u8> {
        create_request_ipv4(SOCKS5_CMD_TCP_CONNECT, ip, port)
    }

    /// Create a connect command to domain
    pub fn create_connect_domain(domain: &str, port: u16) -> Vec<u8> {
        let mut cmd = vec![
            SOCKS5_VERSION,
            SOCKS5_CMD_TCP_CONNECT,
            SOCKS5_RESERVED,
            SOCKS5_ADDR_TYPE_DOMAIN,
            domain.len() as u8,
        ];
        cmd.extend_from_slice(domain.as_bytes());
        cmd.extend_from_slice(&port.to_be_bytes());
        cmd
    }

    /// Create a connect command to IPv6 address
    pub fn create_connect_ipv6(ip: [u8; 16], port: u16) -> Vec<u8> {
        let mut cmd = vec![
            SOCKS5_VERSION,
            SOCKS5_CMD_TCP_CONNECT,
            SOCKS5_RESERVED,
            SOCKS5_ADDR_TYPE_IPV6,
        ];
        cmd.extend_from_slice(&ip);
        cmd.extend_from_slice(&port.to_be_bytes());
        cmd
    }
}
