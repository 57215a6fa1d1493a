//! Shared, read-only settings for every connection a server accepts

use crate::config::ServerConfig;
use crate::transport::SocketOpts;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

/// Per-server context handed to each connection task
///
/// Built once when the listener is bound and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct RelayContext {
    /// Server configuration
    pub config: ServerConfig,
    /// Address the listener actually bound to
    pub listen_addr: SocketAddr,
    /// Options applied to client and target sockets
    pub socket_opts: SocketOpts,
}

impl RelayContext {
    /// Create a context for a listener bound to `listen_addr`
    pub fn new(config: ServerConfig, listen_addr: SocketAddr) -> Self {
        let socket_opts = SocketOpts::from_tcp_config(&config.tcp);
        RelayContext {
            config,
            listen_addr,
            socket_opts,
        }
    }

    /// Bound address reported in success replies when the real one is not used
    pub fn default_bound_addr(&self) -> SocketAddrV4 {
        SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, self.listen_addr.port())
    }
}
