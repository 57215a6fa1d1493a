//! # Socksrelay - Minimal SOCKS5 CONNECT Relay
//!
//! Socksrelay accepts SOCKS5 clients, negotiates the "no authentication"
//! method, connects to the requested destination and relays raw bytes in
//! both directions until either side closes or the session goes idle.
//!
//! ## Features
//!
//! - **No-Auth Negotiation**: Always selects method `0x00` (optionally strict)
//! - **CONNECT Relay**: IPv4, IPv6 and domain-name destinations
//! - **Idle Teardown**: Sessions with no traffic are closed after a window
//! - **Isolated Sessions**: One task per connection, no shared mutable state
//!
//! ## Usage
//!
//! ```rust,ignore
//! use socksrelay::config::load_config;
//! use socksrelay::server::run_server;
//! use tokio::sync::broadcast;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config("config.toml")?;
//!     let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
//!
//!     run_server(config, shutdown_rx).await
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Client -> Server (accept) -> handshake -> request/connect -> relay <-> Target
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod helper;
pub mod server;
pub mod socks;
pub mod transport;

// Re-export commonly used items
pub use config::{load_config, Config};
pub use error::{RelayError, ReplyCode};
pub use server::{run_server, Server};

/// Version of the Socksrelay library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the application
pub const NAME: &str = env!("CARGO_PKG_NAME");
