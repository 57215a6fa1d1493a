//! SOCKS5 module for Socksrelay
//!
//! This module implements the subset of SOCKS5 the relay speaks: the
//! "no authentication" method, the CONNECT request and the raw byte relay
//! that follows a successful reply.

mod auth;
mod command;
mod connect;
mod consts;
mod context;
mod handler;
mod tcp_relay;
mod types;

pub use auth::{negotiate_method, Greeting};
pub use command::{
    build_reply, parse_request, read_request, send_failure, send_reply, send_success,
};
pub use connect::{negotiate, NegotiationFailure, Session};
pub use consts::*;
pub use context::RelayContext;
pub use handler::handle_client;
pub use tcp_relay::{run_session, RelaySummary, Termination};
pub use types::{AddressType, ConnectionRequest, SocksCommand};
