//! SOCKS5 command module
//!
//! Handles decoding connection requests and building replies.

mod parser;
mod reply;

pub use parser::{parse_request, read_request};
pub use reply::{build_reply, send_failure, send_reply, send_success};
