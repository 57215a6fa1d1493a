//! Configuration module for Socksrelay
//!
//! This module provides configuration types and parsing for the server.

mod server;
mod transport;

pub use server::{Config, ServerConfig, SocksConfig};
pub use transport::TcpConfig;

use anyhow::{anyhow, Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

    parse_config(&content)
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config =
        toml::from_str(content).with_context(|| "Failed to parse configuration")?;
    config.validate().map_err(|e| anyhow!(e))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_empty_config() {
        let config = parse_config("").unwrap();
        assert_eq!(config.server.bind_addr, "127.1.1.1:1000");
        assert_eq!(config.server.idle_timeout, 60);
    }

    #[test]
    fn test_parse_full_config() {
        let config_str = r#"
[server]
bind_addr = "0.0.0.0:1080"
connect_timeout = 5
idle_timeout = 120
request_timeout = 3
buffer_size = 16384
report_bound_addr = true

[server.socks]
strict_methods = true
connect_only = true

[server.tcp]
nodelay = false
keepalive_secs = 60
keepalive_interval = 15
"#;

        let config = parse_config(config_str).unwrap();
        assert_eq!(config.server.bind_addr, "0.0.0.0:1080");
        assert_eq!(config.server.connect_timeout, 5);
        assert_eq!(config.server.idle_timeout, 120);
        assert_eq!(config.server.request_timeout, 3);
        assert_eq!(config.server.buffer_size, 16384);
        assert!(config.server.report_bound_addr);
        assert!(config.server.socks.strict_methods);
        assert!(config.server.socks.connect_only);
        assert!(!config.server.tcp.nodelay);
        assert_eq!(config.server.tcp.keepalive_secs, 60);
    }

    #[test]
    fn test_parse_invalid_config() {
        assert!(parse_config("[server]\nidle_timeout = 0\n").is_err());
        assert!(parse_config("[server]\nbind_addr = \"nowhere\"\n").is_err());
        assert!(parse_config("this is not toml").is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nbind_addr = \"127.0.0.1:9050\"").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.server.bind_addr, "127.0.0.1:9050");
    }

    #[test]
    fn test_load_config_missing_file() {
        assert!(load_config("/nonexistent/socksrelay.toml").is_err());
    }
}
