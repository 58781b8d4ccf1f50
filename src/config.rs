//! Configuration handling for sheetview

use std::net::SocketAddr;

/// Base name used for exports when no source file name is known
pub const DEFAULT_BASE_NAME: &str = "exported_data";

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Interface to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Maximum accepted request body, in bytes
    pub max_upload_bytes: usize,
    /// File stem used when an export has no recorded source file
    pub default_base_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_bytes: 64 * 1024 * 1024,
            default_base_name: DEFAULT_BASE_NAME.to_string(),
        }
    }
}

impl Config {
    /// Create a new Config listening on the given host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Set the request body limit in mebibytes
    pub fn with_max_upload_mb(mut self, mb: usize) -> Self {
        self.max_upload_bytes = mb.saturating_mul(1024 * 1024);
        self
    }

    /// Socket address to bind
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|e| anyhow::anyhow!("Invalid listen address {}: {}", addr, e))
    }
}
