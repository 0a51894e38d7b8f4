//! Server configuration from environment variables: bind address and log
//! filter.

use std::env;
use std::net::SocketAddr;

/// Port used when `PORT` is unset or not a valid port number.
pub const DEFAULT_PORT: u16 = 3001;

/// Log filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Tracing filter from `RUST_LOG`-style directives such as
/// `user_registry=debug,tower_http=info`.
#[cfg(feature = "http-server")]
pub fn log_filter(directives: Option<&str>) -> tracing_subscriber::EnvFilter {
    directives
        .and_then(|d| tracing_subscriber::EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Bind address for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Read `HOST` (default `0.0.0.0`) and `PORT` (default 3001).
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address {}:{}: {}", self.host, self.port, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
        };
        assert_eq!(config.socket_addr().unwrap().port(), 8080);
    }

    #[cfg(feature = "http-server")]
    #[test]
    fn test_log_filter_accepts_target_directives() {
        use tracing::level_filters::LevelFilter;

        let filter = log_filter(Some("user_registry=debug,tower_http=warn"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));

        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_invalid_host_is_error() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            port: 1,
        };
        assert!(config.socket_addr().is_err());
    }
}
