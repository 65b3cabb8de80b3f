//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) app_name: String,
}

impl ServerConfig {
    /// Construct a server configuration for `bind_addr`.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, app_name: impl Into<String>) -> Self {
        Self {
            bind_addr,
            app_name: app_name.into(),
        }
    }

    /// Parse the configured bind address.
    ///
    /// # Errors
    /// Returns [`std::io::ErrorKind::InvalidInput`] when `raw` is not a socket
    /// address.
    pub fn parse_bind_addr(raw: &str) -> std::io::Result<SocketAddr> {
        raw.parse().map_err(|err| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid bind address {raw:?}: {err}"),
            )
        })
    }
}
