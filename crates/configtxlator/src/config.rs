//! Configuration for translator operations and the REST server.

use std::net::SocketAddr;

/// Default REST listen host.
pub const DEFAULT_HOSTNAME: &str = "127.0.0.1";

/// Default REST listen port.
pub const DEFAULT_PORT: u16 = 7059;

/// Header scalars stamped on every envelope the translator builds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnvelopeDefaults {
    /// Channel header version.
    pub version: i32,
    /// Channel header epoch.
    pub epoch: u64,
}

/// Configuration for translator operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslatorConfig {
    pub envelope: EnvelopeDefaults,
}

impl TranslatorConfig {
    /// Override the envelope version and epoch.
    pub fn with_envelope(mut self, version: i32, epoch: u64) -> Self {
        self.envelope = EnvelopeDefaults { version, epoch };
        self
    }
}

/// Configuration for the REST server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to listen on.
    pub hostname: String,
    /// Port to listen on.
    pub port: u16,
    /// Allowed CORS origins. Empty disables CORS headers.
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    /// The `host:port` string to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.hostname, self.port)
    }

    /// Parse the bind address, when the host is a literal IP.
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        self.bind_address().parse().ok()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            hostname: DEFAULT_HOSTNAME.to_string(),
            port: DEFAULT_PORT,
            cors_origins: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TranslatorConfig::default();
        assert_eq!(config.envelope.version, 0);
        assert_eq!(config.envelope.epoch, 0);

        let server = ServerConfig::default();
        assert_eq!(server.bind_address(), "127.0.0.1:7059");
        assert!(server.socket_addr().is_some());
        assert!(server.cors_origins.is_empty());
    }

    #[test]
    fn test_with_envelope() {
        let config = TranslatorConfig::default().with_envelope(2, 11);
        assert_eq!(config.envelope, EnvelopeDefaults { version: 2, epoch: 11 });
    }
}
