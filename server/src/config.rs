//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//


//! Server configuration

use crate::error::{ServerError, ServerResult};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use telnetd_session::SessionConfig;

/// Server configuration
///
/// Use the builder methods to customize the defaults.
///
/// # Example
///
/// ```
/// use telnetd_server::ServerConfig;
/// use std::time::Duration;
///
/// let config = ServerConfig::default()
///     .with_max_connections(64)
///     .with_keepalive(false)
///     .with_shutdown_timeout(Duration::from_secs(5));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the listener to
    pub bind_address: SocketAddr,

    /// Maximum number of concurrent connections
    ///
    /// Connections accepted beyond this limit are closed immediately.
    pub max_connections: usize,

    /// Enable TCP keepalive on accepted sockets
    pub keepalive: bool,

    /// Configuration handed to every session
    pub session: Arc<SessionConfig>,

    /// How long `shutdown` waits for sessions to end before aborting them
    pub shutdown_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from((Ipv4Addr::LOCALHOST, 23)),
            max_connections: 1000,
            keepalive: true,
            session: Arc::new(SessionConfig::default()),
            shutdown_timeout: Duration::from_secs(10),
        }
    }
}

impl ServerConfig {
    /// Create a new configuration with the given bind address
    pub fn new(bind_address: SocketAddr) -> Self {
        Self {
            bind_address,
            ..Default::default()
        }
    }

    /// Set the maximum number of concurrent connections
    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Enable or disable TCP keepalive
    pub fn with_keepalive(mut self, enabled: bool) -> Self {
        self.keepalive = enabled;
        self
    }

    /// Set the per-session configuration
    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.session = Arc::new(session);
        self
    }

    /// Set the shutdown grace period
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> ServerResult<()> {
        if self.max_connections == 0 {
            return Err(ServerError::InvalidConfig(
                "max_connections must be greater than 0",
            ));
        }
        if self.shutdown_timeout.is_zero() {
            return Err(ServerError::InvalidConfig(
                "shutdown_timeout must be greater than 0",
            ));
        }
        if self.session.reply_reserve >= self.session.buffer_capacity() {
            return Err(ServerError::InvalidConfig(
                "session reply_reserve must be smaller than the buffer capacity",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.max_connections, 1000);
        assert_eq!(config.bind_address.port(), 23);
        assert!(config.keepalive);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = ServerConfig::new("0.0.0.0:2323".parse().unwrap())
            .with_max_connections(8)
            .with_keepalive(false)
            .with_session(SessionConfig::default().with_map_crlf(false))
            .with_shutdown_timeout(Duration::from_secs(1));

        assert_eq!(config.bind_address.port(), 2323);
        assert_eq!(config.max_connections, 8);
        assert!(!config.keepalive);
        assert!(!config.session.map_crlf);
        assert_eq!(config.shutdown_timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_validation() {
        let mut config = ServerConfig::default();
        config.max_connections = 0;
        assert!(matches!(
            config.validate(),
            Err(ServerError::InvalidConfig(_))
        ));

        let config = ServerConfig::default().with_shutdown_timeout(Duration::ZERO);
        assert!(config.validate().is_err());

        let config = ServerConfig::default()
            .with_session(SessionConfig::default().with_reply_reserve(1 << 20));
        assert!(config.validate().is_err());
    }
}
