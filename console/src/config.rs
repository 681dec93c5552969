//! Console configuration
//!
//! The backend base URL is the single required setting; the streaming
//! endpoint is derived from it rather than configured separately.

use url::Url;

use crate::error::{ConsoleError, ConsoleResult};
use crate::services::{CommandPolicy, ReconnectPolicy};

#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub backend_url: String,
    pub reconnect: ReconnectPolicy,
    pub command_policy: CommandPolicy,
}

impl ConsoleConfig {
    pub fn new(backend_url: impl Into<String>) -> ConsoleResult<Self> {
        let backend_url = backend_url.into();
        let parsed = Url::parse(&backend_url).map_err(|e| ConsoleError::InvalidParameter {
            message: format!("backend url {backend_url}: {e}"),
        })?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ConsoleError::InvalidParameter {
                    message: format!("backend url must be http(s), got {other}://"),
                })
            }
        }
        Ok(Self {
            backend_url,
            reconnect: ReconnectPolicy::None,
            command_policy: CommandPolicy::NoRetry,
        })
    }

    pub fn with_reconnect(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect = policy;
        self
    }

    pub fn with_command_policy(mut self, policy: CommandPolicy) -> Self {
        self.command_policy = policy;
        self
    }

    /// Streaming endpoint derived from the backend URL
    pub fn websocket_url(&self) -> String {
        websocket_url(&self.backend_url)
    }
}

/// Map the backend base URL onto its websocket endpoint: the scheme flips
/// to the websocket counterpart and the stream lives at `/ws`.
pub fn websocket_url(backend_url: &str) -> String {
    let base = backend_url.trim_end_matches('/');
    let ws = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base.to_string()
    };
    format!("{ws}/ws")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn websocket_url_flips_the_scheme() {
        assert_eq!(websocket_url("http://localhost:8080"), "ws://localhost:8080/ws");
        assert_eq!(
            websocket_url("https://portal.example.com/"),
            "wss://portal.example.com/ws"
        );
    }

    #[test]
    fn config_rejects_non_http_backends() {
        assert!(ConsoleConfig::new("ftp://backend").is_err());
        assert!(ConsoleConfig::new("not a url").is_err());
        let config = ConsoleConfig::new("http://localhost:8080").unwrap();
        assert_eq!(config.websocket_url(), "ws://localhost:8080/ws");
        assert_eq!(config.command_policy, CommandPolicy::NoRetry);
        assert_eq!(config.reconnect, ReconnectPolicy::None);
    }
}
