//! Connection manager for the backend channel
//!
//! One worker thread owns the single duplex channel to the backend and
//! reconnects it forever; the UI talks to it through a cloneable handle.

pub mod endpoint;
pub mod pipeline;
pub mod protocol;
pub mod rest;

pub use endpoint::Endpoint;
pub use pipeline::{
    ChannelState, RelayCommand, RelayEvent, RelayHandle, RelayPipeline, RelayPipelineBuilder,
};
pub use protocol::ChatRequest;
pub use rest::RestClient;

/// How chat messages reach the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Persistent duplex channel with automatic reconnect
    WebSocket,
    /// One `POST /chat` per message, no persistent channel
    Http,
}

impl Transport {
    /// Parse a transport name from configuration
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "ws" | "websocket" => Some(Transport::WebSocket),
            "http" | "fetch" => Some(Transport::Http),
            _ => None,
        }
    }
}

/// Connection-manager configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub endpoint: Endpoint,
    pub transport: Transport,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::local(),
            transport: Transport::WebSocket,
        }
    }
}

impl RelayConfig {
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_parsing() {
        assert_eq!(Transport::parse("ws"), Some(Transport::WebSocket));
        assert_eq!(Transport::parse("WebSocket"), Some(Transport::WebSocket));
        assert_eq!(Transport::parse("http"), Some(Transport::Http));
        assert_eq!(Transport::parse("fetch"), Some(Transport::Http));
        assert_eq!(Transport::parse("carrier-pigeon"), None);
    }

    #[test]
    fn test_default_config() {
        let config = RelayConfig::default();
        assert_eq!(config.transport, Transport::WebSocket);
        assert_eq!(config.endpoint, Endpoint::local());
    }

    #[test]
    fn test_config_builders() {
        let config = RelayConfig::default()
            .with_endpoint(Endpoint::hosted())
            .with_transport(Transport::Http);
        assert_eq!(config.transport, Transport::Http);
        assert!(config.endpoint.http_url.starts_with("https://"));
    }
}
