//! Backend endpoint resolution
//!
//! The backend is chosen once at startup and never changes at runtime: an
//! explicit `CUREBOT_BACKEND_URL` override wins, debug builds default to the
//! local development server, release builds to the deployed host.

const LOCAL_BASE: &str = "http://127.0.0.1:5000";
const HOSTED_BASE: &str = "https://curebot-backend.onrender.com";

/// Environment override for the backend base URL
pub const BACKEND_URL_VAR: &str = "CUREBOT_BACKEND_URL";

/// Resolved backend addresses for both transports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// WebSocket channel URL
    pub ws_url: String,
    /// Base URL for the HTTP endpoints
    pub http_url: String,
}

impl Endpoint {
    /// Pick the backend for this process
    pub fn resolve() -> Self {
        if let Ok(base) = std::env::var(BACKEND_URL_VAR) {
            return Self::from_base(&base);
        }
        if cfg!(debug_assertions) {
            Self::local()
        } else {
            Self::hosted()
        }
    }

    pub fn local() -> Self {
        Self::from_base(LOCAL_BASE)
    }

    pub fn hosted() -> Self {
        Self::from_base(HOSTED_BASE)
    }

    /// Derive both transport URLs from one HTTP base like
    /// `http://host:port`. A `ws://`/`wss://` base is accepted too and
    /// mapped back to HTTP for the REST endpoints.
    pub fn from_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');

        let http_url = if let Some(rest) = base.strip_prefix("ws://") {
            format!("http://{rest}")
        } else if let Some(rest) = base.strip_prefix("wss://") {
            format!("https://{rest}")
        } else {
            base.to_string()
        };

        let ws_url = if let Some(rest) = http_url.strip_prefix("https://") {
            format!("wss://{rest}/ws")
        } else if let Some(rest) = http_url.strip_prefix("http://") {
            format!("ws://{rest}/ws")
        } else {
            // No recognizable scheme; assume plaintext
            format!("ws://{http_url}/ws")
        };

        Self { ws_url, http_url }
    }

    /// URL of the chat endpoint
    pub fn chat_url(&self) -> String {
        format!("{}/chat", self.http_url)
    }

    /// URL of the image-analysis endpoint
    pub fn analyze_image_url(&self) -> String {
        format!("{}/analyze-image", self.http_url)
    }
}
