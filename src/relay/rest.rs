//! HTTP endpoints of the backend
//!
//! Used for image analysis on every transport and for chat itself when the
//! HTTP transport is configured.

use crate::relay::endpoint::Endpoint;
use crate::relay::protocol::{self, ChatRequest, ImageReply};
use crate::{CureBotError, Result};
use std::time::Duration;
use tracing::warn;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    endpoint: Endpoint,
}

impl RestClient {
    pub fn new(endpoint: Endpoint) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self { http, endpoint }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// `POST /chat`. The body is the same payload shape the socket carries;
    /// the backend reads the fields it knows.
    pub async fn chat(&self, request: &ChatRequest) -> Result<String> {
        let response = self
            .http
            .post(self.endpoint.chat_url())
            .json(request)
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        match protocol::parse_reply(&body)? {
            Some(text) => Ok(text),
            None => Err(CureBotError::ProtocolError(
                "chat reply carried no bot text".to_string(),
            )),
        }
    }

    /// `POST /analyze-image` with the image bytes as multipart field `file`
    pub async fn analyze_image(&self, file_name: &str, bytes: Vec<u8>) -> Result<String> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let reply: ImageReply = self
            .http
            .post(self.endpoint.analyze_image_url())
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(reply.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_targets_resolved_endpoint() {
        let client = RestClient::new(Endpoint::local());
        assert_eq!(client.endpoint().chat_url(), "http://127.0.0.1:5000/chat");
    }
}
