//! Wire payloads exchanged with the backend
//!
//! The schema is the backend's: a flat JSON object out, one of two reply
//! shapes in. Nothing here is versioned or tagged; the parser is tolerant so
//! either reply shape works on either transport.

use crate::Result;
use serde::{Deserialize, Serialize};

/// Outbound chat payload. Profile fields ride along once collected; `setup`
/// marks the request fired when the wizard completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symptoms: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup: Option<bool>,
}

/// Inbound frame shapes: the socket backend sends `{sender, message}`, the
/// HTTP endpoint answers `{response}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireReply {
    Tagged { sender: String, message: String },
    Plain { response: String },
}

/// Reply body of `POST /analyze-image`
#[derive(Debug, Clone, Deserialize)]
pub struct ImageReply {
    pub message: String,
}

/// Parse one inbound frame.
///
/// `Ok(Some(text))` is a displayable bot reply. `Ok(None)` is a well-formed
/// frame not addressed to the transcript (a non-bot sender). `Err` is a
/// malformed frame; callers log it and drop it without touching the channel.
pub fn parse_reply(raw: &str) -> Result<Option<String>> {
    let reply: WireReply = serde_json::from_str(raw)?;
    match reply {
        WireReply::Tagged { sender, message } => {
            if sender == "bot" {
                Ok(Some(message))
            } else {
                Ok(None)
            }
        }
        WireReply::Plain { response } => Ok(Some(response)),
    }
}
