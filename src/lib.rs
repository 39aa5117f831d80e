pub mod config;
pub mod messages;
pub mod relay;
pub mod session;
pub mod ui;
pub mod voice;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum CureBotError {
    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Channel not open")]
    NotConnected,

    #[error("Protocol error: {0}")]
    ProtocolError(String),

    #[error("Speech error: {0}")]
    SpeechError(String),

    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    #[error("IO error: {0}")]
    IOError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Channel error: {0}")]
    ChannelError(String),
}

impl From<std::io::Error> for CureBotError {
    fn from(e: std::io::Error) -> Self {
        CureBotError::IOError(e.to_string())
    }
}

impl From<serde_json::Error> for CureBotError {
    fn from(e: serde_json::Error) -> Self {
        CureBotError::ProtocolError(e.to_string())
    }
}

impl From<reqwest::Error> for CureBotError {
    fn from(e: reqwest::Error) -> Self {
        CureBotError::TransportError(e.to_string())
    }
}

impl CureBotError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // The channel reconnects on its own; sends can be retried
            CureBotError::TransportError(_) => true,
            CureBotError::NotConnected => true,
            // Malformed frames are dropped without closing the channel
            CureBotError::ProtocolError(_) => true,
            CureBotError::SpeechError(_) => true,
            // Missing devices require user intervention
            CureBotError::AudioDeviceError(_) => false,
            CureBotError::IOError(_) => false,
            CureBotError::ConfigError(_) => false,
            CureBotError::ChannelError(_) => false,
        }
    }

    /// Get the inline notice shown in the transcript for this error
    pub fn user_message(&self) -> String {
        use crate::session::prompts::notices;

        match self {
            CureBotError::TransportError(_) => notices::SEND_FAILED.to_string(),
            CureBotError::NotConnected => notices::CONNECTING.to_string(),
            CureBotError::ProtocolError(_) => {
                "Received an unreadable reply from the server.".to_string()
            }
            CureBotError::SpeechError(_) => notices::VOICE_UNAVAILABLE.to_string(),
            CureBotError::AudioDeviceError(_) => notices::MIC_UNAVAILABLE.to_string(),
            CureBotError::IOError(_) => "File system error occurred.".to_string(),
            CureBotError::ConfigError(_) => {
                "Configuration error. Please check settings.".to_string()
            }
            CureBotError::ChannelError(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, CureBotError>;
