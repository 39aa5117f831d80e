//! Top-level client configuration
//!
//! Aggregates the relay and voice settings and reads overrides from the
//! environment, so deployments can retarget the widget without a rebuild.

use crate::relay::{Endpoint, RelayConfig, Transport};
use crate::voice::VoiceConfig;
use tracing::warn;

pub const TRANSPORT_VAR: &str = "CUREBOT_TRANSPORT";
pub const NO_VOICE_VAR: &str = "CUREBOT_NO_VOICE";
pub const WAKE_PHRASE_VAR: &str = "CUREBOT_WAKE_PHRASE";
pub const STT_BIN_VAR: &str = "CUREBOT_STT_BIN";
pub const STT_MODEL_VAR: &str = "CUREBOT_STT_MODEL";
pub const TTS_BIN_VAR: &str = "CUREBOT_TTS_BIN";

/// Configuration for the complete client
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Backend connection settings
    pub relay: RelayConfig,

    /// Speech engine settings
    pub voice: VoiceConfig,
}

impl ClientConfig {
    /// Build a config from the environment, falling back to defaults.
    /// The backend URL itself is resolved in [`Endpoint::resolve`].
    pub fn from_env() -> Self {
        let mut relay = RelayConfig::default().with_endpoint(Endpoint::resolve());

        if let Ok(raw) = std::env::var(TRANSPORT_VAR) {
            match Transport::parse(&raw) {
                Some(transport) => relay.transport = transport,
                None => warn!(value = %raw, "Unknown transport, keeping WebSocket"),
            }
        }

        let mut voice = VoiceConfig::default();
        if env_flag(NO_VOICE_VAR) {
            voice.enabled = false;
        }
        if let Some(phrase) = env_string(WAKE_PHRASE_VAR) {
            voice.wake_phrase = Some(phrase);
        }
        if let Some(path) = env_string(STT_BIN_VAR) {
            voice.recognizer_bin = Some(path);
        }
        if let Some(path) = env_string(STT_MODEL_VAR) {
            voice.recognizer_model = Some(path);
        }
        if let Some(path) = env_string(TTS_BIN_VAR) {
            voice.synthesizer_bin = Some(path);
        }

        Self { relay, voice }
    }

    pub fn with_relay(mut self, relay: RelayConfig) -> Self {
        self.relay = relay;
        self
    }

    pub fn with_voice(mut self, voice: VoiceConfig) -> Self {
        self.voice = voice;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.relay.endpoint.ws_url.is_empty() {
            return Err("Backend channel URL is required".to_string());
        }
        if self.relay.endpoint.http_url.is_empty() {
            return Err("Backend HTTP URL is required".to_string());
        }
        if let Some(phrase) = &self.voice.wake_phrase {
            if phrase.trim().is_empty() {
                return Err("Wake phrase cannot be blank".to_string());
            }
        }
        Ok(())
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|value| {
            let value = value.trim();
            !value.is_empty() && value != "0" && !value.eq_ignore_ascii_case("false")
        })
        .unwrap_or(false)
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        assert!(ClientConfig::default().validate().is_ok());
    }

    #[test]
    fn test_blank_wake_phrase_is_rejected() {
        let config =
            ClientConfig::default().with_voice(VoiceConfig::default().with_wake_phrase("   "));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builders_replace_sections() {
        let config = ClientConfig::default()
            .with_relay(RelayConfig::default().with_transport(Transport::Http))
            .with_voice(VoiceConfig::disabled());

        assert_eq!(config.relay.transport, Transport::Http);
        assert!(!config.voice.enabled);
    }
}
