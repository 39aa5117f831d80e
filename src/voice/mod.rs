//! Voice input and output
//!
//! Speech runs through external helper programs rather than in-process
//! models, so the widget stays small and degrades to text-only when no
//! helper is installed.

pub mod capture;
pub mod pipeline;
pub mod recognizer;
pub mod synthesizer;

pub use capture::{capture_supported, CapturedAudio, MicCapture};
pub use pipeline::{VoiceCommand, VoiceEvent, VoiceHandle, VoicePipeline};
pub use recognizer::{SidecarRecognizer, SpeechRecognizer, StubRecognizer};
pub use synthesizer::{CommandSynthesizer, SpeechSynthesizer, StubSynthesizer};

/// Voice behavior knobs, all optional
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Master switch; when off the pipeline reports itself unavailable
    pub enabled: bool,

    /// Hands-free trigger phrase; None keeps push-to-talk only
    pub wake_phrase: Option<String>,

    /// Recognizer binary override; None probes PATH
    pub recognizer_bin: Option<String>,

    /// Model file passed to the recognizer binary
    pub recognizer_model: Option<String>,

    /// Synthesizer binary override; None probes PATH
    pub synthesizer_bin: Option<String>,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            wake_phrase: None,
            recognizer_bin: None,
            recognizer_model: None,
            synthesizer_bin: None,
        }
    }
}

impl VoiceConfig {
    /// Config for text-only operation
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    pub fn with_wake_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.wake_phrase = Some(phrase.into());
        self
    }

    pub fn with_recognizer_bin(mut self, path: impl Into<String>) -> Self {
        self.recognizer_bin = Some(path.into());
        self
    }

    pub fn with_recognizer_model(mut self, path: impl Into<String>) -> Self {
        self.recognizer_model = Some(path.into());
        self
    }

    pub fn with_synthesizer_bin(mut self, path: impl Into<String>) -> Self {
        self.synthesizer_bin = Some(path.into());
        self
    }
}
