//! Text-to-speech engines
//!
//! Synthesis shells out to the platform speech command: `say` on macOS,
//! `espeak-ng` (or `espeak`) elsewhere. Blocking until playback ends is
//! fine because the whole voice worker is synchronous.

use crate::voice::recognizer::find_in_path;
use crate::{CureBotError, Result};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub trait SpeechSynthesizer: Send {
    /// Speak one bot reply. `locale` is a BCP-47 tag.
    fn speak(&self, text: &str, locale: &str) -> Result<()>;

    fn engine_label(&self) -> &'static str {
        "unknown"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SynthStyle {
    /// macOS `say`; picks its voice from system settings
    Say,
    /// `espeak`-family; takes an explicit voice flag
    Espeak,
}

/// Synthesizer backed by a platform speech command
#[derive(Debug, Clone)]
pub struct CommandSynthesizer {
    binary: PathBuf,
    style: SynthStyle,
}

impl CommandSynthesizer {
    pub fn new(binary: PathBuf) -> Self {
        let style = if binary
            .file_stem()
            .map(|stem| stem.to_string_lossy().contains("espeak"))
            .unwrap_or(false)
        {
            SynthStyle::Espeak
        } else {
            SynthStyle::Say
        };

        Self { binary, style }
    }

    /// Probe for a usable speech command, preferring the platform default
    pub fn discover(override_bin: Option<&str>) -> Option<Self> {
        if let Some(raw) = override_bin {
            let path = PathBuf::from(raw.trim());
            if path.as_os_str().is_empty() {
                return None;
            }
            if !path.exists() {
                warn!(path = %path.display(), "Configured synthesizer binary not found");
            }
            return Some(Self::new(path));
        }

        let candidates: &[&str] = if cfg!(target_os = "macos") {
            &["say", "espeak-ng", "espeak"]
        } else {
            &["espeak-ng", "espeak"]
        };

        for name in candidates {
            if let Some(path) = find_in_path(name) {
                info!(binary = %path.display(), "Found speech synthesizer");
                return Some(Self::new(path));
            }
        }

        None
    }
}

impl SpeechSynthesizer for CommandSynthesizer {
    fn speak(&self, text: &str, locale: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }

        let mut command = Command::new(&self.binary);
        if self.style == SynthStyle::Espeak {
            command.arg("-v").arg(espeak_voice(locale));
        }
        command.arg(text);

        debug!(binary = %self.binary.display(), "Speaking reply");

        let status = command.status().map_err(|e| {
            CureBotError::SpeechError(format!(
                "could not run '{}': {}",
                self.binary.display(),
                e
            ))
        })?;

        if !status.success() {
            return Err(CureBotError::SpeechError(format!(
                "synthesizer exited with {}",
                status
            )));
        }

        Ok(())
    }

    fn engine_label(&self) -> &'static str {
        match self.style {
            SynthStyle::Say => "say",
            SynthStyle::Espeak => "espeak",
        }
    }
}

/// Recording synthesizer for tests
#[derive(Debug, Clone, Default)]
pub struct StubSynthesizer {
    spoken: Arc<Mutex<Vec<String>>>,
}

impl StubSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything spoken so far, oldest first
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().clone()
    }
}

impl SpeechSynthesizer for StubSynthesizer {
    fn speak(&self, text: &str, _locale: &str) -> Result<()> {
        self.spoken.lock().push(text.to_string());
        Ok(())
    }

    fn engine_label(&self) -> &'static str {
        "stub"
    }
}

/// Map a locale tag to an espeak voice name
fn espeak_voice(locale: &str) -> String {
    match locale.to_ascii_lowercase().as_str() {
        "te-in" => "te".to_string(),
        "hi-in" => "hi".to_string(),
        "" => "en-us".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_espeak_voice_mapping() {
        assert_eq!(espeak_voice("en-US"), "en-us");
        assert_eq!(espeak_voice("te-IN"), "te");
        assert_eq!(espeak_voice("hi-IN"), "hi");
        assert_eq!(espeak_voice(""), "en-us");
    }

    #[test]
    fn test_style_follows_binary_name() {
        let say = CommandSynthesizer::new(PathBuf::from("/usr/bin/say"));
        assert_eq!(say.engine_label(), "say");

        let espeak = CommandSynthesizer::new(PathBuf::from("/usr/bin/espeak-ng"));
        assert_eq!(espeak.engine_label(), "espeak");
    }

    #[test]
    fn test_stub_records_spoken_text() {
        let stub = StubSynthesizer::new();
        stub.speak("Good Morning 🌞", "en-US").unwrap();
        stub.speak("Drink water.", "te-IN").unwrap();

        assert_eq!(stub.spoken(), vec!["Good Morning 🌞", "Drink water."]);
    }

    #[test]
    fn test_blank_text_is_not_spoken() {
        // Blank input short-circuits before the binary is touched.
        let say = CommandSynthesizer::new(PathBuf::from("/nonexistent/say"));
        assert!(say.speak("   ", "en-US").is_ok());
    }
}
