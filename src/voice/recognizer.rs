//! Speech-to-text engines
//!
//! Recognition shells out to a whisper-style CLI over a temp WAV instead of
//! linking model runtimes into the widget. The trait keeps the pipeline
//! testable without audio hardware or an installed binary.

use crate::voice::capture::CapturedAudio;
use crate::{CureBotError, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Rate the sidecar expects its input WAV at
pub const RECOGNIZER_SAMPLE_RATE: u32 = 16_000;

/// Binary names probed on PATH, in order
const RECOGNIZER_BINARIES: &[&str] = &["whisper-cli", "whisper-cpp", "whisper"];

pub trait SpeechRecognizer: Send {
    /// Transcribe one captured utterance. `locale` is a BCP-47 tag.
    fn recognize(&self, audio: &CapturedAudio, locale: &str) -> Result<String>;

    fn engine_label(&self) -> &'static str {
        "unknown"
    }
}

/// Recognizer backed by an external whisper CLI
#[derive(Debug, Clone)]
pub struct SidecarRecognizer {
    binary: PathBuf,
    model: Option<PathBuf>,
}

impl SidecarRecognizer {
    pub fn new(binary: PathBuf, model: Option<PathBuf>) -> Self {
        Self { binary, model }
    }

    /// Probe for a usable binary. The override is taken as given; otherwise
    /// PATH is searched for the known names.
    pub fn discover(override_bin: Option<&str>, model: Option<&str>) -> Option<Self> {
        let model = model.map(PathBuf::from);

        if let Some(raw) = override_bin {
            let path = PathBuf::from(raw.trim());
            if path.as_os_str().is_empty() {
                return None;
            }
            if !path.exists() {
                warn!(path = %path.display(), "Configured recognizer binary not found");
            }
            return Some(Self::new(path, model));
        }

        for name in RECOGNIZER_BINARIES {
            if let Some(path) = find_in_path(name) {
                info!(binary = %path.display(), "Found speech recognizer");
                return Some(Self::new(path, model));
            }
        }

        None
    }

    fn run_sidecar(&self, audio: &CapturedAudio, locale: &str) -> Result<String> {
        let token = temporary_token();
        let temp_dir = env::temp_dir();
        let wav_path = temp_dir.join(format!("curebot-{token}.wav"));
        let output_prefix = temp_dir.join(format!("curebot-{token}-out"));
        let txt_path = output_prefix.with_extension("txt");

        write_recognizer_wav(&wav_path, audio)?;

        let mut command = Command::new(&self.binary);
        if let Some(model) = &self.model {
            command.arg("-m").arg(model);
        }
        command
            .arg("-f")
            .arg(&wav_path)
            .arg("-l")
            .arg(whisper_language(locale))
            .arg("-np")
            .arg("--no-timestamps")
            .arg("-otxt")
            .arg("-of")
            .arg(&output_prefix);

        debug!(binary = %self.binary.display(), "Running recognizer");

        let output = command.output().map_err(|e| {
            CureBotError::SpeechError(format!(
                "could not run '{}': {}",
                self.binary.display(),
                e
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            cleanup_temp_files(&[&wav_path, &txt_path]);
            return Err(CureBotError::SpeechError(format!(
                "recognizer exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let transcript = if txt_path.exists() {
            fs::read_to_string(&txt_path)?
        } else {
            String::from_utf8_lossy(&output.stdout).to_string()
        };

        cleanup_temp_files(&[&wav_path, &txt_path]);

        Ok(transcript.trim().to_string())
    }
}

impl SpeechRecognizer for SidecarRecognizer {
    fn recognize(&self, audio: &CapturedAudio, locale: &str) -> Result<String> {
        if audio.is_empty() {
            return Err(CureBotError::SpeechError("nothing was recorded".into()));
        }
        self.run_sidecar(audio, locale)
    }

    fn engine_label(&self) -> &'static str {
        "whisper-sidecar"
    }
}

/// Fixed-transcript recognizer for tests
#[derive(Debug, Clone, Default)]
pub struct StubRecognizer {
    transcript: String,
}

impl StubRecognizer {
    pub fn with_transcript(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
        }
    }
}

impl SpeechRecognizer for StubRecognizer {
    fn recognize(&self, _audio: &CapturedAudio, _locale: &str) -> Result<String> {
        Ok(self.transcript.clone())
    }

    fn engine_label(&self) -> &'static str {
        "stub"
    }
}

/// Map a locale tag to the whisper language code
pub fn whisper_language(locale: &str) -> &str {
    match locale.split('-').next() {
        Some("") | None => "en",
        Some(tag) => tag,
    }
}

pub(crate) fn find_in_path(name: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    for dir in env::split_paths(&paths) {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        if cfg!(target_os = "windows") {
            let with_ext = dir.join(format!("{name}.exe"));
            if with_ext.is_file() {
                return Some(with_ext);
            }
        }
    }
    None
}

fn temporary_token() -> String {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis())
        .unwrap_or(0);
    format!("{}-{stamp}", std::process::id())
}

fn write_recognizer_wav(path: &Path, audio: &CapturedAudio) -> Result<()> {
    let samples = resample_linear(&audio.samples, audio.sample_rate, RECOGNIZER_SAMPLE_RATE);

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: RECOGNIZER_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| CureBotError::SpeechError(format!("could not create wav file: {}", e)))?;

    for sample in &samples {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer
            .write_sample(value)
            .map_err(|e| CureBotError::SpeechError(format!("could not write wav sample: {}", e)))?;
    }

    writer
        .finalize()
        .map_err(|e| CureBotError::SpeechError(format!("could not finalize wav file: {}", e)))?;

    Ok(())
}

/// Linear interpolation is plenty for speech input; the model downsamples
/// its mel filterbank anyway.
fn resample_linear(input: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || from_rate == 0 || input.is_empty() {
        return input.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let out_len = (input.len() as f64 / ratio).floor() as usize;
    let mut output = Vec::with_capacity(out_len);

    for i in 0..out_len {
        let pos = i as f64 * ratio;
        let idx = pos as usize;
        let frac = (pos - idx as f64) as f32;
        let a = input[idx];
        let b = input[(idx + 1).min(input.len() - 1)];
        output.push(a + (b - a) * frac);
    }

    output
}

fn cleanup_temp_files(paths: &[&Path]) {
    for path in paths {
        let _ = fs::remove_file(path);
    }
}
