//! Voice worker pipeline
//!
//! One synchronous worker thread owns the engines and the microphone. The
//! UI queues commands and polls events each frame; a recognition turn in
//! progress runs to completion before the next command is handled. The
//! standing wake-phrase listener runs between commands when configured.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, info, warn};

use crate::voice::capture::{capture_supported, MicCapture};
use crate::voice::recognizer::{SidecarRecognizer, SpeechRecognizer};
use crate::voice::synthesizer::{CommandSynthesizer, SpeechSynthesizer};
use crate::voice::VoiceConfig;
use crate::{CureBotError, Result};

const CHANNEL_CAPACITY: usize = 100;

/// Longest a single recognition turn may record
const LISTEN_WINDOW: Duration = Duration::from_secs(6);

/// How often an active turn checks for stop and cancel commands
const CAPTURE_POLL: Duration = Duration::from_millis(100);

/// Window length for each standing wake listen
const WAKE_WINDOW: Duration = Duration::from_millis(2500);

/// Command poll gap between wake listens
const WAKE_POLL: Duration = Duration::from_millis(250);

/// Pause after a wake capture failure before trying again
const WAKE_BACKOFF: Duration = Duration::from_secs(1);

/// Spoken acknowledgment when the wake phrase is heard
const WAKE_ACK: &str = "Yes?";

/// Commands accepted by the voice worker
#[derive(Debug, Clone)]
pub enum VoiceCommand {
    /// Begin a recognition turn in the given locale
    Listen { locale: String },
    /// End the current turn early and transcribe what was heard
    StopListening,
    /// Discard the current turn without transcribing
    CancelListening,
    /// Synthesize one bot reply
    Speak { text: String, locale: String },
    /// Toggle the standing wake-phrase listener
    SetWakeMode(bool),
    /// Stop the worker
    Shutdown,
}

/// Events reported back to the UI thread
#[derive(Debug, Clone)]
pub enum VoiceEvent {
    /// Microphone is live and a recognition turn is running
    ListeningStarted,
    /// The turn ended without a usable transcript
    ListeningEnded,
    /// A recognized utterance ready for dispatch
    Utterance { text: String },
    /// Voice input cannot work on this machine
    Unavailable { reason: String },
    /// A recognition or synthesis error outside the wake listener
    Error { error: String },
    /// The worker exited
    Shutdown,
}

/// Cheap clone handed to the UI for queueing work
#[derive(Debug, Clone)]
pub struct VoiceHandle {
    command_tx: Sender<VoiceCommand>,
    available: Arc<AtomicBool>,
}

impl VoiceHandle {
    /// Whether a recognizer and a microphone were found at startup
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    pub fn listen(&self, locale: &str) {
        self.queue(VoiceCommand::Listen {
            locale: locale.to_string(),
        });
    }

    pub fn stop_listening(&self) {
        self.queue(VoiceCommand::StopListening);
    }

    pub fn cancel_listening(&self) {
        self.queue(VoiceCommand::CancelListening);
    }

    pub fn speak(&self, text: &str, locale: &str) {
        self.queue(VoiceCommand::Speak {
            text: text.to_string(),
            locale: locale.to_string(),
        });
    }

    pub fn set_wake_mode(&self, enabled: bool) {
        self.queue(VoiceCommand::SetWakeMode(enabled));
    }

    pub fn shutdown(&self) {
        let _ = self.command_tx.send(VoiceCommand::Shutdown);
    }

    fn queue(&self, command: VoiceCommand) {
        if let Err(e) = self.command_tx.try_send(command) {
            debug!("Voice command dropped: {}", e);
        }
    }
}

type EnginePair = (Box<dyn SpeechRecognizer>, Box<dyn SpeechSynthesizer>);

/// Owns the channel pair between the UI and the voice worker
pub struct VoicePipeline {
    config: VoiceConfig,
    command_tx: Sender<VoiceCommand>,
    command_rx: Receiver<VoiceCommand>,
    event_tx: Sender<VoiceEvent>,
    event_rx: Receiver<VoiceEvent>,
    available: Arc<AtomicBool>,
    engines: Option<EnginePair>,
}

impl VoicePipeline {
    pub fn new(config: VoiceConfig) -> Self {
        let (command_tx, command_rx) = bounded(CHANNEL_CAPACITY);
        let (event_tx, event_rx) = bounded(CHANNEL_CAPACITY);

        Self {
            config,
            command_tx,
            command_rx,
            event_tx,
            event_rx,
            available: Arc::new(AtomicBool::new(false)),
            engines: None,
        }
    }

    /// Skip engine discovery and use the given pair. Tests use this with
    /// the stub engines.
    pub fn with_engines(
        mut self,
        recognizer: Box<dyn SpeechRecognizer>,
        synthesizer: Box<dyn SpeechSynthesizer>,
    ) -> Self {
        self.engines = Some((recognizer, synthesizer));
        self
    }

    pub fn handle(&self) -> VoiceHandle {
        VoiceHandle {
            command_tx: self.command_tx.clone(),
            available: Arc::clone(&self.available),
        }
    }

    pub fn event_receiver(&self) -> Receiver<VoiceEvent> {
        self.event_rx.clone()
    }

    /// Start the worker thread. Engine discovery happens on the worker so
    /// startup never blocks the UI.
    pub fn start_worker(self) -> Result<thread::JoinHandle<()>> {
        let config = self.config;
        let command_rx = self.command_rx;
        let event_tx = self.event_tx;
        let available = self.available;
        let engines = self.engines;

        let handle = thread::Builder::new()
            .name("voice-worker".to_string())
            .spawn(move || {
                info!("Voice pipeline worker starting");

                let (recognizer, synthesizer) = match engines {
                    Some((recognizer, synthesizer)) => (Some(recognizer), Some(synthesizer)),
                    None if config.enabled => discover_engines(&config),
                    None => (None, None),
                };

                let can_listen = recognizer.is_some() && capture_supported();
                available.store(can_listen, Ordering::SeqCst);

                if !can_listen {
                    let reason = degradation_reason(&config, recognizer.is_some());
                    info!(reason = %reason, "Voice input unavailable");
                    let _ = event_tx.send(VoiceEvent::Unavailable { reason });
                }

                let mut wake_on = can_listen && config.wake_phrase.is_some();
                let mut locale = "en-US".to_string();

                loop {
                    let command = if wake_on {
                        match command_rx.recv_timeout(WAKE_POLL) {
                            Ok(command) => command,
                            Err(RecvTimeoutError::Timeout) => {
                                let keep_running = match (
                                    recognizer.as_deref(),
                                    config.wake_phrase.as_deref(),
                                ) {
                                    (Some(engine), Some(phrase)) => wake_turn(
                                        engine,
                                        synthesizer.as_deref(),
                                        &command_rx,
                                        &event_tx,
                                        phrase,
                                        &locale,
                                    ),
                                    _ => true,
                                };
                                if keep_running {
                                    continue;
                                }
                                break;
                            }
                            Err(RecvTimeoutError::Disconnected) => break,
                        }
                    } else {
                        match command_rx.recv() {
                            Ok(command) => command,
                            Err(_) => break,
                        }
                    };

                    match command {
                        VoiceCommand::Listen { locale: requested } => {
                            locale = requested;
                            match recognizer.as_deref() {
                                Some(engine) if capture_supported() => {
                                    let _ = event_tx.send(VoiceEvent::ListeningStarted);
                                    match recognition_turn(engine, &command_rx, &locale) {
                                        Ok(TurnOutcome::Transcript(text)) => {
                                            let _ = event_tx.send(VoiceEvent::Utterance { text });
                                        }
                                        Ok(TurnOutcome::Shutdown) => break,
                                        Ok(_) => {
                                            let _ = event_tx.send(VoiceEvent::ListeningEnded);
                                        }
                                        Err(e) => {
                                            warn!("Recognition failed: {}", e);
                                            let _ = event_tx.send(VoiceEvent::Error {
                                                error: e.to_string(),
                                            });
                                        }
                                    }
                                }
                                _ => {
                                    let _ = event_tx.send(VoiceEvent::Unavailable {
                                        reason: degradation_reason(&config, recognizer.is_some()),
                                    });
                                }
                            }
                        }

                        VoiceCommand::StopListening | VoiceCommand::CancelListening => {
                            debug!("No recognition turn in progress");
                        }

                        VoiceCommand::Speak {
                            text,
                            locale: requested,
                        } => {
                            locale = requested;
                            if let Some(engine) = synthesizer.as_deref() {
                                if let Err(e) = engine.speak(&text, &locale) {
                                    warn!("Speech synthesis failed: {}", e);
                                    let _ = event_tx.send(VoiceEvent::Error {
                                        error: e.to_string(),
                                    });
                                }
                            } else {
                                debug!("No synthesizer; dropping spoken reply");
                            }
                        }

                        VoiceCommand::SetWakeMode(enabled) => {
                            wake_on = enabled && can_listen && config.wake_phrase.is_some();
                            info!(enabled = wake_on, "Wake phrase listener toggled");
                        }

                        VoiceCommand::Shutdown => break,
                    }
                }

                available.store(false, Ordering::SeqCst);
                let _ = event_tx.send(VoiceEvent::Shutdown);
                info!("Voice pipeline worker stopped");
            })
            .map_err(|e| CureBotError::ChannelError(e.to_string()))?;

        Ok(handle)
    }
}

/// How one recognition turn ended
enum TurnOutcome {
    Transcript(String),
    Empty,
    Cancelled,
    Shutdown,
}

/// Record until stop, cancel or the window elapses, then transcribe
fn recognition_turn(
    recognizer: &dyn SpeechRecognizer,
    command_rx: &Receiver<VoiceCommand>,
    locale: &str,
) -> Result<TurnOutcome> {
    let mut capture = MicCapture::start()?;
    let deadline = Instant::now() + LISTEN_WINDOW;
    let mut cancelled = false;

    loop {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        let wait = (deadline - now).min(CAPTURE_POLL);

        match command_rx.recv_timeout(wait) {
            Ok(VoiceCommand::StopListening) => break,
            Ok(VoiceCommand::CancelListening) => {
                cancelled = true;
                break;
            }
            Ok(VoiceCommand::Shutdown) => {
                let _ = capture.finish();
                return Ok(TurnOutcome::Shutdown);
            }
            Ok(other) => {
                debug!("Dropping command during a recognition turn: {:?}", other);
            }
            Err(RecvTimeoutError::Timeout) => capture.drain(),
            Err(RecvTimeoutError::Disconnected) => {
                cancelled = true;
                break;
            }
        }
    }

    let audio = capture.finish();
    if cancelled {
        return Ok(TurnOutcome::Cancelled);
    }
    if audio.is_empty() {
        return Ok(TurnOutcome::Empty);
    }

    debug!(seconds = audio.duration_secs(), "Transcribing turn");

    let transcript = recognizer.recognize(&audio, locale)?;
    if transcript.is_empty() {
        return Ok(TurnOutcome::Empty);
    }
    Ok(TurnOutcome::Transcript(transcript))
}

/// One standing listen window. Failures are logged and swallowed; the wake
/// listener must stay silent while idle. Returns false on shutdown.
fn wake_turn(
    recognizer: &dyn SpeechRecognizer,
    synthesizer: Option<&dyn SpeechSynthesizer>,
    command_rx: &Receiver<VoiceCommand>,
    event_tx: &Sender<VoiceEvent>,
    phrase: &str,
    locale: &str,
) -> bool {
    let audio = match MicCapture::record_for(WAKE_WINDOW) {
        Ok(audio) => audio,
        Err(e) => {
            debug!("Wake listener could not record: {}", e);
            thread::sleep(WAKE_BACKOFF);
            return true;
        }
    };
    if audio.is_empty() {
        return true;
    }

    let transcript = match recognizer.recognize(&audio, locale) {
        Ok(transcript) => transcript,
        Err(e) => {
            debug!("Wake listener could not transcribe: {}", e);
            return true;
        }
    };

    if !wake_phrase_heard(&transcript, phrase) {
        return true;
    }

    info!("Wake phrase heard");
    if let Some(engine) = synthesizer {
        if let Err(e) = engine.speak(WAKE_ACK, locale) {
            debug!("Wake acknowledgment failed: {}", e);
        }
    }

    let _ = event_tx.send(VoiceEvent::ListeningStarted);
    match recognition_turn(recognizer, command_rx, locale) {
        Ok(TurnOutcome::Transcript(text)) => {
            let _ = event_tx.send(VoiceEvent::Utterance { text });
        }
        Ok(TurnOutcome::Shutdown) => return false,
        Ok(_) => {
            let _ = event_tx.send(VoiceEvent::ListeningEnded);
        }
        Err(e) => {
            debug!("Wake recognition failed: {}", e);
            let _ = event_tx.send(VoiceEvent::ListeningEnded);
        }
    }

    true
}

/// Case-insensitive substring match on the transcript
fn wake_phrase_heard(transcript: &str, phrase: &str) -> bool {
    let phrase = phrase.trim();
    if phrase.is_empty() {
        return false;
    }
    transcript
        .to_lowercase()
        .contains(&phrase.to_lowercase())
}

fn discover_engines(
    config: &VoiceConfig,
) -> (
    Option<Box<dyn SpeechRecognizer>>,
    Option<Box<dyn SpeechSynthesizer>>,
) {
    let recognizer = SidecarRecognizer::discover(
        config.recognizer_bin.as_deref(),
        config.recognizer_model.as_deref(),
    )
    .map(|engine| Box::new(engine) as Box<dyn SpeechRecognizer>);

    let synthesizer = CommandSynthesizer::discover(config.synthesizer_bin.as_deref())
        .map(|engine| Box::new(engine) as Box<dyn SpeechSynthesizer>);

    if recognizer.is_none() {
        info!("No speech recognizer found; voice input disabled");
    }
    if synthesizer.is_none() {
        info!("No speech synthesizer found; replies stay silent");
    }

    (recognizer, synthesizer)
}

fn degradation_reason(config: &VoiceConfig, has_recognizer: bool) -> String {
    if !config.enabled {
        "voice disabled by configuration".to_string()
    } else if !has_recognizer {
        "no speech recognizer installed".to_string()
    } else {
        "built without audio input support".to_string()
    }
}
