//! Application state management
//!
//! This module provides the central state for the CureBot UI.

use crate::messages::{ImageData, Message, MessageContent, MessageMetadata, MessageStorage, Sender};
use crate::relay::{ChannelState, ChatRequest, RelayEvent, RelayHandle};
use crate::session::{prompts, InputSource, SessionController, SessionEvent};
use crate::voice::{VoiceEvent, VoiceHandle};
use crossbeam_channel::Receiver;
use std::collections::VecDeque;
use uuid::Uuid;

/// Recording state for voice input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    /// Not recording
    Idle,
    /// A recognition turn is running
    Recording,
    /// Waiting for the transcript of a finished turn
    Processing,
}

/// Debug information displayed in the debug panel
#[derive(Debug, Clone, Default)]
pub struct DebugInfo {
    /// Round-trip time of the most recent backend reply
    pub last_reply_status: String,
    /// Current frame rate
    pub fps: f32,
    /// Recent log messages
    pub log_messages: VecDeque<String>,
}

impl DebugInfo {
    pub fn new() -> Self {
        Self {
            log_messages: VecDeque::with_capacity(100),
            ..Default::default()
        }
    }

    pub fn add_log(&mut self, message: String) {
        if self.log_messages.len() >= 100 {
            self.log_messages.pop_front();
        }
        let stamped = format!("[{}] {}", chrono::Local::now().format("%H:%M:%S"), message);
        self.log_messages.push_back(stamped);
    }
}

/// Central application state
///
/// Worker handles and event receivers are installed by the app shell after
/// construction. With no handles the state still drives the setup wizard,
/// which keeps it testable without workers.
pub struct AppState {
    /// Message storage (thread-safe)
    pub messages: MessageStorage,

    /// Current text input
    pub input_text: String,

    /// Recording state
    pub recording_state: RecordingState,

    /// Setup wizard and relay-mode turn routing
    pub session: SessionController,

    /// True while a backend reply is outstanding
    pub awaiting_reply: bool,

    /// True when a recognizer and a capture device were found
    pub voice_available: bool,

    /// Whether to show the debug panel
    pub show_debug_panel: bool,

    /// True when a wake phrase is configured at all
    pub wake_configured: bool,

    /// Current wake listener toggle
    pub wake_enabled: bool,

    /// Debug information
    pub debug_info: DebugInfo,

    /// Last error message
    pub last_error: Option<String>,

    /// Handle to send relay commands
    pub relay: Option<RelayHandle>,

    /// Channel to receive relay events
    pub relay_events: Option<Receiver<RelayEvent>>,

    /// Handle to send voice commands
    pub voice: Option<VoiceHandle>,

    /// Channel to receive voice events
    pub voice_events: Option<Receiver<VoiceEvent>>,

    /// Round-trip time carried onto the next bot bubble
    pending_reply_elapsed: Option<u64>,

    /// Set on the first mic press; gates the unavailability notice
    voice_use_requested: bool,
    voice_notice_shown: bool,

    /// Frame time tracking for FPS
    frame_times: VecDeque<f64>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Create a new application state
    pub fn new() -> Self {
        Self {
            messages: MessageStorage::new(),
            input_text: String::new(),
            recording_state: RecordingState::Idle,
            session: SessionController::new(),
            awaiting_reply: false,
            voice_available: false,
            show_debug_panel: false,
            wake_configured: false,
            wake_enabled: false,
            debug_info: DebugInfo::new(),
            last_error: None,
            relay: None,
            relay_events: None,
            voice: None,
            voice_events: None,
            pending_reply_elapsed: None,
            voice_use_requested: false,
            voice_notice_shown: false,
            frame_times: VecDeque::with_capacity(60),
        }
    }

    /// Update FPS calculation
    pub fn update_fps(&mut self, delta_time: f64) {
        self.frame_times.push_back(delta_time);
        if self.frame_times.len() > 60 {
            self.frame_times.pop_front();
        }

        if !self.frame_times.is_empty() {
            let avg_time: f64 = self.frame_times.iter().sum::<f64>() / self.frame_times.len() as f64;
            self.debug_info.fps = if avg_time > 0.0 { 1.0 / avg_time as f32 } else { 0.0 };
        }
    }

    /// Greet the user, ask the first setup question, and open the channel
    pub fn begin_session(&mut self) {
        let events = self.session.begin();
        self.apply_session_events(events);
        if let Some(relay) = &self.relay {
            relay.connect();
        }
    }

    /// Send the text box content as a typed turn
    pub fn send_message(&mut self) {
        let text = self.input_text.trim().to_string();
        if text.is_empty() {
            return;
        }
        self.input_text.clear();
        self.dispatch_input(&text, InputSource::Typed);
    }

    /// Send a quick-reply button press as a canonical answer
    pub fn send_choice(&mut self, choice: &str) {
        self.messages.add(Message::text(Sender::User, choice));
        let events = self.session.choose(choice);
        self.apply_session_events(events);
    }

    /// Record a user turn in the transcript and route it through the session
    pub fn dispatch_input(&mut self, text: &str, source: InputSource) {
        let metadata = MessageMetadata {
            is_speech: source == InputSource::Voice,
            processing_time_ms: None,
        };
        self.messages
            .add(Message::text(Sender::User, text).with_metadata(metadata));

        let events = self.session.submit(text, source);
        self.apply_session_events(events);
    }

    fn apply_session_events(&mut self, events: Vec<SessionEvent>) {
        for event in events {
            match event {
                SessionEvent::Say(text) => {
                    let metadata = MessageMetadata {
                        is_speech: false,
                        processing_time_ms: self.pending_reply_elapsed.take(),
                    };
                    self.messages
                        .add(Message::text(Sender::Bot, text).with_metadata(metadata));
                }
                SessionEvent::Relay(request) => self.relay_out(request),
                SessionEvent::Speak(text) => {
                    if let Some(voice) = &self.voice {
                        voice.speak(&text, self.session.locale());
                    }
                }
            }
        }
    }

    fn relay_out(&mut self, request: ChatRequest) {
        let request_id = Uuid::new_v4();
        let sent = match &self.relay {
            Some(relay) => relay.send(request, request_id),
            None => false,
        };

        if sent {
            self.awaiting_reply = true;
        } else {
            // The handle already asked the worker to reconnect
            self.messages.add_bot_text(prompts::notices::CONNECTING);
            self.debug_info
                .add_log("Send deferred, channel not open".to_string());
        }
    }

    /// Process incoming events from worker channels
    pub fn poll_events(&mut self) {
        // Collect first, then process, so handlers can borrow mutably
        let mut relay_events = Vec::new();
        if let Some(rx) = &self.relay_events {
            while let Ok(event) = rx.try_recv() {
                relay_events.push(event);
            }
        }
        for event in relay_events {
            self.on_relay_event(event);
        }

        let mut voice_events = Vec::new();
        if let Some(rx) = &self.voice_events {
            while let Ok(event) = rx.try_recv() {
                voice_events.push(event);
            }
        }
        for event in voice_events {
            self.on_voice_event(event);
        }

        if let Some(voice) = &self.voice {
            self.voice_available = voice.is_available();
        }
    }

    fn on_relay_event(&mut self, event: RelayEvent) {
        match event {
            RelayEvent::Connected => {
                self.last_error = None;
                self.debug_info.add_log("Relay channel open".to_string());
            }
            RelayEvent::Disconnected { reason } => {
                self.debug_info.add_log(format!("Relay offline: {}", reason));
                self.last_error = Some(reason);
            }
            RelayEvent::Reply {
                text,
                request_id: _,
                elapsed_ms,
            } => {
                self.awaiting_reply = false;
                self.pending_reply_elapsed = elapsed_ms;
                self.debug_info.last_reply_status = match elapsed_ms {
                    Some(ms) => format!("{}ms", ms),
                    None => "ok".to_string(),
                };

                let events = self.session.on_reply(&text);
                self.apply_session_events(events);
            }
            RelayEvent::SendFailed { request_id: _ } => {
                self.awaiting_reply = false;
                self.messages.add_bot_text(prompts::notices::SEND_FAILED);
                self.debug_info.add_log("Send failed, payload dropped".to_string());
            }
            RelayEvent::ImageReply { text, request_id: _ } => {
                self.awaiting_reply = false;
                self.messages.add_bot_text(text);
                self.debug_info.add_log("Image analysis done".to_string());
            }
            RelayEvent::ImageFailed {
                request_id: _,
                reason,
            } => {
                self.awaiting_reply = false;
                self.messages.add_bot_text(prompts::notices::IMAGE_FAILED);
                self.debug_info
                    .add_log(format!("Image analysis failed: {}", reason));
            }
            RelayEvent::Shutdown => {
                self.debug_info.add_log("Relay worker stopped".to_string());
            }
        }
    }

    fn on_voice_event(&mut self, event: VoiceEvent) {
        match event {
            VoiceEvent::ListeningStarted => {
                self.recording_state = RecordingState::Recording;
                self.debug_info.add_log("Listening".to_string());
            }
            VoiceEvent::ListeningEnded => {
                self.recording_state = RecordingState::Idle;
            }
            VoiceEvent::Utterance { text } => {
                self.recording_state = RecordingState::Idle;
                self.dispatch_input(&text, InputSource::Voice);
            }
            VoiceEvent::Unavailable { reason } => {
                self.voice_available = false;
                self.recording_state = RecordingState::Idle;
                self.debug_info.add_log(format!("Voice unavailable: {}", reason));
                if self.voice_use_requested && !self.voice_notice_shown {
                    self.messages
                        .add_bot_text(prompts::notices::VOICE_UNAVAILABLE);
                    self.voice_notice_shown = true;
                }
            }
            VoiceEvent::Error { error } => {
                if self.recording_state != RecordingState::Idle {
                    self.messages.add_bot_text(prompts::notices::MIC_UNAVAILABLE);
                }
                self.recording_state = RecordingState::Idle;
                self.debug_info.add_log(format!("Voice error: {}", error));
                self.last_error = Some(error);
            }
            VoiceEvent::Shutdown => {
                self.debug_info.add_log("Voice worker stopped".to_string());
            }
        }
    }

    /// Start a recognition turn
    ///
    /// The bubble flips to Recording right away; the worker confirms or
    /// reports failure through events.
    pub fn start_recording(&mut self) {
        if self.recording_state != RecordingState::Idle {
            return;
        }

        self.voice_use_requested = true;
        if self.voice.is_none() || !self.voice_available {
            if !self.voice_notice_shown {
                self.messages
                    .add_bot_text(prompts::notices::VOICE_UNAVAILABLE);
                self.voice_notice_shown = true;
            }
            return;
        }

        self.recording_state = RecordingState::Recording;
        if let Some(voice) = &self.voice {
            voice.listen(self.session.locale());
        }
        self.debug_info.add_log("Recording started".to_string());
    }

    /// Stop the turn early and wait for the transcript
    pub fn stop_recording(&mut self) {
        if self.recording_state != RecordingState::Recording {
            return;
        }

        self.recording_state = RecordingState::Processing;
        if let Some(voice) = &self.voice {
            voice.stop_listening();
        }
        self.debug_info.add_log("Recording stopped".to_string());
    }

    /// Cancel the turn without producing an utterance
    pub fn cancel_recording(&mut self) {
        if self.recording_state == RecordingState::Idle {
            return;
        }

        self.recording_state = RecordingState::Idle;
        if let Some(voice) = &self.voice {
            voice.cancel_listening();
        }
        self.debug_info.add_log("Recording cancelled".to_string());
    }

    /// Show a dropped image in the transcript and send it for analysis
    pub fn handle_dropped_image(&mut self, name: String, bytes: Vec<u8>) {
        self.messages.add(Message::new(
            Sender::User,
            MessageContent::Image(ImageData::new(name.clone(), bytes.clone())),
        ));

        let request_id = Uuid::new_v4();
        let sent = match &self.relay {
            Some(relay) => relay.analyze_image(name, bytes, request_id),
            None => false,
        };

        if sent {
            self.awaiting_reply = true;
            self.debug_info.add_log("Image sent for analysis".to_string());
        } else {
            self.messages.add_bot_text(prompts::notices::CONNECTING);
        }
    }

    /// Toggle the standing wake listener
    pub fn set_wake_mode(&mut self, enabled: bool) {
        self.wake_enabled = enabled;
        if let Some(voice) = &self.voice {
            voice.set_wake_mode(enabled);
        }
        self.debug_info.add_log(
            if enabled {
                "Wake phrase on"
            } else {
                "Wake phrase off"
            }
            .to_string(),
        );
    }

    /// Clear the transcript and restart the setup conversation
    pub fn clear_messages(&mut self) {
        self.messages.clear();
        self.session = SessionController::new();
        self.awaiting_reply = false;
        self.pending_reply_elapsed = None;
        self.recording_state = RecordingState::Idle;

        let events = self.session.begin();
        self.apply_session_events(events);
        self.debug_info.add_log("Conversation reset".to_string());
    }

    /// Current channel state, Closed when no relay handle is installed
    pub fn channel_state(&self) -> ChannelState {
        self.relay
            .as_ref()
            .map(|relay| relay.state())
            .unwrap_or(ChannelState::Closed)
    }

    /// Ask both workers to exit
    pub fn shutdown_workers(&self) {
        if let Some(relay) = &self.relay {
            relay.shutdown();
        }
        if let Some(voice) = &self.voice {
            voice.shutdown();
        }
    }
}
