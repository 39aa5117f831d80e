//! UI recording state tests
//!
//! These tests verify the recording state machine and how voice worker
//! events fold back into it.

use crossbeam_channel::unbounded;
use curebot::session::prompts;
use curebot::ui::{AppState, RecordingState};
use curebot::voice::{VoiceConfig, VoiceEvent, VoicePipeline};

/// State with a voice handle installed and availability forced on, as if
/// engine discovery had succeeded.
fn state_with_voice() -> AppState {
    let pipeline = VoicePipeline::new(VoiceConfig::default());
    let mut state = AppState::new();
    state.voice = Some(pipeline.handle());
    state.voice_available = true;
    state
}

#[test]
fn test_initial_state_is_idle() {
    let state = AppState::new();
    assert_eq!(
        state.recording_state,
        RecordingState::Idle,
        "Initial state should be Idle"
    );
}

#[test]
fn test_start_recording_transitions_to_recording() {
    let mut state = state_with_voice();

    state.start_recording();

    assert_eq!(
        state.recording_state,
        RecordingState::Recording,
        "State should be Recording after start_recording()"
    );
}

#[test]
fn test_stop_recording_transitions_to_processing() {
    let mut state = state_with_voice();

    // Must be recording first
    state.start_recording();
    state.stop_recording();

    assert_eq!(
        state.recording_state,
        RecordingState::Processing,
        "State should be Processing after stop_recording()"
    );
}

#[test]
fn test_cancel_recording_transitions_to_idle() {
    let mut state = state_with_voice();

    state.start_recording();
    state.cancel_recording();

    assert_eq!(
        state.recording_state,
        RecordingState::Idle,
        "State should be Idle after cancel_recording()"
    );
}

#[test]
fn test_stop_recording_only_works_when_recording() {
    let mut state = state_with_voice();

    // When Idle, stop_recording should do nothing
    state.stop_recording();
    assert_eq!(
        state.recording_state,
        RecordingState::Idle,
        "stop_recording when Idle should keep Idle state"
    );

    // When Processing, stop_recording should do nothing
    state.start_recording();
    state.stop_recording(); // Now Processing
    state.stop_recording(); // Should do nothing
    assert_eq!(
        state.recording_state,
        RecordingState::Processing,
        "stop_recording when Processing should keep Processing state"
    );
}

#[test]
fn test_mic_press_without_voice_shows_notice_once() {
    let mut state = AppState::new();

    state.start_recording();

    assert_eq!(
        state.recording_state,
        RecordingState::Idle,
        "no voice worker, no recording"
    );
    assert_eq!(
        state.messages.last_text().as_deref(),
        Some(prompts::notices::VOICE_UNAVAILABLE)
    );

    let count = state.messages.len();
    state.start_recording();
    assert_eq!(
        state.messages.len(),
        count,
        "the notice should not repeat on every press"
    );
}

#[test]
fn test_listening_ended_event_returns_to_idle() {
    let mut state = state_with_voice();
    let (tx, rx) = unbounded();
    state.voice_events = Some(rx);

    state.start_recording();
    state.stop_recording();
    assert_eq!(state.recording_state, RecordingState::Processing);

    // The worker reports a turn that produced no transcript
    tx.send(VoiceEvent::ListeningEnded).unwrap();
    state.poll_events();

    assert_eq!(
        state.recording_state,
        RecordingState::Idle,
        "an empty turn should land back in Idle"
    );
}

#[test]
fn test_voice_error_resets_turn_with_notice() {
    let mut state = state_with_voice();
    let (tx, rx) = unbounded();
    state.voice_events = Some(rx);

    state.start_recording();
    assert_eq!(state.recording_state, RecordingState::Recording);

    tx.send(VoiceEvent::Error {
        error: "no capture device".to_string(),
    })
    .unwrap();
    state.poll_events();

    assert_eq!(
        state.recording_state,
        RecordingState::Idle,
        "an error should abort the turn"
    );
    assert_eq!(
        state.messages.last_text().as_deref(),
        Some(prompts::notices::MIC_UNAVAILABLE)
    );
}

#[test]
fn test_state_machine_full_cycle() {
    let mut state = state_with_voice();

    // Idle -> Recording
    assert_eq!(state.recording_state, RecordingState::Idle);
    state.start_recording();
    assert_eq!(state.recording_state, RecordingState::Recording);

    // Recording -> Processing
    state.stop_recording();
    assert_eq!(state.recording_state, RecordingState::Processing);

    // Processing -> Idle (transcript arrived)
    state.recording_state = RecordingState::Idle;

    // Idle -> Recording -> Idle (via cancel)
    state.start_recording();
    assert_eq!(state.recording_state, RecordingState::Recording);
    state.cancel_recording();
    assert_eq!(state.recording_state, RecordingState::Idle);
}

#[test]
fn test_debug_info_logs_on_state_changes() {
    let mut state = state_with_voice();

    let initial_log_count = state.debug_info.log_messages.len();

    state.start_recording();
    assert!(
        state.debug_info.log_messages.len() > initial_log_count,
        "start_recording should add a log message"
    );

    let after_start_count = state.debug_info.log_messages.len();

    state.stop_recording();
    assert!(
        state.debug_info.log_messages.len() > after_start_count,
        "stop_recording should add a log message"
    );
}
