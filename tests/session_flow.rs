//! End-to-end flows across the session, relay, and voice layers
//!
//! These tests run headless: the app state is driven directly, worker
//! threads talk to unreachable backends or stub engines.

use std::time::{Duration, Instant};

use crossbeam_channel::unbounded;
use uuid::Uuid;

use curebot::messages::{MessageContent, Sender};
use curebot::relay::{
    ChannelState, Endpoint, RelayConfig, RelayEvent, RelayPipelineBuilder,
};
use curebot::session::{prompts, InputSource, SessionController, SessionEvent};
use curebot::ui::AppState;
use curebot::voice::{StubRecognizer, StubSynthesizer, VoiceConfig, VoiceEvent, VoicePipeline};

fn complete_setup(session: &mut SessionController) {
    session.submit("1", InputSource::Typed);
    session.submit("30", InputSource::Typed);
    session.choose("Male");
    session.submit("fever", InputSource::Typed);
}

/// Walking the wizard end to end must produce the initial relay payload
/// carrying the whole profile.
#[test]
fn test_wizard_walkthrough_relays_profile() {
    let mut session = SessionController::new();

    let opening = session.begin_with_hour(10);
    assert_eq!(opening.len(), 2, "greeting plus the first question");
    assert!(
        matches!(&opening[0], SessionEvent::Say(text) if text.contains("Good Morning")),
        "morning greeting expected for hour 10"
    );

    session.submit("1", InputSource::Typed);
    session.submit("34", InputSource::Typed);
    session.choose("Female");
    let events = session.submit("fever and cough", InputSource::Typed);

    assert!(session.is_setup_complete());
    assert_eq!(session.locale(), "en-US");

    let request = events
        .iter()
        .find_map(|event| match event {
            SessionEvent::Relay(request) => Some(request.clone()),
            _ => None,
        })
        .expect("completing setup must relay the profile");

    assert_eq!(request.message, "fever and cough");
    assert_eq!(request.language, "english");
    assert_eq!(request.age.as_deref(), Some("34"));
    assert_eq!(request.gender.as_deref(), Some("Female"));
    assert_eq!(request.symptoms.as_deref(), Some("fever and cough"));
    assert_eq!(request.setup, Some(true));
}

/// A spoken turn arms the one-shot spoken reply; a typed turn disarms it.
#[test]
fn test_voice_turn_arms_one_spoken_reply() {
    let mut session = SessionController::new();
    complete_setup(&mut session);

    session.submit("my head hurts", InputSource::Voice);
    assert!(session.voice_reply_pending());

    let events = session.on_reply("Drink water and rest.");
    assert!(
        events
            .iter()
            .any(|e| matches!(e, SessionEvent::Speak(text) if text == "Drink water and rest.")),
        "reply to a spoken turn must be spoken back"
    );
    assert!(!session.voice_reply_pending(), "the flag is one-shot");

    session.submit("thanks", InputSource::Typed);
    let events = session.on_reply("You are welcome.");
    assert!(
        events.iter().all(|e| !matches!(e, SessionEvent::Speak(_))),
        "typed turns must not trigger speech"
    );
}

/// A reply event becomes a bot bubble carrying the round-trip time.
#[test]
fn test_reply_event_lands_in_transcript() {
    let mut state = AppState::new();
    state.begin_session();
    let baseline = state.messages.len();

    let (tx, rx) = unbounded();
    state.relay_events = Some(rx);
    state.awaiting_reply = true;

    tx.send(RelayEvent::Reply {
        text: "Hello, how can I help?".to_string(),
        request_id: Some(Uuid::new_v4()),
        elapsed_ms: Some(180),
    })
    .unwrap();
    state.poll_events();

    assert!(!state.awaiting_reply);
    let messages = state.messages.get_all();
    assert_eq!(messages.len(), baseline + 1);

    let last = messages.last().unwrap();
    assert_eq!(last.sender, Sender::Bot);
    assert_eq!(last.metadata.processing_time_ms, Some(180));
    match &last.content {
        MessageContent::Text(text) => assert_eq!(text, "Hello, how can I help?"),
        other => panic!("expected a text bubble, got {:?}", other),
    }
}

/// Without an open channel a send shows the connecting notice instead of
/// silently dropping the turn.
#[test]
fn test_send_without_channel_shows_notice() {
    let mut state = AppState::new();
    state.begin_session();

    // Drive the wizard to completion; the final step relays the profile
    state.dispatch_input("1", InputSource::Typed);
    state.dispatch_input("30", InputSource::Typed);
    state.send_choice("Male");
    state.dispatch_input("fever", InputSource::Typed);

    assert_eq!(
        state.messages.last_text().as_deref(),
        Some(prompts::notices::CONNECTING)
    );

    state.input_text = "I feel dizzy".to_string();
    state.send_message();
    assert_eq!(
        state.messages.last_text().as_deref(),
        Some(prompts::notices::CONNECTING)
    );
    assert!(!state.awaiting_reply);
}

/// A failed socket write surfaces as an inline notice.
#[test]
fn test_send_failure_event_shows_notice() {
    let mut state = AppState::new();
    let (tx, rx) = unbounded();
    state.relay_events = Some(rx);
    state.awaiting_reply = true;

    tx.send(RelayEvent::SendFailed {
        request_id: Uuid::new_v4(),
    })
    .unwrap();
    state.poll_events();

    assert!(!state.awaiting_reply);
    assert_eq!(
        state.messages.last_text().as_deref(),
        Some(prompts::notices::SEND_FAILED)
    );
}

/// An utterance from the voice worker is dispatched as a speech-marked turn.
#[test]
fn test_voice_utterance_dispatches_as_speech_turn() {
    let mut state = AppState::new();
    state.begin_session();

    let (tx, rx) = unbounded();
    state.voice_events = Some(rx);

    tx.send(VoiceEvent::Utterance {
        text: "English".to_string(),
    })
    .unwrap();
    state.poll_events();

    let messages = state.messages.get_all();
    let user_turn = messages
        .iter()
        .rev()
        .find(|m| m.sender == Sender::User)
        .expect("utterance must appear as a user turn");
    assert!(user_turn.metadata.is_speech);
    match &user_turn.content {
        MessageContent::Text(text) => assert_eq!(text, "English"),
        other => panic!("expected a text bubble, got {:?}", other),
    }
}

/// Connecting to a closed port must surface a disconnect, and shutdown must
/// stop the worker even while a retry is pending.
#[test]
fn test_unreachable_backend_reports_disconnect() {
    let config = RelayConfig::default().with_endpoint(Endpoint::from_base("http://127.0.0.1:9"));
    let mut pipeline = RelayPipelineBuilder::new().with_config(config).build();
    let handle = pipeline.handle();
    let events = pipeline.event_receiver();
    pipeline.start_worker().unwrap();

    handle.connect();

    let mut saw_disconnect = false;
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        match events.recv_timeout(Duration::from_secs(1)) {
            Ok(RelayEvent::Disconnected { .. }) => {
                saw_disconnect = true;
                break;
            }
            Ok(_) => continue,
            Err(_) => continue,
        }
    }
    assert!(saw_disconnect, "closed port must produce a disconnect event");
    assert_ne!(handle.state(), ChannelState::Open);

    handle.shutdown();

    let mut saw_shutdown = false;
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        match events.recv_timeout(Duration::from_secs(1)) {
            Ok(RelayEvent::Shutdown) => {
                saw_shutdown = true;
                break;
            }
            Ok(_) => continue,
            Err(_) => continue,
        }
    }
    assert!(saw_shutdown, "shutdown must stop the worker");
}

/// Spoken replies reach the synthesizer in order, and the worker announces
/// its exit.
#[test]
fn test_spoken_replies_reach_synthesizer() {
    let synthesizer = StubSynthesizer::new();
    let spoken = synthesizer.clone();

    let pipeline = VoicePipeline::new(VoiceConfig::default()).with_engines(
        Box::new(StubRecognizer::with_transcript("ok")),
        Box::new(synthesizer),
    );
    let handle = pipeline.handle();
    let events = pipeline.event_receiver();
    let worker = pipeline.start_worker().unwrap();

    handle.speak("Take rest and drink fluids.", "en-US");
    handle.speak("See a doctor if it persists.", "en-US");
    handle.shutdown();
    worker.join().unwrap();

    assert_eq!(
        spoken.spoken(),
        vec![
            "Take rest and drink fluids.".to_string(),
            "See a doctor if it persists.".to_string(),
        ]
    );

    let mut saw_shutdown = false;
    while let Ok(event) = events.try_recv() {
        if matches!(event, VoiceEvent::Shutdown) {
            saw_shutdown = true;
        }
    }
    assert!(saw_shutdown, "worker must announce its exit");
}
