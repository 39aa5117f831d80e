//! Session controller
//!
//! Owns the profile, the setup wizard and the one-shot voice-reply flag, and
//! turns user inputs and backend replies into the actions the rest of the
//! app performs: render a bot bubble, relay a payload, speak a line. All
//! input paths (typed, recognized speech, quick-reply buttons) dispatch
//! through here, so there is no session state outside this object.

use crate::relay::protocol::ChatRequest;
use crate::session::profile::Profile;
use crate::session::prompts;
use crate::session::wizard::SetupWizard;
use chrono::{Local, Timelike};

/// Where a user turn came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Typed,
    Voice,
}

/// Action requested by the session in response to an input or reply.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Render a bot-role message in the transcript
    Say(String),
    /// Forward a payload to the backend
    Relay(ChatRequest),
    /// Synthesize speech for bot output
    Speak(String),
}

/// Session state machine: wizard first, relay mode after.
#[derive(Debug, Clone)]
pub struct SessionController {
    wizard: SetupWizard,
    voice_reply: bool,
}

impl SessionController {
    pub fn new() -> Self {
        Self {
            wizard: SetupWizard::new(),
            voice_reply: false,
        }
    }

    /// Opening events for the current local time
    pub fn begin(&mut self) -> Vec<SessionEvent> {
        self.begin_with_hour(Local::now().hour())
    }

    /// Opening events: time-of-day greeting, then the language menu
    pub fn begin_with_hour(&mut self, hour: u32) -> Vec<SessionEvent> {
        vec![
            SessionEvent::Say(prompts::greeting(hour)),
            SessionEvent::Say(self.wizard.first_prompt().to_string()),
        ]
    }

    /// Dispatch one user turn.
    ///
    /// While setup is incomplete the wizard consumes the input and the next
    /// prompt is emitted; completing the final step also relays the initial
    /// payload built from the collected profile. In relay mode the input is
    /// packaged with the profile and forwarded. A voice-originated turn arms
    /// the one-shot flag so the next bot output is also spoken; a typed turn
    /// disarms it.
    pub fn submit(&mut self, raw: &str, source: InputSource) -> Vec<SessionEvent> {
        let input = raw.trim();
        if input.is_empty() {
            return Vec::new();
        }

        self.voice_reply = source == InputSource::Voice;

        if !self.wizard.is_complete() {
            let outcome = self.wizard.submit(input);
            if !outcome.consumed {
                return Vec::new();
            }

            let mut events = Vec::new();
            if let Some(prompt) = outcome.next_prompt {
                self.push_bot_output(&mut events, prompt);
            }
            if self.wizard.is_complete() {
                events.push(SessionEvent::Relay(self.relay_request(input, true)));
            }
            return events;
        }

        vec![SessionEvent::Relay(self.relay_request(input, false))]
    }

    /// Satisfy the current multiple-choice step via its button affordance
    pub fn choose(&mut self, canonical: &str) -> Vec<SessionEvent> {
        let outcome = self.wizard.submit_choice(canonical);
        if !outcome.consumed {
            return Vec::new();
        }

        let mut events = Vec::new();
        if let Some(prompt) = outcome.next_prompt {
            self.push_bot_output(&mut events, prompt);
        }
        events
    }

    /// Handle one inbound backend reply
    pub fn on_reply(&mut self, text: &str) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        self.push_bot_output(&mut events, text.to_string());
        events
    }

    /// Choices offered for the current step, if it is a bounded one
    pub fn quick_replies(&self) -> Option<&'static [&'static str]> {
        match self.wizard.current_step() {
            Some(crate::session::wizard::WizardStep::Gender) => Some(&prompts::GENDER_CHOICES),
            _ => None,
        }
    }

    pub fn profile(&self) -> &Profile {
        self.wizard.profile()
    }

    pub fn is_setup_complete(&self) -> bool {
        self.wizard.is_complete()
    }

    /// Speech locale derived from the profile language
    pub fn locale(&self) -> &'static str {
        self.profile().language_or_default().locale()
    }

    /// Whether the next bot output would be spoken
    pub fn voice_reply_pending(&self) -> bool {
        self.voice_reply
    }

    /// Emit a bot line, spoken at most once per voice-originated turn
    fn push_bot_output(&mut self, events: &mut Vec<SessionEvent>, text: String) {
        if std::mem::take(&mut self.voice_reply) {
            events.push(SessionEvent::Say(text.clone()));
            events.push(SessionEvent::Speak(text));
        } else {
            events.push(SessionEvent::Say(text));
        }
    }

    fn relay_request(&self, message: &str, setup: bool) -> ChatRequest {
        let profile = self.profile();
        ChatRequest {
            message: message.to_string(),
            language: profile.language_or_default().as_str().to_string(),
            age: profile.age.clone(),
            gender: profile.gender.clone(),
            symptoms: profile.symptoms.clone(),
            setup: setup.then_some(true),
        }
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::profile::Language;

    fn says(events: &[SessionEvent]) -> Vec<&str> {
        events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Say(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn speaks(events: &[SessionEvent]) -> Vec<&str> {
        events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Speak(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn relays(events: &[SessionEvent]) -> Vec<&ChatRequest> {
        events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Relay(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    fn completed_session() -> SessionController {
        let mut session = SessionController::new();
        session.submit("1", InputSource::Typed);
        session.submit("30", InputSource::Typed);
        session.submit("male", InputSource::Typed);
        session.submit("cough", InputSource::Typed);
        session
    }

    #[test]
    fn test_begin_greets_then_asks_language() {
        let mut session = SessionController::new();
        let events = session.begin_with_hour(9);

        let lines = says(&events);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Good Morning"));
        assert_eq!(lines[1], prompts::CHOOSE_LANGUAGE);
        assert!(speaks(&events).is_empty());
    }

    #[test]
    fn test_wizard_flow_to_first_relay() {
        let mut session = SessionController::new();

        let events = session.submit("2", InputSource::Typed);
        assert_eq!(says(&events), vec![prompts::ask_age(Language::Telugu)]);
        assert_eq!(session.profile().language, Some(Language::Telugu));

        session.submit("45", InputSource::Typed);
        session.submit("female", InputSource::Typed);

        let events = session.submit("fever and chills", InputSource::Typed);
        assert!(session.is_setup_complete());
        assert_eq!(says(&events), vec![prompts::SETUP_COMPLETE]);

        let sent = relays(&events);
        assert_eq!(sent.len(), 1);
        let request = sent[0];
        assert_eq!(request.message, "fever and chills");
        assert_eq!(request.language, "telugu");
        assert_eq!(request.age.as_deref(), Some("45"));
        assert_eq!(request.gender.as_deref(), Some("Female"));
        assert_eq!(request.symptoms.as_deref(), Some("fever and chills"));
        assert_eq!(request.setup, Some(true));
    }

    #[test]
    fn test_relay_mode_packages_profile() {
        let mut session = completed_session();
        let events = session.submit("is this serious?", InputSource::Typed);

        assert!(says(&events).is_empty());
        let sent = relays(&events);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].message, "is this serious?");
        assert_eq!(sent[0].language, "english");
        assert_eq!(sent[0].gender.as_deref(), Some("Male"));
        assert_eq!(sent[0].setup, None);
    }

    #[test]
    fn test_empty_input_is_dropped() {
        let mut session = SessionController::new();
        assert!(session.submit("", InputSource::Typed).is_empty());
        assert!(session.submit("  \n", InputSource::Voice).is_empty());
        assert!(!session.voice_reply_pending());
    }

    #[test]
    fn test_voice_turn_speaks_next_prompt_once() {
        let mut session = SessionController::new();
        let events = session.submit("english", InputSource::Voice);

        let expected = prompts::ask_age(Language::English);
        assert_eq!(says(&events), vec![expected]);
        assert_eq!(speaks(&events), vec![expected]);
        assert!(!session.voice_reply_pending());

        // The following typed turn stays silent
        let events = session.submit("30", InputSource::Typed);
        assert!(speaks(&events).is_empty());
    }

    #[test]
    fn test_voice_reply_flag_is_one_shot_in_relay_mode() {
        let mut session = completed_session();

        session.submit("my head hurts", InputSource::Voice);
        assert!(session.voice_reply_pending());

        let events = session.on_reply("Drink water and rest.");
        assert_eq!(says(&events), vec!["Drink water and rest."]);
        assert_eq!(speaks(&events), vec!["Drink water and rest."]);
        assert!(!session.voice_reply_pending());

        // A second reply without a new voice turn is rendered silently
        let events = session.on_reply("Anything else?");
        assert_eq!(says(&events), vec!["Anything else?"]);
        assert!(speaks(&events).is_empty());
    }

    #[test]
    fn test_typed_turn_disarms_voice_flag() {
        let mut session = completed_session();
        session.submit("first question", InputSource::Voice);
        assert!(session.voice_reply_pending());

        session.submit("second question", InputSource::Typed);
        assert!(!session.voice_reply_pending());

        let events = session.on_reply("Here is my advice.");
        assert!(speaks(&events).is_empty());
    }

    #[test]
    fn test_quick_replies_only_on_gender_step() {
        let mut session = SessionController::new();
        assert!(session.quick_replies().is_none());

        session.submit("1", InputSource::Typed);
        assert!(session.quick_replies().is_none());

        session.submit("30", InputSource::Typed);
        assert_eq!(session.quick_replies(), Some(&prompts::GENDER_CHOICES[..]));

        let events = session.choose("Female");
        assert_eq!(says(&events), vec![prompts::ask_symptoms(Language::English)]);
        assert!(session.quick_replies().is_none());
        assert_eq!(session.profile().gender.as_deref(), Some("Female"));
    }

    #[test]
    fn test_choice_ignored_when_not_offered() {
        let mut session = completed_session();
        assert!(session.choose("Male").is_empty());
    }

    #[test]
    fn test_locale_follows_profile() {
        let mut session = SessionController::new();
        assert_eq!(session.locale(), "en-US");

        session.submit("3", InputSource::Typed);
        assert_eq!(session.locale(), "hi-IN");
    }
}
