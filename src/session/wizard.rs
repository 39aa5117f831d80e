//! Setup wizard state machine
//!
//! A fixed linear sequence of profile questions: language, age, gender,
//! symptoms. Each accepted input advances the cursor by exactly one; no step
//! is revisited or skipped. Unrecognized input never blocks progress, it is
//! normalized or stored verbatim per step. Once complete, the wizard freezes
//! and the session switches to relay mode.

use crate::session::profile::{Language, Profile};
use crate::session::prompts;

/// Number of profile questions
pub const STEP_COUNT: usize = 4;

/// One stage of the profile-collection sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Language,
    Age,
    Gender,
    Symptoms,
}

impl WizardStep {
    fn from_cursor(cursor: usize) -> Option<Self> {
        match cursor {
            0 => Some(WizardStep::Language),
            1 => Some(WizardStep::Age),
            2 => Some(WizardStep::Gender),
            3 => Some(WizardStep::Symptoms),
            _ => None,
        }
    }
}

/// Result of feeding one user input to the wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    /// Whether the input was consumed as setup data
    pub consumed: bool,
    /// Prompt to render next, if any
    pub next_prompt: Option<String>,
}

impl StepOutcome {
    fn ignored() -> Self {
        Self {
            consumed: false,
            next_prompt: None,
        }
    }

    fn advanced(prompt: &str) -> Self {
        Self {
            consumed: true,
            next_prompt: Some(prompt.to_string()),
        }
    }
}

/// Normalize a typed gender answer.
///
/// Case-insensitive substring match, with "female" tested first so it is not
/// shadowed by its "male" suffix. Anything else is stored verbatim.
pub fn normalize_gender(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    if lower.contains("female") {
        "Female".to_string()
    } else if lower.contains("male") {
        "Male".to_string()
    } else {
        raw.trim().to_string()
    }
}

/// Linear profile-collection state machine.
#[derive(Debug, Clone)]
pub struct SetupWizard {
    cursor: usize,
    completed: bool,
    profile: Profile,
}

impl SetupWizard {
    pub fn new() -> Self {
        Self {
            cursor: 0,
            completed: false,
            profile: Profile::new(),
        }
    }

    /// Current cursor value, frozen after completion
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    /// Step awaiting input, None once complete
    pub fn current_step(&self) -> Option<WizardStep> {
        if self.completed {
            None
        } else {
            WizardStep::from_cursor(self.cursor)
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Prompt that opens the sequence
    pub fn first_prompt(&self) -> &'static str {
        prompts::choose_language(self.profile.language_or_default())
    }

    /// Feed one user input to the current step.
    ///
    /// Empty input and input after completion are not consumed; the caller
    /// routes those to relay mode instead.
    pub fn submit(&mut self, raw: &str) -> StepOutcome {
        let input = raw.trim();
        if self.completed || input.is_empty() {
            return StepOutcome::ignored();
        }

        match WizardStep::from_cursor(self.cursor) {
            Some(WizardStep::Language) => {
                let language = Language::from_input(input);
                self.profile.language = Some(language);
                self.cursor = 1;
                StepOutcome::advanced(prompts::ask_age(language))
            }
            Some(WizardStep::Age) => {
                self.profile.age = Some(input.to_string());
                self.cursor = 2;
                StepOutcome::advanced(prompts::ask_gender(self.language()))
            }
            Some(WizardStep::Gender) => {
                self.profile.gender = Some(normalize_gender(input));
                self.cursor = 3;
                StepOutcome::advanced(prompts::ask_symptoms(self.language()))
            }
            Some(WizardStep::Symptoms) => {
                self.profile.symptoms = Some(input.to_string());
                self.cursor = STEP_COUNT;
                self.completed = true;
                StepOutcome::advanced(prompts::SETUP_COMPLETE)
            }
            None => StepOutcome::ignored(),
        }
    }

    /// Satisfy a bounded multiple-choice step with a canonical value,
    /// bypassing text normalization. Only the gender step offers choices.
    pub fn submit_choice(&mut self, canonical: &str) -> StepOutcome {
        if self.current_step() != Some(WizardStep::Gender) {
            return StepOutcome::ignored();
        }

        self.profile.gender = Some(canonical.to_string());
        self.cursor = 3;
        StepOutcome::advanced(prompts::ask_symptoms(self.language()))
    }

    fn language(&self) -> Language {
        self.profile.language_or_default()
    }
}

impl Default for SetupWizard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_wizard() -> SetupWizard {
        let mut wizard = SetupWizard::new();
        wizard.submit("1");
        wizard.submit("30");
        wizard.submit("male");
        wizard.submit("headache");
        wizard
    }

    #[test]
    fn test_cursor_advances_by_one_per_input() {
        let mut wizard = SetupWizard::new();
        let inputs = ["2", "45", "whatever", "stomach pain"];

        for (i, input) in inputs.iter().enumerate() {
            assert_eq!(wizard.cursor(), i);
            let outcome = wizard.submit(input);
            assert!(outcome.consumed);
            assert_eq!(wizard.cursor(), i + 1);
        }

        assert!(wizard.is_complete());
    }

    #[test]
    fn test_completion_is_sticky() {
        let mut wizard = complete_wizard();
        assert!(wizard.is_complete());
        assert_eq!(wizard.cursor(), STEP_COUNT);

        // Further input is not consumed and the cursor stays frozen
        for input in ["hello", "2", "female"] {
            let outcome = wizard.submit(input);
            assert!(!outcome.consumed);
            assert!(outcome.next_prompt.is_none());
            assert_eq!(wizard.cursor(), STEP_COUNT);
            assert!(wizard.is_complete());
        }
    }

    #[test]
    fn test_empty_input_does_not_advance() {
        let mut wizard = SetupWizard::new();
        assert!(!wizard.submit("").consumed);
        assert!(!wizard.submit("   ").consumed);
        assert_eq!(wizard.cursor(), 0);
    }

    #[test]
    fn test_language_step_localizes_next_prompt() {
        let mut wizard = SetupWizard::new();
        let outcome = wizard.submit("2");

        assert_eq!(wizard.profile().language, Some(Language::Telugu));
        assert_eq!(
            outcome.next_prompt.as_deref(),
            Some(prompts::ask_age(Language::Telugu))
        );
    }

    #[test]
    fn test_language_defaults_on_ambiguous_input() {
        let mut wizard = SetupWizard::new();
        let outcome = wizard.submit("no idea");

        assert!(outcome.consumed);
        assert_eq!(wizard.profile().language, Some(Language::English));
        assert_eq!(wizard.cursor(), 1);
    }

    #[test]
    fn test_age_stored_verbatim() {
        let mut wizard = SetupWizard::new();
        wizard.submit("1");
        wizard.submit("about forty");

        assert_eq!(wizard.profile().age.as_deref(), Some("about forty"));
    }

    #[test]
    fn test_gender_normalization() {
        assert_eq!(normalize_gender("male"), "Male");
        assert_eq!(normalize_gender("MALE"), "Male");
        assert_eq!(normalize_gender("I am male"), "Male");
        assert_eq!(normalize_gender("female"), "Female");
        assert_eq!(normalize_gender("Female "), "Female");
        assert_eq!(normalize_gender("other"), "other");
        assert_eq!(normalize_gender("prefer not to say"), "prefer not to say");
    }

    #[test]
    fn test_gender_step_stores_normalized_value() {
        let mut wizard = SetupWizard::new();
        wizard.submit("1");
        wizard.submit("50");
        wizard.submit("fEmAlE");

        assert_eq!(wizard.profile().gender.as_deref(), Some("Female"));
    }

    #[test]
    fn test_choice_shortcut_on_gender_step() {
        let mut wizard = SetupWizard::new();
        wizard.submit("3");
        wizard.submit("28");
        assert_eq!(wizard.current_step(), Some(WizardStep::Gender));

        let outcome = wizard.submit_choice("Male");
        assert!(outcome.consumed);
        assert_eq!(wizard.profile().gender.as_deref(), Some("Male"));
        assert_eq!(wizard.current_step(), Some(WizardStep::Symptoms));
        assert_eq!(
            outcome.next_prompt.as_deref(),
            Some(prompts::ask_symptoms(Language::Hindi))
        );
    }

    #[test]
    fn test_choice_ignored_outside_gender_step() {
        let mut wizard = SetupWizard::new();
        assert!(!wizard.submit_choice("Male").consumed);
        assert_eq!(wizard.cursor(), 0);

        let mut done = complete_wizard();
        assert!(!done.submit_choice("Female").consumed);
    }

    #[test]
    fn test_final_step_emits_acknowledgment() {
        let mut wizard = SetupWizard::new();
        wizard.submit("1");
        wizard.submit("30");
        wizard.submit("male");
        let outcome = wizard.submit("fever since yesterday");

        assert!(wizard.is_complete());
        assert_eq!(
            outcome.next_prompt.as_deref(),
            Some(prompts::SETUP_COMPLETE)
        );
        assert_eq!(
            wizard.profile().symptoms.as_deref(),
            Some("fever since yesterday")
        );
        assert!(wizard.profile().is_filled());
    }
}
