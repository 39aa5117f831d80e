//! User profile collected by the setup wizard
//!
//! Fields are assigned exactly once, in step order, and never cleared while
//! the process lives.

use serde::{Deserialize, Serialize};

/// Interface languages the assistant supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Telugu,
    Hindi,
}

impl Language {
    /// Normalize free-form input to a language.
    ///
    /// Precedence: exact numeric token, then case-insensitive keyword or
    /// native-script name. Anything unrecognized falls back to English;
    /// ambiguous input never blocks the wizard.
    pub fn from_input(raw: &str) -> Self {
        let input = raw.trim();
        let lower = input.to_lowercase();

        if input == "1" || lower.contains("english") {
            Language::English
        } else if input == "2" || lower.contains("telugu") || input.contains("తెలుగు") {
            Language::Telugu
        } else if input == "3"
            || lower.contains("hindi")
            || input.contains("हिन्दी")
            || input.contains("हिंदी")
        {
            Language::Hindi
        } else {
            Language::English
        }
    }

    /// Wire value expected by the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Telugu => "telugu",
            Language::Hindi => "hindi",
        }
    }

    /// BCP 47 tag for the speech engines
    pub fn locale(&self) -> &'static str {
        match self {
            Language::English => "en-US",
            Language::Telugu => "te-IN",
            Language::Hindi => "hi-IN",
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::English
    }
}

/// Profile record filled in by the wizard, one field per step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    pub language: Option<Language>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub symptoms: Option<String>,
}

impl Profile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Language for prompt lookup and speech locales. English until the
    /// language step has run.
    pub fn language_or_default(&self) -> Language {
        self.language.unwrap_or_default()
    }

    /// True once every wizard field has been assigned
    pub fn is_filled(&self) -> bool {
        self.language.is_some()
            && self.age.is_some()
            && self.gender.is_some()
            && self.symptoms.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_tokens() {
        assert_eq!(Language::from_input("1"), Language::English);
        assert_eq!(Language::from_input("2"), Language::Telugu);
        assert_eq!(Language::from_input("3"), Language::Hindi);
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        assert_eq!(Language::from_input("English please"), Language::English);
        assert_eq!(Language::from_input("TELUGU"), Language::Telugu);
        assert_eq!(Language::from_input("I'd like Hindi"), Language::Hindi);
    }

    #[test]
    fn test_native_script_match() {
        assert_eq!(Language::from_input("తెలుగు"), Language::Telugu);
        assert_eq!(Language::from_input("हिन्दी"), Language::Hindi);
        assert_eq!(Language::from_input("हिंदी"), Language::Hindi);
    }

    #[test]
    fn test_unrecognized_defaults_to_english() {
        assert_eq!(Language::from_input("42"), Language::English);
        assert_eq!(Language::from_input("français"), Language::English);
        assert_eq!(Language::from_input(""), Language::English);
    }

    #[test]
    fn test_numeric_token_must_be_exact() {
        // "12" is not a menu choice; it falls through to the default
        assert_eq!(Language::from_input("12"), Language::English);
    }

    #[test]
    fn test_locales() {
        assert_eq!(Language::English.locale(), "en-US");
        assert_eq!(Language::Telugu.locale(), "te-IN");
        assert_eq!(Language::Hindi.locale(), "hi-IN");
    }

    #[test]
    fn test_wire_values() {
        assert_eq!(Language::English.as_str(), "english");
        assert_eq!(Language::Telugu.as_str(), "telugu");
        assert_eq!(Language::Hindi.as_str(), "hindi");
    }

    #[test]
    fn test_profile_fill_tracking() {
        let mut profile = Profile::new();
        assert!(!profile.is_filled());
        assert_eq!(profile.language_or_default(), Language::English);

        profile.language = Some(Language::Telugu);
        profile.age = Some("34".to_string());
        profile.gender = Some("Female".to_string());
        assert!(!profile.is_filled());

        profile.symptoms = Some("fever and cough".to_string());
        assert!(profile.is_filled());
        assert_eq!(profile.language_or_default(), Language::Telugu);
    }
}
