//! Localized prompt catalog and inline notice strings
//!
//! Every user-facing string the session emits lives here. Wizard prompts are
//! localized to the profile language; missing translations fall back to
//! English so an unfinished catalog can never block the flow.

use crate::session::profile::Language;

/// Language-selection menu, shown before a language is known
pub const CHOOSE_LANGUAGE: &str = "🌐 Choose language:\n1️⃣ English\n2️⃣ Telugu\n3️⃣ Hindi";

const CHOOSE_LANGUAGE_TELUGU: &str = "🌐 భాషను ఎంచుకోండి:\n1️⃣ English\n2️⃣ తెలుగు\n3️⃣ हिन्दी";
const CHOOSE_LANGUAGE_HINDI: &str = "🌐 भाषा चुनें:\n1️⃣ English\n2️⃣ తెలుగు\n3️⃣ हिन्दी";

const ASK_AGE: &str = "🧾 What is your age?";
const ASK_AGE_TELUGU: &str = "🧾 మీ వయస్సు ఎంత?";
const ASK_AGE_HINDI: &str = "🧾 आपकी उम्र क्या है?";

const ASK_GENDER: &str = "🧑‍⚕️ What is your gender? (Male / Female)";
const ASK_GENDER_TELUGU: &str = "🧑‍⚕️ మీ లింగం ఏమిటి? (Male / Female)";
const ASK_GENDER_HINDI: &str = "🧑‍⚕️ आपका लिंग क्या है? (Male / Female)";

const ASK_SYMPTOMS: &str = "❓ What problem are you facing? What symptoms do you have?";
const ASK_SYMPTOMS_TELUGU: &str = "❓ మీకు ఏ సమస్య ఉంది? మీకు ఏ లక్షణాలు కనిపిస్తున్నాయి?";
const ASK_SYMPTOMS_HINDI: &str = "❓ आपको क्या तकलीफ़ है? कौन से लक्षण दिख रहे हैं?";

/// Fixed acknowledgment emitted when the wizard completes
pub const SETUP_COMPLETE: &str =
    "✔ Setup complete! I will respond in your chosen language. How can I help you today?";

/// Language-selection prompt in the given language
pub fn choose_language(language: Language) -> &'static str {
    match language {
        Language::English => CHOOSE_LANGUAGE,
        Language::Telugu => CHOOSE_LANGUAGE_TELUGU,
        Language::Hindi => CHOOSE_LANGUAGE_HINDI,
    }
}

/// Age prompt in the given language
pub fn ask_age(language: Language) -> &'static str {
    match language {
        Language::English => ASK_AGE,
        Language::Telugu => ASK_AGE_TELUGU,
        Language::Hindi => ASK_AGE_HINDI,
    }
}

/// Gender prompt in the given language
pub fn ask_gender(language: Language) -> &'static str {
    match language {
        Language::English => ASK_GENDER,
        Language::Telugu => ASK_GENDER_TELUGU,
        Language::Hindi => ASK_GENDER_HINDI,
    }
}

/// Symptoms prompt in the given language
pub fn ask_symptoms(language: Language) -> &'static str {
    match language {
        Language::English => ASK_SYMPTOMS,
        Language::Telugu => ASK_SYMPTOMS_TELUGU,
        Language::Hindi => ASK_SYMPTOMS_HINDI,
    }
}

/// Session-opening greeting for the given local hour (0..24)
pub fn greeting(hour: u32) -> String {
    let greet = if hour < 12 {
        "Good Morning 🌞"
    } else if hour <= 15 {
        "Good Afternoon ☀️"
    } else {
        "Good Evening 🌙"
    };

    format!("{greet} Welcome to CureBot 🩺 — I will ask a few quick questions to help you better.")
}

/// Canonical values offered by the gender quick-reply buttons
pub const GENDER_CHOICES: [&str; 2] = ["Male", "Female"];

/// Inline notices rendered as bot bubbles on failures
pub mod notices {
    /// Shown when a send finds the channel not open (a reconnect is already
    /// underway by then)
    pub const CONNECTING: &str = "⚠️ Connecting to backend, try again in a moment.";

    /// Shown after a message could not be handed to the channel
    pub const SEND_FAILED: &str = "⚠️ Could not send message to backend.";

    /// Shown on explicit mic use when no speech engine is available
    pub const VOICE_UNAVAILABLE: &str = "🎤 Voice input is not available on this device.";

    /// Shown when the microphone cannot be opened
    pub const MIC_UNAVAILABLE: &str = "🎤 Could not access the microphone.";

    /// Shown when an image upload fails
    pub const IMAGE_FAILED: &str = "⚠️ Could not analyze the image.";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_are_localized() {
        assert_eq!(ask_age(Language::English), "🧾 What is your age?");
        assert_eq!(ask_age(Language::Telugu), "🧾 మీ వయస్సు ఎంత?");
        assert_eq!(ask_age(Language::Hindi), "🧾 आपकी उम्र क्या है?");

        assert_ne!(ask_symptoms(Language::Telugu), ask_symptoms(Language::Hindi));
    }

    #[test]
    fn test_gender_prompt_keeps_choice_hint() {
        for language in [Language::English, Language::Telugu, Language::Hindi] {
            assert!(ask_gender(language).contains("(Male / Female)"));
        }
    }

    #[test]
    fn test_greeting_by_hour() {
        assert!(greeting(0).starts_with("Good Morning"));
        assert!(greeting(11).starts_with("Good Morning"));
        assert!(greeting(12).starts_with("Good Afternoon"));
        assert!(greeting(15).starts_with("Good Afternoon"));
        assert!(greeting(16).starts_with("Good Evening"));
        assert!(greeting(23).starts_with("Good Evening"));
    }

    #[test]
    fn test_greeting_always_introduces_the_assistant() {
        for hour in [3, 13, 20] {
            assert!(greeting(hour).contains("Welcome to CureBot"));
        }
    }
}
