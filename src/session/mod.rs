pub mod controller;
pub mod profile;
pub mod prompts;
pub mod wizard;

pub use controller::{InputSource, SessionController, SessionEvent};
pub use profile::{Language, Profile};
pub use wizard::{SetupWizard, StepOutcome, WizardStep};
