//! UI module for CureBot
//!
//! egui-based chat interface: message list, input bar, and debug panel.

pub mod app;
pub mod components;
pub mod state;
pub mod theme;

pub use app::CureBotApp;
pub use state::{AppState, DebugInfo, RecordingState};
pub use theme::Theme;
