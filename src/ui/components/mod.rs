//! Reusable UI components

pub mod debug_panel;
pub mod input_bar;
pub mod message_list;

pub use debug_panel::DebugPanel;
pub use input_bar::InputBar;
pub use message_list::MessageList;
