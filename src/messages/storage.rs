use super::types::{Message, MessageContent, Sender};
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared transcript store. The rendered transcript is the only record the
/// client keeps; nothing is persisted across runs.
#[derive(Debug, Clone)]
pub struct MessageStorage {
    messages: Arc<RwLock<Vec<Message>>>,
}

impl MessageStorage {
    pub fn new() -> Self {
        Self {
            messages: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn add(&self, message: Message) {
        self.messages.write().push(message);
    }

    /// Append a bot-role text bubble
    pub fn add_bot_text(&self, text: impl Into<String>) {
        self.add(Message::text(Sender::Bot, text));
    }

    pub fn get_all(&self) -> Vec<Message> {
        self.messages.read().clone()
    }

    pub fn last(&self) -> Option<Message> {
        self.messages.read().last().cloned()
    }

    /// Text of the most recent message, for status display and tests
    pub fn last_text(&self) -> Option<String> {
        self.messages.read().last().and_then(|m| match &m.content {
            MessageContent::Text(text) => Some(text.clone()),
            MessageContent::Image(_) => None,
        })
    }

    pub fn clear(&self) {
        self.messages.write().clear();
    }

    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }
}

impl Default for MessageStorage {
    fn default() -> Self {
        Self::new()
    }
}
