pub mod storage;
pub mod types;

pub use storage::MessageStorage;
pub use types::{ImageData, Message, MessageContent, MessageMetadata, Sender};
