use parley_core::{ChatFrame, ChatMessage};
use tracing::warn;

/// Append-only message list of one session.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    messages: Vec<ChatMessage>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_local(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Parses an inbound frame and appends it as `remote`. Malformed frames
    /// are dropped.
    pub fn receive(&mut self, raw: &str) -> Option<ChatMessage> {
        match ChatFrame::decode(raw) {
            Ok(frame) => {
                let message = frame.into_remote_message();
                self.messages.push(message.clone());
                Some(message)
            }
            Err(e) => {
                warn!("Dropping malformed chat frame: {}", e);
                None
            }
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
