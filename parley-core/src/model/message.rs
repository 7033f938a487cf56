use crate::error::ModelError;
use crate::utils::now_millis;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static MESSAGE_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Local,
    Remote,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    /// Unix milliseconds.
    pub timestamp: i64,
    pub origin: Origin,
}

impl ChatMessage {
    /// New locally authored message stamped with the current time.
    pub fn local(text: impl Into<String>) -> Self {
        let timestamp = now_millis();
        let seq = MESSAGE_SEQ.fetch_add(1, Ordering::Relaxed);

        Self {
            id: format!("{timestamp}-{seq}"),
            text: text.into(),
            timestamp,
            origin: Origin::Local,
        }
    }

    pub fn to_frame(&self) -> ChatFrame {
        ChatFrame::Message {
            id: Some(self.id.clone()),
            text: self.text.clone(),
            timestamp: Some(self.timestamp),
        }
    }
}

/// JSON frame carried over the data channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ChatFrame {
    Message {
        #[serde(default)]
        id: Option<String>,
        text: String,
        #[serde(default)]
        timestamp: Option<i64>,
    },
}

impl ChatFrame {
    pub fn encode(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(raw: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Turns a received frame into a `remote` message, filling in a local id
    /// and timestamp when the sender omitted them.
    pub fn into_remote_message(self) -> ChatMessage {
        let ChatFrame::Message {
            id,
            text,
            timestamp,
        } = self;

        let received_at = now_millis();
        ChatMessage {
            id: id.unwrap_or_else(|| received_at.to_string()),
            text,
            timestamp: timestamp.unwrap_or(received_at),
            origin: Origin::Remote,
        }
    }
}
