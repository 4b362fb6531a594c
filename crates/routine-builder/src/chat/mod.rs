// Chat bridge: conversation state, prompt text and the HTTP transport to an
// OpenAI-compatible chat-completions endpoint.

pub mod client;
pub mod conversation;
pub mod prompt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use client::{ChatClient, HttpChatClient};
pub use conversation::{Conversation, OutboundTurn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat endpoint not configured")]
    NotConfigured,

    #[error("chat endpoint returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("endpoint returned an empty reply")]
    EmptyReply,
}
