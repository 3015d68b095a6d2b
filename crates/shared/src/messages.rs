//! Role-tagged chat messages and the modifier control-message format.
//!
//! One `ChatRequest` carries the full conversation for a single turn. A
//! system message whose content starts with [`MODS_UPDATED_PREFIX`] is a
//! control message: it conveys the client's enabled-modifier ids and must
//! never be forwarded to the text-generation backend as a conversation turn.

use serde::{Deserialize, Serialize};

/// Literal prefix marking a modifier control message.
pub const MODS_UPDATED_PREFIX: &str = "Mods updated";

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
    /// Unknown roles deserialize here for forward compatibility.
    #[serde(other)]
    Unknown,
}

/// One message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    /// Whether this is a modifier control message.
    pub fn is_control(&self) -> bool {
        self.role == ChatRole::System && self.content.starts_with(MODS_UPDATED_PREFIX)
    }

    /// Enabled-modifier ids carried by this control message.
    ///
    /// The id list is the text after the last `": "` in the content,
    /// comma-space-separated. This accepts both observed shapes:
    /// `Mods updated. Enabled mods: a, b` and `Mods updated: a, b`.
    /// Returns None for non-control messages and for control messages
    /// carrying no list segment.
    pub fn enabled_mods(&self) -> Option<Vec<String>> {
        if !self.is_control() {
            return None;
        }
        let list = &self.content[self.content.rfind(": ")? + 2..];
        Some(
            list.split(", ")
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}

/// Inbound body of one conversational turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatTurn>,
}

/// Enabled-modifier ids from the most recent control message, if any.
pub fn latest_enabled_mods(messages: &[ChatTurn]) -> Option<Vec<String>> {
    messages.iter().rev().find(|m| m.is_control())?.enabled_mods()
}

/// The most recent human-authored message, if any.
pub fn latest_user_message(messages: &[ChatTurn]) -> Option<&ChatTurn> {
    messages.iter().rev().find(|m| m.role == ChatRole::User)
}
