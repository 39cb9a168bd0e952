use serde::{Deserialize, Serialize};

/// Author of a transcript entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person at the keyboard.
    User,
    /// The chat backend.
    Bot,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Bot => write!(f, "bot"),
        }
    }
}

/// One line of the chat message list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranscriptEntry {
    /// Who wrote it.
    pub role: Role,
    /// The rendered text.
    pub content: String,
}

impl TranscriptEntry {
    /// Creates a user entry.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates a bot entry.
    pub fn bot(content: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            content: content.into(),
        }
    }

    /// Returns true if this is a bot entry whose trimmed text equals `text`.
    pub fn is_bot_text(&self, text: &str) -> bool {
        self.role == Role::Bot && self.content.trim() == text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        let entry = TranscriptEntry::bot("hi");
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            serde_json::json!({"role": "bot", "content": "hi"})
        );
    }

    #[test]
    fn is_bot_text_ignores_whitespace() {
        assert!(TranscriptEntry::bot(" ...processing ").is_bot_text("...processing"));
        assert!(!TranscriptEntry::user("...processing").is_bot_text("...processing"));
    }
}
