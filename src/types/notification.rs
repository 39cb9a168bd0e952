use serde::{Deserialize, Serialize};

/// Text shown for a notification that carries no message.
const DEFAULT_MESSAGE: &str = "Notification";

/// A user notification from `GET /api/notifications/{user_id}`.
///
/// The backend has shipped both `message`/`created_at` and `msg`/`timestamp`
/// spellings; either is accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "RawNotification")]
pub struct Notification {
    /// Notification text.
    pub message: Option<String>,
    /// Creation time as formatted by the server.
    pub timestamp: Option<String>,
}

#[derive(Deserialize)]
struct RawNotification {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
}

impl From<RawNotification> for Notification {
    fn from(raw: RawNotification) -> Self {
        let message = raw.message.filter(|m| !m.is_empty()).or(raw.msg);
        let timestamp = raw.created_at.filter(|t| !t.is_empty()).or(raw.timestamp);
        Self { message, timestamp }
    }
}

impl Notification {
    /// Creates a notification.
    pub fn new(message: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            timestamp: Some(timestamp.into()),
        }
    }

    /// The text to display.
    pub fn display_message(&self) -> &str {
        self.message
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MESSAGE)
    }

    /// The timestamp to display, or the empty string.
    pub fn display_timestamp(&self) -> &str {
        self.timestamp.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_server_shape() {
        let json = serde_json::json!({
            "id": 4,
            "user_id": 7,
            "message": "Loan approved",
            "type": "loan",
            "is_read": false,
            "created_at": "2024-03-01 10:00:00"
        });
        let n: Notification = serde_json::from_value(json).unwrap();
        assert_eq!(n.display_message(), "Loan approved");
        assert_eq!(n.display_timestamp(), "2024-03-01 10:00:00");
    }

    #[test]
    fn deserialize_alias_shape() {
        let json = serde_json::json!({"msg": "Deposit received", "timestamp": "yesterday"});
        let n: Notification = serde_json::from_value(json).unwrap();
        assert_eq!(n, Notification::new("Deposit received", "yesterday"));
    }

    #[test]
    fn missing_fields_fall_back() {
        let n: Notification = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(n.display_message(), "Notification");
        assert_eq!(n.display_timestamp(), "");
    }

    #[test]
    fn both_spellings_prefer_primary() {
        let json = serde_json::json!({"message": "a", "msg": "b", "created_at": "t1", "timestamp": "t2"});
        let n: Notification = serde_json::from_value(json).unwrap();
        assert_eq!(n, Notification::new("a", "t1"));
    }
}
