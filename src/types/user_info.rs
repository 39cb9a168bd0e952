use serde::{Deserialize, Serialize};

/// The authenticated user, as returned by `GET /api/users/me`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserInfo {
    /// Numeric user identifier used in per-user resource paths.
    pub id: u64,

    /// Display name shown in the chat header.
    pub username: String,

    /// Registered email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// KYC verification status, e.g. `pending` or `verified`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kyc_status: Option<String>,

    /// Hedera account bound to the user, once onboarded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hedera_id: Option<String>,
}

impl UserInfo {
    /// Creates a user with only the fields the controller relies on.
    pub fn new(id: u64, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: None,
            kyc_status: None,
            hedera_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_full_response() {
        let json = serde_json::json!({
            "id": 7,
            "username": "amina",
            "email": "amina@example.com",
            "kyc_status": "pending",
            "hedera_id": "0.0.1234"
        });
        let user: UserInfo = serde_json::from_value(json).unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.username, "amina");
        assert_eq!(user.hedera_id.as_deref(), Some("0.0.1234"));
    }

    #[test]
    fn deserialize_minimal_response() {
        let json = serde_json::json!({"id": 1, "username": "kofi", "hedera_id": null});
        let user: UserInfo = serde_json::from_value(json).unwrap();
        assert_eq!(user, UserInfo::new(1, "kofi"));
    }
}
