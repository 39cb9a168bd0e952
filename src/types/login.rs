use serde::{Deserialize, Serialize};

/// Credentials posted to `POST /api/users/login`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LoginRequest {
    /// Username or email address.
    pub username: String,
    /// Plain-text password.
    pub password: String,
}

impl LoginRequest {
    /// Creates a new login request.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Successful login response.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub access_token: String,

    /// The logged-in user's identifier.
    #[serde(default)]
    pub id: Option<u64>,

    /// The logged-in user's name.
    #[serde(default)]
    pub username: Option<String>,

    /// Server greeting, e.g. "Login successful".
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serialization() {
        let req = LoginRequest::new("amina", "hunter2");
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({"username": "amina", "password": "hunter2"})
        );
    }

    #[test]
    fn response_ignores_unknown_fields() {
        let json = serde_json::json!({
            "message": "Login successful",
            "id": 3,
            "username": "amina",
            "role": "user",
            "kyc_status": "pending",
            "access_token": "eyJ.abc.def"
        });
        let resp: LoginResponse = serde_json::from_value(json).unwrap();
        assert_eq!(resp.access_token, "eyJ.abc.def");
        assert_eq!(resp.id, Some(3));
    }
}
