//! The seam between the chat controller and the SafiHash HTTP API.
//!
//! [`crate::SafiHash`] is the production implementation.  The controller only
//! ever talks to a `Backend`, which is what lets the dispatch, polling and link
//! flows be exercised without a network.

use crate::error::Result;
use crate::types::{ChatPayload, Group, LoginRequest, LoginResponse, Notification, UserInfo};

/// The raw outcome of a chat message post.
///
/// Non-success statuses other than 401 are not errors here: the backend
/// explains refusals in the body and the controller renders them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text; may or may not be JSON.
    pub body: String,
}

impl ChatReply {
    /// Creates a reply.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The text to render for this reply.
    pub fn text(&self) -> String {
        crate::extract::reply_text(&self.body)
    }
}

/// Operations the chat controller needs from the server.
///
/// Every method except [`Backend::login`] takes the bearer token explicitly.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// `POST /api/users/login`.
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse>;

    /// `GET /api/users/me`.
    async fn whoami(&self, token: &str) -> Result<UserInfo>;

    /// `GET /api/notifications/{user_id}`.
    async fn notifications(&self, token: &str, user_id: u64) -> Result<Vec<Notification>>;

    /// `POST /api/chat/message`, as JSON or multipart depending on the payload.
    async fn send_message(&self, token: &str, payload: &ChatPayload) -> Result<ChatReply>;

    /// `GET /api/coops/{slug}`.
    async fn group(&self, token: &str, slug: &str) -> Result<Group>;

    /// `POST /api/users/logout`.
    async fn logout(&self, token: &str) -> Result<()>;
}
