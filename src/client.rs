use std::env;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client as ReqwestClient, RequestBuilder, Response, header};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::backend::{Backend, ChatReply};
use crate::error::{Error, Result};
use crate::observability::{CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS};
use crate::types::{
    ChatPayload, Group, GroupResponse, LoginRequest, LoginResponse, Notification, UploadForm,
    UserInfo,
};

/// Default server for the SafiHash chat backend.
pub const DEFAULT_BASE_URL: &str = "https://safihash.onrender.com";
/// Environment variable that overrides [`DEFAULT_BASE_URL`].
pub const BASE_URL_ENV: &str = "SAFICHAT_BASE_URL";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for the SafiHash REST API.
#[derive(Debug, Clone)]
pub struct SafiHash {
    client: ReqwestClient,
    base_url: Url,
    timeout: Duration,
}

impl SafiHash {
    /// Create a new SafiHash client.
    ///
    /// The base URL can be provided directly or read from the SAFICHAT_BASE_URL
    /// environment variable, falling back to [`DEFAULT_BASE_URL`].
    pub fn new(base_url: Option<String>) -> Result<Self> {
        Self::with_options(base_url, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(base_url: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = base_url
            .or_else(|| env::var(BASE_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(base_url.trim())?;
        if base_url.cannot_be_a_base() {
            return Err(Error::url(
                format!("{base_url} cannot be used as a base URL"),
                None,
            ));
        }

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// The server this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL from path segments; each segment is escaped.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::url(format!("{} cannot be a base URL", self.base_url), None))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Headers for an authenticated request.
    fn auth_headers(token: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .map_err(|_| Error::authentication("token contains invalid header characters"))?;
        headers.insert(header::AUTHORIZATION, bearer);
        Ok(headers)
    }

    /// Send a request, recording metrics and mapping transport failures.
    async fn execute(&self, op: &'static str, request: RequestBuilder) -> Result<Response> {
        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let result = request.send().await;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        match result {
            Ok(response) => {
                tracing::debug!(op, status = response.status().as_u16(), "response received");
                Ok(response)
            }
            Err(e) => {
                CLIENT_REQUEST_ERRORS.click();
                tracing::warn!(op, error = %e, "request failed");
                Err(if e.is_timeout() {
                    Error::timeout(
                        format!("Request timed out: {}", e),
                        Some(self.timeout.as_secs_f64()),
                    )
                } else if e.is_connect() {
                    Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
                } else {
                    Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
                })
            }
        }
    }

    /// Pass successful responses through; turn everything else into an error.
    async fn expect_success(response: Response) -> Result<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            CLIENT_REQUEST_ERRORS.click();
            Err(Self::process_error_response(response).await)
        }
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();
        match response.text().await {
            Ok(body) => error_for_status(status_code, &body),
            Err(e) => Error::http_client(
                format!("Failed to read error response: {}", e),
                Some(Box::new(e)),
            ),
        }
    }

    async fn parse_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
        response.json::<T>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }

    fn upload_form(form: &UploadForm) -> Result<Form> {
        let file = Part::bytes(form.file.bytes.to_vec())
            .file_name(form.file.file_name.clone())
            .mime_str(&form.file.mime_type)
            .map_err(|e| {
                Error::validation(
                    format!("invalid attachment type {}: {}", form.file.mime_type, e),
                    Some("file".to_string()),
                )
            })?;
        let mut multipart = Form::new()
            .text("message", form.message.clone())
            .part("file", file);
        if let Some(user_text) = &form.user_text {
            multipart = multipart.text("user_text", user_text.clone());
        }
        if let Some(document_number) = &form.document_number {
            multipart = multipart.text("document_number", document_number.clone());
        }
        if let Some(name) = &form.name {
            multipart = multipart.text("name", name.clone());
        }
        Ok(multipart)
    }
}

#[async_trait::async_trait]
impl Backend for SafiHash {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        let url = self.endpoint(&["api", "users", "login"])?;
        let response = self
            .execute("login", self.client.post(url).json(request))
            .await?;
        Self::parse_json(Self::expect_success(response).await?).await
    }

    async fn whoami(&self, token: &str) -> Result<UserInfo> {
        let url = self.endpoint(&["api", "users", "me"])?;
        let request = self.client.get(url).headers(Self::auth_headers(token)?);
        let response = self.execute("whoami", request).await?;
        Self::parse_json(Self::expect_success(response).await?).await
    }

    async fn notifications(&self, token: &str, user_id: u64) -> Result<Vec<Notification>> {
        let user_id = user_id.to_string();
        let url = self.endpoint(&["api", "notifications", &user_id])?;
        let request = self.client.get(url).headers(Self::auth_headers(token)?);
        let response = self.execute("notifications", request).await?;
        let value: Value = Self::parse_json(Self::expect_success(response).await?).await?;
        match value {
            Value::Array(_) => Ok(serde_json::from_value(value)?),
            // Anything but an array renders as "no notifications".
            _ => Ok(Vec::new()),
        }
    }

    async fn send_message(&self, token: &str, payload: &ChatPayload) -> Result<ChatReply> {
        let url = self.endpoint(&["api", "chat", "message"])?;
        let request = self.client.post(url).headers(Self::auth_headers(token)?);
        let request = match payload {
            ChatPayload::Upload(form) => request.multipart(Self::upload_form(form)?),
            _ => request.json(&payload.as_json()),
        };
        let response = self.execute("send_message", request).await?;
        let status = response.status().as_u16();
        if rejects_token(status) {
            CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }
        let body = response.text().await.map_err(|e| {
            Error::http_client(format!("Failed to read response: {}", e), Some(Box::new(e)))
        })?;
        Ok(ChatReply { status, body })
    }

    async fn group(&self, token: &str, slug: &str) -> Result<Group> {
        let url = self.endpoint(&["api", "coops", slug])?;
        let request = self.client.get(url).headers(Self::auth_headers(token)?);
        let response = self.execute("group", request).await?;
        let group: GroupResponse = Self::parse_json(Self::expect_success(response).await?).await?;
        Ok(group.into())
    }

    async fn logout(&self, token: &str) -> Result<()> {
        let url = self.endpoint(&["api", "users", "logout"])?;
        let request = self.client.post(url).headers(Self::auth_headers(token)?);
        let response = self.execute("logout", request).await?;
        Self::expect_success(response).await.map(|_| ())
    }
}

/// Statuses that mean the bearer token is missing, expired or malformed.
pub(crate) fn rejects_token(status_code: u16) -> bool {
    matches!(status_code, 401 | 422)
}

/// Map a non-success status and its body onto an [`Error`].
///
/// The backend reports failures as `{"error": ...}`, `{"response": ...}` or
/// `{"message": ...}`; a body that is none of those is used verbatim.
pub(crate) fn error_for_status(status_code: u16, body: &str) -> Error {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<String>,
        response: Option<String>,
        message: Option<String>,
        msg: Option<String>,
    }

    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error.or(b.response).or(b.message).or(b.msg))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string());

    match status_code {
        status if rejects_token(status) => Error::authentication(message),
        403 => Error::permission(message),
        404 => Error::not_found(message, None, None),
        408 => Error::timeout(message, None),
        _ => Error::api(status_code, message),
    }
}
