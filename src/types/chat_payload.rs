use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Attachment;

/// Document type sent by the interactive KYC flow.
pub const NATIONAL_ID: &str = "National ID";

/// Identity document collected by the interactive KYC flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StructuredDocument {
    /// Always [`NATIONAL_ID`] for the interactive flow.
    pub document_type: String,
    /// Uppercased identifier.
    pub document_number: String,
    /// Same value as `document_number`; the backend reads either.
    pub national_id: String,
    /// Full name.
    pub name: String,
    /// Date of birth, ISO `yyyy-mm-dd` when the input was recognized.
    pub dob: String,
}

impl StructuredDocument {
    /// Builds a national-ID document, normalizing the identifier and trimming fields.
    pub fn national_id(name: &str, national_id: &str, dob: &str) -> Self {
        let id = national_id.trim().to_uppercase();
        Self {
            document_type: NATIONAL_ID.to_string(),
            document_number: id.clone(),
            national_id: id,
            name: name.trim().to_string(),
            dob: dob.trim().to_string(),
        }
    }
}

/// The `document` member of a JSON chat message.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Document {
    /// Collected through the interactive KYC prompts.
    Kyc(StructuredDocument),
    /// A JSON object the user pasted, forwarded verbatim.
    Pasted(Map<String, Value>),
}

/// A multipart chat message carrying a file.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadForm {
    /// The `message` field; `kyc` when the user typed nothing.
    pub message: String,
    /// The attached file.
    pub file: Attachment,
    /// The free text as typed, when there was any.
    pub user_text: Option<String>,
    /// Identifier extracted from the free text.
    pub document_number: Option<String>,
    /// Name extracted from the free text.
    pub name: Option<String>,
}

/// Exactly one representation is sent per chat message.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatPayload {
    /// `{"message": ...}`
    Text {
        /// The message text.
        message: String,
    },
    /// `{"message": ..., "document": {...}}`
    Document {
        /// The message text.
        message: String,
        /// The attached document.
        document: Document,
    },
    /// `multipart/form-data` with a file.
    Upload(UploadForm),
}

/// JSON body of `POST /api/chat/message`.
#[derive(Debug, Serialize)]
pub struct JsonMessage<'a> {
    /// The message text.
    pub message: &'a str,
    /// The attached document, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<&'a Document>,
}

impl ChatPayload {
    /// Creates a plain text payload.
    pub fn text(message: impl Into<String>) -> Self {
        ChatPayload::Text {
            message: message.into(),
        }
    }

    /// The message text carried by any representation.
    pub fn message(&self) -> &str {
        match self {
            ChatPayload::Text { message } => message,
            ChatPayload::Document { message, .. } => message,
            ChatPayload::Upload(form) => &form.message,
        }
    }

    /// The JSON body for this payload, or `None` for a multipart upload.
    pub fn as_json(&self) -> Option<JsonMessage<'_>> {
        match self {
            ChatPayload::Text { message } => Some(JsonMessage {
                message,
                document: None,
            }),
            ChatPayload::Document { message, document } => Some(JsonMessage {
                message,
                document: Some(document),
            }),
            ChatPayload::Upload(_) => None,
        }
    }

    /// Returns true if this payload is sent as multipart.
    pub fn is_upload(&self) -> bool {
        matches!(self, ChatPayload::Upload(_))
    }

    /// Short name for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ChatPayload::Text { .. } => "text",
            ChatPayload::Document { .. } => "document",
            ChatPayload::Upload(_) => "upload",
        }
    }
}
