//! Message dispatch states and drafts.

use crate::error::Result;
use crate::extract::{extract_kyc_fields, parse_pasted_document};
use crate::prompt::{Prompter, collect_kyc};
use crate::types::{Attachment, ChatPayload, Document, UploadForm};

/// Message sent in place of empty text when only a file is attached.
pub const DEFAULT_UPLOAD_MESSAGE: &str = "kyc";

/// Where a single dispatch is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchState {
    /// Nothing in flight; also the outcome of a cancelled or failed send.
    Idle,
    /// The draft is being turned into a payload.
    Composing,
    /// The payload is on the wire.
    Sending,
    /// The reply has been rendered.
    Rendered,
}

impl std::fmt::Display for DispatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DispatchState::Idle => "idle",
            DispatchState::Composing => "composing",
            DispatchState::Sending => "sending",
            DispatchState::Rendered => "rendered",
        };
        f.write_str(name)
    }
}

/// What the user submitted: free text and an optional file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    text: String,
    attachment: Option<Attachment>,
}

impl Draft {
    /// A text-only draft.  Surrounding whitespace is dropped.
    pub fn text(text: impl AsRef<str>) -> Self {
        Self {
            text: text.as_ref().trim().to_string(),
            attachment: None,
        }
    }

    /// Attaches a file to the draft.
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    /// The trimmed text.
    pub fn body(&self) -> &str {
        &self.text
    }

    /// The attached file, if any.
    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    /// Returns true when there is neither text nor a file.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.attachment.is_none()
    }

    /// What to show as the user's entry: the text, else the file name.
    pub fn echo(&self) -> Option<&str> {
        if !self.text.is_empty() {
            Some(&self.text)
        } else {
            self.attachment.as_ref().map(|a| a.file_name.as_str())
        }
    }

    /// Turns the draft into exactly one payload representation.
    ///
    /// A file always means multipart.  Otherwise the literal `kyc` runs the
    /// interactive prompts, a pasted identity document is forwarded as is,
    /// and anything else is plain text.
    pub fn compose(self, prompter: &mut dyn Prompter) -> Result<ChatPayload> {
        let Draft { text, attachment } = self;

        if let Some(file) = attachment {
            let fields = extract_kyc_fields(&text).unwrap_or_default();
            let user_text = (!text.is_empty()).then(|| text.clone());
            let message = if text.is_empty() {
                DEFAULT_UPLOAD_MESSAGE.to_string()
            } else {
                text
            };
            return Ok(ChatPayload::Upload(UploadForm {
                message,
                file,
                user_text,
                document_number: fields.national_id,
                name: fields.full_name,
            }));
        }

        if text.eq_ignore_ascii_case("kyc") {
            let document = collect_kyc(prompter)?;
            return Ok(ChatPayload::Document {
                message: text,
                document: Document::Kyc(document),
            });
        }

        if let Some(object) = parse_pasted_document(&text) {
            return Ok(ChatPayload::Document {
                message: text,
                document: Document::Pasted(object),
            });
        }

        Ok(ChatPayload::text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompter;

    #[test]
    fn echo_prefers_text() {
        assert_eq!(Draft::text("  hi ").echo(), Some("hi"));
        let draft = Draft::text("").with_attachment(Attachment::new("id.png", vec![1]));
        assert_eq!(draft.echo(), Some("id.png"));
        assert_eq!(Draft::text("   ").echo(), None);
        assert!(Draft::text(" ").is_empty());
    }

    #[test]
    fn upload_extracts_fields() {
        let draft = Draft::text("kyc name John Doe id GH123456")
            .with_attachment(Attachment::new("id.png", vec![1]));
        let payload = draft.compose(&mut ScriptedPrompter::abandon()).unwrap();
        let ChatPayload::Upload(form) = payload else {
            panic!("expected upload");
        };
        assert_eq!(form.message, "kyc name John Doe id GH123456");
        assert_eq!(form.document_number.as_deref(), Some("GH123456"));
        assert_eq!(form.name.as_deref(), Some("John Doe"));
        assert_eq!(form.user_text.as_deref(), Some("kyc name John Doe id GH123456"));
    }

    #[test]
    fn upload_without_text_sends_kyc() {
        let draft = Draft::text("").with_attachment(Attachment::new("id.png", vec![1]));
        let ChatPayload::Upload(form) = draft.compose(&mut ScriptedPrompter::abandon()).unwrap()
        else {
            panic!("expected upload");
        };
        assert_eq!(form.message, DEFAULT_UPLOAD_MESSAGE);
        assert_eq!(form.user_text, None);
        assert_eq!(form.document_number, None);
        assert_eq!(form.name, None);
    }

    #[test]
    fn upload_never_prompts() {
        let mut prompter = ScriptedPrompter::abandon();
        let draft = Draft::text("KYC").with_attachment(Attachment::new("id.png", vec![1]));
        assert!(draft.compose(&mut prompter).unwrap().is_upload());
        assert!(prompter.asked().is_empty());
    }

    #[test]
    fn kyc_keyword_is_case_insensitive() {
        let mut prompter = ScriptedPrompter::new(["John Doe", "GH123456", "25-12-1990"]);
        let payload = Draft::text("KyC").compose(&mut prompter).unwrap();
        let ChatPayload::Document {
            document: Document::Kyc(doc),
            ..
        } = payload
        else {
            panic!("expected kyc document");
        };
        assert_eq!(doc.dob, "1990-12-25");
    }

    #[test]
    fn pasted_json_document() {
        let payload = Draft::text(r#"{"national_id": "GH123456", "name": "Ama"}"#)
            .compose(&mut ScriptedPrompter::abandon())
            .unwrap();
        assert!(matches!(
            payload,
            ChatPayload::Document {
                document: Document::Pasted(_),
                ..
            }
        ));
    }

    #[test]
    fn other_text_is_plain() {
        let payload = Draft::text("wallet")
            .compose(&mut ScriptedPrompter::abandon())
            .unwrap();
        assert_eq!(payload, ChatPayload::text("wallet"));
    }

    #[test]
    fn state_display() {
        assert_eq!(DispatchState::Rendered.to_string(), "rendered");
    }
}
