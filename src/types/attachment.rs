use std::fmt;

use bytes::Bytes;

use crate::error::{Error, Result};

/// A file attached to the next chat message.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name reported to the server.
    pub file_name: String,
    /// MIME type of the content.
    pub mime_type: String,
    /// File contents.
    pub bytes: Bytes,
}

impl Attachment {
    /// Creates an attachment from in-memory contents, guessing the MIME type from the name.
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let file_name = file_name.into();
        let mime_type = guess_mime_type(&file_name);
        Self {
            file_name,
            mime_type,
            bytes: bytes.into(),
        }
    }

    /// Reads an attachment from disk.
    ///
    /// ```
    /// # use safichat::Attachment;
    /// # tokio_test::block_on(async {
    /// let file = Attachment::from_path("Cargo.toml").await.unwrap();
    /// assert_eq!(file.file_name, "Cargo.toml");
    /// assert!(!file.is_empty());
    /// # });
    /// ```
    pub async fn from_path(path: &str) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Error::io(format!("could not read {path}: {e}"), e))?;
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| Error::validation("attachment has no file name", Some(path.to_string())))?
            .to_string();
        Ok(Self::new(file_name, bytes))
    }

    /// Size of the attachment in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the attachment is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn guess_mime_type(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_or_octet_stream()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_from_extension() {
        assert_eq!(Attachment::new("id.JPG", vec![1]).mime_type, "image/jpeg");
        assert_eq!(Attachment::new("scan.pdf", vec![1]).mime_type, "application/pdf");
        assert_eq!(
            Attachment::new("blob", vec![1]).mime_type,
            "application/octet-stream"
        );
    }

    #[test]
    fn mime_for_common_scan_formats() {
        assert_eq!(Attachment::new("scan.tiff", vec![1]).mime_type, "image/tiff");
        assert_eq!(Attachment::new("id.bmp", vec![1]).mime_type, "image/bmp");
        assert_eq!(
            Attachment::new("doc.docx", vec![1]).mime_type,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
        assert_eq!(Attachment::new("card.webp", vec![1]).mime_type, "image/webp");
    }

    #[test]
    fn debug_hides_contents() {
        let a = Attachment::new("id.png", vec![0u8; 4]);
        let dbg = format!("{a:?}");
        assert!(dbg.contains("len: 4"));
        assert!(!dbg.contains("bytes"));
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let err = Attachment::from_path("/nonexistent/safichat/id.png")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
