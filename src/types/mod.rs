// Public modules
pub mod attachment;
pub mod chat_payload;
pub mod group;
pub mod login;
pub mod notification;
pub mod transcript_entry;
pub mod user_info;

// Re-exports
pub use attachment::Attachment;
pub use chat_payload::{ChatPayload, Document, JsonMessage, NATIONAL_ID, StructuredDocument, UploadForm};
pub use group::{Group, GroupMember};
pub(crate) use group::GroupResponse;
pub use login::{LoginRequest, LoginResponse};
pub use notification::Notification;
pub use transcript_entry::{Role, TranscriptEntry};
pub use user_info::UserInfo;
