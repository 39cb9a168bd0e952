//! The chat session controller and its supporting pieces.
//!
//! This module drives a chat session against the backend. It supports:
//!
//! - Session validation and login/logout
//! - Dispatching drafts as JSON or multipart uploads
//! - Background notification polling
//! - Loading groups from in-chat links
//!
//! # Architecture
//!
//! - [`dispatch`]: drafts and the per-message state machine
//! - [`link`]: group links and the optional group loader
//! - [`poller`]: the cancellable notification poll
//! - [`config`]: CLI argument parsing and configuration
//! - [`commands`]: slash command parsing for the terminal front end

pub mod commands;
pub mod config;
pub mod dispatch;
pub mod link;
pub mod poller;
mod session;

pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig, ConfigFile};
pub use dispatch::{DEFAULT_UPLOAD_MESSAGE, DispatchState, Draft};
pub use link::{GROUP_LINK_CLASS, GROUP_LINK_MARKER, GroupLink, GroupLoader, LinkOutcome};
pub use poller::{DEFAULT_POLL_INTERVAL, NotificationPoller};
pub use session::{
    ChatController, ControllerOptions, INVALID_CREDENTIALS, LOGGED_OUT, LOGIN_FIRST,
    SESSION_EXPIRED, UNABLE_TO_VERIFY,
};
