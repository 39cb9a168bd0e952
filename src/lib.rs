//! Client-side chat session controller for the SafiHash lending and chat service.
//!
//! The crate validates a bearer-token session, dispatches chat messages as JSON
//! or multipart uploads, renders replies, polls notifications, and loads
//! cooperative groups from in-chat links.  [`SafiHash`] talks HTTP; the
//! [`controller::ChatController`] drives a session against any [`backend::Backend`]
//! and describes what changed through a [`view::ChatView`].

// Public modules
pub mod backend;
pub mod client;
pub mod controller;
pub mod error;
pub mod extract;
pub mod prompt;
pub mod session;
pub mod token;
pub mod types;
pub mod view;

mod observability;

// Re-exports
pub use backend::{Backend, ChatReply};
pub use client::SafiHash;
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use session::Session;
pub use types::*;
