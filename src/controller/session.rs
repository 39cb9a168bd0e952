//! The chat session controller.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::backend::Backend;
use crate::controller::dispatch::{DispatchState, Draft};
use crate::controller::link::{GroupLink, GroupLoader, LinkOutcome};
use crate::controller::poller::{DEFAULT_POLL_INTERVAL, NotificationPoller};
use crate::error::{Error, Result};
use crate::observability::{
    DISPATCH_CANCELLED, DISPATCH_FAILED, DISPATCH_SENT, DISPATCH_UPLOADS, GROUP_LOAD_ERRORS,
    GROUP_LOADS, POLL_ERRORS, POLLS, SESSION_REDIRECTS, SESSION_VALIDATIONS,
};
use crate::prompt::Prompter;
use crate::session::Session;
use crate::types::{LoginRequest, Notification, TranscriptEntry, UserInfo};
use crate::view::{ChatView, NotificationPanel, PROCESSING_PLACEHOLDER};

/// Shown when there is no token at all.
pub const LOGIN_FIRST: &str = "Please login first.";

/// Shown when the server rejects the token.
pub const SESSION_EXPIRED: &str = "Session expired. Please login again.";

/// Shown when the token could not be checked.
pub const UNABLE_TO_VERIFY: &str = "Unable to verify session. Please login.";

/// Shown after an explicit logout.
pub const LOGGED_OUT: &str = "Logged out.";

/// Shown when the login endpoint rejects the credentials.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Options for a [`ChatController`].
#[derive(Clone)]
pub struct ControllerOptions {
    poll_interval: Duration,
    group_loader: Option<Arc<dyn GroupLoader>>,
}

impl ControllerOptions {
    /// Default options: 15 second polls and no group loader.
    pub fn new() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            group_loader: None,
        }
    }

    /// Sets the time between notification polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Hands loaded groups to `loader` instead of the default fallback.
    pub fn with_group_loader(mut self, loader: Arc<dyn GroupLoader>) -> Self {
        self.group_loader = Some(loader);
        self
    }
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ControllerOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerOptions")
            .field("poll_interval", &self.poll_interval)
            .field("group_loader", &self.group_loader.is_some())
            .finish()
    }
}

/// The parts the poll task needs.  It holds these, never the controller, so
/// that dropping the last controller stops the poll.
struct Shared<V> {
    backend: Arc<dyn Backend>,
    session: Session,
    view: Arc<Mutex<V>>,
}

impl<V> Clone for Shared<V> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            session: self.session.clone(),
            view: Arc::clone(&self.view),
        }
    }
}

impl<V: ChatView + 'static> Shared<V> {
    fn with_view<R>(&self, f: impl FnOnce(&mut V) -> R) -> R {
        let mut view = self.view.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut view)
    }

    fn say(&self, text: impl Into<String>) {
        let entry = TranscriptEntry::bot(text);
        self.with_view(|v| v.append_message(entry));
    }

    async fn refresh_notifications(&self, user_id: u64) -> Result<Vec<Notification>> {
        POLLS.click();
        let result = match self.session.bearer() {
            Ok(token) => self.backend.notifications(&token, user_id).await,
            Err(err) => Err(err),
        };
        match result {
            Ok(notifications) => {
                tracing::debug!(user_id, count = notifications.len(), "notifications polled");
                let panel = NotificationPanel::from_list(notifications.clone());
                self.with_view(|v| v.render_notifications(&panel));
                Ok(notifications)
            }
            Err(err) => {
                POLL_ERRORS.click();
                tracing::warn!(user_id, error = %err, "notification poll failed");
                Err(err)
            }
        }
    }
}

struct Inner<V> {
    shared: Shared<V>,
    poller: NotificationPoller,
    group_loader: Option<Arc<dyn GroupLoader>>,
}

/// Drives one chat session: validation, dispatch, notifications and group links.
///
/// Cloning is cheap and every clone drives the same session, so several
/// dispatches may be in flight at once.  Their replies render in the order
/// they resolve.  The view lock is never held across an await.
///
/// ```no_run
/// # async fn demo() -> safichat::Result<()> {
/// use std::sync::Arc;
/// use safichat::controller::{ChatController, Draft};
/// use safichat::prompt::ScriptedPrompter;
/// use safichat::token::MemoryTokenStore;
/// use safichat::view::Transcript;
/// use safichat::{SafiHash, Session};
///
/// let backend = Arc::new(SafiHash::new(None)?);
/// let session = Session::new(Arc::new(MemoryTokenStore::with_token("jwt")));
/// let controller = ChatController::new(backend, session, Transcript::new());
/// if controller.validate_session().await.is_some() {
///     let mut prompter = ScriptedPrompter::abandon();
///     controller.dispatch(Draft::text("wallet"), &mut prompter).await;
/// }
/// # Ok(())
/// # }
/// ```
pub struct ChatController<V: ChatView + 'static> {
    inner: Arc<Inner<V>>,
}

impl<V: ChatView + 'static> Clone for ChatController<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: ChatView + 'static> ChatController<V> {
    /// Creates a controller with default options.
    pub fn new(backend: Arc<dyn Backend>, session: Session, view: V) -> Self {
        Self::with_options(backend, session, view, ControllerOptions::default())
    }

    /// Creates a controller.
    pub fn with_options(
        backend: Arc<dyn Backend>,
        session: Session,
        view: V,
        options: ControllerOptions,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                shared: Shared {
                    backend,
                    session,
                    view: Arc::new(Mutex::new(view)),
                },
                poller: NotificationPoller::new(options.poll_interval),
                group_loader: options.group_loader,
            }),
        }
    }

    /// The session context.
    pub fn session(&self) -> &Session {
        &self.inner.shared.session
    }

    /// Runs `f` with the view locked.
    pub fn with_view<R>(&self, f: impl FnOnce(&mut V) -> R) -> R {
        self.inner.shared.with_view(f)
    }

    /// Returns true while the notification poll is running.
    pub fn is_polling(&self) -> bool {
        self.inner.poller.is_running()
    }

    /// Checks the stored token against the user-info endpoint.
    ///
    /// On success the user is remembered, the header shows the username and
    /// notification polling starts.  Validating again with the same token
    /// yields the same identity and leaves the poll alone.
    pub async fn validate_session(&self) -> Option<UserInfo> {
        SESSION_VALIDATIONS.click();
        let shared = &self.inner.shared;
        let token = match shared.session.token() {
            Ok(Some(token)) => token,
            Ok(None) => {
                tracing::info!("no session token");
                self.redirect(LOGIN_FIRST);
                return None;
            }
            Err(err) => {
                tracing::warn!(error = %err, "could not read session token");
                self.redirect(LOGIN_FIRST);
                return None;
            }
        };

        match shared.backend.whoami(&token).await {
            Ok(user) => {
                tracing::info!(user_id = user.id, username = %user.username, "session validated");
                shared.session.set_user(user.clone());
                let header = format!("Hedera ID - {}", user.username);
                shared.with_view(|v| v.set_header(&header));
                self.start_polling(user.id);
                Some(user)
            }
            Err(err) if err.is_network() => {
                tracing::warn!(error = %err, "session check failed");
                self.redirect(UNABLE_TO_VERIFY);
                None
            }
            Err(err) => {
                tracing::info!(error = %err, "session rejected");
                self.expire_session(SESSION_EXPIRED);
                None
            }
        }
    }

    /// Exchanges credentials for a token, then validates the new session.
    pub async fn login(&self, username: &str, password: &str) -> Option<UserInfo> {
        let shared = &self.inner.shared;
        let request = LoginRequest::new(username, password);
        match shared.backend.login(&request).await {
            Ok(response) => {
                if let Err(err) = shared.session.set_token(&response.access_token) {
                    tracing::warn!(error = %err, "could not store session token");
                    shared.say(format!("Login failed: {err}"));
                    return None;
                }
                tracing::info!(username, "logged in");
                self.inner.poller.stop();
                self.validate_session().await
            }
            Err(err) if err.is_authentication() => {
                tracing::info!(username, "login rejected");
                shared.say(INVALID_CREDENTIALS);
                None
            }
            Err(err) if err.is_network() => {
                tracing::warn!(error = %err, "login failed");
                shared.say(format!("Network error: {err}"));
                None
            }
            Err(err) => {
                tracing::warn!(error = %err, "login failed");
                shared.say(format!("Login failed: {err}"));
                None
            }
        }
    }

    /// Ends the session.
    ///
    /// The logout call is best effort.  Whatever it returns, polling stops,
    /// the token is discarded and the view is sent to login.
    pub async fn logout(&self) {
        let shared = &self.inner.shared;
        match shared.session.token() {
            Ok(Some(token)) => {
                if let Err(err) = shared.backend.logout(&token).await {
                    tracing::warn!(error = %err, "logout call failed");
                }
            }
            Ok(None) => {}
            Err(err) => tracing::warn!(error = %err, "could not read session token"),
        }
        self.expire_session(LOGGED_OUT);
    }

    /// Starts the notification poll for `user_id`.
    ///
    /// Returns false if a poll is already running.
    pub fn start_polling(&self, user_id: u64) -> bool {
        let shared = self.inner.shared.clone();
        self.inner.poller.start(user_id, move |user_id| {
            let shared = shared.clone();
            async move {
                let _ = shared.refresh_notifications(user_id).await;
            }
        })
    }

    /// Polls notifications once for the validated user and renders them.
    pub async fn refresh_notifications(&self) -> Result<Vec<Notification>> {
        let shared = &self.inner.shared;
        let user_id = shared
            .session
            .user_id()
            .ok_or_else(|| Error::authentication("Not authenticated. Please login."))?;
        shared.refresh_notifications(user_id).await
    }

    /// Sends one draft and renders the reply.
    ///
    /// Returns [`DispatchState::Rendered`] when a reply was shown and
    /// [`DispatchState::Idle`] when the draft was empty, cancelled, failed on
    /// the network or hit an authorization failure.
    pub async fn dispatch(&self, draft: Draft, prompter: &mut dyn Prompter) -> DispatchState {
        let shared = &self.inner.shared;
        if draft.is_empty() {
            return DispatchState::Idle;
        }
        if let Some(echo) = draft.echo() {
            let entry = TranscriptEntry::user(echo);
            shared.with_view(|v| v.append_message(entry));
        }

        tracing::debug!(state = %DispatchState::Composing, "dispatch");
        let payload = match draft.compose(prompter) {
            Ok(payload) => payload,
            Err(err) => {
                DISPATCH_CANCELLED.click();
                tracing::info!(error = %err, "dispatch cancelled");
                shared.say(abort_message(err));
                return DispatchState::Idle;
            }
        };

        let token = match shared.session.bearer() {
            Ok(token) => token,
            Err(err) => {
                tracing::info!(error = %err, "dispatch without a session");
                self.expire_session(LOGIN_FIRST);
                return DispatchState::Idle;
            }
        };

        let upload = payload.is_upload();
        if upload {
            DISPATCH_UPLOADS.click();
        } else {
            shared.say(PROCESSING_PLACEHOLDER);
        }
        DISPATCH_SENT.click();
        tracing::debug!(state = %DispatchState::Sending, kind = payload.kind(), "dispatch");
        let start = Instant::now();
        let result = shared.backend.send_message(&token, &payload).await;
        if !upload {
            shared.with_view(|v| v.retract_placeholder(PROCESSING_PLACEHOLDER));
        }

        match result {
            Ok(reply) => {
                if !reply.is_success() {
                    tracing::info!(status = reply.status, "chat endpoint returned an error");
                }
                shared.say(reply.text());
                tracing::debug!(
                    state = %DispatchState::Rendered,
                    status = reply.status,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "dispatch"
                );
                if let Some(user_id) = shared.session.user_id() {
                    let _ = shared.refresh_notifications(user_id).await;
                }
                DispatchState::Rendered
            }
            Err(err) if err.is_authentication() => {
                DISPATCH_FAILED.click();
                tracing::info!(error = %err, "chat endpoint rejected the token");
                self.expire_session(SESSION_EXPIRED);
                DispatchState::Idle
            }
            Err(err) => {
                DISPATCH_FAILED.click();
                tracing::warn!(error = %err, upload, "dispatch failed");
                if upload {
                    shared.say(format!("Upload failed: {err}"));
                } else {
                    shared.say(format!("Network error: {err}"));
                }
                DispatchState::Idle
            }
        }
    }

    /// Loads a group in place when `link` is a group link.
    pub async fn follow_link(&self, link: &GroupLink) -> LinkOutcome {
        let shared = &self.inner.shared;
        if !link.is_group_link() {
            return LinkOutcome::NotIntercepted;
        }
        let Some(slug) = link.resolve_slug() else {
            shared.say("Group link invalid.");
            return LinkOutcome::Invalid;
        };

        shared.say(format!("...loading group {slug}"));
        let token = match shared.session.bearer() {
            Ok(token) => token,
            Err(err) => {
                shared.say(err_message(&err));
                return LinkOutcome::Failed { slug };
            }
        };

        GROUP_LOADS.click();
        match shared.backend.group(&token, &slug).await {
            Ok(group) => {
                tracing::info!(slug = %slug, "group loaded");
                match &self.inner.group_loader {
                    Some(loader) => loader.load_group(&slug, &group),
                    None => {
                        let name = group.display_name(&slug).to_string();
                        shared.with_view(|v| v.set_header(&name));
                        shared.say(format!("Loaded group: {name}"));
                    }
                }
                LinkOutcome::Loaded { slug, group }
            }
            Err(err) => {
                GROUP_LOAD_ERRORS.click();
                tracing::warn!(slug = %slug, error = %err, "group load failed");
                match err.status_code() {
                    Some(status) => shared.say(format!("Failed to load group ({status}).")),
                    None => shared.say(format!("Error loading group: {err}")),
                }
                LinkOutcome::Failed { slug }
            }
        }
    }

    fn redirect(&self, reason: &str) {
        SESSION_REDIRECTS.click();
        self.inner.shared.with_view(|v| v.redirect_to_login(reason));
    }

    fn expire_session(&self, reason: &str) {
        self.inner.poller.stop();
        if let Err(err) = self.inner.shared.session.discard() {
            tracing::warn!(error = %err, "could not discard session token");
        }
        self.redirect(reason);
    }
}

impl<V: ChatView + 'static> std::fmt::Debug for ChatController<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatController")
            .field("session", &self.inner.shared.session)
            .field("polling", &self.inner.poller.is_running())
            .finish_non_exhaustive()
    }
}

fn abort_message(err: Error) -> String {
    match err {
        Error::Abort { message } => message,
        other => other.to_string(),
    }
}

fn err_message(err: &Error) -> String {
    match err {
        Error::Authentication { message } => message.clone(),
        other => other.to_string(),
    }
}
