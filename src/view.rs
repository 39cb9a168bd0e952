//! Display surfaces for a chat session.
//!
//! The controller never prints.  It describes what changed through the
//! [`ChatView`] trait, and a view decides how that looks: [`PlainTextView`]
//! writes to a terminal, [`Transcript`] records everything in memory.

use std::io::{self, Stdout, Write};

use crate::types::{Notification, Role, TranscriptEntry};

/// ANSI escape code for dim text (used for placeholders and timestamps).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for bold text (used for headers).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for bot replies).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for yellow text (used for notifications).
const ANSI_YELLOW: &str = "\x1b[33m";

/// ANSI escape code for red text (used for redirects).
const ANSI_RED: &str = "\x1b[31m";

/// Move the cursor up one line and clear it.
const ANSI_CLEAR_PREVIOUS_LINE: &str = "\x1b[1A\x1b[2K\r";

/// Text of the transient message shown while a reply is outstanding.
pub const PROCESSING_PLACEHOLDER: &str = "...processing";

/// Text shown when the notification list is empty.
pub const NO_NOTIFICATIONS: &str = "No notifications";

/// What the notification area currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NotificationPanel {
    /// Nothing has been fetched yet.
    #[default]
    Unloaded,
    /// The last poll returned no notifications.
    Placeholder,
    /// The last poll's notifications, in server order.
    Items(Vec<Notification>),
}

impl NotificationPanel {
    /// Builds the panel for a freshly polled list.
    pub fn from_list(notifications: Vec<Notification>) -> Self {
        if notifications.is_empty() {
            NotificationPanel::Placeholder
        } else {
            NotificationPanel::Items(notifications)
        }
    }

    /// Number of notifications shown.
    pub fn len(&self) -> usize {
        match self {
            NotificationPanel::Items(items) => items.len(),
            _ => 0,
        }
    }

    /// Returns true when no notification is shown.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Receives every display change a chat session makes.
pub trait ChatView: Send {
    /// Append an entry to the message list.
    fn append_message(&mut self, entry: TranscriptEntry);

    /// Remove the most recent bot entry whose text is `placeholder`.
    ///
    /// Returns true if an entry was removed.
    fn retract_placeholder(&mut self, placeholder: &str) -> bool;

    /// Replace the notification area.
    fn render_notifications(&mut self, panel: &NotificationPanel);

    /// Replace the header label.
    fn set_header(&mut self, label: &str);

    /// The session is unusable; send the user to log in.
    fn redirect_to_login(&mut self, reason: &str);
}

/// Records everything in memory.
///
/// Useful for embedding the controller in another surface, and for tests.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    header: Option<String>,
    notifications: NotificationPanel,
    notification_renders: usize,
    redirects: Vec<String>,
}

impl Transcript {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// The message list, oldest first.
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Text of every bot entry, oldest first.
    pub fn bot_messages(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.role == Role::Bot)
            .map(|e| e.content.as_str())
            .collect()
    }

    /// The most recent entry.
    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    /// The header label, if one was set.
    pub fn header(&self) -> Option<&str> {
        self.header.as_deref()
    }

    /// The notification area.
    pub fn notifications(&self) -> &NotificationPanel {
        &self.notifications
    }

    /// How many times the notification area was rendered.
    pub fn notification_renders(&self) -> usize {
        self.notification_renders
    }

    /// Reasons given for every redirect to login.
    pub fn redirects(&self) -> &[String] {
        &self.redirects
    }
}

impl ChatView for Transcript {
    fn append_message(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    fn retract_placeholder(&mut self, placeholder: &str) -> bool {
        match self.entries.iter().rposition(|e| e.is_bot_text(placeholder)) {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    fn render_notifications(&mut self, panel: &NotificationPanel) {
        self.notifications = panel.clone();
        self.notification_renders += 1;
    }

    fn set_header(&mut self, label: &str) {
        self.header = Some(label.to_string());
    }

    fn redirect_to_login(&mut self, reason: &str) {
        self.redirects.push(reason.to_string());
    }
}

/// Plain text view with optional ANSI styling.
///
/// User entries are not echoed by default because the line editor already
/// shows what was typed.  The notification area is reprinted only when its
/// contents change, so a quiet poll does not scroll the terminal.
pub struct PlainTextView {
    stdout: Stdout,
    use_color: bool,
    echo_user: bool,
    last_line_placeholder: bool,
    last_panel: NotificationPanel,
}

impl PlainTextView {
    /// Creates a new PlainTextView with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextView with configurable color support.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
            echo_user: false,
            last_line_placeholder: false,
            last_panel: NotificationPanel::Unloaded,
        }
    }

    /// Also print user entries.
    pub fn echo_user(mut self, echo: bool) -> Self {
        self.echo_user = echo;
        self
    }

    fn styled(&self, style: &str, text: &str) -> String {
        if self.use_color {
            format!("{style}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    }

    fn write_line(&mut self, line: &str) {
        let _ = writeln!(self.stdout, "{line}");
        let _ = self.stdout.flush();
        self.last_line_placeholder = false;
    }
}

impl Default for PlainTextView {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatView for PlainTextView {
    fn append_message(&mut self, entry: TranscriptEntry) {
        match entry.role {
            Role::User if !self.echo_user => {}
            Role::User => {
                let line = format!("You: {}", entry.content);
                self.write_line(&line);
            }
            Role::Bot if entry.is_bot_text(PROCESSING_PLACEHOLDER) => {
                let line = self.styled(ANSI_DIM, PROCESSING_PLACEHOLDER);
                self.write_line(&line);
                self.last_line_placeholder = true;
            }
            Role::Bot => {
                let line = format!("{} {}", self.styled(ANSI_CYAN, "Bot:"), entry.content);
                self.write_line(&line);
            }
        }
    }

    fn retract_placeholder(&mut self, _placeholder: &str) -> bool {
        // Only the line right above the cursor can be taken back.
        if self.use_color && self.last_line_placeholder {
            let _ = write!(self.stdout, "{ANSI_CLEAR_PREVIOUS_LINE}");
            let _ = self.stdout.flush();
            self.last_line_placeholder = false;
            true
        } else {
            false
        }
    }

    fn render_notifications(&mut self, panel: &NotificationPanel) {
        if *panel == self.last_panel {
            return;
        }
        self.last_panel = panel.clone();
        let title = self.styled(ANSI_YELLOW, "Notifications:");
        self.write_line(&title);
        match panel {
            NotificationPanel::Unloaded => {}
            NotificationPanel::Placeholder => {
                let line = format!("  {}", self.styled(ANSI_DIM, NO_NOTIFICATIONS));
                self.write_line(&line);
            }
            NotificationPanel::Items(items) => {
                for n in items {
                    let line = format!(
                        "  * {} {}",
                        n.display_message(),
                        self.styled(ANSI_DIM, n.display_timestamp())
                    );
                    self.write_line(&line);
                }
            }
        }
    }

    fn set_header(&mut self, label: &str) {
        let line = self.styled(ANSI_BOLD, &format!("== {label} =="));
        self.write_line(&line);
    }

    fn redirect_to_login(&mut self, reason: &str) {
        let line = self.styled(ANSI_RED, reason);
        self.write_line(&line);
        self.write_line("Use /login <username> to sign in.");
    }
}
