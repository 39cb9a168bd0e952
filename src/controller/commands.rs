//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to control the session without sending chat messages.

/// A parsed chat command.
///
/// These commands control the session and are not sent to the chat endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Attach a file to the next message.
    Attach(String),

    /// Drop the pending attachment.
    Detach,

    /// Load a group by slug or link.
    Group(String),

    /// Fetch and show notifications now.
    Notifications,

    /// Show the logged-in user.
    WhoAmI,

    /// Log in as the given user.
    Login(String),

    /// Log out and discard the token.
    Logout,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a valid command,
/// or `None` if it should be treated as a regular message.
///
/// # Examples
///
/// ```
/// # use safichat::controller::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/group accra-savers").is_some());
/// assert!(parse_command("kyc").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input[1..].splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "attach" | "file" => match argument {
            Some(path) => ChatCommand::Attach(path.to_string()),
            None => ChatCommand::Invalid("/attach requires a file path".to_string()),
        },
        "detach" => ChatCommand::Detach,
        "group" => match argument {
            Some(link) => ChatCommand::Group(link.to_string()),
            None => ChatCommand::Invalid("/group requires a slug or link".to_string()),
        },
        "notifications" | "n" => ChatCommand::Notifications,
        "whoami" | "me" => ChatCommand::WhoAmI,
        "login" => match argument {
            Some(user) if !user.contains(' ') => ChatCommand::Login(user.to_string()),
            Some(_) => ChatCommand::Invalid("/login takes a single username".to_string()),
            None => ChatCommand::Invalid("/login requires a username".to_string()),
        },
        "logout" => ChatCommand::Logout,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /attach <path>         Attach a file to the next message
  /detach                Drop the pending attachment
  /group <slug|link>     Load a cooperative group
  /notifications         Show notifications now
  /whoami                Show the logged-in user
  /login <username>      Log in (password is prompted)
  /logout                Log out and forget the session token
  /help                  Show this help message
  /quit                  Exit the chat

Type "kyc" to start identity verification."#
}
