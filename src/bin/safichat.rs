//! Interactive terminal chat for the SafiHash lending and chat service.
//!
//! # Usage
//!
//! ```bash
//! # Talk to the hosted backend
//! safichat
//!
//! # Talk to a local backend, without colors
//! safichat --base-url http://localhost:5000 --no-color
//!
//! # Read settings from a file and log requests
//! RUST_LOG=safichat=debug safichat --config ~/.safichat/config.yaml
//! ```
//!
//! # Commands
//!
//! - `/login <username>` - Log in; the password is prompted
//! - `/attach <path>` - Attach a file to the next message
//! - `/group <slug|link>` - Load a cooperative group
//! - `/notifications` - Show notifications now
//! - `/logout` - Log out
//! - `/quit` - Exit the application

use std::sync::Arc;

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use safichat::controller::{
    ChatArgs, ChatCommand, ChatConfig, ChatController, ControllerOptions, Draft, GroupLink,
    LinkOutcome, help_text, parse_command,
};
use safichat::prompt::Prompter;
use safichat::token::FileTokenStore;
use safichat::view::PlainTextView;
use safichat::{Attachment, SafiHash, Session};

/// Answers prompts from the line editor.  Ctrl-C and Ctrl-D abandon.
struct EditorPrompter<'a> {
    editor: &'a mut DefaultEditor,
}

impl Prompter for EditorPrompter<'_> {
    fn ask(&mut self, question: &str) -> Option<String> {
        match self.editor.readline(&format!("{question} ")) {
            Ok(answer) => Some(answer),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => None,
            Err(err) => {
                tracing::warn!(error = %err, "prompt failed");
                None
            }
        }
    }
}

/// Main entry point for the safichat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("safichat [OPTIONS]");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ChatConfig::resolve(&args)?;
    let backend = Arc::new(SafiHash::with_options(
        config.base_url.clone(),
        Some(config.timeout),
    )?);
    let store = Arc::new(FileTokenStore::new(&config.state_dir));
    let session = Session::new(store);
    let view = PlainTextView::with_color(config.use_color);
    let options = ControllerOptions::new().with_poll_interval(config.poll_interval);
    let controller = ChatController::with_options(backend.clone(), session, view, options);
    let mut rl = DefaultEditor::new()?;

    println!("SafiHash Chat ({})", backend.base_url());
    println!("Type /help for commands, /quit to exit\n");
    controller.validate_session().await;

    let mut attachment: Option<Attachment> = None;
    loop {
        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() && attachment.is_none() {
                    continue;
                }
                if !line.is_empty() {
                    let _ = rl.add_history_entry(line);
                }

                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Attach(path) => match Attachment::from_path(&path).await {
                            Ok(file) => {
                                println!(
                                    "Attached {} ({} bytes, {}). It is sent with your next message.",
                                    file.file_name,
                                    file.len(),
                                    file.mime_type
                                );
                                attachment = Some(file);
                            }
                            Err(err) => eprintln!("Could not attach {}: {}", path, err),
                        },
                        ChatCommand::Detach => match attachment.take() {
                            Some(file) => println!("Removed {}.", file.file_name),
                            None => println!("Nothing attached."),
                        },
                        ChatCommand::Group(link) => {
                            let outcome = controller.follow_link(&GroupLink::parse(&link)).await;
                            if let LinkOutcome::Loaded { group, .. } = outcome {
                                if !group.members.is_empty() {
                                    println!("    Members: {}", group.members.len());
                                }
                            }
                        }
                        ChatCommand::Notifications => {
                            if let Err(err) = controller.refresh_notifications().await {
                                eprintln!("Could not load notifications: {}", err);
                            }
                        }
                        ChatCommand::WhoAmI => match controller.session().user() {
                            Some(user) => {
                                println!("    {} (id {})", user.username, user.id);
                                if let Some(status) = user.kyc_status {
                                    println!("    KYC: {}", status);
                                }
                                if let Some(hedera_id) = user.hedera_id {
                                    println!("    Hedera account: {}", hedera_id);
                                }
                            }
                            None => println!("Not logged in."),
                        },
                        ChatCommand::Login(username) => {
                            let mut prompter = EditorPrompter { editor: &mut rl };
                            match prompter.ask("Password:") {
                                Some(password) if !password.is_empty() => {
                                    controller.login(&username, &password).await;
                                }
                                _ => println!("Login cancelled."),
                            }
                        }
                        ChatCommand::Logout => {
                            controller.logout().await;
                        }
                        ChatCommand::Invalid(message) => {
                            eprintln!("{}", message);
                        }
                    }
                    continue;
                }

                let mut draft = Draft::text(line);
                if let Some(file) = attachment.take() {
                    draft = draft.with_attachment(file);
                }
                let mut prompter = EditorPrompter { editor: &mut rl };
                let state = controller.dispatch(draft, &mut prompter).await;
                tracing::debug!(state = %state, "dispatch finished");
            }
            Err(ReadlineError::Interrupted) => {
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                eprintln!("Input error: {}", err);
                break;
            }
        }
    }

    Ok(())
}
