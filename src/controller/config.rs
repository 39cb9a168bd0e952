//! Configuration types for the chat application.
//!
//! Settings are layered: built-in defaults, then an optional YAML file, then
//! the `SAFICHAT_BASE_URL` environment variable, then command-line flags
//! parsed via `arrrg`.

use std::time::Duration;

use arrrg_derive::CommandLine;
use serde::Deserialize;
use utf8path::Path;

use crate::client::BASE_URL_ENV;
use crate::controller::poller::DEFAULT_POLL_INTERVAL;
use crate::error::{Error, Result};

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Directory, under `$HOME`, holding the token when none is configured.
const DEFAULT_STATE_DIR: &str = ".safichat";

/// Command-line arguments for the safichat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Server to talk to.
    #[arrrg(optional, "Backend base URL (default: https://safihash.onrender.com)", "URL")]
    pub base_url: Option<String>,

    /// YAML configuration file.
    #[arrrg(optional, "Read settings from a YAML file", "FILE")]
    pub config: Option<String>,

    /// Directory for the stored session token.
    #[arrrg(optional, "Directory holding the session token (default: ~/.safichat)", "DIR")]
    pub state_dir: Option<String>,

    /// Seconds between notification polls.
    #[arrrg(optional, "Seconds between notification polls (default: 15)", "SECS")]
    pub poll_interval: Option<u64>,

    /// HTTP timeout in seconds.
    #[arrrg(optional, "HTTP request timeout in seconds (default: 60)", "SECS")]
    pub timeout: Option<u64>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// The YAML configuration file.  Every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Backend base URL.
    pub base_url: Option<String>,
    /// Directory holding the session token.
    pub state_dir: Option<String>,
    /// Seconds between notification polls.
    pub poll_interval_secs: Option<u64>,
    /// HTTP timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Whether to use ANSI styling.
    pub color: Option<bool>,
}

impl ConfigFile {
    /// Parses a configuration file.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Reads and parses a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_str())
            .map_err(|e| Error::io(format!("could not read config {}", path.as_str()), e))?;
        Self::from_yaml(&content)
    }
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// the config file and command-line arguments with appropriate defaults.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Backend base URL; `None` lets the client apply its default.
    pub base_url: Option<String>,

    /// Directory holding the session token.
    pub state_dir: Path<'static>,

    /// Time between notification polls.
    pub poll_interval: Duration,

    /// HTTP request timeout.
    pub timeout: Duration,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Base URL: client default
    /// - State directory: `$HOME/.safichat`
    /// - Poll interval: 15 seconds
    /// - Timeout: 60 seconds
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            base_url: None,
            state_dir: default_state_dir(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            use_color: true,
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the state directory.
    pub fn with_state_dir(mut self, state_dir: &str) -> Self {
        self.state_dir = Path::from(state_dir).into_owned();
        self
    }

    /// Sets the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Applies the values present in a config file.
    pub fn merge_file(mut self, file: ConfigFile) -> Self {
        if let Some(base_url) = file.base_url {
            self.base_url = Some(base_url);
        }
        if let Some(state_dir) = file.state_dir {
            self = self.with_state_dir(&state_dir);
        }
        if let Some(secs) = file.poll_interval_secs {
            self.poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = file.timeout_secs {
            self.timeout = Duration::from_secs(secs);
        }
        if let Some(color) = file.color {
            self.use_color = color;
        }
        self
    }

    /// Applies an environment base URL override, if set and non-empty.
    pub fn merge_env_base_url(mut self, value: Option<String>) -> Self {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            self.base_url = Some(value);
        }
        self
    }

    /// Applies command-line arguments.
    pub fn merge_args(mut self, args: &ChatArgs) -> Result<Self> {
        if let Some(base_url) = &args.base_url {
            self.base_url = Some(base_url.clone());
        }
        if let Some(state_dir) = &args.state_dir {
            self = self.with_state_dir(state_dir);
        }
        if let Some(secs) = args.poll_interval {
            self.poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = args.timeout {
            self.timeout = Duration::from_secs(secs);
        }
        if args.no_color {
            self.use_color = false;
        }
        self.validate()
    }

    /// Resolves defaults, the config file named in `args`, the environment, and `args`.
    pub fn resolve(args: &ChatArgs) -> Result<Self> {
        let mut config = ChatConfig::new();
        if let Some(path) = &args.config {
            config = config.merge_file(ConfigFile::load(&Path::from(path.as_str()))?);
        }
        config
            .merge_env_base_url(std::env::var(BASE_URL_ENV).ok())
            .merge_args(args)
    }

    fn validate(self) -> Result<Self> {
        if self.poll_interval.is_zero() {
            return Err(Error::validation(
                "poll interval must be at least one second",
                Some("poll_interval".to_string()),
            ));
        }
        if self.timeout.is_zero() {
            return Err(Error::validation(
                "timeout must be at least one second",
                Some("timeout".to_string()),
            ));
        }
        Ok(self)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn default_state_dir() -> Path<'static> {
    match std::env::var("HOME") {
        Ok(home) if !home.is_empty() => Path::from(home.as_str()).join(DEFAULT_STATE_DIR).into_owned(),
        _ => Path::from(DEFAULT_STATE_DIR).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert!(config.base_url.is_none());
        assert_eq!(config.poll_interval, Duration::from_secs(15));
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert!(config.use_color);
        assert!(config.state_dir.as_str().ends_with(DEFAULT_STATE_DIR));
    }

    #[test]
    fn config_from_args_defaults() {
        let config = ChatConfig::new().merge_args(&ChatArgs::default()).unwrap();
        let defaults = ChatConfig::new();
        assert_eq!(config.base_url, defaults.base_url);
        assert_eq!(config.state_dir.as_str(), defaults.state_dir.as_str());
        assert_eq!(config.poll_interval, defaults.poll_interval);
        assert_eq!(config.timeout, defaults.timeout);
        assert!(config.use_color);
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            base_url: Some("http://localhost:5000".to_string()),
            config: None,
            state_dir: Some("/tmp/safichat".to_string()),
            poll_interval: Some(5),
            timeout: Some(10),
            no_color: true,
        };
        let config = ChatConfig::new().merge_args(&args).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:5000"));
        assert_eq!(config.state_dir.as_str(), "/tmp/safichat");
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(!config.use_color);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let args = ChatArgs {
            poll_interval: Some(0),
            ..ChatArgs::default()
        };
        assert!(ChatConfig::new().merge_args(&args).unwrap_err().is_validation());
    }

    #[test]
    fn layers_apply_in_order() {
        let file = ConfigFile::from_yaml(
            "base_url: http://file.example\npoll_interval_secs: 30\ncolor: false\n",
        )
        .unwrap();
        let args = ChatArgs {
            base_url: Some("http://flag.example".to_string()),
            ..ChatArgs::default()
        };
        let config = ChatConfig::new()
            .merge_file(file)
            .merge_env_base_url(Some("http://env.example".to_string()))
            .merge_args(&args)
            .unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://flag.example"));
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert!(!config.use_color);

        let config = ChatConfig::new()
            .merge_file(ConfigFile::from_yaml("base_url: http://file.example").unwrap())
            .merge_env_base_url(Some(" ".to_string()));
        assert_eq!(config.base_url.as_deref(), Some("http://file.example"));
    }

    #[test]
    fn unknown_config_keys_fail() {
        assert!(ConfigFile::from_yaml("model: x\n").is_err());
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .with_base_url("http://localhost:8000")
            .with_state_dir("/var/lib/safichat")
            .with_poll_interval(Duration::from_secs(2))
            .with_timeout(Duration::from_secs(3))
            .without_color();
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8000"));
        assert_eq!(config.state_dir.as_str(), "/var/lib/safichat");
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert!(!config.use_color);
    }
}
