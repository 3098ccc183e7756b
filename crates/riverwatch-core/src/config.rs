use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variables that override values from the config file.
pub const ENV_FEED_USER: &str = "NEWSBLUR_USER";
pub const ENV_FEED_PASS: &str = "NEWSBLUR_PASS";
pub const ENV_CHAT_TOKEN: &str = "TELE_TOKEN";
pub const ENV_CHAT_ID: &str = "TELE_CHAT";
pub const ENV_AI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_INTERVAL_SECS: &str = "RIVERWATCH_INTERVAL_SECS";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Directory holding the append-only log file
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Log file name inside `log_dir`
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_dir: default_log_dir(),
            log_file: default_log_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Feed service base URL
    #[serde(default = "default_feed_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_feed_base_url(),
            username: None,
            password: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// AI provider: "openai" or "claude_api"
    #[serde(default = "default_ai_provider")]
    pub provider: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_ai_model")]
    pub model: String,
    /// Override for OpenAI-compatible endpoints
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default = "default_ai_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: default_ai_provider(),
            api_key: None,
            model: default_ai_model(),
            api_base: None,
            request_timeout_secs: default_ai_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Bot API base URL
    #[serde(default = "default_chat_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub bot_token: Option<String>,
    #[serde(default)]
    pub chat_id: Option<String>,
    /// Markup mode understood by the chat service
    #[serde(default = "default_parse_mode")]
    pub parse_mode: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_base: default_chat_api_base(),
            bot_token: None,
            chat_id: None,
            parse_mode: default_parse_mode(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// Retries after a connection-level failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// First backoff delay in milliseconds, doubled on each retry
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Seconds between pipeline runs
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
        }
    }
}

impl ScheduleConfig {
    /// Period between runs. A zero interval is clamped to one second.
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("riverwatch")
}

fn default_log_file() -> String {
    "riverwatch.log".to_string()
}

fn default_feed_base_url() -> String {
    "https://www.newsblur.com".to_string()
}

fn default_ai_provider() -> String {
    "openai".to_string()
}

fn default_ai_model() -> String {
    "gpt-4".to_string()
}

fn default_ai_timeout() -> u64 {
    60
}

fn default_chat_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_parse_mode() -> String {
    "HTML".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    500
}

fn default_user_agent() -> String {
    format!("riverwatch/{}", env!("CARGO_PKG_VERSION"))
}

fn default_interval() -> u64 {
    3600 // 60 minutes
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

/// A non-fatal misconfiguration found at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    MissingAiApiKey,
    MissingChatCredentials,
    MissingFeedCredentials,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::MissingAiApiKey => write!(
                f,
                "No language-model API key provided. Please set the {} environment variable.",
                ENV_AI_API_KEY
            ),
            ConfigWarning::MissingChatCredentials => write!(
                f,
                "Chat credentials missing. Please set the {} and {} environment variables.",
                ENV_CHAT_TOKEN, ENV_CHAT_ID
            ),
            ConfigWarning::MissingFeedCredentials => write!(
                f,
                "Feed credentials missing. Please set the {} and {} environment variables.",
                ENV_FEED_USER, ENV_FEED_PASS
            ),
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

impl AppConfig {
    /// Load configuration from the default path, then apply environment overrides
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path` (defaults if it does not exist),
    /// then apply environment overrides
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        let path = expand_tilde(path);

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            Self::from_toml(&content)?
        } else {
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Overlay credentials and schedule from a variable lookup (normally the process environment)
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(user) = lookup(ENV_FEED_USER) {
            self.feed.username = Some(user);
        }
        if let Some(pass) = lookup(ENV_FEED_PASS) {
            self.feed.password = Some(pass);
        }
        if let Some(token) = lookup(ENV_CHAT_TOKEN) {
            self.chat.bot_token = Some(token);
        }
        if let Some(chat) = lookup(ENV_CHAT_ID) {
            self.chat.chat_id = Some(chat);
        }
        if let Some(key) = lookup(ENV_AI_API_KEY) {
            self.ai.api_key = Some(key);
        }
        if let Some(secs) = lookup(ENV_INTERVAL_SECS) {
            match secs.trim().parse() {
                Ok(secs) => self.schedule.interval_secs = secs,
                Err(_) => tracing::warn!(
                    value = %secs,
                    "Ignoring invalid {}", ENV_INTERVAL_SECS
                ),
            }
        }
    }

    /// Report missing credentials. None of these stop the process from starting.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        if is_blank(&self.ai.api_key) {
            warnings.push(ConfigWarning::MissingAiApiKey);
        }
        if is_blank(&self.chat.bot_token) || is_blank(&self.chat.chat_id) {
            warnings.push(ConfigWarning::MissingChatCredentials);
        }
        if is_blank(&self.feed.username) || is_blank(&self.feed.password) {
            warnings.push(ConfigWarning::MissingFeedCredentials);
        }
        warnings
    }

    /// Get the configuration file path
    /// Always uses ~/.config/riverwatch/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("riverwatch")
            .join("config.toml")
    }

    /// Get the log directory (with tilde expansion)
    pub fn log_dir(&self) -> PathBuf {
        expand_tilde(&self.general.log_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.feed.base_url, "https://www.newsblur.com");
        assert_eq!(config.http.max_retries, 3);
        assert_eq!(config.http.backoff_base_ms, 500);
        assert_eq!(config.chat.parse_mode, "HTML");
        assert_eq!(config.schedule.period(), Duration::from_secs(3600));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [schedule]
            interval_secs = 900

            [ai]
            model = "gpt-4o"
            "#,
        )
        .unwrap();

        assert_eq!(config.schedule.interval_secs, 900);
        assert_eq!(config.ai.model, "gpt-4o");
        assert_eq!(config.ai.provider, "openai");
        assert_eq!(config.http.max_retries, 3);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = AppConfig::from_toml("[schedule]\ninterval_secs = \"soon\"").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_FEED_USER, "reader"),
            (ENV_FEED_PASS, "hunter2"),
            (ENV_CHAT_TOKEN, "123:abc"),
            (ENV_CHAT_ID, "-10042"),
            (ENV_AI_API_KEY, "sk-test"),
            (ENV_INTERVAL_SECS, "120"),
        ]);

        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.feed.username.as_deref(), Some("reader"));
        assert_eq!(config.feed.password.as_deref(), Some("hunter2"));
        assert_eq!(config.chat.bot_token.as_deref(), Some("123:abc"));
        assert_eq!(config.chat.chat_id.as_deref(), Some("-10042"));
        assert_eq!(config.ai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.schedule.interval_secs, 120);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_invalid_interval_override_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| (key == ENV_INTERVAL_SECS).then(|| "hourly".to_string()));
        assert_eq!(config.schedule.interval_secs, 3600);
    }

    #[test]
    fn test_validate_reports_missing_credentials() {
        let mut config = AppConfig::default();
        config.chat.bot_token = Some("token".to_string());
        config.chat.chat_id = Some("  ".to_string());

        let warnings = config.validate();
        assert_eq!(
            warnings,
            vec![
                ConfigWarning::MissingAiApiKey,
                ConfigWarning::MissingChatCredentials,
                ConfigWarning::MissingFeedCredentials,
            ]
        );
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let schedule = ScheduleConfig { interval_secs: 0 };
        assert_eq!(schedule.period(), Duration::from_secs(1));
    }
}
