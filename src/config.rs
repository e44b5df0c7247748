use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tokio::fs;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Bot API token.
    pub token: String,

    /// Reply text posted in chats where the bot is not an administrator.
    pub warning: String,

    #[serde(default)]
    pub filters: Vec<FilterConfig>,

    /// Absent means long polling.
    #[serde(default)]
    pub webhook: Option<WebhookConfig>,

    #[serde(default)]
    pub enforcement: EnforcementConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub stats: StatsConfig,
}

/// One `[[filters]]` record: the type name plus whatever the filter takes.
#[derive(Debug, Deserialize, Clone)]
pub struct FilterConfig {
    pub filter: String,
    #[serde(flatten)]
    pub params: toml::Table,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebhookConfig {
    pub hostname: String,
    pub path: String,
    #[serde(default = "default_webhook_address")]
    pub address: String,
    #[serde(default = "default_webhook_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThrottleScope {
    /// One cooldown clock for the whole process.
    Global,
    /// A cooldown clock per chat.
    Chat,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EnforcementConfig {
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    #[serde(default = "default_throttle_scope")]
    pub throttle_scope: ThrottleScope,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_enable")]
    pub enable: bool,
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Also log messages that came out SAFE.
    #[serde(default)]
    pub log_safe: bool,
    #[serde(default = "default_verdict_log_sinks")]
    pub verdict_log_sinks: Vec<String>,
    #[serde(default = "default_memory_capacity")]
    pub memory_capacity: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StatsConfig {
    #[serde(default = "default_stats_enable")]
    pub enable: bool,
    #[serde(default = "default_log_interval")]
    pub log_interval_seconds: u64,
}

// Defaults
fn default_webhook_address() -> String {
    "0.0.0.0".to_string()
}
fn default_webhook_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8443)
}
fn default_cooldown_secs() -> u64 {
    60
}
fn default_throttle_scope() -> ThrottleScope {
    ThrottleScope::Global
}
fn default_log_enable() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "text".to_string()
}
fn default_verdict_log_sinks() -> Vec<String> {
    vec!["console".to_string()]
}
fn default_memory_capacity() -> usize {
    100
}
fn default_stats_enable() -> bool {
    true
}
fn default_log_interval() -> u64 {
    300
}

impl Default for EnforcementConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: default_cooldown_secs(),
            throttle_scope: default_throttle_scope(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable: default_log_enable(),
            level: default_log_level(),
            format: default_log_format(),
            log_safe: false,
            verdict_log_sinks: default_verdict_log_sinks(),
            memory_capacity: default_memory_capacity(),
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            enable: default_stats_enable(),
            log_interval_seconds: default_log_interval(),
        }
    }
}

impl EnforcementConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

impl WebhookConfig {
    /// Public URL Telegram posts updates to.
    pub fn url(&self) -> Result<url::Url> {
        let hostname = self.hostname.trim_end_matches('/');
        let path = self.path.trim_start_matches('/');
        let raw = format!("{}/{}", hostname, path);
        url::Url::parse(&raw).with_context(|| format!("Invalid webhook URL '{}'", raw))
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let raw = format!("{}:{}", self.address, self.port);
        raw.parse()
            .with_context(|| format!("Invalid webhook listen address '{}'", raw))
    }
}

/// Config file named on the command line: `-k <file>`, or a bare path.
/// Falls back to `config.toml`.
pub fn config_path_from_args(args: impl IntoIterator<Item = String>) -> Result<String> {
    let mut args = args.into_iter();
    let mut path = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-k" | "--config" => match args.next() {
                Some(value) => path = Some(value),
                None => bail!("Option '{}' needs a config file path", arg),
            },
            flag if flag.starts_with('-') => bail!("Unknown option '{}'", flag),
            _ => path = Some(arg),
        }
    }
    Ok(path.unwrap_or_else(|| "config.toml".to_string()))
}

impl Config {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .context("Failed to read config file")?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            bail!("Config field 'token' must not be empty");
        }
        if self.warning.trim().is_empty() {
            bail!("Config field 'warning' must not be empty");
        }
        if let Some(webhook) = &self.webhook {
            webhook.url()?;
            webhook.listen_addr()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        token = "123:abc"
        warning = "Do not click that"
    "#;

    #[test]
    fn test_minimal_config_defaults() {
        let config = Config::parse(MINIMAL).unwrap();
        assert!(config.filters.is_empty());
        assert!(config.webhook.is_none());
        assert_eq!(config.enforcement.cooldown(), Duration::from_secs(60));
        assert_eq!(config.enforcement.throttle_scope, ThrottleScope::Global);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.verdict_log_sinks, vec!["console".to_string()]);
        assert!(!config.logging.log_safe);
        assert_eq!(config.stats.log_interval_seconds, 300);
    }

    #[test]
    fn test_full_config() {
        let config = Config::parse(
            r#"
            token = "123:abc"
            warning = "Careful"

            [[filters]]
            filter = "blocklist"
            filename = "blocklist.txt"
            match_subdomains = true

            [webhook]
            hostname = "https://bot.example/"
            path = "/hook"
            port = 9000

            [enforcement]
            cooldown_secs = 30
            throttle_scope = "chat"

            [logging]
            format = "json"
            verdict_log_sinks = ["console", "memory"]
            "#,
        )
        .unwrap();

        assert_eq!(config.filters.len(), 1);
        assert_eq!(config.filters[0].filter, "blocklist");
        assert_eq!(
            config.filters[0].params.get("filename").and_then(|v| v.as_str()),
            Some("blocklist.txt")
        );
        assert!(!config.filters[0].params.contains_key("filter"));

        let webhook = config.webhook.unwrap();
        assert_eq!(webhook.url().unwrap().as_str(), "https://bot.example/hook");
        assert_eq!(
            webhook.listen_addr().unwrap(),
            "0.0.0.0:9000".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(config.enforcement.throttle_scope, ThrottleScope::Chat);
        assert_eq!(config.enforcement.cooldown_secs, 30);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_missing_token_fails() {
        assert!(Config::parse(r#"warning = "x""#).is_err());
        assert!(Config::parse("token = \"\"\nwarning = \"x\"").is_err());
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_config_path_from_args() {
        assert_eq!(config_path_from_args(args(&[])).unwrap(), "config.toml");
        assert_eq!(
            config_path_from_args(args(&["-k", "bot.toml"])).unwrap(),
            "bot.toml"
        );
        assert_eq!(
            config_path_from_args(args(&["--config", "bot.toml"])).unwrap(),
            "bot.toml"
        );
        assert_eq!(config_path_from_args(args(&["bot.toml"])).unwrap(), "bot.toml");
        assert!(config_path_from_args(args(&["-k"])).is_err());
        assert!(config_path_from_args(args(&["-x", "bot.toml"])).is_err());
    }

    #[test]
    fn test_bad_throttle_scope_fails() {
        let text = format!("{}\n[enforcement]\nthrottle_scope = \"galaxy\"", MINIMAL);
        assert!(Config::parse(&text).is_err());
    }
}
