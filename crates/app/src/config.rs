use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use giveaway_infra::reddit::RedditCredentials;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: SocketAddr,
    pub request_timeout: Duration,
    pub reveal_interval: Duration,
    pub reddit: Option<RedditCredentials>,
    pub cors_allow_origins: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid socket address: {0}")]
    InvalidSocket(String),
    #[error("invalid integer for {0}: {1}")]
    InvalidNumber(&'static str, String),
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_addr_raw = read_string("GIVEAWAY_HTTP_ADDR", "127.0.0.1:8080");
        let http_addr = http_addr_raw
            .parse()
            .map_err(|_| ConfigError::InvalidSocket(http_addr_raw.clone()))?;
        let request_timeout_secs = read_u64("GIVEAWAY_REQUEST_TIMEOUT_SECS", 15)?;
        let reveal_interval_ms = read_u64("GIVEAWAY_REVEAL_INTERVAL_MS", 750)?;
        let reddit = reddit_credentials(
            read_optional_string("GIVEAWAY_REDDIT_CLIENT_ID"),
            read_optional_string("GIVEAWAY_REDDIT_CLIENT_SECRET"),
            read_optional_string("GIVEAWAY_REDDIT_USER_AGENT"),
        );
        let cors_allow_origins = read_list("GIVEAWAY_CORS_ALLOW_ORIGINS");

        Ok(Self {
            http_addr,
            request_timeout: Duration::from_secs(request_timeout_secs),
            reveal_interval: Duration::from_millis(reveal_interval_ms),
            reddit,
            cors_allow_origins,
        })
    }
}

fn reddit_credentials(
    client_id: Option<String>,
    client_secret: Option<String>,
    user_agent: Option<String>,
) -> Option<RedditCredentials> {
    match (client_id, client_secret, user_agent) {
        (Some(client_id), Some(client_secret), Some(user_agent)) => {
            RedditCredentials::new(&client_id, &client_secret, &user_agent).ok()
        }
        (None, None, None) => None,
        _ => {
            warn!("reddit credentials partially configured; ignoring them");
            None
        }
    }
}

/// Must run before any other thread exists.
pub fn load_dotenv() -> Result<(), std::io::Error> {
    let path = Path::new(".env");
    if !path.exists() {
        return Ok(());
    }
    let contents = std::fs::read_to_string(path)?;
    for (key, value) in parse_dotenv(&contents) {
        if std::env::var_os(&key).is_none() {
            // Safety: `main` calls this before the tokio runtime is built,
            // while the process is still single-threaded.
            unsafe {
                std::env::set_var(key, value);
            }
        }
    }
    Ok(())
}

fn read_string(key: &'static str, default: &'static str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn read_u64(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .map_err(|_| ConfigError::InvalidNumber(key, raw))
}

fn read_list(key: &'static str) -> Vec<String> {
    std::env::var(key)
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

fn read_optional_string(key: &'static str) -> Option<String> {
    let value = std::env::var(key).unwrap_or_default();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    contents
        .lines()
        .filter_map(parse_dotenv_line)
        .collect()
}

fn parse_dotenv_line(line: &str) -> Option<(String, String)> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
    let (key, value) = trimmed.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    let value = parse_dotenv_value(value.trim());
    Some((key.to_string(), value))
}

fn parse_dotenv_value(value: &str) -> String {
    if let Some(stripped) = value.strip_prefix('"').and_then(|inner| inner.strip_suffix('"')) {
        return unescape_double_quoted(stripped);
    }
    if let Some(stripped) = value.strip_prefix('\'').and_then(|inner| inner.strip_suffix('\'')) {
        return stripped.to_string();
    }
    value.to_string()
}

fn unescape_double_quoted(value: &str) -> String {
    let mut output = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('n') => output.push('\n'),
                Some('r') => output.push('\r'),
                Some('t') => output.push('\t'),
                Some('\\') => output.push('\\'),
                Some('"') => output.push('"'),
                Some(other) => {
                    output.push('\\');
                    output.push(other);
                }
                None => output.push('\\'),
            }
        } else {
            output.push(ch);
        }
    }
    output
}
