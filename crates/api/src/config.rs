use std::env;
use std::time::Duration;

use safari_concierge::{AgentSettings, DEFAULT_REPLY_DELAY};

const DEFAULT_ALLOWED_ORIGINS: [&str; 4] = [
    "http://localhost:5173",
    "http://127.0.0.1:5173",
    "http://localhost:8080",
    "https://safariadventures.co.ke",
];

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind: String,
    pub api_key: String,
    pub chat_reply_delay: Duration,
    pub session_ttl: Duration,
    pub rate_limit_window: Duration,
    pub rate_limit_max: usize,
    pub allowed_origins: Vec<String>,
    pub body_limit_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            api_key: "dev-safari-key".to_string(),
            chat_reply_delay: DEFAULT_REPLY_DELAY,
            session_ttl: Duration::from_secs(60 * 60),
            rate_limit_window: Duration::from_secs(60),
            rate_limit_max: 120,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|origin| origin.to_string())
                .collect(),
            body_limit_bytes: 16 * 1024,
        }
    }
}

impl ApiConfig {
    /// Reads `SAFARI_*` variables, keeping the default for anything unset or
    /// unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            bind: env::var("SAFARI_BIND").unwrap_or(defaults.bind),
            api_key: env::var("SAFARI_API_KEY")
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or(defaults.api_key),
            chat_reply_delay: env_parse::<u64>("SAFARI_CHAT_REPLY_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.chat_reply_delay),
            session_ttl: env_parse::<u64>("SAFARI_SESSION_TTL_SECONDS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.session_ttl),
            rate_limit_window: env_parse::<u64>("SAFARI_RATE_LIMIT_WINDOW_SECONDS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.rate_limit_window),
            rate_limit_max: env_parse("SAFARI_RATE_LIMIT_MAX").unwrap_or(defaults.rate_limit_max),
            allowed_origins: env::var("SAFARI_ALLOWED_ORIGINS")
                .ok()
                .map(|value| parse_origins(&value))
                .filter(|origins| !origins.is_empty())
                .unwrap_or(defaults.allowed_origins),
            body_limit_bytes: defaults.body_limit_bytes,
        }
    }

    pub fn agent_settings(&self) -> AgentSettings {
        AgentSettings {
            reply_delay: self.chat_reply_delay,
            session_ttl: self.session_ttl,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|value| value.trim().parse::<T>().ok())
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|origin| origin.trim().trim_end_matches('/').to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}
