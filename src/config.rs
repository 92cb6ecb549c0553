use anyhow::Result;
use std::env;
use std::fmt;

use crate::providers::Provider;

const DEFAULT_LLM_PROVIDER: &str = "gemini";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_WEB_BIND_ADDR: &str = "127.0.0.1:5000";

/// API key for the remote provider. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Returns `None` for an empty value. Anything else is kept exactly as given.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            return None;
        }
        Some(Self(raw))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub provider: Provider,
    pub model: String,
    pub base_url: String,
    pub credential: Option<Credential>,
    pub timeout_secs: u64,
    pub web_bind_addr: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(|key| env::var(key).ok())
    }

    pub fn from_env_with(mut get_var: impl FnMut(&str) -> Option<String>) -> Result<Self> {
        let provider = Provider::parse(
            get_var("LLM_PROVIDER")
                .as_deref()
                .unwrap_or(DEFAULT_LLM_PROVIDER),
        )?;
        let model = non_empty(get_var("LLM_MODEL"))
            .unwrap_or_else(|| provider.default_model().to_string());
        let base_url = non_empty(get_var("LLM_BASE_URL"))
            .unwrap_or_else(|| provider.default_base_url().to_string())
            .trim_end_matches('/')
            .to_string();
        let credential = get_var(provider.credential_env_var()).and_then(Credential::new);
        let timeout_secs = parse_timeout_secs(get_var("LLM_TIMEOUT_SECS").as_deref());
        let web_bind_addr = non_empty(get_var("WEB_BIND_ADDR"))
            .unwrap_or_else(|| DEFAULT_WEB_BIND_ADDR.to_string());

        Ok(Self {
            provider,
            model,
            base_url,
            credential,
            timeout_secs,
            web_bind_addr,
        })
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_positive_u64(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

fn parse_timeout_secs(raw: Option<&str>) -> u64 {
    parse_positive_u64(raw, DEFAULT_TIMEOUT_SECS)
}
