//! Environment-driven configuration for the text generation provider.

use std::time::Duration;

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_API_BASE: &str = "https://api.anthropic.com";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Settings for the external text generation provider
///
/// `api_key` being `None` means generation is not configured and insights
/// are always rule-based.
#[derive(Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl std::fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_API_BASE.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl GenerationConfig {
    /// Read provider settings from the environment.
    ///
    /// `HABIT_TRACKER_API_KEY` takes precedence over `ANTHROPIC_API_KEY`;
    /// blank values count as unset.
    pub fn from_env() -> Self {
        let api_key = non_empty_var("HABIT_TRACKER_API_KEY")
            .or_else(|| non_empty_var("ANTHROPIC_API_KEY"));

        Self {
            api_key,
            base_url: non_empty_var("HABIT_TRACKER_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_owned()),
            model: non_empty_var("HABIT_TRACKER_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
            max_tokens: env_parse_with_default("HABIT_TRACKER_MAX_TOKENS", DEFAULT_MAX_TOKENS),
            timeout: Duration::from_secs(env_parse_with_default(
                "HABIT_TRACKER_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

fn non_empty_var(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Parse an environment variable with a default fallback.
///
/// Unset variables return `default` silently; unparsable ones log a warning
/// and return `default`.
pub fn env_parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    default: T,
) -> T {
    match std::env::var(var) {
        Ok(v) => match v.trim().parse() {
            Ok(n) => n,
            Err(_) => {
                tracing::warn!(
                    var,
                    value = %v,
                    default = %default,
                    "invalid env var value, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}
