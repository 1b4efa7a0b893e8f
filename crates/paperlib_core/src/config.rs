//! Configuration loading from environment variables.

use crate::constants::{DEFAULT_SEARCH_RESULTS, DEFAULT_SERVER_URL};
use std::env;
use std::time::Duration;

/// Runtime configuration for PaperLib clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub server_url: String,
    /// Request timeout in seconds; `0` leaves requests unbounded.
    pub timeout_secs: u64,
    pub search_results: usize,
    /// Multi-file uploads include non-PDF files when set.
    pub allow_non_pdf: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            timeout_secs: 0,
            search_results: DEFAULT_SEARCH_RESULTS,
            allow_non_pdf: false,
        }
    }
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Strip trailing slashes so path segments can be appended verbatim.
pub fn normalize_server_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Unparseable values fall back to defaults with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let server_url = lookup("PAPERLIB_SERVER")
            .filter(|value| !value.trim().is_empty())
            .map(|value| normalize_server_url(&value))
            .unwrap_or(defaults.server_url);
        let timeout_secs =
            parse_or_default(&lookup, "PAPERLIB_TIMEOUT_SECS", defaults.timeout_secs);
        let search_results =
            parse_or_default(&lookup, "PAPERLIB_SEARCH_RESULTS", defaults.search_results);
        let allow_non_pdf = lookup("PAPERLIB_ALLOW_NON_PDF")
            .and_then(|value| {
                let parsed = parse_env_flag(&value);
                if parsed.is_none() {
                    tracing::warn!(
                        "Ignoring unrecognized PAPERLIB_ALLOW_NON_PDF value '{}'",
                        value
                    );
                }
                parsed
            })
            .unwrap_or(defaults.allow_non_pdf);

        Self {
            server_url,
            timeout_secs,
            search_results,
            allow_non_pdf,
        }
    }

    /// Request timeout, or `None` when requests are unbounded.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring unparseable {} value '{}'", key, raw);
            default
        }),
        None => default,
    }
}
