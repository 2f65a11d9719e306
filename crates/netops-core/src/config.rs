//! Environment Configuration Loader
//!
//! Loads environment variables from `/etc/netops/environment` (or a local
//! `.env` during development) and assembles [`AppConfig`] from them.
//!
//! ## Usage
//!
//! Call `load_environment()` early in main() before reading any config:
//!
//! ```rust,no_run
//! use netops_core::config::{load_environment, AppConfig};
//!
//! load_environment();
//! let config = AppConfig::from_env();
//! ```
//!
//! ## Variables
//!
//! | Variable | Default |
//! |----------|---------|
//! | `NETOPS_MODEL` | `gpt-4o-mini` |
//! | `NETOPS_TEMPERATURE` | `0.3` |
//! | `NETOPS_ANALYSIS_TEMPERATURE` | `0.7` |
//! | `NETOPS_MAX_ITERATIONS` | `10` |
//! | `NETOPS_TOKEN_CEILING` | unset (unbounded history) |
//! | `NETOPS_TOP_K` | `1` |
//! | `NETOPS_DOCS_DIR` | `./docs` |
//! | `NETOPS_HISTORY_LOG` | `./history.log` (empty disables) |
//! | `NETOPS_INVENTORY` | unset (built-in inventory) |
//! | `NETOPS_EMBEDDING_MODEL` | unset (lexical index) |
//! | `NETOPS_PING_COUNT` | `2` |
//! | `NETOPS_PING_TIMEOUT_SECS` | `2` |
//! | `NETOPS_MAX_SESSIONS` | `100` |
//! | `NETOPS_BIND` | `127.0.0.1:8080` |
//! | `OPENAI_API_KEY` | unset |
//! | `OPENAI_BASE_URL` | `https://api.openai.com/v1` |

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment files tried in order when `NETOPS_ENV_FILE` is unset or missing
pub const ENV_FILE_PATHS: &[&str] = &["/etc/netops/environment", "/etc/netops.env", ".env"];

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Load the first environment file found into the process environment.
///
/// `NETOPS_ENV_FILE` is tried before [`ENV_FILE_PATHS`]. Variables that are
/// already set keep their value. Returns the path that was applied.
pub fn load_environment() -> Option<String> {
    let custom = std::env::var("NETOPS_ENV_FILE").ok();
    let applied = custom
        .iter()
        .map(String::as_str)
        .chain(ENV_FILE_PATHS.iter().copied())
        .find(|path| apply_env_file(Path::new(path)).is_some())
        .map(str::to_string);

    if applied.is_none() {
        debug!("No environment file found, using existing environment");
    }
    applied
}

/// Set every unset variable listed in `path`; returns how many were set
fn apply_env_file(path: &Path) -> Option<usize> {
    let entries = match fs::read_to_string(path) {
        Ok(content) => parse_env_file(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Environment file unreadable");
            return None;
        }
    };

    let total = entries.len();
    let mut applied = 0;
    for (key, value) in entries {
        if std::env::var_os(&key).is_some() {
            debug!(%key, "Already set, keeping process value");
            continue;
        }
        debug!(%key, value = redact(&key, &value), "Setting from environment file");
        std::env::set_var(&key, &value);
        applied += 1;
    }

    info!(
        path = %path.display(),
        applied,
        kept = total - applied,
        "Environment file loaded"
    );
    Some(applied)
}

fn redact<'a>(key: &str, value: &'a str) -> &'a str {
    if ["KEY", "TOKEN", "SECRET"].iter().any(|s| key.contains(s)) {
        "***"
    } else {
        value
    }
}

/// `KEY=VALUE` entries of an env file; comments and blank lines are skipped
fn parse_env_file(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(parse_assignment)
        .collect()
}

/// One assignment, optionally prefixed by `export`, value optionally quoted
fn parse_assignment(line: &str) -> Option<(String, String)> {
    let line = line.strip_prefix("export ").unwrap_or(line);
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }

    let value = value.trim();
    let unquoted = ['"', '\'']
        .iter()
        .find_map(|q| value.strip_prefix(*q)?.strip_suffix(*q))
        .unwrap_or(value);
    Some((key.to_string(), unquoted.to_string()))
}

/// Non-empty value of an environment variable
pub fn get_config_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Application settings shared by the service and the library crates
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Chat model identifier
    pub model: String,
    /// Sampling temperature for chat and agent cycles
    pub temperature: f32,
    /// Sampling temperature for log analysis
    pub analysis_temperature: f32,
    /// Upper bound on model calls per dispatch cycle
    pub max_iterations: usize,
    /// Token ceiling for history; `None` keeps every turn
    pub token_ceiling: Option<usize>,
    /// Passages returned by document lookup
    pub top_k: usize,
    /// Directory indexed for RAG
    pub docs_dir: PathBuf,
    /// Append-only interaction log; `None` disables it
    pub history_log: Option<PathBuf>,
    /// TOML inventory file; `None` uses the built-in table
    pub inventory_file: Option<PathBuf>,
    /// Embedding model for the vector index; `None` uses the lexical index
    pub embedding_model: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    /// ICMP echo requests per probe
    pub ping_count: u32,
    /// Per-reply wait of the prober in seconds
    pub ping_timeout_secs: u64,
    pub max_sessions: usize,
    pub bind: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            analysis_temperature: 0.7,
            max_iterations: 10,
            token_ceiling: None,
            top_k: 1,
            docs_dir: PathBuf::from("./docs"),
            history_log: Some(PathBuf::from("./history.log")),
            inventory_file: None,
            embedding_model: None,
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            ping_count: 2,
            ping_timeout_secs: 2,
            max_sessions: 100,
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

impl AppConfig {
    /// Build the configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Unparseable values fall back to the default and are logged.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string());

        Self {
            model: get("NETOPS_MODEL")
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.model),
            temperature: parse_or("NETOPS_TEMPERATURE", get("NETOPS_TEMPERATURE"), defaults.temperature),
            analysis_temperature: parse_or(
                "NETOPS_ANALYSIS_TEMPERATURE",
                get("NETOPS_ANALYSIS_TEMPERATURE"),
                defaults.analysis_temperature,
            ),
            max_iterations: parse_or(
                "NETOPS_MAX_ITERATIONS",
                get("NETOPS_MAX_ITERATIONS"),
                defaults.max_iterations,
            )
            .max(1),
            token_ceiling: get("NETOPS_TOKEN_CEILING")
                .and_then(|v| v.parse::<usize>().ok())
                .filter(|v| *v > 0),
            top_k: parse_or("NETOPS_TOP_K", get("NETOPS_TOP_K"), defaults.top_k).max(1),
            docs_dir: get("NETOPS_DOCS_DIR")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.docs_dir),
            history_log: match get("NETOPS_HISTORY_LOG") {
                Some(v) if v.is_empty() => None,
                Some(v) => Some(PathBuf::from(v)),
                None => defaults.history_log,
            },
            inventory_file: get("NETOPS_INVENTORY")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            embedding_model: get("NETOPS_EMBEDDING_MODEL").filter(|v| !v.is_empty()),
            openai_api_key: get("OPENAI_API_KEY").filter(|v| !v.is_empty()),
            openai_base_url: get("OPENAI_BASE_URL")
                .filter(|v| !v.is_empty())
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.openai_base_url),
            ping_count: parse_or("NETOPS_PING_COUNT", get("NETOPS_PING_COUNT"), defaults.ping_count)
                .max(1),
            ping_timeout_secs: parse_or(
                "NETOPS_PING_TIMEOUT_SECS",
                get("NETOPS_PING_TIMEOUT_SECS"),
                defaults.ping_timeout_secs,
            )
            .max(1),
            max_sessions: parse_or(
                "NETOPS_MAX_SESSIONS",
                get("NETOPS_MAX_SESSIONS"),
                defaults.max_sessions,
            )
            .max(1),
            bind: get("NETOPS_BIND")
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.bind),
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        Some(v) if !v.is_empty() => v.parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid value for {}: {:?}", key, v);
            default
        }),
        _ => default,
    }
}
