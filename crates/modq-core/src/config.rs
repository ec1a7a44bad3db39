//! Configuration management for the moderation queue
//!
//! Configuration is loaded from environment variables, falling back to a
//! `.env` file in the working directory. All durations are milliseconds.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

/// Default number of items rendered before any growth.
pub const DEFAULT_PAGE_SIZE: usize = 10;
/// Default number of items added per growth request.
pub const DEFAULT_PAGE_STEP: usize = 10;
/// Default simulated round trip of a batch operation.
pub const DEFAULT_BATCH_LATENCY: Duration = Duration::from_millis(500);
/// Default simulated page fetch latency.
pub const DEFAULT_GROW_LATENCY: Duration = Duration::from_millis(500);
/// Default lifetime of a live undo snapshot.
pub const DEFAULT_UNDO_WINDOW: Duration = Duration::from_millis(3500);
/// Default notification auto-close delay.
pub const DEFAULT_NOTIFY_DURATION: Duration = Duration::from_millis(3000);

/// Main configuration struct for the moderation queue engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    // Pagination window
    pub page_size: usize,
    pub page_step: usize,
    pub grow_latency: Duration,

    // Batch coordinator
    pub batch_latency: Duration,

    // Undo buffer
    pub undo_window: Duration,

    // Notification channel
    pub notify_duration: Duration,

    /// Single-item reject through an affordance asks for confirmation first.
    pub confirm_single_reject: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page_step: DEFAULT_PAGE_STEP,
            grow_latency: DEFAULT_GROW_LATENCY,
            batch_latency: DEFAULT_BATCH_LATENCY,
            undo_window: DEFAULT_UNDO_WINDOW,
            notify_duration: DEFAULT_NOTIFY_DURATION,
            confirm_single_reject: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let config = Self {
            page_size: env_nonzero_usize("MODQ_PAGE_SIZE", defaults.page_size),
            page_step: env_nonzero_usize("MODQ_PAGE_STEP", defaults.page_step),
            grow_latency: env_millis("MODQ_GROW_LATENCY_MS", defaults.grow_latency),
            batch_latency: env_millis("MODQ_BATCH_LATENCY_MS", defaults.batch_latency),
            undo_window: env_millis("MODQ_UNDO_WINDOW_MS", defaults.undo_window),
            notify_duration: env_millis("MODQ_NOTIFY_MS", defaults.notify_duration),
            confirm_single_reject: env_bool(
                "MODQ_CONFIRM_SINGLE_REJECT",
                defaults.confirm_single_reject,
            ),
        };
        tracing::debug!(?config, "loaded configuration");
        config
    }

    /// Configuration with every latency set to zero, for synchronous backends.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            grow_latency: Duration::ZERO,
            batch_latency: Duration::ZERO,
            ..Self::default()
        }
    }
}

// ── Environment lookup ──────────────────────────────────────────────────

static DOTENV_VALUES: OnceLock<HashMap<String, String>> = OnceLock::new();

#[cfg(test)]
thread_local! {
    static TEST_ENV_OVERRIDES: std::cell::RefCell<HashMap<String, String>> =
        std::cell::RefCell::new(HashMap::new());
}

#[cfg(test)]
fn test_env_override_value(key: &str) -> Option<String> {
    TEST_ENV_OVERRIDES.with(|cell| cell.borrow().get(key).cloned())
}

fn dotenv_values() -> &'static HashMap<String, String> {
    DOTENV_VALUES.get_or_init(|| load_dotenv_file(Path::new(".env")))
}

/// Read a value from the real environment first, falling back to .env.
#[must_use]
pub fn env_value(key: &str) -> Option<String> {
    #[cfg(test)]
    if let Some(v) = test_env_override_value(key) {
        return Some(v);
    }
    env::var(key)
        .ok()
        .or_else(|| dotenv_values().get(key).cloned())
}

fn load_dotenv_file(path: &Path) -> HashMap<String, String> {
    let Ok(contents) = fs::read_to_string(path) else {
        return HashMap::new();
    };
    parse_dotenv_contents(&contents)
}

/// Parse `KEY=value` lines; `#` comments, blank lines and `export ` prefixes
/// are accepted, surrounding quotes are stripped.
#[must_use]
pub fn parse_dotenv_contents(contents: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for raw_line in contents.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        map.insert(key.to_string(), unquote(value.trim()).to_string());
    }
    map
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

fn parse_bool(value: &str, default: bool) -> bool {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" => true,
        "0" | "false" | "f" | "no" | "n" => false,
        _ => default,
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    env_value(key).map_or(default, |v| parse_bool(&v, default))
}

fn env_nonzero_usize(key: &str, default: usize) -> usize {
    env_value(key)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

fn env_millis(key: &str, default: Duration) -> Duration {
    env_value(key)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map_or(default, Duration::from_millis)
}
