//! Client configuration
//!
//! # Environment variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | FLOOR_API_BASE_URL | http://localhost:8000 | Backend base URL |
//! | FLOOR_POLL_INTERVAL_SECS | 10 | Auto-refresh cadence |
//! | FLOOR_SEARCH_DEBOUNCE_MS | 300 | Menu search debounce window |
//! | FLOOR_REQUEST_TIMEOUT_SECS | 30 | Per-request deadline, `0` disables it |
//! | FLOOR_SUPPRESS_POLL_DURING_MUTATION | true | Skip poll ticks while a mutation is outstanding |
//! | LOG_LEVEL | info | Default log level (RUST_LOG overrides) |
//! | LOG_JSON | false | JSON console output |
//! | LOG_DIR | (unset) | Directory for daily rotating log files |

use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Default backend address
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
/// Auto-refresh cadence
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
/// Shortest accepted poll interval; shorter values are raised to this
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Search debounce window
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);
/// Per-request deadline
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Invalid environment value
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has invalid value {value:?}: expected {expected}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
    pub log_dir: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            log_dir: None,
        }
    }
}

/// Client configuration for connecting to the floor backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:8000")
    pub base_url: String,

    /// Interval between scheduled reconciliations
    pub poll_interval: Duration,

    /// Quiet period before a search keystroke is evaluated
    pub search_debounce: Duration,

    /// Request deadline, `None` lets a request hang indefinitely
    pub request_timeout: Option<Duration>,

    /// Skip scheduled ticks while an occupy/vacate/order call is outstanding
    pub suppress_poll_during_mutation: bool,

    pub logging: LogConfig,
}

impl ClientConfig {
    /// Create a new client configuration with default timings
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
            suppress_poll_during_mutation: true,
            logging: LogConfig::default(),
        }
    }

    /// Set the poll interval
    ///
    /// Values below [`MIN_POLL_INTERVAL`] are raised to it.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = clamp_poll_interval(interval);
        self
    }

    /// Set the search debounce window
    pub fn with_search_debounce(mut self, window: Duration) -> Self {
        self.search_debounce = window;
        self
    }

    /// Set the request timeout (`None` disables it)
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Toggle poll suppression during mutations
    pub fn with_poll_suppression(mut self, enabled: bool) -> Self {
        self.suppress_poll_during_mutation = enabled;
        self
    }

    pub fn with_logging(mut self, logging: LogConfig) -> Self {
        self.logging = logging;
        self
    }

    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let base_url = get("FLOOR_API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let poll_secs: u64 = parse_var("FLOOR_POLL_INTERVAL_SECS", get("FLOOR_POLL_INTERVAL_SECS"), 10)?;
        let debounce_ms: u64 =
            parse_var("FLOOR_SEARCH_DEBOUNCE_MS", get("FLOOR_SEARCH_DEBOUNCE_MS"), 300)?;
        let timeout_secs: u64 =
            parse_var("FLOOR_REQUEST_TIMEOUT_SECS", get("FLOOR_REQUEST_TIMEOUT_SECS"), 30)?;
        let suppress = parse_flag(
            "FLOOR_SUPPRESS_POLL_DURING_MUTATION",
            get("FLOOR_SUPPRESS_POLL_DURING_MUTATION"),
            true,
        )?;

        if poll_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "FLOOR_POLL_INTERVAL_SECS",
                value: "0".into(),
                expected: "a positive number of seconds",
            });
        }

        let logging = LogConfig {
            level: get("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            json: parse_flag("LOG_JSON", get("LOG_JSON"), false)?,
            log_dir: get("LOG_DIR"),
        };

        Ok(Self {
            base_url,
            poll_interval: Duration::from_secs(poll_secs),
            search_debounce: Duration::from_millis(debounce_ms),
            request_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            suppress_poll_during_mutation: suppress,
            logging,
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

fn parse_var<T: FromStr>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            value,
            expected: "a non-negative integer",
        }),
    }
}

fn parse_flag(name: &'static str, raw: Option<String>, default: bool) -> Result<bool, ConfigError> {
    let Some(value) = raw else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value,
            expected: "a boolean",
        }),
    }
}

pub(crate) fn clamp_poll_interval(interval: Duration) -> Duration {
    if interval < MIN_POLL_INTERVAL {
        tracing::warn!(
            requested_ms = interval.as_millis() as u64,
            min_ms = MIN_POLL_INTERVAL.as_millis() as u64,
            "Poll interval too short, using minimum"
        );
        MIN_POLL_INTERVAL
    } else {
        interval
    }
}
