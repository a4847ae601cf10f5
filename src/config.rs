//! Configuration management with environment variable support.
//!
//! Every knob of the harness has a hardcoded default so that running the
//! binary without arguments exercises the backend at its usual address.
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `ANPR_HARNESS_BASE_URL` | Root URL of the ANPR backend | `http://localhost:8001` |
//! | `ANPR_HARNESS_TIMEOUT` | Timeout for simple requests (seconds) | `30` |
//! | `ANPR_HARNESS_UPLOAD_TIMEOUT` | Timeout for multipart uploads (seconds) | `60` |
//! | `ANPR_HARNESS_RESULTS_PATH` | Where the JSON summary is written | `backend_test_results.json` |
//!
//! # Example
//!
//! ```bash
//! export ANPR_HARNESS_BASE_URL="http://10.0.0.12:8001"
//! export ANPR_HARNESS_UPLOAD_TIMEOUT=120
//! ```

use std::env;
use std::sync::OnceLock;

// ============================================================================
// Default Values
// ============================================================================

/// Default backend root URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8001";

/// Default timeout for plain requests (seconds)
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 30;

/// Default timeout for file uploads (seconds)
pub const DEFAULT_UPLOAD_TIMEOUT: u64 = 60;

/// Default summary file path
pub const DEFAULT_RESULTS_PATH: &str = "backend_test_results.json";

/// Width of generated fixture frames (pixels)
pub const DEFAULT_FRAME_WIDTH: u32 = 640;

/// Height of generated fixture frames (pixels)
pub const DEFAULT_FRAME_HEIGHT: u32 = 480;

// ============================================================================
// Environment Variable Names
// ============================================================================

/// Environment variable for the backend root URL
pub const ENV_BASE_URL: &str = "ANPR_HARNESS_BASE_URL";

/// Environment variable for the plain request timeout
pub const ENV_REQUEST_TIMEOUT: &str = "ANPR_HARNESS_TIMEOUT";

/// Environment variable for the upload timeout
pub const ENV_UPLOAD_TIMEOUT: &str = "ANPR_HARNESS_UPLOAD_TIMEOUT";

/// Environment variable for the summary file path
pub const ENV_RESULTS_PATH: &str = "ANPR_HARNESS_RESULTS_PATH";

// ============================================================================
// Configuration Getters (with caching)
// ============================================================================

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration (initialized from environment on first access)
pub fn get() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

/// Centralized configuration for the harness
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend under test
    pub target: TargetSettings,
    /// Request timeouts
    pub timeouts: TimeoutSettings,
    /// Summary output
    pub report: ReportSettings,
}

/// Settings describing the service under test
#[derive(Debug, Clone)]
pub struct TargetSettings {
    /// Root URL, without the `api/` prefix
    pub base_url: String,
}

/// Per-request timeouts
#[derive(Debug, Clone)]
pub struct TimeoutSettings {
    /// Timeout for requests without file parts (seconds)
    pub request: u64,
    /// Timeout for multipart uploads (seconds)
    pub upload: u64,
}

/// Settings for the persisted summary
#[derive(Debug, Clone)]
pub struct ReportSettings {
    /// Path of the JSON summary file
    pub results_path: String,
}

impl Config {
    /// Create configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            target: TargetSettings::from_env(),
            timeouts: TimeoutSettings::from_env(),
            report: ReportSettings::from_env(),
        }
    }

    /// Create configuration with all defaults (ignoring environment)
    pub fn defaults() -> Self {
        Self {
            target: TargetSettings::defaults(),
            timeouts: TimeoutSettings::defaults(),
            report: ReportSettings::defaults(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

impl TargetSettings {
    pub fn from_env() -> Self {
        Self {
            base_url: env::var(ENV_BASE_URL)
                .ok()
                .map(|s| normalize_base_url(&s))
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    pub fn defaults() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl TimeoutSettings {
    pub fn from_env() -> Self {
        Self {
            request: parse_seconds(env::var(ENV_REQUEST_TIMEOUT).ok().as_deref())
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            upload: parse_seconds(env::var(ENV_UPLOAD_TIMEOUT).ok().as_deref())
                .unwrap_or(DEFAULT_UPLOAD_TIMEOUT),
        }
    }

    pub fn defaults() -> Self {
        Self {
            request: DEFAULT_REQUEST_TIMEOUT,
            upload: DEFAULT_UPLOAD_TIMEOUT,
        }
    }
}

impl ReportSettings {
    pub fn from_env() -> Self {
        Self {
            results_path: env::var(ENV_RESULTS_PATH)
                .unwrap_or_else(|_| DEFAULT_RESULTS_PATH.to_string()),
        }
    }

    pub fn defaults() -> Self {
        Self {
            results_path: DEFAULT_RESULTS_PATH.to_string(),
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Strip whitespace and trailing slashes so endpoints can be joined with `/`
pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Parse a positive number of seconds; zero and garbage are rejected
fn parse_seconds(value: Option<&str>) -> Option<u64> {
    value
        .and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
}
