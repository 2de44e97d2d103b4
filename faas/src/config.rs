//! Configuration management via environment variables
//!
//! Provides helper functions for reading environment variables with fallback
//! to deprecated variable names with warning logs, and the typed configuration
//! structs consumed by the server, the dispatcher and the package loop.

use std::path::PathBuf;
use std::time::Duration;

/// Default database URL
pub const DEFAULT_DATABASE_URL: &str = "sqlite:faas.db";

/// Default package poll interval in milliseconds
pub const DEFAULT_PACKAGE_POLL_INTERVAL_MS: u64 = 60_000;

/// Get an environment variable with fallback to a deprecated name
///
/// If the new variable name is set, returns its value.
/// If only the old (deprecated) variable name is set, returns its value
/// and logs a deprecation warning.
///
/// # Example
/// ```
/// use faas::config::get_env_with_fallback;
///
/// let port = get_env_with_fallback("FAAS_PORT", "PORT");
/// ```
pub fn get_env_with_fallback(new_name: &str, old_name: &str) -> Option<String> {
    if let Ok(val) = std::env::var(new_name) {
        return Some(val);
    }
    if let Ok(val) = std::env::var(old_name) {
        tracing::warn!(
            "Environment variable '{}' is deprecated, use '{}' instead",
            old_name,
            new_name
        );
        return Some(val);
    }
    None
}

/// Get an environment variable with fallback and default value
pub fn get_env_with_fallback_or(new_name: &str, old_name: &str, default: &str) -> String {
    get_env_with_fallback(new_name, old_name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable with fallback, parsing to a specific type
///
/// Returns `default` if neither variable is set or parsing fails.
pub fn get_env_with_fallback_parse<T: std::str::FromStr>(
    new_name: &str,
    old_name: &str,
    default: T,
) -> T {
    get_env_with_fallback(new_name, old_name)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// データベースURLを取得
///
/// 環境変数 `FAAS_DATABASE_URL`（旧: `DATABASE_URL`）から取得し、
/// 未設定の場合は `sqlite:faas.db` を返す。
pub fn get_database_url() -> String {
    get_env_with_fallback_or("FAAS_DATABASE_URL", "DATABASE_URL", DEFAULT_DATABASE_URL)
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Listen port
    pub port: u16,
}

impl ServerConfig {
    /// Load server configuration from environment variables.
    pub fn from_env() -> Self {
        let host = get_env_with_fallback_or("FAAS_HOST", "HOST", "0.0.0.0");
        let port = get_env_with_fallback_parse("FAAS_PORT", "PORT", 3000u16);
        Self { host, port }
    }

    /// Build from explicit CLI values.
    pub fn from_args(host: String, port: u16) -> Self {
        Self { host, port }
    }

    /// `host:port` form used for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// URL suitable for printing in logs.
    pub fn base_url(&self) -> String {
        let host = match self.host.as_str() {
            "0.0.0.0" | "::" | "[::]" => "localhost",
            other => other,
        };
        format!("http://{}:{}", host, self.port)
    }
}

/// Handler execution configuration
///
/// Both limits are disabled by default; a handler that blocks or loops
/// forever then occupies one blocking worker until it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecutionConfig {
    /// Deadline for a single invocation. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Script-engine loop iteration limit. `None` means unlimited.
    pub loop_iteration_limit: Option<u64>,
}

impl ExecutionConfig {
    /// Load execution configuration from environment variables.
    ///
    /// `0` is treated the same as unset.
    pub fn from_env() -> Self {
        let timeout_ms = get_env_with_fallback_parse(
            "FAAS_HANDLER_TIMEOUT_MS",
            "HANDLER_TIMEOUT_MS",
            0u64,
        );
        let loop_limit =
            get_env_with_fallback_parse("FAAS_HANDLER_LOOP_LIMIT", "HANDLER_LOOP_LIMIT", 0u64);

        Self {
            timeout: (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms)),
            loop_iteration_limit: (loop_limit > 0).then_some(loop_limit),
        }
    }
}

/// Package reconciliation configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileConfig {
    /// Interval between passes.
    pub interval: Duration,
    /// Directory the host package manager operates in.
    pub packages_dir: PathBuf,
    /// Package manager executable.
    pub package_manager: String,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_PACKAGE_POLL_INTERVAL_MS),
            packages_dir: PathBuf::from("packages"),
            package_manager: "npm".to_string(),
        }
    }
}

impl ReconcileConfig {
    /// Load reconciliation configuration from environment variables.
    pub fn from_env() -> Self {
        let interval_ms = get_env_with_fallback_parse(
            "FAAS_PACKAGE_POLL_INTERVAL_MS",
            "PACKAGE_POLL_INTERVAL",
            DEFAULT_PACKAGE_POLL_INTERVAL_MS,
        )
        .max(1);
        let packages_dir = get_env_with_fallback_or("FAAS_PACKAGES_DIR", "PACKAGES_DIR", "packages");
        let package_manager =
            get_env_with_fallback_or("FAAS_PACKAGE_MANAGER", "PACKAGE_MANAGER", "npm");

        Self {
            interval: Duration::from_millis(interval_ms),
            packages_dir: PathBuf::from(packages_dir),
            package_manager,
        }
    }
}
