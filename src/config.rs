//! Client configuration parsed from environment variables.

use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_NAVIGATION_DELAY_MS: u64 = 100;

/// Session validation used on mount and by `refresh_user`.
pub const ADMIN_SESSION_PATH: &str = "/auth/admin/refresh-token";
pub const ADMIN_LOGIN_PATH: &str = "/auth/admin/login";
pub const ADMIN_LOGOUT_PATH: &str = "/auth/admin/logout";
/// Mid-session refresh used by the retry wrapper.
pub const TOKEN_REFRESH_PATH: &str = "/auth/refresh-token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminConfig {
    /// Prefix for every request URL. Empty means relative requests.
    pub base_url: String,
    pub timeouts: Timeouts,
    /// Share one in-flight token refresh among concurrent 401s.
    pub coalesce_refresh: bool,
    /// Pause between a successful login and the dashboard navigation.
    pub navigation_delay: Duration,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeouts: Timeouts::default(),
            coalesce_refresh: false,
            navigation_delay: Duration::from_millis(DEFAULT_NAVIGATION_DELAY_MS),
        }
    }
}

impl AdminConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `ADMIN_API_BASE_URL`: default empty (relative requests)
    /// - `ADMIN_REQUEST_TIMEOUT_SECS`: default 30
    /// - `ADMIN_CONNECT_TIMEOUT_SECS`: default 10
    /// - `ADMIN_COALESCE_REFRESH`: default false
    /// - `ADMIN_NAVIGATION_DELAY_MS`: default 100
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = std::env::var("ADMIN_API_BASE_URL")
            .unwrap_or_default()
            .trim()
            .trim_end_matches('/')
            .to_string();
        let timeouts = Timeouts {
            request_secs: env_parse_u64("ADMIN_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("ADMIN_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let coalesce_refresh = env_bool("ADMIN_COALESCE_REFRESH").unwrap_or(false);
        let navigation_delay =
            Duration::from_millis(env_parse_u64("ADMIN_NAVIGATION_DELAY_MS", DEFAULT_NAVIGATION_DELAY_MS));

        Self { base_url, timeouts, coalesce_refresh, navigation_delay }
    }

    /// Same config pointed at another backend.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
