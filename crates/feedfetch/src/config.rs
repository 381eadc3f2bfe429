//! Process-level configuration, read once at startup.

use crate::logging_impl::LogConfig;

/// Environment variable holding the default `User-Agent`.
pub const USER_AGENT_ENV: &str = "FEEDFETCH_USER_AGENT";

/// Configuration shared by every fetch of a [`Fetcher`](crate::Fetcher).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Sent when a request does not set its own user agent.
    pub default_user_agent: String,

    /// Redaction and truncation of logged URLs and headers.
    pub log: LogConfig,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            default_user_agent: default_user_agent(),
            log: LogConfig::default(),
        }
    }
}

impl FetchConfig {
    /// Create a configuration with built-in defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read configuration from the environment.
    ///
    /// `FEEDFETCH_USER_AGENT` overrides the default user agent when it is
    /// set and non-blank.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default_user_agent = lookup(USER_AGENT_ENV)
            .map(|ua| ua.trim().to_string())
            .filter(|ua| !ua.is_empty())
            .unwrap_or_else(default_user_agent);
        Self {
            default_user_agent,
            log: LogConfig::default(),
        }
    }

    /// Set the default user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.default_user_agent = user_agent.into();
        self
    }

    /// Set the logging configuration.
    pub fn log_config(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }
}

fn default_user_agent() -> String {
    format!("feedfetch/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_user_agent() {
        let config = FetchConfig::new();
        assert!(config.default_user_agent.starts_with("feedfetch/"));
    }

    #[test]
    fn test_env_override() {
        let config = FetchConfig::from_lookup(|key| {
            (key == USER_AGENT_ENV).then(|| "  MyReader/2.0 ".to_string())
        });
        assert_eq!(config.default_user_agent, "MyReader/2.0");
    }

    #[test]
    fn test_blank_env_ignored() {
        let config = FetchConfig::from_lookup(|_| Some("   ".to_string()));
        assert!(config.default_user_agent.starts_with("feedfetch/"));
    }

    #[test]
    fn test_builder_override() {
        let config = FetchConfig::new().user_agent("custom");
        assert_eq!(config.default_user_agent, "custom");
        assert!(config.log.redact_sensitive);

        let config = config.log_config(LogConfig::new().unsafe_disable_redaction());
        assert!(!config.log.redact_sensitive);
    }
}
