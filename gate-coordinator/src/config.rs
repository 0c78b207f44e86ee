//! Configuration loading for sync-gate.
//!
//! Configuration is loaded from a TOML file (default: `gate.toml`). Every
//! section and field is optional; missing values fall back to the built-in
//! policy table.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use sync_gate_core::{Policies, TierPolicy, DEFAULT_AUTOMATED_INTERVAL};

/// Root configuration for sync-gate.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Rate-limit policy configuration.
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Coordinator configuration.
    #[serde(default)]
    pub coordinator: CoordinatorConfig,
    /// Simulated sync configuration.
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Rate-limit policy configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyConfig {
    /// `Automated` request policy.
    #[serde(default)]
    pub automated: AutomatedConfig,
    /// `UserAppOpen` request policy (default: 2 per 3 min, 5 per 30 min).
    #[serde(default)]
    pub user_app_open: TierConfig,
    /// `UserRequest` request policy (default: 1 per 3 min, 3 per 30 min).
    #[serde(default)]
    pub user_request: TierConfig,
}

/// `Automated` request policy.
#[derive(Debug, Clone, Deserialize)]
pub struct AutomatedConfig {
    /// Minimum seconds between the last success and an automated sync
    /// (default: 28800 = 8 hours).
    #[serde(default = "default_automated_interval")]
    pub interval_secs: u64,
}

/// Two-tier policy for a counted request type.
///
/// Unset fields take the request type's built-in default, so the same
/// struct serves both tiers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TierConfig {
    /// Short window length in seconds.
    pub short_window_secs: Option<u64>,
    /// Successes allowed in the short window.
    pub short_limit: Option<u32>,
    /// Long window length in seconds; also the counter reset threshold.
    pub long_window_secs: Option<u64>,
    /// Successes allowed in the long window.
    pub long_limit: Option<u32>,
}

/// Coordinator configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoordinatorConfig {
    /// Seconds after which an unfinished sync counts as failed
    /// (default: no timeout).
    pub sync_timeout_secs: Option<u64>,
}

/// Simulated sync configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    /// Probability that a simulated sync fails (default: 0.1).
    #[serde(default = "default_failure_rate")]
    pub failure_rate: f64,
    /// Maximum simulated sync latency in milliseconds (default: 5000).
    #[serde(default = "default_max_latency_ms")]
    pub max_latency_ms: u64,
    /// Retries of a failed sync before giving up (default: 10).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

// Default value functions
fn default_automated_interval() -> u64 {
    DEFAULT_AUTOMATED_INTERVAL.as_secs()
}

fn default_failure_rate() -> f64 {
    0.1
}

fn default_max_latency_ms() -> u64 {
    5000
}

fn default_max_retries() -> u32 {
    10
}

impl Default for AutomatedConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_automated_interval(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            failure_rate: default_failure_rate(),
            max_latency_ms: default_max_latency_ms(),
            max_retries: default_max_retries(),
        }
    }
}

impl TierConfig {
    /// Fill unset fields from `defaults`.
    pub fn resolve(&self, defaults: TierPolicy) -> TierPolicy {
        TierPolicy {
            short_window: self
                .short_window_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.short_window),
            short_limit: self.short_limit.unwrap_or(defaults.short_limit),
            long_window: self
                .long_window_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.long_window),
            long_limit: self.long_limit.unwrap_or(defaults.long_limit),
        }
    }
}

impl PolicyConfig {
    /// Build the policy table.
    pub fn policies(&self) -> Policies {
        Policies {
            automated_interval: Duration::from_secs(self.automated.interval_secs),
            user_app_open: self.user_app_open.resolve(TierPolicy::user_app_open()),
            user_request: self.user_request.resolve(TierPolicy::user_request()),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails
    /// validation.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::from("<inline>"),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configured limits describe a usable policy.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.policy.automated.interval_secs == 0 {
            return Err(ConfigError::invalid("policy.automated.interval_secs must be > 0"));
        }

        let policies = self.policies();
        validate_tier("policy.user_app_open", &policies.user_app_open)?;
        validate_tier("policy.user_request", &policies.user_request)?;

        if self.coordinator.sync_timeout_secs == Some(0) {
            return Err(ConfigError::invalid("coordinator.sync_timeout_secs must be > 0"));
        }

        let rate = self.simulation.failure_rate;
        if !(0.0..1.0).contains(&rate) {
            return Err(ConfigError::invalid(format!(
                "simulation.failure_rate must be in [0, 1), got {}",
                rate
            )));
        }
        Ok(())
    }

    /// The effective policy table.
    pub fn policies(&self) -> Policies {
        self.policy.policies()
    }

    /// The configured sync timeout, if any.
    pub fn sync_timeout(&self) -> Option<Duration> {
        self.coordinator.sync_timeout_secs.map(Duration::from_secs)
    }
}

fn validate_tier(section: &str, tier: &TierPolicy) -> Result<(), ConfigError> {
    if tier.short_limit == 0 || tier.long_limit == 0 {
        return Err(ConfigError::invalid(format!("{}: limits must be > 0", section)));
    }
    if tier.short_window.is_zero() || tier.long_window.is_zero() {
        return Err(ConfigError::invalid(format!("{}: windows must be > 0", section)));
    }
    if tier.short_window > tier.long_window {
        return Err(ConfigError::invalid(format!(
            "{}: short window ({:?}) exceeds long window ({:?})",
            section, tier.short_window, tier.long_window
        )));
    }
    Ok(())
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
    /// Configuration parsed but describes an unusable policy.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

impl ConfigError {
    fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_matches_policy_table() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.policies(), Policies::default());
        assert_eq!(config.sync_timeout(), None);
        assert_eq!(config.simulation.max_retries, 10);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.policy.automated.interval_secs, 8 * 60 * 60);
        assert_eq!(config.policies(), Policies::default());
    }

    #[test]
    fn config_from_toml_string() {
        let toml = r#"
[policy.automated]
interval_secs = 3600

[policy.user_app_open]
short_limit = 3

[policy.user_request]
long_window_secs = 600
long_limit = 4

[coordinator]
sync_timeout_secs = 30

[simulation]
failure_rate = 0.25
max_latency_ms = 100
"#;

        let config = Config::from_toml_str(toml).unwrap();
        let policies = config.policies();
        assert_eq!(policies.automated_interval, Duration::from_secs(3600));

        // Unset tier fields keep that tier's own defaults.
        assert_eq!(policies.user_app_open.short_limit, 3);
        assert_eq!(policies.user_app_open.long_limit, 5);
        assert_eq!(policies.user_request.short_limit, 1);
        assert_eq!(policies.user_request.long_window, Duration::from_secs(600));
        assert_eq!(policies.user_request.long_limit, 4);

        assert_eq!(config.sync_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.simulation.failure_rate, 0.25);
        assert_eq!(config.simulation.max_latency_ms, 100);
        assert_eq!(config.simulation.max_retries, 10);
    }

    #[test]
    fn zero_limit_is_rejected() {
        let err = Config::from_toml_str("[policy.user_request]\nshort_limit = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert!(err.to_string().contains("policy.user_request"));
    }

    #[test]
    fn short_window_longer_than_long_window_is_rejected() {
        let toml = "[policy.user_app_open]\nshort_window_secs = 3600\n";
        let err = Config::from_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("exceeds long window"));
    }

    #[test]
    fn failure_rate_out_of_range_is_rejected() {
        let err = Config::from_toml_str("[simulation]\nfailure_rate = 1.0\n").unwrap_err();
        assert!(err.to_string().contains("failure_rate"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = Config::from_toml_str("[coordinator]\nsync_timeout_secs = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = Config::from_toml_str("[policy\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[policy.user_request]\nshort_limit = 2").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.policies().user_request.short_limit, 2);
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_file(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }
}
