//! Bot configuration.
//!
//! One YAML file carries the bot identity and the policy list:
//!
//! ```yaml
//! user: triage-bot
//! repoHost: https://gitlab.example.com
//! endpoint: /webhook
//! policies:
//!   - name: label critical merge requests
//!     resource: Merge Request Hook
//!     conditions:
//!       labels: [critical]
//!     actions:
//!       comment: on it
//! ```
//!
//! Loading validates every policy; a file with any invalid policy is
//! rejected as a whole.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dispatch::DispatcherConfig;
use crate::error::ConfigError;
use crate::policy::{Policy, PolicySet};
use crate::validate::validate_all;

/// Port the bot listens on when the file does not say.
pub const DEFAULT_PORT: u16 = 7838;

/// Webhook path when the file does not say.
pub const DEFAULT_ENDPOINT: &str = "/webhook";

/// Bot identity, listener settings and policies, as read from YAML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// The account remote updates are made as.
    #[serde(default)]
    pub user: String,
    /// Base URL of the GitLab instance.
    #[serde(default)]
    pub repo_host: String,
    /// Path webhooks are posted to.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Listener port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Log remote operations instead of performing them.
    #[serde(default)]
    pub dry_run: bool,
    /// Worker settings.
    #[serde(default)]
    pub dispatcher: DispatcherConfig,
    /// Policies in file order.
    #[serde(default)]
    pub policies: PolicySet,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

const fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user: String::new(),
            repo_host: String::new(),
            endpoint: default_endpoint(),
            port: DEFAULT_PORT,
            dry_run: false,
            dispatcher: DispatcherConfig::default(),
            policies: PolicySet::default(),
        }
    }
}

impl Config {
    /// Parses and validates a configuration document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Runs the validator over every policy.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = validate_all(&self.policies);
        if invalid.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::InvalidPolicies(invalid))
        }
    }

    /// The policies in the shared form the dispatcher takes.
    #[must_use]
    pub fn shared_policies(&self) -> Arc<[Policy]> {
        self.policies.0.clone().into()
    }
}

/// Reads, parses and validates the configuration file at `path`.
pub fn load(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let config = Config::from_yaml(&raw)?;
    tracing::info!(
        path = %path.display(),
        policies = config.policies.len(),
        "configuration loaded"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    #[test]
    fn defaults_fill_missing_fields() {
        let config = Config::from_yaml("user: bot").unwrap();
        assert_eq!(config.user, "bot");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert!(!config.dry_run);
        assert!(config.policies.is_empty());
        assert!(config.dispatcher.workers >= 1);
    }

    #[test]
    fn reads_camel_case_keys() {
        let config = Config::from_yaml(
            "repoHost: https://gitlab.example.com\ndryRun: true\nport: 9000\ndispatcher: {workers: 3}",
        )
        .unwrap();
        assert_eq!(config.repo_host, "https://gitlab.example.com");
        assert!(config.dry_run);
        assert_eq!(config.port, 9000);
        assert_eq!(config.dispatcher.workers, 3);
    }

    #[test]
    fn every_invalid_policy_is_reported() {
        let err = Config::from_yaml(
            r"
policies:
  - name: ok
    resource: Issue Hook
  - name: typo
    resource: Isue Hook
  - name: zero
    resource: Merge Request Hook
    conditions:
      milestone: 0
",
        )
        .unwrap_err();
        let ConfigError::InvalidPolicies(invalid) = err else {
            panic!("expected invalid policies, got {err:?}");
        };
        assert_eq!(invalid.len(), 2);
        assert_eq!(invalid[0].policy, "typo");
        assert_eq!(invalid[1].errors, vec![ValidationError::ZeroMilestone]);
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = Config::from_yaml("policies: {").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
