use rolegate_core::VisibilityPolicy;
use serde::Deserialize;

use crate::identity::DEFAULT_ITERATIONS;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    /// Deployment-declared visibility tuning; defaults to the full-detail,
    /// kind-unrestricted variant.
    #[serde(default)]
    pub policy: VisibilityPolicy,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// PBKDF2 iteration count used when hashing new secrets.
    pub iterations: u32,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self, anyhow::Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Install the global tracing subscriber at the configured level.
    /// `RUST_LOG` wins when set; a second call is a no-op.
    pub fn init_tracing(&self) {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&self.general.log_level));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            identity: IdentityConfig::default(),
            policy: VisibilityPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolegate_core::{FileKind, Role};

    #[test]
    fn empty_config_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.identity.iterations, DEFAULT_ITERATIONS);
        assert!(config.policy.account_detail(Role::Viewer));
    }

    #[test]
    fn policy_tables_parse_from_toml() {
        let config: Config = toml::from_str(
            r#"
            [general]
            log_level = "debug"

            [identity]
            iterations = 1000

            [policy]
            account_detail_roles = ["admin"]

            [policy.file_kinds]
            guest = ["image"]
            viewer = ["link"]
            "#,
        )
        .unwrap();

        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.identity.iterations, 1000);
        assert!(config.policy.account_detail(Role::Admin));
        assert!(!config.policy.account_detail(Role::Viewer));
        assert!(config.policy.kind_visible(Role::Guest, FileKind::Image));
        assert!(!config.policy.kind_visible(Role::Guest, FileKind::Document));
        assert!(config.policy.kind_visible(Role::Viewer, FileKind::Link));
        assert!(config.policy.kind_visible(Role::Admin, FileKind::Document));
    }
}
