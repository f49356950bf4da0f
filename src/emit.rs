//! Emission configuration and concrete identifier synthesis
//!
//! Physical names and access-control resource names are synthesized
//! deterministically from the emission config, the stack name, and the
//! logical id. No clock, no randomness: resolving the same declared graph
//! twice yields byte-identical output.

use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::resource::ResourceKind;

/// Environment variable pointing at a YAML emission config file
const EMIT_CONFIG_ENV: &str = "STACKPLAN_EMIT_CONFIG";

/// Controls how concrete names and resource names are synthesized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitConfig {
    pub partition: String,
    pub region: String,
    pub account: String,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            partition: "cloud".to_string(),
            region: "local".to_string(),
            account: "000000000000".to_string(),
        }
    }
}

impl EmitConfig {
    /// Load from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading emit config {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&raw)
            .with_context(|| format!("parsing emit config {}", path.display()))?;
        info!(path = %path.display(), "loaded emit config");
        Ok(config)
    }

    /// Config from `STACKPLAN_EMIT_CONFIG` if set, defaults otherwise
    pub fn from_env() -> Self {
        match std::env::var(EMIT_CONFIG_ENV) {
            Ok(path) => match Self::from_yaml_file(&path) {
                Ok(config) => config,
                Err(err) => {
                    warn!(%path, error = %err, "emit config unusable, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Synthesized physical name for a resource without an explicit one
    pub fn physical_name(&self, stack_name: &str, logical_id: &str) -> String {
        format!("{}-{}", stack_name, logical_id)
    }

    /// Access-control resource name for a resource of the given kind
    ///
    /// Identity resources are partition-global, so their resource name
    /// carries no region segment.
    pub fn resource_name(&self, kind: ResourceKind, physical_name: &str) -> String {
        match kind {
            ResourceKind::Table => format!(
                "arn:{}:datastore:{}:{}:table/{}",
                self.partition, self.region, self.account, physical_name
            ),
            ResourceKind::Role => format!(
                "arn:{}:identity::{}:role/{}",
                self.partition, self.account, physical_name
            ),
            ResourceKind::Function => format!(
                "arn:{}:compute:{}:{}:function/{}",
                self.partition, self.region, self.account, physical_name
            ),
            ResourceKind::ApiRoute => format!(
                "arn:{}:gateway:{}:{}:route/{}",
                self.partition, self.region, self.account, physical_name
            ),
        }
    }
}

static DEFAULT_CONFIG: Lazy<EmitConfig> = Lazy::new(EmitConfig::from_env);

/// Process-wide emission config, loaded once from the environment
pub fn default_config() -> &'static EmitConfig {
    &DEFAULT_CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EmitConfig::default();
        assert_eq!(config.partition, "cloud");
        assert_eq!(config.physical_name("bookstore", "Table"), "bookstore-Table");
    }

    #[test]
    fn test_resource_name_shapes() {
        let config = EmitConfig::default();
        assert_eq!(
            config.resource_name(ResourceKind::Table, "bookstore-Table"),
            "arn:cloud:datastore:local:000000000000:table/bookstore-Table"
        );
        // no region segment for identity resources
        assert_eq!(
            config.resource_name(ResourceKind::Role, "bookstore-Role"),
            "arn:cloud:identity::000000000000:role/bookstore-Role"
        );
    }

    #[test]
    fn test_yaml_round_trip() {
        let yaml = "partition: aws\nregion: eu-west-1\naccount: \"123456789012\"\n";
        let config: EmitConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.partition, "aws");
        assert_eq!(
            config.resource_name(ResourceKind::Function, "api"),
            "arn:aws:compute:eu-west-1:123456789012:function/api"
        );
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: EmitConfig = serde_yaml::from_str("partition: aws\n").unwrap();
        assert_eq!(config.partition, "aws");
        assert_eq!(config.region, "local");
    }
}
