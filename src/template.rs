//! The resolved, reference-free provisioning template
//!
//! Output surface of the core: every attribute reference replaced by a
//! concrete value, resources listed in a valid topological order. This is
//! what a provisioning engine consumes.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::attr::LogicalId;
use crate::resource::ResourceKind;

/// One fully-resolved resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedResource {
    pub logical_id: LogicalId,
    pub kind: ResourceKind,
    pub properties: JsonValue,
    pub depends_on: Vec<LogicalId>,
}

/// Dependency-ordered description of all declared resources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTemplate {
    pub stack_name: String,
    /// Resources in resolved (topological) order
    pub resources: Vec<ResolvedResource>,
}

impl ResolvedTemplate {
    pub fn get(&self, logical_id: &LogicalId) -> Option<&ResolvedResource> {
        self.resources.iter().find(|r| r.logical_id == *logical_id)
    }

    /// Position of a resource in the resolved order
    pub fn position(&self, logical_id: &LogicalId) -> Option<usize> {
        self.resources.iter().position(|r| r.logical_id == *logical_id)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable plan listing for dry-run output
    pub fn describe(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("Provisioning plan for stack '{}'\n", self.stack_name));
        output.push_str(&format!("Resources: {}\n\n", self.resources.len()));

        for (idx, resource) in self.resources.iter().enumerate() {
            output.push_str(&format!(
                "  {}. [{}] {}\n",
                idx + 1,
                resource.kind,
                resource.logical_id
            ));
            if !resource.depends_on.is_empty() {
                let deps: Vec<&str> = resource.depends_on.iter().map(|d| d.as_str()).collect();
                output.push_str(&format!("     depends on: {}\n", deps.join(", ")));
            }
        }

        output
    }
}
