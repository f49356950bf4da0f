//! Resource model: logical identity plus a closed set of variants
//!
//! Dependencies are never declared by hand. They are derived by scanning a
//! variant's configuration for embedded [`AttrRef`]s, so the graph always
//! matches what the properties actually consume.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::attr::{AttrRef, LogicalId};
use crate::resources::{ApiRoute, Function, Role, Table};

/// The closed set of resource kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Table,
    Role,
    Function,
    ApiRoute,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Table => "table",
            ResourceKind::Role => "role",
            ResourceKind::Function => "function",
            ResourceKind::ApiRoute => "api-route",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Variant configuration for one declared resource
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceSpec {
    Table(Table),
    Role(Role),
    Function(Function),
    ApiRoute(ApiRoute),
}

impl ResourceSpec {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceSpec::Table(_) => ResourceKind::Table,
            ResourceSpec::Role(_) => ResourceKind::Role,
            ResourceSpec::Function(_) => ResourceKind::Function,
            ResourceSpec::ApiRoute(_) => ResourceKind::ApiRoute,
        }
    }

    /// All attribute references embedded in this variant's configuration
    pub(crate) fn references(&self) -> Vec<&AttrRef> {
        match self {
            ResourceSpec::Table(_) => Vec::new(),
            ResourceSpec::Role(role) => role.references().collect(),
            ResourceSpec::Function(function) => function.references().collect(),
            ResourceSpec::ApiRoute(route) => route.references().collect(),
        }
    }
}

/// A declared resource, owned by its stack
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    logical_id: LogicalId,
    spec: ResourceSpec,
}

impl Resource {
    pub fn new(logical_id: impl Into<LogicalId>, spec: ResourceSpec) -> Self {
        Self {
            logical_id: logical_id.into(),
            spec,
        }
    }

    pub fn logical_id(&self) -> &LogicalId {
        &self.logical_id
    }

    pub fn kind(&self) -> ResourceKind {
        self.spec.kind()
    }

    pub fn spec(&self) -> &ResourceSpec {
        &self.spec
    }

    pub(crate) fn spec_mut(&mut self) -> &mut ResourceSpec {
        &mut self.spec
    }

    /// Logical ids this resource depends on, derived from its references
    pub fn dependencies(&self) -> HashSet<&LogicalId> {
        self.spec
            .references()
            .into_iter()
            .map(AttrRef::target)
            .collect()
    }

    pub fn describe(&self) -> String {
        match &self.spec {
            ResourceSpec::Table(_) => format!("table '{}'", self.logical_id),
            ResourceSpec::Role(role) => format!(
                "role '{}' assumed by {}",
                self.logical_id,
                role.trust_principal()
            ),
            ResourceSpec::Function(function) => {
                format!("function '{}' ({})", self.logical_id, function.runtime())
            }
            ResourceSpec::ApiRoute(route) => format!(
                "route '{}' {} {}",
                self.logical_id,
                route.method(),
                route.path()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::Attr;
    use crate::catalog::Runtime;
    use crate::resources::KeyType;

    #[test]
    fn test_table_has_no_dependencies() {
        let resource = Resource::new(
            "Table",
            ResourceSpec::Table(Table::new().partition_key("isbn", KeyType::Text)),
        );
        assert!(resource.dependencies().is_empty());
    }

    #[test]
    fn test_function_dependencies_deduplicated() {
        let role_arn = AttrRef::new(LogicalId::from("Role"), Attr::Arn);
        let role_name = AttrRef::new(LogicalId::from("Role"), Attr::Name);
        let function = Function::new(Runtime::NodeJs20, "index.handler", "./code", role_arn)
            .env("ROLE_NAME", role_name);

        let resource = Resource::new("Fn", ResourceSpec::Function(function));
        let deps = resource.dependencies();
        assert_eq!(deps.len(), 1);
        assert!(deps.contains(&LogicalId::from("Role")));
    }

    #[test]
    fn test_describe_names_the_kind() {
        let resource = Resource::new(
            "LambdaExecutionRole",
            ResourceSpec::Role(Role::assumed_by("compute-service")),
        );
        assert_eq!(
            resource.describe(),
            "role 'LambdaExecutionRole' assumed by compute-service"
        );
        assert_eq!(resource.kind(), ResourceKind::Role);
    }
}
