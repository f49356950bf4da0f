//! Attribute resolution over the topologically ordered graph
//!
//! Two-phase protocol: the stack is built mutable and OPEN, then resolution
//! walks the topological order once, emitting each resource's concrete
//! attribute values into a binding table before any consumer needs them.

use std::collections::HashMap;

use serde_json::Value as JsonValue;
use tracing::debug;

use crate::attr::{Attr, AttrRef, LogicalId, Value};
use crate::dag;
use crate::emit::EmitConfig;
use crate::error::{StackError, StackResult};
use crate::resource::{Resource, ResourceSpec};
use crate::template::{ResolvedResource, ResolvedTemplate};

/// Concrete attribute values emitted so far during one resolution pass
#[derive(Debug, Default)]
pub(crate) struct Bindings {
    values: HashMap<(LogicalId, Attr), String>,
}

impl Bindings {
    fn new() -> Self {
        Self::default()
    }

    fn bind(&mut self, id: &LogicalId, attr: Attr, value: String) {
        self.values.insert((id.clone(), attr), value);
    }

    /// Concrete value for a reference; the target is guaranteed to have
    /// been emitted earlier in the topological order
    pub(crate) fn resolve_ref(&self, r: &AttrRef, referrer: &LogicalId) -> StackResult<&str> {
        self.values
            .get(&(r.target().clone(), r.attr()))
            .map(String::as_str)
            .ok_or_else(|| StackError::UnresolvedReference {
                referrer: referrer.clone(),
                target: r.target().clone(),
            })
    }

    pub(crate) fn resolve_value(&self, value: &Value, referrer: &LogicalId) -> StackResult<JsonValue> {
        Ok(match value {
            Value::Str(s) => JsonValue::from(s.clone()),
            Value::Int(n) => JsonValue::from(*n),
            Value::Bool(b) => JsonValue::from(*b),
            Value::Ref(r) => JsonValue::from(self.resolve_ref(r, referrer)?),
        })
    }
}

/// Resolve the declared graph into a dependency-ordered, reference-free
/// template
pub(crate) fn resolve_stack(
    stack_name: &str,
    resources: &[Resource],
    config: &EmitConfig,
) -> StackResult<ResolvedTemplate> {
    let order = dag::topo_order(resources)?;

    let mut bindings = Bindings::new();
    let mut resolved = Vec::with_capacity(resources.len());

    for idx in order {
        let resource = &resources[idx];
        let id = resource.logical_id();
        let kind = resource.kind();

        let physical_name = match resource.spec() {
            ResourceSpec::Table(table) => table
                .explicit_name()
                .map(str::to_string)
                .unwrap_or_else(|| config.physical_name(stack_name, id.as_str())),
            _ => config.physical_name(stack_name, id.as_str()),
        };
        let resource_name = config.resource_name(kind, &physical_name);

        bindings.bind(id, Attr::Name, physical_name.clone());
        bindings.bind(id, Attr::Arn, resource_name);

        let properties = match resource.spec() {
            ResourceSpec::Table(table) => table.resolved_properties(&physical_name),
            ResourceSpec::Role(role) => role.resolved_properties(&physical_name, &bindings, id)?,
            ResourceSpec::Function(function) => {
                function.resolved_properties(&physical_name, &bindings, id)?
            }
            ResourceSpec::ApiRoute(route) => route.resolved_properties(&bindings, id)?,
        };

        let mut depends_on: Vec<LogicalId> =
            resource.dependencies().into_iter().cloned().collect();
        depends_on.sort();

        debug!(logical_id = %id, kind = %kind, deps = depends_on.len(), "resolved resource");

        resolved.push(ResolvedResource {
            logical_id: id.clone(),
            kind,
            properties: JsonValue::Object(properties),
            depends_on,
        });
    }

    Ok(ResolvedTemplate {
        stack_name: stack_name.to_string(),
        resources: resolved,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::catalog::Runtime;
    use crate::resources::{Function, KeyType, PolicyStatement, Role, Table};

    fn bookstore_resources() -> Vec<Resource> {
        let table_arn = AttrRef::new(LogicalId::from("Table"), Attr::Arn);
        let role_arn = AttrRef::new(LogicalId::from("Role"), Attr::Arn);

        let mut role = Role::assumed_by("compute-service");
        role.push_statement(
            PolicyStatement::new()
                .action("datastore:*")
                .resource(table_arn.clone()),
        );

        vec![
            Resource::new(
                "Table",
                ResourceSpec::Table(
                    Table::new()
                        .table_name("MyBookTable")
                        .partition_key("isbn", KeyType::Text),
                ),
            ),
            Resource::new("Role", ResourceSpec::Role(role)),
            Resource::new(
                "Fn",
                ResourceSpec::Function(
                    Function::new(Runtime::NodeJs20, "index.handler", "./code", role_arn)
                        .env("DYNAMODB", table_arn),
                ),
            ),
        ]
    }

    #[test]
    fn test_refs_replaced_by_concrete_values() {
        let template =
            resolve_stack("bookstore", &bookstore_resources(), &EmitConfig::default()).unwrap();

        let table_arn = "arn:cloud:datastore:local:000000000000:table/MyBookTable";
        let function = template.get(&LogicalId::from("Fn")).unwrap();
        assert_eq!(function.properties["environment"]["DYNAMODB"], table_arn);
        assert_eq!(
            function.properties["role"],
            "arn:cloud:identity::000000000000:role/bookstore-Role"
        );

        let role = template.get(&LogicalId::from("Role")).unwrap();
        assert_eq!(role.properties["policy"][0]["resources"][0], table_arn);
    }

    #[test]
    fn test_explicit_table_name_wins() {
        let template =
            resolve_stack("bookstore", &bookstore_resources(), &EmitConfig::default()).unwrap();
        let table = template.get(&LogicalId::from("Table")).unwrap();
        assert_eq!(table.properties["tableName"], "MyBookTable");
    }

    #[test]
    fn test_depends_on_is_sorted_and_complete() {
        let template =
            resolve_stack("bookstore", &bookstore_resources(), &EmitConfig::default()).unwrap();
        let function = template.get(&LogicalId::from("Fn")).unwrap();
        assert_eq!(
            function.depends_on,
            vec![LogicalId::from("Role"), LogicalId::from("Table")]
        );
    }

    #[test]
    fn test_resolution_is_pure() {
        let a = resolve_stack("bookstore", &bookstore_resources(), &EmitConfig::default()).unwrap();
        let b = resolve_stack("bookstore", &bookstore_resources(), &EmitConfig::default()).unwrap();
        assert_eq!(a, b);
    }
}
