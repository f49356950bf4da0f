//! Identity declaration with trust principal and permission statements
//!
//! The trust principal is fixed at construction, so a role can never reach
//! a function without one. Policy statements are append-only and never
//! de-duplicated; an auditor sees exactly what was declared, in order.

use serde_json::{json, Map as JsonMap, Value as JsonValue};

use crate::attr::{AttrRef, LogicalId, Value};
use crate::error::{StackError, StackResult};
use crate::resolver::Bindings;

/// Allowed actions plus the resources they apply to
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyStatement {
    actions: Vec<String>,
    resources: Vec<Value>,
}

impl PolicyStatement {
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
            resources: Vec::new(),
        }
    }

    /// Add an action glob, `service:Action` or `service:*`
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.actions.push(action.into());
        self
    }

    /// Add a target resource, a literal name or a reference
    pub fn resource(mut self, resource: impl Into<Value>) -> Self {
        self.resources.push(resource.into());
        self
    }

    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    pub(crate) fn references(&self) -> impl Iterator<Item = &AttrRef> {
        self.resources.iter().filter_map(Value::as_ref_value)
    }

    pub(crate) fn validate(&self) -> StackResult<()> {
        if self.actions.is_empty() {
            return Err(StackError::InvalidPolicyStatement {
                reason: "statement declares no actions".to_string(),
            });
        }
        for action in &self.actions {
            if !is_valid_action(action) {
                return Err(StackError::InvalidPolicyStatement {
                    reason: format!(
                        "action '{}' is not of the form service:Action or service:*",
                        action
                    ),
                });
            }
        }
        Ok(())
    }

    fn resolved_json(&self, bindings: &Bindings, referrer: &LogicalId) -> StackResult<JsonValue> {
        let resources = self
            .resources
            .iter()
            .map(|v| bindings.resolve_value(v, referrer))
            .collect::<StackResult<Vec<_>>>()?;
        Ok(json!({ "actions": self.actions, "resources": resources }))
    }
}

impl Default for PolicyStatement {
    fn default() -> Self {
        Self::new()
    }
}

/// Shallow shape check only; there is no permission catalogue to check
/// action names against
fn is_valid_action(action: &str) -> bool {
    match action.split_once(':') {
        Some((service, name)) => {
            !service.is_empty()
                && !name.is_empty()
                && !service.contains(['*', ' '])
                && !name.contains(' ')
        }
        None => false,
    }
}

/// Declaration of an assumable identity
#[derive(Debug, Clone, PartialEq)]
pub struct Role {
    trust_principal: String,
    statements: Vec<PolicyStatement>,
}

impl Role {
    /// A role trusted by the given service principal
    pub fn assumed_by(principal: impl Into<String>) -> Self {
        Self {
            trust_principal: principal.into(),
            statements: Vec::new(),
        }
    }

    pub fn trust_principal(&self) -> &str {
        &self.trust_principal
    }

    pub fn statements(&self) -> &[PolicyStatement] {
        &self.statements
    }

    /// Append a validated statement; duplicates are kept in order
    pub(crate) fn push_statement(&mut self, statement: PolicyStatement) {
        self.statements.push(statement);
    }

    pub(crate) fn references(&self) -> impl Iterator<Item = &AttrRef> {
        self.statements.iter().flat_map(PolicyStatement::references)
    }

    pub(crate) fn resolved_properties(
        &self,
        physical_name: &str,
        bindings: &Bindings,
        referrer: &LogicalId,
    ) -> StackResult<JsonMap<String, JsonValue>> {
        let policy = self
            .statements
            .iter()
            .map(|s| s.resolved_json(bindings, referrer))
            .collect::<StackResult<Vec<_>>>()?;

        let mut props = JsonMap::new();
        props.insert("roleName".to_string(), json!(physical_name));
        props.insert("trustPrincipal".to_string(), json!(self.trust_principal));
        props.insert("policy".to_string(), JsonValue::Array(policy));
        Ok(props)
    }
}
