//! Executable unit declaration
//!
//! Binds a runtime, an entry point, an opaque code locator, an assumed
//! role, and an environment mapping. Environment keys are unique; a repeat
//! key is rejected rather than silently overwritten, so a misconfiguration
//! cannot mask an earlier value.

use serde_json::{json, Map as JsonMap, Value as JsonValue};

use crate::attr::{AttrRef, LogicalId, Value};
use crate::catalog::Runtime;
use crate::error::{StackError, StackResult};
use crate::resolver::Bindings;

/// Opaque locator for the function's code artifact
#[derive(Debug, Clone, PartialEq)]
pub struct CodeLocation(String);

impl CodeLocation {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CodeLocation {
    fn from(loc: &str) -> Self {
        Self(loc.to_string())
    }
}

impl From<String> for CodeLocation {
    fn from(loc: String) -> Self {
        Self(loc)
    }
}

/// Declaration of an executable unit
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    runtime: Runtime,
    handler: String,
    code: CodeLocation,
    role: AttrRef,
    environment: Vec<(String, Value)>,
}

impl Function {
    /// New function assuming the role behind `role`
    pub fn new(
        runtime: Runtime,
        handler: impl Into<String>,
        code: impl Into<CodeLocation>,
        role: AttrRef,
    ) -> Self {
        Self {
            runtime,
            handler: handler.into(),
            code: code.into(),
            role,
            environment: Vec::new(),
        }
    }

    /// Pre-registration environment entry; key uniqueness is checked when
    /// the function is added to a stack
    pub fn env(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.environment.push((key.into(), value.into()));
        self
    }

    pub fn runtime(&self) -> Runtime {
        self.runtime
    }

    pub fn environment(&self) -> &[(String, Value)] {
        &self.environment
    }

    pub(crate) fn validate(&self, id: &LogicalId) -> StackResult<()> {
        for (i, (key, _)) in self.environment.iter().enumerate() {
            if self.environment[..i].iter().any(|(k, _)| k == key) {
                return Err(StackError::DuplicateEnvironmentKey {
                    id: id.clone(),
                    key: key.clone(),
                });
            }
        }
        Ok(())
    }

    /// Post-registration environment entry
    pub(crate) fn add_environment(
        &mut self,
        id: &LogicalId,
        key: String,
        value: Value,
    ) -> StackResult<()> {
        if self.environment.iter().any(|(k, _)| *k == key) {
            return Err(StackError::DuplicateEnvironmentKey {
                id: id.clone(),
                key,
            });
        }
        self.environment.push((key, value));
        Ok(())
    }

    pub(crate) fn references(&self) -> impl Iterator<Item = &AttrRef> {
        std::iter::once(&self.role).chain(
            self.environment
                .iter()
                .filter_map(|(_, v)| v.as_ref_value()),
        )
    }

    pub(crate) fn resolved_properties(
        &self,
        physical_name: &str,
        bindings: &Bindings,
        referrer: &LogicalId,
    ) -> StackResult<JsonMap<String, JsonValue>> {
        let mut env = JsonMap::new();
        for (key, value) in &self.environment {
            env.insert(key.clone(), bindings.resolve_value(value, referrer)?);
        }

        let mut props = JsonMap::new();
        props.insert("functionName".to_string(), json!(physical_name));
        props.insert("runtime".to_string(), json!(self.runtime.id()));
        props.insert("handler".to_string(), json!(self.handler));
        props.insert("code".to_string(), json!(self.code.as_str()));
        props.insert(
            "role".to_string(),
            bindings.resolve_value(&Value::Ref(self.role.clone()), referrer)?,
        );
        props.insert("environment".to_string(), JsonValue::Object(env));
        Ok(props)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::Attr;

    fn role_ref() -> AttrRef {
        AttrRef::new(LogicalId::from("Role"), Attr::Arn)
    }

    #[test]
    fn test_duplicate_builder_env_key_rejected() {
        let func = Function::new(Runtime::NodeJs20, "index.handler", "./code", role_ref())
            .env("DB", "one")
            .env("DB", "two");
        let err = func.validate(&LogicalId::from("Fn")).unwrap_err();
        assert!(matches!(
            err,
            StackError::DuplicateEnvironmentKey { key, .. } if key == "DB"
        ));
    }

    #[test]
    fn test_post_registration_duplicate_rejected() {
        let id = LogicalId::from("Fn");
        let mut func = Function::new(Runtime::NodeJs20, "index.handler", "./code", role_ref());
        func.add_environment(&id, "DB".to_string(), Value::from("one"))
            .unwrap();
        let err = func
            .add_environment(&id, "DB".to_string(), Value::from("two"))
            .unwrap_err();
        assert!(matches!(err, StackError::DuplicateEnvironmentKey { .. }));
        assert_eq!(func.environment().len(), 1);
    }

    #[test]
    fn test_references_include_role_and_env_refs() {
        let table_ref = AttrRef::new(LogicalId::from("Table"), Attr::Arn);
        let func = Function::new(Runtime::Python312, "app.handler", "./code", role_ref())
            .env("TABLE", table_ref.clone())
            .env("STAGE", "prod");

        let refs: Vec<_> = func.references().collect();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0], &role_ref());
        assert_eq!(refs[1], &table_ref);
    }
}
