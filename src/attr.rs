//! Logical ids, attribute references, and property values
//!
//! An [`AttrRef`] is a symbolic handle to an attribute of a resource that
//! has not been provisioned yet. Embedding one in another resource's
//! configuration is what creates a dependency edge; the concrete value is
//! substituted only during resolution, when the target is guaranteed to
//! have been emitted already.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable, caller-assigned identifier for a resource within one stack
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalId(String);

impl LogicalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LogicalId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for LogicalId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Emittable attributes of a declared resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attr {
    /// The concrete physical name of the resource
    Name,
    /// The access-control resource name (ARN-shaped identifier)
    Arn,
}

impl fmt::Display for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attr::Name => write!(f, "name"),
            Attr::Arn => write!(f, "arn"),
        }
    }
}

/// Symbolic reference to an attribute of another declared resource
///
/// Never owns the target. Resolved at emission time against the values the
/// target produced earlier in the topological order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttrRef {
    target: LogicalId,
    attr: Attr,
}

impl AttrRef {
    pub fn new(target: LogicalId, attr: Attr) -> Self {
        Self { target, attr }
    }

    pub fn target(&self) -> &LogicalId {
        &self.target
    }

    pub fn attr(&self) -> Attr {
        self.attr
    }
}

impl fmt::Display for AttrRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${{{}.{}}}", self.target, self.attr)
    }
}

/// A configuration property value: a literal, or a reference resolved later
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Str(String),
    Int(i64),
    Bool(bool),
    Ref(AttrRef),
}

impl Value {
    /// The reference inside this value, if it is one
    pub fn as_ref_value(&self) -> Option<&AttrRef> {
        match self {
            Value::Ref(r) => Some(r),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<AttrRef> for Value {
    fn from(r: AttrRef) -> Self {
        Value::Ref(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_ref_display() {
        let r = AttrRef::new(LogicalId::from("Table"), Attr::Arn);
        assert_eq!(r.to_string(), "${Table.arn}");
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(Value::from("x"), Value::Str("x".to_string()));
        assert_eq!(Value::from(5), Value::Int(5));

        let r = AttrRef::new(LogicalId::from("Table"), Attr::Name);
        let v = Value::from(r.clone());
        assert_eq!(v.as_ref_value(), Some(&r));
        assert_eq!(Value::from("x").as_ref_value(), None);
    }
}
