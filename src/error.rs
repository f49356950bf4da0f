//! Error handling for stack construction and resolution
//!
//! All variants are construction/resolution-time validation failures. None
//! are retryable: each one indicates a programmer error in the declared
//! topology and is surfaced immediately, with no partial resolution.

use thiserror::Error;

use crate::attr::LogicalId;
use crate::catalog::HttpMethod;

/// Main error type for stack construction and resolution
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StackError {
    #[error("duplicate logical id '{id}'")]
    DuplicateLogicalId { id: LogicalId },

    #[error("dependency cycle between resources: {}", ids.iter().map(LogicalId::as_str).collect::<Vec<_>>().join(" -> "))]
    CyclicDependency { ids: Vec<LogicalId> },

    #[error("resource '{referrer}' references '{target}', which was never added to the stack")]
    UnresolvedReference {
        referrer: LogicalId,
        target: LogicalId,
    },

    #[error("stack '{stack}' is sealed; no further mutation is permitted")]
    StackSealed { stack: String },

    #[error("invalid table schema for '{id}': {reason}")]
    InvalidTableSchema { id: LogicalId, reason: String },

    #[error("invalid policy statement: {reason}")]
    InvalidPolicyStatement { reason: String },

    #[error("duplicate environment key '{key}' on function '{id}'")]
    DuplicateEnvironmentKey { id: LogicalId, key: String },

    #[error("duplicate route {method} {path}")]
    DuplicateRoute { path: String, method: HttpMethod },
}

/// Result type alias for stack operations
pub type StackResult<T> = Result<T, StackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StackError::DuplicateLogicalId {
            id: LogicalId::from("Table"),
        };
        assert_eq!(err.to_string(), "duplicate logical id 'Table'");

        let err = StackError::CyclicDependency {
            ids: vec![LogicalId::from("A"), LogicalId::from("B")],
        };
        assert_eq!(err.to_string(), "dependency cycle between resources: A -> B");
    }

    #[test]
    fn test_duplicate_route_display() {
        let err = StackError::DuplicateRoute {
            path: "/books".to_string(),
            method: HttpMethod::Get,
        };
        assert_eq!(err.to_string(), "duplicate route GET /books");
    }
}
