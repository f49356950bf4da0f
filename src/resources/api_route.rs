//! HTTP-facing gateway route declaration
//!
//! A route binds an HTTP method and a path to a target function. The
//! `(path, method)` pair must be unique within a stack; that check lives in
//! the stack, which owns all routes.

use serde_json::{json, Map as JsonMap, Value as JsonValue};

use crate::attr::{AttrRef, LogicalId, Value};
use crate::catalog::HttpMethod;
use crate::error::StackResult;
use crate::resolver::Bindings;

/// Declaration of an HTTP-exposed path bound to a function
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRoute {
    method: HttpMethod,
    path: String,
    handler: AttrRef,
}

impl ApiRoute {
    pub fn new(method: HttpMethod, path: impl Into<String>, handler: AttrRef) -> Self {
        Self {
            method,
            path: normalize_path(&path.into()),
            handler,
        }
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn references(&self) -> impl Iterator<Item = &AttrRef> {
        std::iter::once(&self.handler)
    }

    pub(crate) fn resolved_properties(
        &self,
        bindings: &Bindings,
        referrer: &LogicalId,
    ) -> StackResult<JsonMap<String, JsonValue>> {
        let mut props = JsonMap::new();
        props.insert("method".to_string(), json!(self.method.as_str()));
        props.insert("path".to_string(), json!(self.path));
        props.insert(
            "handler".to_string(),
            bindings.resolve_value(&Value::Ref(self.handler.clone()), referrer)?,
        );
        Ok(props)
    }
}

/// Single leading slash, no trailing slash except for the root path
fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::Attr;

    fn handler_ref() -> AttrRef {
        AttrRef::new(LogicalId::from("ApiFunction"), Attr::Arn)
    }

    #[test]
    fn test_path_normalization() {
        let route = ApiRoute::new(HttpMethod::Get, "books", handler_ref());
        assert_eq!(route.path(), "/books");

        let route = ApiRoute::new(HttpMethod::Get, "/books/", handler_ref());
        assert_eq!(route.path(), "/books");

        let route = ApiRoute::new(HttpMethod::Get, "/", handler_ref());
        assert_eq!(route.path(), "/");
    }

    #[test]
    fn test_route_references_handler() {
        let route = ApiRoute::new(HttpMethod::Post, "/books", handler_ref());
        let refs: Vec<_> = route.references().collect();
        assert_eq!(refs, vec![&handler_ref()]);
    }
}
