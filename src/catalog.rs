//! Closed catalogs of supported runtimes and HTTP methods
//!
//! Both sets are closed at the type level: an unsupported runtime or method
//! is unrepresentable, so no runtime validation path exists for them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Supported function runtimes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Runtime {
    NodeJs18,
    NodeJs20,
    Python311,
    Python312,
}

impl Runtime {
    /// Wire identifier used in emitted templates
    pub fn id(&self) -> &'static str {
        match self {
            Runtime::NodeJs18 => "nodejs18.x",
            Runtime::NodeJs20 => "nodejs20.x",
            Runtime::Python311 => "python3.11",
            Runtime::Python312 => "python3.12",
        }
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// HTTP methods routable through the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_ids() {
        assert_eq!(Runtime::NodeJs20.id(), "nodejs20.x");
        assert_eq!(Runtime::Python311.to_string(), "python3.11");
    }

    #[test]
    fn test_method_strings() {
        assert_eq!(HttpMethod::Get.as_str(), "GET");
        assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
    }
}
