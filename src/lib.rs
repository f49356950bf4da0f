//! stackplan: declarative cloud stack graph and provisioning planner
//!
//! Declares a cloud application topology as typed resources with symbolic
//! attribute references, resolves the dependency graph, and emits a
//! dependency-ordered, reference-free provisioning template.
//!
//! ## Pipeline
//!
//! ```text
//! builder API → Stack (OPEN) → toposort → attribute resolution → ResolvedTemplate → ProvisioningEngine
//!                                  ↓
//!                          declaration order
//!                          breaks ties
//! ```
//!
//! ## Key modules
//!
//! - `attr`: logical ids, attribute references, property values
//! - `resource`: the closed set of resource kinds and derived dependencies
//! - `resources`: typed variants (table, role, function, api route)
//! - `stack`: ownership, uniqueness, the OPEN -> SEALED state machine
//! - `dag`: stable topological sort with cycle detection
//! - `resolver`: reference substitution in topological order
//! - `engine`: the provisioning collaborator boundary
//!
//! ## Example
//!
//! ```
//! use stackplan::{
//!     ApiRoute, EmitConfig, Function, HttpMethod, KeyType, PolicyStatement, Role, Runtime,
//!     Stack, Table,
//! };
//!
//! # fn main() -> stackplan::StackResult<()> {
//! let mut stack = Stack::with_config("bookstore", EmitConfig::default());
//!
//! let table = stack.add_table(
//!     "Table",
//!     Table::new()
//!         .table_name("MyBookTable")
//!         .partition_key("isbn", KeyType::Text)
//!         .sort_key("title", KeyType::Text),
//! )?;
//!
//! let role = stack.add_role("LambdaExecutionRole", Role::assumed_by("compute-service"))?;
//! stack.add_to_policy(
//!     &role,
//!     PolicyStatement::new()
//!         .action("datastore:*")
//!         .resource(table.arn_ref()),
//! )?;
//!
//! let api = stack.add_function(
//!     "ApiFunction",
//!     Function::new(Runtime::NodeJs20, "index.handler", "./fn/api", role.arn_ref()),
//! )?;
//! stack.add_environment(&api, "DYNAMODB", table.arn_ref())?;
//!
//! stack.add_route("GetBooks", ApiRoute::new(HttpMethod::Get, "/books", api.arn_ref()))?;
//!
//! let template = stack.resolve()?;
//! assert_eq!(template.len(), 4);
//! # Ok(())
//! # }
//! ```

pub mod attr;
pub mod catalog;
pub mod dag;
pub mod emit;
pub mod engine;
pub mod error;
pub mod resolver;
pub mod resource;
pub mod resources;
pub mod stack;
pub mod template;

// Re-export the public surface at the crate root
pub use attr::{Attr, AttrRef, LogicalId, Value};
pub use catalog::{HttpMethod, Runtime};
pub use emit::EmitConfig;
pub use engine::{
    deploy, InMemoryEngine, ProvisionOutcome, ProvisionReport, ProvisionedHandle,
    ProvisioningEngine,
};
pub use error::{StackError, StackResult};
pub use resource::{Resource, ResourceKind, ResourceSpec};
pub use resources::{ApiRoute, CodeLocation, Function, KeySchema, KeyType, PolicyStatement, Role, Table};
pub use stack::{FunctionHandle, RoleHandle, RouteHandle, Stack, TableHandle};
pub use template::{ResolvedResource, ResolvedTemplate};
