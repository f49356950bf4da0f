//! Stack: the top-level resource container and its state machine
//!
//! A stack owns every resource declared into it, in declaration order.
//! Registration returns a typed handle whose accessors produce attribute
//! references for wiring into later resources. The stack is OPEN while
//! being built and seals on the first successful `resolve()`; a failed
//! resolution leaves it OPEN so the declaration can be fixed and retried.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::attr::{Attr, AttrRef, LogicalId, Value};
use crate::catalog::HttpMethod;
use crate::emit::{self, EmitConfig};
use crate::error::{StackError, StackResult};
use crate::resolver;
use crate::resource::{Resource, ResourceSpec};
use crate::resources::{ApiRoute, Function, PolicyStatement, Role, Table};
use crate::template::ResolvedTemplate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StackState {
    Open,
    Sealed,
}

/// Handle to a registered table
#[derive(Debug, Clone, PartialEq)]
pub struct TableHandle {
    id: LogicalId,
}

impl TableHandle {
    pub fn logical_id(&self) -> &LogicalId {
        &self.id
    }

    /// Reference to the table's physical name
    pub fn name_ref(&self) -> AttrRef {
        AttrRef::new(self.id.clone(), Attr::Name)
    }

    /// Reference to the table's access-control resource name
    pub fn arn_ref(&self) -> AttrRef {
        AttrRef::new(self.id.clone(), Attr::Arn)
    }
}

/// Handle to a registered role
#[derive(Debug, Clone, PartialEq)]
pub struct RoleHandle {
    id: LogicalId,
}

impl RoleHandle {
    pub fn logical_id(&self) -> &LogicalId {
        &self.id
    }

    pub fn arn_ref(&self) -> AttrRef {
        AttrRef::new(self.id.clone(), Attr::Arn)
    }
}

/// Handle to a registered function
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionHandle {
    id: LogicalId,
}

impl FunctionHandle {
    pub fn logical_id(&self) -> &LogicalId {
        &self.id
    }

    pub fn name_ref(&self) -> AttrRef {
        AttrRef::new(self.id.clone(), Attr::Name)
    }

    pub fn arn_ref(&self) -> AttrRef {
        AttrRef::new(self.id.clone(), Attr::Arn)
    }
}

/// Handle to a registered route
#[derive(Debug, Clone, PartialEq)]
pub struct RouteHandle {
    id: LogicalId,
}

impl RouteHandle {
    pub fn logical_id(&self) -> &LogicalId {
        &self.id
    }
}

/// Top-level container for a declared topology
#[derive(Debug)]
pub struct Stack {
    name: String,
    config: EmitConfig,
    ids: HashSet<LogicalId>,
    resources: Vec<Resource>,
    routes: HashSet<(String, HttpMethod)>,
    state: StackState,
}

impl Stack {
    /// New stack using the process-wide emission config
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, emit::default_config().clone())
    }

    pub fn with_config(name: impl Into<String>, config: EmitConfig) -> Self {
        Self {
            name: name.into(),
            config,
            ids: HashSet::new(),
            resources: Vec::new(),
            routes: HashSet::new(),
            state: StackState::Open,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_sealed(&self) -> bool {
        self.state == StackState::Sealed
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Register a resource; declaration order is resolution tie-break order
    pub fn add_resource(&mut self, resource: Resource) -> StackResult<LogicalId> {
        self.ensure_open()?;

        let id = resource.logical_id().clone();
        if self.ids.contains(&id) {
            return Err(StackError::DuplicateLogicalId { id });
        }

        if let ResourceSpec::ApiRoute(route) = resource.spec() {
            let key = (route.path().to_string(), route.method());
            if !self.routes.insert(key) {
                return Err(StackError::DuplicateRoute {
                    path: route.path().to_string(),
                    method: route.method(),
                });
            }
        }

        debug!(stack = %self.name, resource = %resource.describe(), "registered");
        self.ids.insert(id.clone());
        self.resources.push(resource);
        Ok(id)
    }

    pub fn add_table(
        &mut self,
        id: impl Into<LogicalId>,
        table: Table,
    ) -> StackResult<TableHandle> {
        let id = id.into();
        table.validate(&id)?;
        let id = self.add_resource(Resource::new(id, ResourceSpec::Table(table)))?;
        Ok(TableHandle { id })
    }

    pub fn add_role(&mut self, id: impl Into<LogicalId>, role: Role) -> StackResult<RoleHandle> {
        let id = self.add_resource(Resource::new(id.into(), ResourceSpec::Role(role)))?;
        Ok(RoleHandle { id })
    }

    pub fn add_function(
        &mut self,
        id: impl Into<LogicalId>,
        function: Function,
    ) -> StackResult<FunctionHandle> {
        let id = id.into();
        function.validate(&id)?;
        let id = self.add_resource(Resource::new(id, ResourceSpec::Function(function)))?;
        Ok(FunctionHandle { id })
    }

    pub fn add_route(
        &mut self,
        id: impl Into<LogicalId>,
        route: ApiRoute,
    ) -> StackResult<RouteHandle> {
        let id = self.add_resource(Resource::new(id.into(), ResourceSpec::ApiRoute(route)))?;
        Ok(RouteHandle { id })
    }

    /// Append a permission statement to a registered role
    pub fn add_to_policy(
        &mut self,
        role: &RoleHandle,
        statement: PolicyStatement,
    ) -> StackResult<()> {
        self.ensure_open()?;
        statement.validate()?;
        match self.resource_mut(role.logical_id())?.spec_mut() {
            ResourceSpec::Role(r) => {
                r.push_statement(statement);
                Ok(())
            }
            // handles are minted by registration, so the variant matches
            // unless the handle came from another stack
            _ => Err(StackError::UnresolvedReference {
                referrer: role.logical_id().clone(),
                target: role.logical_id().clone(),
            }),
        }
    }

    /// Add an environment entry to a registered function
    pub fn add_environment(
        &mut self,
        function: &FunctionHandle,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> StackResult<()> {
        self.ensure_open()?;
        let id = function.logical_id().clone();
        match self.resource_mut(&id)?.spec_mut() {
            ResourceSpec::Function(f) => f.add_environment(&id, key.into(), value.into()),
            _ => Err(StackError::UnresolvedReference {
                referrer: id.clone(),
                target: id,
            }),
        }
    }

    /// Resolve the declared graph into a provisioning template
    ///
    /// Terminal on success: the stack seals and rejects further mutation.
    /// On failure the stack stays OPEN.
    pub fn resolve(&mut self) -> StackResult<ResolvedTemplate> {
        self.ensure_open()?;
        let template = resolver::resolve_stack(&self.name, &self.resources, &self.config)?;
        self.state = StackState::Sealed;
        info!(
            stack = %self.name,
            resources = template.len(),
            "stack resolved and sealed"
        );
        Ok(template)
    }

    fn ensure_open(&self) -> StackResult<()> {
        if self.is_sealed() {
            return Err(StackError::StackSealed {
                stack: self.name.clone(),
            });
        }
        Ok(())
    }

    fn resource_mut(&mut self, id: &LogicalId) -> StackResult<&mut Resource> {
        let referrer = id.clone();
        self.resources
            .iter_mut()
            .find(|r| r.logical_id() == id)
            .ok_or(StackError::UnresolvedReference {
                referrer,
                target: id.clone(),
            })
    }
}
