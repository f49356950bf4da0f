//! Provisioning engine boundary
//!
//! The engine is an external collaborator: it accepts a finished template
//! and reports, per resource, a provisioned handle or a structured failure.
//! The core propagates outcomes without interpreting them. `InMemoryEngine`
//! is the in-process implementation used for tests and dry runs.

use std::collections::HashMap;

use anyhow::Result;
use tracing::{info, warn};
use uuid::Uuid;

use crate::attr::LogicalId;
use crate::stack::Stack;
use crate::template::ResolvedTemplate;

/// Opaque identifier returned by an engine for one provisioned resource
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionedHandle {
    pub logical_id: LogicalId,
    pub provider_id: String,
}

/// Per-resource outcome of a provisioning run
#[derive(Debug, Clone, PartialEq)]
pub enum ProvisionOutcome {
    Provisioned(ProvisionedHandle),
    Failed { kind: String, message: String },
}

/// Outcomes for every resource in the template, in template order
#[derive(Debug, Clone, Default)]
pub struct ProvisionReport {
    pub outcomes: Vec<(LogicalId, ProvisionOutcome)>,
}

impl ProvisionReport {
    pub fn provisioned_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, ProvisionOutcome::Provisioned(_)))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.provisioned_count()
    }

    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = (&LogicalId, &str, &str)> {
        self.outcomes.iter().filter_map(|(id, o)| match o {
            ProvisionOutcome::Failed { kind, message } => {
                Some((id, kind.as_str(), message.as_str()))
            }
            ProvisionOutcome::Provisioned(_) => None,
        })
    }

    pub fn handle(&self, logical_id: &LogicalId) -> Option<&ProvisionedHandle> {
        self.outcomes.iter().find_map(|(id, o)| match o {
            ProvisionOutcome::Provisioned(h) if id == logical_id => Some(h),
            _ => None,
        })
    }
}

/// External collaborator that turns a template into provisioned resources
pub trait ProvisioningEngine {
    fn provision(&mut self, template: &ResolvedTemplate) -> Result<ProvisionReport>;
}

/// In-process engine: deterministic ordering, uuid-derived handles, and a
/// request log
///
/// Failures can be injected per logical id to exercise failure paths.
#[derive(Debug, Default)]
pub struct InMemoryEngine {
    requests: Vec<ResolvedTemplate>,
    injected_failures: HashMap<LogicalId, (String, String)>,
}

impl InMemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next run fail for `logical_id` with the given failure
    pub fn fail_on(
        &mut self,
        logical_id: impl Into<LogicalId>,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.injected_failures
            .insert(logical_id.into(), (kind.into(), message.into()));
    }

    /// Templates this engine has been asked to provision
    pub fn requests(&self) -> &[ResolvedTemplate] {
        &self.requests
    }
}

impl ProvisioningEngine for InMemoryEngine {
    fn provision(&mut self, template: &ResolvedTemplate) -> Result<ProvisionReport> {
        self.requests.push(template.clone());

        let mut report = ProvisionReport::default();
        for resource in &template.resources {
            let outcome = match self.injected_failures.get(&resource.logical_id) {
                Some((kind, message)) => ProvisionOutcome::Failed {
                    kind: kind.clone(),
                    message: message.clone(),
                },
                None => ProvisionOutcome::Provisioned(ProvisionedHandle {
                    logical_id: resource.logical_id.clone(),
                    provider_id: format!("{}/{}", resource.kind, Uuid::new_v4()),
                }),
            };
            report.outcomes.push((resource.logical_id.clone(), outcome));
        }
        Ok(report)
    }
}

/// Resolve a stack and hand the template to the engine, at most once
///
/// Any resolution error aborts before the engine is invoked. Per-resource
/// provisioning failures do not abort; they are reported and propagated to
/// the caller unchanged.
pub fn deploy<E: ProvisioningEngine>(
    stack: &mut Stack,
    engine: &mut E,
) -> Result<(ResolvedTemplate, ProvisionReport)> {
    let template = stack.resolve()?;
    info!(
        stack = %template.stack_name,
        resources = template.len(),
        "handing template to provisioning engine"
    );

    let report = engine.provision(&template)?;
    for (id, kind, message) in report.failures() {
        warn!(logical_id = %id, kind, message, "resource failed to provision");
    }
    info!(
        provisioned = report.provisioned_count(),
        failed = report.failed_count(),
        "provisioning run complete"
    );

    Ok((template, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::EmitConfig;
    use crate::resources::{KeyType, Table};

    fn single_table_stack() -> Stack {
        let mut stack = Stack::with_config("test", EmitConfig::default());
        stack
            .add_table("Table", Table::new().partition_key("isbn", KeyType::Text))
            .unwrap();
        stack
    }

    #[test]
    fn test_in_memory_engine_provisions_everything() {
        let mut stack = single_table_stack();
        let mut engine = InMemoryEngine::new();
        let (template, report) = deploy(&mut stack, &mut engine).unwrap();

        assert!(report.is_success());
        assert_eq!(report.provisioned_count(), 1);
        assert_eq!(engine.requests().len(), 1);
        assert_eq!(engine.requests()[0], template);

        let handle = report.handle(&LogicalId::from("Table")).unwrap();
        assert!(handle.provider_id.starts_with("table/"));
    }

    #[test]
    fn test_injected_failure_is_propagated_not_interpreted() {
        let mut stack = single_table_stack();
        let mut engine = InMemoryEngine::new();
        engine.fail_on("Table", "LimitExceeded", "table quota reached");

        let (_, report) = deploy(&mut stack, &mut engine).unwrap();
        assert!(!report.is_success());

        let failures: Vec<_> = report.failures().collect();
        assert_eq!(
            failures,
            vec![(
                &LogicalId::from("Table"),
                "LimitExceeded",
                "table quota reached"
            )]
        );
    }

    #[test]
    fn test_deploy_aborts_on_resolution_error() {
        let mut stack = single_table_stack();
        // seal it so deploy's resolve fails
        stack.resolve().unwrap();

        let mut engine = InMemoryEngine::new();
        assert!(deploy(&mut stack, &mut engine).is_err());
        assert!(engine.requests().is_empty());
    }
}
