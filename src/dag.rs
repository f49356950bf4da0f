//! Topological ordering of the resource graph
//!
//! Kahn's algorithm with a stable sort: when several resources are ready at
//! once, the one declared earliest is picked first, so resolution order is
//! deterministic and follows declaration order wherever the graph allows.

use std::collections::{BinaryHeap, HashMap};

use tracing::debug;

use crate::error::{StackError, StackResult};
use crate::resource::Resource;

/// Wrapper for BinaryHeap to get min-heap behavior keyed by declaration index
#[derive(Debug, Eq, PartialEq)]
struct MinHeapEntry {
    decl_index: usize,
}

impl Ord for MinHeapEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reverse ordering for min-heap
        other.decl_index.cmp(&self.decl_index)
    }
}

impl PartialOrd for MinHeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Compute a topological order over `resources`, returned as indices into
/// the input slice
///
/// Every reference target must be a declared resource; a reference to an id
/// never added fails with `UnresolvedReference`. If no valid order exists
/// the resources still waiting on each other are reported in declaration
/// order via `CyclicDependency`.
pub(crate) fn topo_order(resources: &[Resource]) -> StackResult<Vec<usize>> {
    let n = resources.len();
    if n == 0 {
        return Ok(Vec::new());
    }

    // Map of what each resource produces
    let produces: HashMap<_, usize> = resources
        .iter()
        .enumerate()
        .map(|(idx, r)| (r.logical_id(), idx))
        .collect();

    // Adjacency list and in-degrees; adj[i] holds the resources that
    // depend on resource i
    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut in_degree: Vec<usize> = vec![0; n];

    for (idx, resource) in resources.iter().enumerate() {
        for target in resource.dependencies() {
            let Some(&dep_idx) = produces.get(target) else {
                return Err(StackError::UnresolvedReference {
                    referrer: resource.logical_id().clone(),
                    target: target.clone(),
                });
            };
            adj[dep_idx].push(idx);
            in_degree[idx] += 1;
        }
    }

    let mut heap: BinaryHeap<MinHeapEntry> = BinaryHeap::new();
    for (idx, &degree) in in_degree.iter().enumerate() {
        if degree == 0 {
            heap.push(MinHeapEntry { decl_index: idx });
        }
    }

    let mut sorted: Vec<usize> = Vec::with_capacity(n);
    while let Some(entry) = heap.pop() {
        let idx = entry.decl_index;
        sorted.push(idx);

        for &next_idx in &adj[idx] {
            in_degree[next_idx] -= 1;
            if in_degree[next_idx] == 0 {
                heap.push(MinHeapEntry {
                    decl_index: next_idx,
                });
            }
        }
    }

    if sorted.len() != n {
        let remaining: Vec<_> = resources
            .iter()
            .enumerate()
            .filter(|(idx, _)| !sorted.contains(idx))
            .map(|(_, r)| r.logical_id().clone())
            .collect();
        return Err(StackError::CyclicDependency { ids: remaining });
    }

    debug!(resources = n, "topological order computed");
    Ok(sorted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::{Attr, AttrRef, LogicalId};
    use crate::catalog::Runtime;
    use crate::resource::ResourceSpec;
    use crate::resources::{Function, KeyType, PolicyStatement, Role, Table};

    fn table(id: &str) -> Resource {
        Resource::new(
            id,
            ResourceSpec::Table(Table::new().partition_key("pk", KeyType::Text)),
        )
    }

    fn role_with_ref(id: &str, target: &str) -> Resource {
        let mut role = Role::assumed_by("compute-service");
        role.push_statement(
            PolicyStatement::new()
                .action("datastore:*")
                .resource(AttrRef::new(LogicalId::from(target), Attr::Arn)),
        );
        Resource::new(id, ResourceSpec::Role(role))
    }

    fn function(id: &str, role: &str) -> Resource {
        Resource::new(
            id,
            ResourceSpec::Function(Function::new(
                Runtime::NodeJs20,
                "index.handler",
                "./code",
                AttrRef::new(LogicalId::from(role), Attr::Arn),
            )),
        )
    }

    #[test]
    fn test_empty_graph() {
        assert!(topo_order(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_reordering_by_dependency() {
        // Declared in the wrong order: the role references a table that is
        // declared after it
        let resources = vec![role_with_ref("Role", "Table"), table("Table")];
        let order = topo_order(&resources).unwrap();
        assert_eq!(order, vec![1, 0]);
    }

    #[test]
    fn test_stable_sort_preserves_declaration_order() {
        let resources = vec![table("A"), table("B"), table("C")];
        let order = topo_order(&resources).unwrap();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_independent_resources_interleave_by_declaration() {
        // B depends on A; C is independent and declared between them
        let resources = vec![table("A"), role_with_ref("B", "A"), table("C")];
        let order = topo_order(&resources).unwrap();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_cycle_detected() {
        // Role policy references the function, function assumes the role
        let resources = vec![role_with_ref("Role", "Fn"), function("Fn", "Role")];
        let err = topo_order(&resources).unwrap_err();
        match err {
            StackError::CyclicDependency { ids } => {
                assert_eq!(ids, vec![LogicalId::from("Role"), LogicalId::from("Fn")]);
            }
            other => panic!("expected CyclicDependency, got {other:?}"),
        }
    }

    #[test]
    fn test_unresolved_reference_detected() {
        let resources = vec![role_with_ref("Role", "Ghost")];
        let err = topo_order(&resources).unwrap_err();
        match err {
            StackError::UnresolvedReference { referrer, target } => {
                assert_eq!(referrer, LogicalId::from("Role"));
                assert_eq!(target, LogicalId::from("Ghost"));
            }
            other => panic!("expected UnresolvedReference, got {other:?}"),
        }
    }
}
