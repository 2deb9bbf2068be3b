//! Class Inheritance Graph
//!
//! petgraph DiGraph over registered classes (edges point sub → super) with
//! HashMap indexes for the queries the transform stages need: ordered
//! transitive supertypes, transitive subclasses, abstractness.
//!
//! Built once by the registrar, read-only afterwards.

pub mod diagnostics;

pub use diagnostics::{DiagnosticCode, DiagnosticItem, Diagnostics, Severity};

use petgraph::algo::{kosaraju_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::metamodel::ClassifierId;

/// Case-insensitive name order with an exact-match tie-break
pub fn case_insensitive_order(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn id_order(a: &ClassifierId, b: &ClassifierId) -> Ordering {
    case_insensitive_order(&a.name, &b.name).then_with(|| a.package.cmp(&b.package))
}

// =============================================================================
// Builder
// =============================================================================

/// Accumulates classes and supertype edges during registration
#[derive(Debug, Default)]
pub struct ClassGraphBuilder {
    graph: DiGraph<ClassifierId, ()>,
    node_indices: HashMap<ClassifierId, NodeIndex>,
    is_abstract: HashMap<ClassifierId, bool>,
    direct: HashMap<ClassifierId, Vec<ClassifierId>>,
    order: Vec<ClassifierId>,
}

impl ClassGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a class node; returns false if it was already present
    pub fn add_class(&mut self, id: ClassifierId, is_abstract: bool) -> bool {
        if self.node_indices.contains_key(&id) {
            return false;
        }
        let idx = self.graph.add_node(id.clone());
        self.node_indices.insert(id.clone(), idx);
        self.is_abstract.insert(id.clone(), is_abstract);
        self.direct.insert(id.clone(), Vec::new());
        self.order.push(id);
        true
    }

    pub fn contains(&self, id: &ClassifierId) -> bool {
        self.node_indices.contains_key(id)
    }

    /// Add a direct supertype edge; both ends must already be classes
    pub fn add_supertype(&mut self, sub: &ClassifierId, sup: &ClassifierId) -> bool {
        let (Some(&s), Some(&p)) = (self.node_indices.get(sub), self.node_indices.get(sup)) else {
            return false;
        };
        let direct = self.direct.entry(sub.clone()).or_default();
        if direct.contains(sup) {
            return true;
        }
        direct.push(sup.clone());
        self.graph.add_edge(s, p, ());
        true
    }

    /// Freeze the graph, computing transitive indexes.
    ///
    /// Returns the members of every inheritance cycle as the error.
    pub fn build(self) -> Result<ClassGraph, Vec<Vec<ClassifierId>>> {
        let topo = match toposort(&self.graph, None) {
            Ok(order) => order,
            Err(_) => {
                let cycles = kosaraju_scc(&self.graph)
                    .into_iter()
                    .filter(|scc| {
                        scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0])
                    })
                    .map(|scc| {
                        let mut members: Vec<ClassifierId> =
                            scc.into_iter().map(|i| self.graph[i].clone()).collect();
                        members.sort_by(id_order);
                        members
                    })
                    .collect();
                return Err(cycles);
            }
        };

        // Sub comes before super in `topo`; walk it backwards so every
        // supertype's ancestor list exists before its subclasses need it.
        let mut ancestors: HashMap<ClassifierId, Vec<ClassifierId>> =
            HashMap::with_capacity(self.order.len());
        for idx in topo.iter().rev() {
            let id = &self.graph[*idx];
            let mut list: Vec<ClassifierId> = Vec::new();
            for sup in self.direct.get(id).map(Vec::as_slice).unwrap_or(&[]) {
                for a in ancestors.get(sup).map(Vec::as_slice).unwrap_or(&[]) {
                    if !list.contains(a) {
                        list.push(a.clone());
                    }
                }
                if !list.contains(sup) {
                    list.push(sup.clone());
                }
            }
            ancestors.insert(id.clone(), list);
        }

        let mut subclasses: HashMap<ClassifierId, Vec<ClassifierId>> = HashMap::new();
        for id in &self.order {
            for sup in ancestors.get(id).map(Vec::as_slice).unwrap_or(&[]) {
                subclasses.entry(sup.clone()).or_default().push(id.clone());
            }
        }
        for subs in subclasses.values_mut() {
            subs.sort_by(id_order);
        }

        Ok(ClassGraph {
            graph: self.graph,
            node_indices: self.node_indices,
            is_abstract: self.is_abstract,
            order: self.order,
            ancestors,
            subclasses,
        })
    }
}

// =============================================================================
// ClassGraph
// =============================================================================

/// Immutable inheritance graph over registered classes
#[derive(Debug, Clone)]
pub struct ClassGraph {
    graph: DiGraph<ClassifierId, ()>,
    node_indices: HashMap<ClassifierId, NodeIndex>,
    is_abstract: HashMap<ClassifierId, bool>,
    /// Registration order
    order: Vec<ClassifierId>,
    /// Transitive supertypes, root-most first, declaration order otherwise
    ancestors: HashMap<ClassifierId, Vec<ClassifierId>>,
    /// Transitive subclasses, case-insensitively sorted by name
    subclasses: HashMap<ClassifierId, Vec<ClassifierId>>,
}

impl ClassGraph {
    pub fn class_count(&self) -> usize {
        self.order.len()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, id: &ClassifierId) -> bool {
        self.node_indices.contains_key(id)
    }

    /// All classes in registration order
    pub fn classes(&self) -> &[ClassifierId] {
        &self.order
    }

    pub fn is_abstract(&self, id: &ClassifierId) -> bool {
        self.is_abstract.get(id).copied().unwrap_or(false)
    }

    /// Transitive supertypes, root-most first
    pub fn ancestors(&self, id: &ClassifierId) -> &[ClassifierId] {
        self.ancestors.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Transitive subclasses (excluding `id` itself)
    pub fn subclasses(&self, id: &ClassifierId) -> &[ClassifierId] {
        self.subclasses.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_subclasses(&self, id: &ClassifierId) -> bool {
        !self.subclasses(id).is_empty()
    }

    /// Whether `sup` is a transitive supertype of `sub`
    pub fn is_supertype_of(&self, sup: &ClassifierId, sub: &ClassifierId) -> bool {
        self.ancestors(sub).contains(sup)
    }

    /// Concrete transitive subclasses, plus `id` itself when concrete
    pub fn concrete_specializations(&self, id: &ClassifierId) -> Vec<ClassifierId> {
        let mut result: Vec<ClassifierId> = self
            .subclasses(id)
            .iter()
            .filter(|c| !self.is_abstract(c))
            .cloned()
            .collect();
        if self.contains(id) && !self.is_abstract(id) {
            result.push(id.clone());
        }
        result.sort_by(id_order);
        result
    }

    /// Abstract transitive supertypes, in ancestor order
    pub fn abstract_ancestors(&self, id: &ClassifierId) -> impl Iterator<Item = &ClassifierId> {
        self.ancestors(id).iter().filter(|a| self.is_abstract(a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> ClassifierId {
        ClassifierId::new("p", name)
    }

    fn diamond() -> ClassGraph {
        let mut b = ClassGraphBuilder::new();
        b.add_class(id("Element"), true);
        b.add_class(id("Named"), true);
        b.add_class(id("Typed"), true);
        b.add_class(id("attribute"), false);
        b.add_class(id("Class"), false);
        b.add_supertype(&id("Named"), &id("Element"));
        b.add_supertype(&id("Typed"), &id("Element"));
        b.add_supertype(&id("attribute"), &id("Named"));
        b.add_supertype(&id("attribute"), &id("Typed"));
        b.add_supertype(&id("Class"), &id("Named"));
        b.build().unwrap()
    }

    #[test]
    fn test_ancestors_root_most_first() {
        let g = diamond();
        assert_eq!(
            g.ancestors(&id("attribute")),
            &[id("Element"), id("Named"), id("Typed")]
        );
        assert!(g.ancestors(&id("Element")).is_empty());
        assert!(g.is_supertype_of(&id("Element"), &id("Class")));
        assert!(!g.is_supertype_of(&id("Typed"), &id("Class")));
    }

    #[test]
    fn test_subclasses_sorted_case_insensitive() {
        let g = diamond();
        assert_eq!(
            g.subclasses(&id("Element")),
            &[id("attribute"), id("Class"), id("Named"), id("Typed")]
        );
        assert_eq!(
            g.concrete_specializations(&id("Named")),
            vec![id("attribute"), id("Class")]
        );
        assert_eq!(g.concrete_specializations(&id("Class")), vec![id("Class")]);
    }

    #[test]
    fn test_cycle_detected() {
        let mut b = ClassGraphBuilder::new();
        b.add_class(id("A"), false);
        b.add_class(id("B"), false);
        b.add_class(id("C"), false);
        b.add_supertype(&id("A"), &id("B"));
        b.add_supertype(&id("B"), &id("A"));
        b.add_supertype(&id("C"), &id("A"));

        let cycles = b.build().unwrap_err();
        assert_eq!(cycles, vec![vec![id("A"), id("B")]]);
    }
}
