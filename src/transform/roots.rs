//! Root Operation Inferencer
//!
//! A class is a root when nothing contains it: it is not contained, is not a
//! supertype of a contained class, and has no contained supertype. Abstract
//! candidates are kept only if a concrete candidate specializes them. Each
//! root becomes an `all<Plural>` field on `Query`.

use std::collections::HashSet;

use super::names::all_query_field;
use super::registrar::Registry;
use crate::graph::{case_insensitive_order, ClassGraph};
use crate::metamodel::ClassifierId;
use crate::schema::{FieldDef, TypeRef};

/// Root candidates, case-insensitively sorted by name
pub fn candidates(graph: &ClassGraph, contained: &HashSet<ClassifierId>) -> Vec<ClassifierId> {
    let mut result: Vec<ClassifierId> = graph
        .classes()
        .iter()
        .filter(|c| !contained.contains(*c))
        .filter(|c| !contained.iter().any(|x| graph.is_supertype_of(c, x)))
        .filter(|c| !graph.ancestors(c).iter().any(|a| contained.contains(a)))
        .cloned()
        .collect();
    result.sort_by(|a, b| {
        case_insensitive_order(&a.name, &b.name).then_with(|| a.package.cmp(&b.package))
    });
    result
}

/// Keep concrete candidates, and abstract ones with a concrete candidate below them
pub fn select_roots(graph: &ClassGraph, candidates: &[ClassifierId]) -> Vec<ClassifierId> {
    candidates
        .iter()
        .filter(|c| {
            !graph.is_abstract(c)
                || candidates
                    .iter()
                    .any(|d| !graph.is_abstract(d) && graph.is_supertype_of(c, d))
        })
        .cloned()
        .collect()
}

/// `Query` fields for every root
pub fn root_fields(registry: &Registry<'_>, contained: &HashSet<ClassifierId>) -> Vec<FieldDef> {
    let graph = registry.graph();
    let roots = select_roots(graph, &candidates(graph, contained));

    tracing::debug!(
        roots = ?roots.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
        "root classes inferred"
    );

    roots
        .iter()
        .map(|r| FieldDef::new(all_query_field(&r.name), TypeRef::list(TypeRef::named(r.name.as_str()))))
        .collect()
}
