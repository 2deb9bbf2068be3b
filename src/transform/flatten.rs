//! Inheritance Flattener
//!
//! Every interface and object carries the union of its own fields and the
//! fields of all transitive supertypes. Own fields come first and win a name
//! collision; inherited fields follow in ancestor order, first seen wins.

use std::collections::{HashMap, HashSet};

use super::mapper::MemberTable;
use super::registrar::Registry;
use crate::error::{Result, TransformError};
use crate::metamodel::ClassifierId;
use crate::schema::FieldDef;

/// Flattened field lists, one per registered class
#[derive(Debug, Clone, Default)]
pub struct FlatTypes {
    fields: HashMap<ClassifierId, Vec<FieldDef>>,
}

impl FlatTypes {
    pub fn fields(&self, class: &ClassifierId) -> &[FieldDef] {
        self.fields.get(class).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_field(&self, class: &ClassifierId, name: &str) -> bool {
        self.fields(class).iter().any(|f| f.name == name)
    }
}

pub fn flatten(registry: &Registry<'_>, table: &MemberTable) -> Result<FlatTypes> {
    let graph = registry.graph();
    let mut flat = FlatTypes::default();

    for (shell, _) in registry.classes() {
        let own = table.members(&shell.id).ok_or_else(|| {
            TransformError::invariant(shell.id.to_string(), "class has no member bookkeeping")
        })?;

        let mut fields: Vec<FieldDef> = own.fields.clone();
        let mut seen: HashSet<String> = fields.iter().map(|f| f.name.clone()).collect();

        for ancestor in graph.ancestors(&shell.id) {
            let inherited = table.members(ancestor).ok_or_else(|| {
                TransformError::invariant(ancestor.to_string(), "supertype has no member bookkeeping")
            })?;
            for field in &inherited.fields {
                if seen.insert(field.name.clone()) {
                    fields.push(field.clone());
                }
            }
        }

        tracing::debug!(
            class = %shell.id,
            own = own.fields.len(),
            total = fields.len(),
            "flattened"
        );
        flat.fields.insert(shell.id.clone(), fields);
    }

    Ok(flat)
}
