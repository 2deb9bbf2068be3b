//! Schema Assembler
//!
//! Collects shells, flattened fields, synthesized wrapper/enum types and the
//! root/mutation fields into one [`Schema`]. A synthesized type name that
//! clashes with a metamodel type is reported here.

use std::collections::HashMap;

use super::collections::CollectionTypes;
use super::flatten::FlatTypes;
use super::mapper::MemberTable;
use super::mutations::MutationTypes;
use super::names::{MUTATION, QUERY};
use super::registrar::{Registry, ShellKind};
use crate::graph::{DiagnosticCode, Diagnostics};
use crate::schema::{EnumType, FieldDef, InterfaceType, ObjectType, ScalarType, Schema};

/// Stage outputs the assembler consumes
pub struct Parts<'p> {
    pub table: &'p MemberTable,
    pub flat: &'p FlatTypes,
    pub collections: CollectionTypes,
    pub roots: Vec<FieldDef>,
    pub mutations: MutationTypes,
}

pub fn assemble(registry: &Registry<'_>, parts: Parts<'_>, diagnostics: &mut Diagnostics) -> Schema {
    let mut scalars = Vec::new();
    let mut enums = Vec::new();
    let mut interfaces = Vec::new();
    let mut objects = Vec::new();

    for shell in registry.shells() {
        let name = shell.name().to_string();
        let description = shell.description.clone();
        match &shell.kind {
            ShellKind::Scalar(coercion) => scalars.push(ScalarType {
                name,
                coercion: *coercion,
                description,
            }),
            ShellKind::Enum => enums.push(EnumType {
                name,
                values: parts.table.enum_values(&shell.id).to_vec(),
                description,
            }),
            ShellKind::Interface => interfaces.push(InterfaceType {
                name,
                fields: parts.flat.fields(&shell.id).to_vec(),
                description,
            }),
            ShellKind::Object { implements } => objects.push(ObjectType {
                name,
                implements: implements.clone(),
                fields: parts.flat.fields(&shell.id).to_vec(),
                description,
            }),
        }
    }

    let mut subtype_enums = parts.collections.subtype_enums;
    subtype_enums.extend(parts.mutations.subtype_enums);

    let mut query = ObjectType::new(QUERY);
    query.fields = parts.roots;

    let mutation = if parts.mutations.fields.is_empty() {
        None
    } else {
        let mut mutation = ObjectType::new(MUTATION);
        mutation.fields = parts.mutations.fields;
        Some(mutation)
    };

    let schema = Schema {
        scalars,
        enums,
        interfaces,
        objects,
        wrappers: parts.collections.wrappers,
        page_info: parts.collections.page_info,
        subtype_enums,
        query,
        mutation,
    };

    report_type_clashes(&schema, diagnostics);

    tracing::debug!(
        types = schema.type_names().len(),
        roots = schema.query.fields.len(),
        mutations = schema.mutation.as_ref().map(|m| m.fields.len()).unwrap_or(0),
        "schema assembled"
    );

    schema
}

/// Every named type must be unique across metamodel and synthesized types
fn report_type_clashes(schema: &Schema, diagnostics: &mut Diagnostics) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let names = schema.type_names();
    for name in &names {
        *counts.entry(*name).or_insert(0) += 1;
    }

    let mut reported: Vec<&str> = Vec::new();
    for name in names {
        if counts.get(name).copied().unwrap_or(0) > 1 && !reported.contains(&name) {
            reported.push(name);
            diagnostics.report(
                name,
                DiagnosticCode::ReservedTypeName,
                format!("type name '{}' clashes with a generated type", name),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EnumValue, TypeRef};

    fn schema_with(objects: Vec<ObjectType>, subtype_enums: Vec<EnumType>) -> Schema {
        Schema {
            scalars: Vec::new(),
            enums: Vec::new(),
            interfaces: Vec::new(),
            objects,
            wrappers: Vec::new(),
            page_info: None,
            subtype_enums,
            query: ObjectType::new(QUERY),
            mutation: None,
        }
    }

    #[test]
    fn test_clash_with_generated_name() {
        let mut clash = ObjectType::new("AllSubtypesOfItem");
        clash.fields = vec![FieldDef::new("x", TypeRef::named("Int"))];
        let generated = EnumType {
            name: "AllSubtypesOfItem".to_string(),
            values: vec![EnumValue { name: "Item".into(), value: "Item".into() }],
            description: None,
        };

        let mut diags = Diagnostics::new();
        report_type_clashes(&schema_with(vec![clash], vec![generated]), &mut diags);
        assert_eq!(diags.with_code(DiagnosticCode::ReservedTypeName).count(), 1);
    }

    #[test]
    fn test_no_clash() {
        let mut diags = Diagnostics::new();
        report_type_clashes(&schema_with(vec![ObjectType::new("Folder")], Vec::new()), &mut diags);
        assert!(diags.is_empty());
    }
}
