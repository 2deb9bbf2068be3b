//! Mutation Synthesizer
//!
//! For every class that owns containment references and has an identifier
//! (own or inherited), each containment reference yields a creation mutation
//! `<reference>Of<Class>By<Id>(<id>: String, <target>: AllConcreteSubtypesOf<T>): String`
//! returning the new instance's identifier.

use std::collections::HashSet;

use super::mapper::MemberTable;
use super::names::{all_concrete_subtypes_of, lower_first, mutation_field};
use super::registrar::Registry;
use crate::graph::{DiagnosticCode, Diagnostics};
use crate::metamodel::ClassifierId;
use crate::schema::{Argument, EnumType, EnumValue, FieldDef, TypeRef};

/// Mutation fields plus the concrete-subtype enums they reference
#[derive(Debug, Clone, Default)]
pub struct MutationTypes {
    pub fields: Vec<FieldDef>,
    pub subtype_enums: Vec<EnumType>,
}

/// Identifier attributes visible on a class, supertypes first
pub fn visible_identifiers(
    registry: &Registry<'_>,
    table: &MemberTable,
    class: &ClassifierId,
) -> Vec<String> {
    registry
        .graph()
        .ancestors(class)
        .iter()
        .chain(std::iter::once(class))
        .filter_map(|c| table.members(c))
        .flat_map(|m| m.identifiers.iter().cloned())
        .collect()
}

pub fn synthesize(
    registry: &Registry<'_>,
    table: &MemberTable,
    diagnostics: &mut Diagnostics,
) -> MutationTypes {
    let graph = registry.graph();
    let mut out = MutationTypes::default();
    let mut enum_targets: HashSet<ClassifierId> = HashSet::new();

    for (shell, _) in registry.classes() {
        let Some(members) = table.members(&shell.id) else {
            continue;
        };
        if members.containments.is_empty() {
            continue;
        }

        let identifiers = visible_identifiers(registry, table, &shell.id);
        let Some(identifier) = identifiers.first() else {
            tracing::debug!(class = %shell.id, "containments without identifier; no mutations");
            continue;
        };
        if identifiers.len() > 1 {
            diagnostics.report(
                shell.id.to_string(),
                DiagnosticCode::AmbiguousIdentifier,
                format!(
                    "identifiers {} are visible; mutations keyed by '{}'",
                    identifiers.join(", "),
                    identifier
                ),
            );
        }

        for containment in &members.containments {
            let target = &containment.target;
            let concrete = graph.concrete_specializations(target);
            if concrete.is_empty() {
                continue;
            }

            let enum_name = all_concrete_subtypes_of(&target.name);
            if enum_targets.insert(target.clone()) {
                out.subtype_enums.push(EnumType {
                    name: enum_name.clone(),
                    values: concrete
                        .iter()
                        .map(|c| EnumValue { name: c.name.clone(), value: c.name.clone() })
                        .collect(),
                    description: None,
                });
            }

            let mut kind_arg = lower_first(&target.name);
            if &kind_arg == identifier {
                kind_arg = containment.reference.clone();
            }

            let name = mutation_field(&containment.reference, &shell.id.name, identifier);
            tracing::debug!(class = %shell.id, mutation = %name, "mutation synthesized");

            out.fields.push(
                FieldDef::new(name, TypeRef::named("String"))
                    .with_arguments(vec![
                        Argument::new(identifier.as_str(), TypeRef::named("String")).with_description(Some(
                            format!(
                                "Identifies the {} mutation context via its {} property.",
                                shell.id.name, identifier
                            ),
                        )),
                        Argument::new(kind_arg, TypeRef::named(enum_name.as_str()))
                            .with_description(Some(format!("Specifies one of {} to create.", enum_name))),
                    ])
                    .with_description(Some(format!(
                        "Creates one of {} in {}.{} for the container identified by {}; returns the new identifier.",
                        enum_name, shell.id.name, containment.reference, identifier
                    ))),
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metamodel::Metamodel;
    use crate::transform::mapper::Mapper;
    use crate::transform::names::NameValidator;
    use crate::transform::registrar::Registrar;
    use crate::transform::scope::Scope;

    fn run(json: &str) -> (MutationTypes, Diagnostics) {
        let m = Metamodel::from_json(json).unwrap();
        let names = NameValidator::new().unwrap();
        let mut diags = Diagnostics::new();
        let scope = Scope::build(&m, &mut diags);
        let registry = Registrar::run(scope, &names, &mut diags).unwrap();
        let table = Mapper::run(&registry, &names, &mut diags).unwrap();
        let mutations = synthesize(&registry, &table, &mut diags);
        (mutations, diags)
    }

    #[test]
    fn test_folder_items_mutation() {
        let (out, diags) = run(
            r#"{"packages": [{"name": "fs", "classifiers": [
                {"kind": "class", "name": "Folder", "members": [
                    {"kind": "attribute", "name": "id", "type": "String",
                     "annotations": {"identifier": "true"}},
                    {"kind": "reference", "name": "items", "type": "Item", "multiplicity": "*",
                     "containment": true}
                ]},
                {"kind": "class", "name": "Item", "abstract": true},
                {"kind": "class", "name": "Link", "supertypes": ["Item"]},
                {"kind": "class", "name": "File", "supertypes": ["Item"]}
            ]}]}"#,
        );

        assert_eq!(out.fields.len(), 1);
        let field = &out.fields[0];
        assert_eq!(field.name, "itemsOfFolderById");
        assert_eq!(field.ty.to_string(), "String");
        let args: Vec<String> = field.arguments.iter().map(|a| format!("{}: {}", a.name, a.ty)).collect();
        assert_eq!(args, vec!["id: String", "item: AllConcreteSubtypesOfItem"]);
        assert_eq!(
            field.arguments[0].description.as_deref(),
            Some("Identifies the Folder mutation context via its id property.")
        );
        assert_eq!(
            field.arguments[1].description.as_deref(),
            Some("Specifies one of AllConcreteSubtypesOfItem to create.")
        );

        assert_eq!(out.subtype_enums.len(), 1);
        assert_eq!(out.subtype_enums[0].name, "AllConcreteSubtypesOfItem");
        assert_eq!(out.subtype_enums[0].value_names(), vec!["File", "Link"]);
        assert_eq!(diags.with_code(DiagnosticCode::AmbiguousIdentifier).count(), 0);
    }

    #[test]
    fn test_inherited_identifier_and_ambiguity() {
        let (out, diags) = run(
            r#"{"packages": [{"name": "p", "classifiers": [
                {"kind": "class", "name": "Keyed", "abstract": true, "members": [
                    {"kind": "attribute", "name": "uuid", "type": "String",
                     "annotations": {"identifier": "true"}}
                ]},
                {"kind": "class", "name": "Box", "supertypes": ["Keyed"], "members": [
                    {"kind": "attribute", "name": "code", "type": "String",
                     "annotations": {"identifier": "true"}},
                    {"kind": "reference", "name": "parts", "type": "Part", "multiplicity": "*",
                     "containment": true},
                    {"kind": "reference", "name": "ghosts", "type": "Ghost", "multiplicity": "*",
                     "containment": true}
                ]},
                {"kind": "class", "name": "Part"},
                {"kind": "class", "name": "Ghost", "abstract": true}
            ]}]}"#,
        );

        // Ghost has no concrete specialization
        let names: Vec<&str> = out.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["partsOfBoxByUuid"]);
        assert_eq!(out.subtype_enums[0].value_names(), vec!["Part"]);
        assert_eq!(diags.with_code(DiagnosticCode::AmbiguousIdentifier).count(), 1);
    }

    #[test]
    fn test_no_identifier_no_mutation() {
        let (out, _) = run(
            r#"{"packages": [{"name": "p", "classifiers": [
                {"kind": "class", "name": "Bag", "members": [
                    {"kind": "reference", "name": "parts", "type": "Part", "multiplicity": "*",
                     "containment": true}
                ]},
                {"kind": "class", "name": "Part"}
            ]}]}"#,
        );
        assert!(out.fields.is_empty());
        assert!(out.subtype_enums.is_empty());
    }
}
