//! Member Mapper (pass 2)
//!
//! Turns attributes, references and operations of registered classes into
//! field definitions, and enum literals into enum values. Also records the
//! bookkeeping later stages need: identifier attributes, containment
//! references, contained metaclasses, and paginated collection elements.

use std::collections::{HashMap, HashSet};

use super::collections::{paginate, CollectionUses};
use super::names::{enum_value_name, NameValidator};
use super::registrar::{Registry, ShellKind};
use super::scope::Resolution;
use crate::error::{Result, TransformError};
use crate::graph::{DiagnosticCode, Diagnostics};
use crate::metamodel::{
    Attribute, ClassDecl, Classifier, ClassifierId, EnumDecl, Member, Multiplicity, Operation,
    Reference,
};
use crate::schema::{Argument, EnumValue, FieldDef, TypeRef};

// =============================================================================
// Member Table
// =============================================================================

/// A containment reference declared on a class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Containment {
    pub reference: String,
    pub target: ClassifierId,
}

/// Per-class bookkeeping filled during pass 2
#[derive(Debug, Clone, Default)]
pub struct ClassMembers {
    /// Own fields, declaration order
    pub fields: Vec<FieldDef>,
    /// Own identifier attribute names
    pub identifiers: Vec<String>,
    /// Own containment references
    pub containments: Vec<Containment>,
}

/// Output of pass 2
#[derive(Debug, Clone, Default)]
pub struct MemberTable {
    classes: HashMap<ClassifierId, ClassMembers>,
    enum_values: HashMap<ClassifierId, Vec<EnumValue>>,
    contained: HashSet<ClassifierId>,
    collections: CollectionUses,
}

impl MemberTable {
    /// Empty bookkeeping for every registered class and enum
    pub fn for_registry(registry: &Registry<'_>) -> Self {
        let mut table = MemberTable::default();
        for shell in registry.shells() {
            match shell.kind {
                ShellKind::Interface | ShellKind::Object { .. } => {
                    table.classes.insert(shell.id.clone(), ClassMembers::default());
                }
                ShellKind::Enum => {
                    table.enum_values.insert(shell.id.clone(), Vec::new());
                }
                ShellKind::Scalar(_) => {}
            }
        }
        table
    }

    pub fn members(&self, class: &ClassifierId) -> Option<&ClassMembers> {
        self.classes.get(class)
    }

    pub fn enum_values(&self, id: &ClassifierId) -> &[EnumValue] {
        self.enum_values.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether the class is the target (or concrete subclass of a target)
    /// of some containment reference
    pub fn is_contained(&self, class: &ClassifierId) -> bool {
        self.contained.contains(class)
    }

    pub fn contained(&self) -> &HashSet<ClassifierId> {
        &self.contained
    }

    pub fn collections(&self) -> &CollectionUses {
        &self.collections
    }

    fn class_mut(&mut self, class: &ClassifierId) -> Result<&mut ClassMembers> {
        self.classes.get_mut(class).ok_or_else(|| {
            TransformError::invariant(class.to_string(), "member bookkeeping missing for class")
        })
    }

    pub fn add_field(&mut self, class: &ClassifierId, field: FieldDef) -> Result<()> {
        self.class_mut(class)?.fields.push(field);
        Ok(())
    }

    pub fn add_identifier(&mut self, class: &ClassifierId, name: &str) -> Result<()> {
        self.class_mut(class)?.identifiers.push(name.to_string());
        Ok(())
    }

    pub fn add_containment(&mut self, class: &ClassifierId, containment: Containment) -> Result<()> {
        self.class_mut(class)?.containments.push(containment);
        Ok(())
    }
}

// =============================================================================
// Type targets
// =============================================================================

/// What a member's type name points at, from the schema's point of view
enum Target {
    /// Named GraphQL type; `class` is set for registered classes
    Named {
        name: String,
        class: Option<ClassifierId>,
    },
    /// Classifier that declares type parameters
    Generic(ClassifierId),
    External,
}

/// Multiplicity rule shared by fields and arguments.
///
/// Many → `[T]`; unique or an explicit upper bound of one → `T!`; an absent
/// multiplicity leaves `T` nullable.
pub fn wrap_multiplicity(base: TypeRef, multiplicity: Option<Multiplicity>, unique: bool) -> TypeRef {
    match multiplicity {
        Some(m) if m.is_many() => TypeRef::list(base),
        Some(m) if m.is_single() => TypeRef::non_null(base),
        _ if unique => TypeRef::non_null(base),
        _ => base,
    }
}

fn is_many(multiplicity: Option<Multiplicity>) -> bool {
    multiplicity.is_some_and(|m| m.is_many())
}

// =============================================================================
// Mapper
// =============================================================================

/// Pass 2 driver
pub struct Mapper<'r, 'm> {
    registry: &'r Registry<'m>,
    names: &'r NameValidator,
    diagnostics: &'r mut Diagnostics,
    table: MemberTable,
}

impl<'r, 'm> Mapper<'r, 'm> {
    pub fn run(
        registry: &'r Registry<'m>,
        names: &'r NameValidator,
        diagnostics: &'r mut Diagnostics,
    ) -> Result<MemberTable> {
        let mut mapper = Mapper {
            registry,
            names,
            diagnostics,
            table: MemberTable::for_registry(registry),
        };

        for shell in registry.shells() {
            match (&shell.kind, registry.scope().get(&shell.id)) {
                (ShellKind::Enum, Some(Classifier::Enum(decl))) => {
                    let values = mapper.map_literals(&shell.id, decl);
                    mapper.table.enum_values.insert(shell.id.clone(), values);
                }
                (ShellKind::Interface | ShellKind::Object { .. }, Some(Classifier::Class(decl))) => {
                    mapper.map_class(&shell.id, decl)?;
                }
                _ => {}
            }
        }

        Ok(mapper.table)
    }

    fn map_literals(&mut self, id: &ClassifierId, decl: &EnumDecl) -> Vec<EnumValue> {
        let mut values: Vec<EnumValue> = Vec::with_capacity(decl.literals.len());
        for literal in &decl.literals {
            let name = enum_value_name(&literal.name);
            if !self.names.is_valid(&name) {
                self.diagnostics.report(
                    format!("{}::{}", id, literal.name),
                    DiagnosticCode::InvalidName,
                    format!("'{}' is not a valid GraphQL enum value; literal skipped", name),
                );
                continue;
            }
            if values.iter().any(|v| v.name == name) {
                continue;
            }
            values.push(EnumValue {
                name,
                value: literal.value().to_string(),
            });
        }
        values
    }

    fn map_class(&mut self, class: &ClassifierId, decl: &'m ClassDecl) -> Result<()> {
        let getters = self.getter_targets(class, decl);

        for member in &decl.members {
            let subject = format!("{}::{}", class, member.name());
            match member {
                Member::Attribute(a) => self.map_attribute(class, &subject, a)?,
                Member::Reference(r) => {
                    if getters.contains(r.name.as_str()) {
                        self.diagnostics.report(
                            subject,
                            DiagnosticCode::ShadowedReference,
                            "reference read through a getter operation; field comes from the operation",
                        );
                        continue;
                    }
                    self.map_reference(class, &subject, r)?
                }
                Member::Operation(o) => self.map_operation(class, &subject, o)?,
            }
        }
        Ok(())
    }

    /// Reference names claimed by `getterOf` on any operation visible on the class
    fn getter_targets(&self, class: &ClassifierId, decl: &'m ClassDecl) -> HashSet<&'m str> {
        let mut targets: HashSet<&'m str> = decl.operations().filter_map(Operation::getter_of).collect();
        for ancestor in self.registry.graph().ancestors(class) {
            if let Some(sup) = self.registry.class_decl(ancestor) {
                targets.extend(sup.operations().filter_map(Operation::getter_of));
            }
        }
        targets
    }

    fn resolve(&self, class: &ClassifierId, type_name: &str) -> Target {
        match self.registry.scope().resolve(&class.package, type_name) {
            Resolution::Builtin(p) => Target::Named {
                name: p.graphql_name().to_string(),
                class: None,
            },
            Resolution::Classifier(id, classifier) => {
                if self.registry.is_registered(id) {
                    Target::Named {
                        name: id.name.clone(),
                        class: self.registry.is_class(id).then(|| id.clone()),
                    }
                } else if classifier.is_generic() {
                    Target::Generic(id.clone())
                } else {
                    // Skipped scalar or invalid name: the reference dangles
                    Target::Named {
                        name: id.name.clone(),
                        class: None,
                    }
                }
            }
            Resolution::External => Target::External,
        }
    }

    fn report_external(&mut self, subject: &str, type_name: &str) {
        let suggestion = self.registry.scope().suggest(type_name);
        self.diagnostics
            .external_type(subject, type_name, suggestion.as_deref());
    }

    fn report_generic(&mut self, subject: &str, id: &ClassifierId) {
        self.diagnostics.report(
            subject,
            DiagnosticCode::TypeParameters,
            format!("type '{}' declares type parameters; member skipped", id),
        );
    }

    fn check_name(&mut self, subject: &str, name: &str) -> bool {
        if self.names.is_valid(name) {
            return true;
        }
        self.diagnostics.report(
            subject,
            DiagnosticCode::InvalidName,
            format!("'{}' is not a valid GraphQL name; member skipped", name),
        );
        false
    }

    /// Paginate multi-valued class-typed results; other fields pass through
    fn finish_field(
        &mut self,
        field: FieldDef,
        element: Option<&ClassifierId>,
        multiplicity: Option<Multiplicity>,
    ) -> FieldDef {
        match element {
            Some(element) if is_many(multiplicity) => paginate(
                field,
                element,
                self.registry.graph(),
                &mut self.table.collections,
            ),
            _ => field,
        }
    }

    fn map_attribute(&mut self, class: &ClassifierId, subject: &str, a: &Attribute) -> Result<()> {
        if !self.check_name(subject, &a.name) {
            return Ok(());
        }

        let (base, element) = match self.resolve(class, &a.ty) {
            Target::Named { name, class } => (name, class),
            Target::Generic(id) => {
                self.report_generic(subject, &id);
                return Ok(());
            }
            Target::External => {
                self.report_external(subject, &a.ty);
                return Ok(());
            }
        };

        let field = FieldDef::new(&a.name, wrap_multiplicity(TypeRef::named(base), a.multiplicity, a.unique))
            .with_description(a.description.clone());
        let field = self.finish_field(field, element.as_ref(), a.multiplicity);
        tracing::debug!(member = subject, ty = %field.ty, "mapped attribute");
        self.table.add_field(class, field)?;

        if a.is_identifier() {
            self.table.add_identifier(class, &a.name)?;
        }
        Ok(())
    }

    fn map_reference(&mut self, class: &ClassifierId, subject: &str, r: &Reference) -> Result<()> {
        if !self.check_name(subject, &r.name) {
            return Ok(());
        }

        let target = match self.resolve(class, &r.ty) {
            Target::Named { class: Some(target), .. } => target,
            Target::Named { name, class: None } => {
                self.diagnostics.report(
                    subject,
                    DiagnosticCode::NonClassReference,
                    format!("reference target '{}' is not a class; member skipped", name),
                );
                return Ok(());
            }
            Target::Generic(id) => {
                self.report_generic(subject, &id);
                return Ok(());
            }
            Target::External => {
                self.report_external(subject, &r.ty);
                return Ok(());
            }
        };

        if r.containment {
            self.record_containment(class, &r.name, &target)?;
        }

        let field = FieldDef::new(
            &r.name,
            wrap_multiplicity(TypeRef::named(target.name.as_str()), r.multiplicity, r.unique),
        )
        .with_description(r.description.clone());
        let field = self.finish_field(field, Some(&target), r.multiplicity);
        tracing::debug!(member = subject, ty = %field.ty, containment = r.containment, "mapped reference");
        self.table.add_field(class, field)
    }

    fn record_containment(&mut self, class: &ClassifierId, reference: &str, target: &ClassifierId) -> Result<()> {
        let graph = self.registry.graph();
        self.table.contained.insert(target.clone());
        for sub in graph.subclasses(target) {
            if !graph.is_abstract(sub) {
                self.table.contained.insert(sub.clone());
            }
        }
        self.table.add_containment(
            class,
            Containment {
                reference: reference.to_string(),
                target: target.clone(),
            },
        )
    }

    fn map_operation(&mut self, class: &ClassifierId, subject: &str, o: &Operation) -> Result<()> {
        let Some(return_type) = o.ty.as_deref() else {
            self.diagnostics.report(
                subject,
                DiagnosticCode::MissingReturnType,
                "operation has no return type; member skipped",
            );
            return Ok(());
        };

        if !o.type_parameters.is_empty() {
            self.diagnostics.report(
                subject,
                DiagnosticCode::TypeParameters,
                "operations with type parameters are not supported; member skipped",
            );
            return Ok(());
        }

        let field_name = o.getter_of().unwrap_or(o.name.as_str());
        if !self.check_name(subject, field_name) {
            return Ok(());
        }

        let (base, element) = match self.resolve(class, return_type) {
            Target::Named { name, class } => (name, class),
            Target::Generic(id) => {
                self.report_generic(subject, &id);
                return Ok(());
            }
            Target::External => {
                self.report_external(subject, return_type);
                return Ok(());
            }
        };

        let mut arguments = Vec::with_capacity(o.parameters.len());
        for p in &o.parameters {
            let param_subject = format!("{}({})", subject, p.name);
            if !self.check_name(&param_subject, &p.name) {
                return Ok(());
            }
            let param_base = match self.resolve(class, &p.ty) {
                Target::Named { name, .. } => name,
                Target::Generic(id) => {
                    self.report_generic(&param_subject, &id);
                    return Ok(());
                }
                Target::External => {
                    self.report_external(&param_subject, &p.ty);
                    return Ok(());
                }
            };
            arguments.push(Argument::new(
                &p.name,
                wrap_multiplicity(TypeRef::named(param_base), p.multiplicity, p.unique),
            ));
        }

        let field = FieldDef::new(field_name, wrap_multiplicity(TypeRef::named(base), o.multiplicity, o.unique))
            .with_arguments(arguments)
            .with_description(o.description.clone());
        let field = self.finish_field(field, element.as_ref(), o.multiplicity);
        tracing::debug!(member = subject, field = field_name, ty = %field.ty, "mapped operation");
        self.table.add_field(class, field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metamodel::Metamodel;
    use crate::transform::registrar::Registrar;
    use crate::transform::scope::Scope;

    fn map(json: &str) -> (MemberTable, Diagnostics) {
        let m = Metamodel::from_json(json).unwrap();
        let names = NameValidator::new().unwrap();
        let mut diags = Diagnostics::new();
        let scope = Scope::build(&m, &mut diags);
        let registry = Registrar::run(scope, &names, &mut diags).unwrap();
        let table = Mapper::run(&registry, &names, &mut diags).unwrap();
        (table, diags)
    }

    fn shape(table: &MemberTable, class: &str) -> Vec<String> {
        table
            .members(&ClassifierId::new("p", class))
            .unwrap()
            .fields
            .iter()
            .map(|f| format!("{}: {}", f.name, f.ty))
            .collect()
    }

    #[test]
    fn test_multiplicity_mapping() {
        let (table, _) = map(
            r#"{"packages": [{"name": "p", "classifiers": [
                {"kind": "class", "name": "A", "members": [
                    {"kind": "attribute", "name": "opt", "type": "String"},
                    {"kind": "attribute", "name": "req", "type": "EInt", "multiplicity": "1"},
                    {"kind": "attribute", "name": "uniq", "type": "Boolean", "unique": true},
                    {"kind": "attribute", "name": "tags", "type": "String", "multiplicity": "*"},
                    {"kind": "attribute", "name": "some", "type": "EDouble", "multiplicity": "1..*"}
                ]}
            ]}]}"#,
        );
        assert_eq!(
            shape(&table, "A"),
            vec!["opt: String", "req: Int!", "uniq: Boolean!", "tags: [String]", "some: [Float]"]
        );
    }

    #[test]
    fn test_explicit_upper_bound_of_one_is_non_null() {
        let (table, _) = map(
            r#"{"packages": [{"name": "p", "classifiers": [
                {"kind": "class", "name": "A", "members": [
                    {"kind": "attribute", "name": "opt", "type": "String", "multiplicity": "0..1"},
                    {"kind": "reference", "name": "peer", "type": "A", "multiplicity": "0..1"},
                    {"kind": "operation", "name": "f", "type": "Int", "multiplicity": "0..1",
                     "parameters": [{"name": "x", "type": "Int", "multiplicity": "0..1"},
                                    {"name": "y", "type": "Int"}]}
                ]}
            ]}]}"#,
        );
        assert_eq!(shape(&table, "A"), vec!["opt: String!", "peer: A!", "f: Int!"]);

        let a = table.members(&ClassifierId::new("p", "A")).unwrap();
        let args: Vec<String> = a.fields[2].arguments.iter().map(|x| format!("{}: {}", x.name, x.ty)).collect();
        assert_eq!(args, vec!["x: Int!", "y: Int"]);
    }

    #[test]
    fn test_external_and_unsupported_members_skipped() {
        let (table, diags) = map(
            r#"{"packages": [{"name": "p", "classifiers": [
                {"kind": "enum", "name": "Mode"},
                {"kind": "scalar", "name": "Date", "representation": "java.util.Date"},
                {"kind": "class", "name": "Person"},
                {"kind": "class", "name": "A", "members": [
                    {"kind": "attribute", "name": "owner", "type": "other.Persn"},
                    {"kind": "attribute", "name": "when", "type": "Date"},
                    {"kind": "reference", "name": "mode", "type": "Mode"},
                    {"kind": "operation", "name": "touch"},
                    {"kind": "operation", "name": "map", "type": "String", "type_parameters": ["T"]},
                    {"kind": "operation", "name": "find", "type": "Person",
                     "parameters": [{"name": "key", "type": "Missing"}]},
                    {"kind": "attribute", "name": "bad-name", "type": "String"}
                ]}
            ]}]}"#,
        );

        // Dangling reference to a skipped scalar is still emitted
        assert_eq!(shape(&table, "A"), vec!["when: Date"]);

        assert_eq!(diags.with_code(DiagnosticCode::ExternalType).count(), 2);
        let owner = diags.with_code(DiagnosticCode::ExternalType).next().unwrap();
        assert_eq!(owner.context, vec!["did you mean 'Person'?".to_string()]);
        assert_eq!(diags.with_code(DiagnosticCode::NonClassReference).count(), 1);
        assert_eq!(diags.with_code(DiagnosticCode::MissingReturnType).count(), 1);
        assert_eq!(diags.with_code(DiagnosticCode::TypeParameters).count(), 1);
        assert_eq!(diags.with_code(DiagnosticCode::InvalidName).count(), 1);
    }

    #[test]
    fn test_containment_and_pagination() {
        let (table, _) = map(
            r#"{"packages": [{"name": "p", "classifiers": [
                {"kind": "class", "name": "Folder", "members": [
                    {"kind": "attribute", "name": "id", "type": "String",
                     "annotations": {"identifier": "true"}},
                    {"kind": "reference", "name": "items", "type": "Item", "multiplicity": "*",
                     "containment": true},
                    {"kind": "reference", "name": "parent", "type": "Folder"}
                ]},
                {"kind": "class", "name": "Item", "abstract": true},
                {"kind": "class", "name": "File", "supertypes": ["Item"]},
                {"kind": "class", "name": "Special", "abstract": true, "supertypes": ["Item"]}
            ]}]}"#,
        );

        assert_eq!(
            shape(&table, "Folder"),
            vec!["id: String", "items: ItemPaginatedCollection!", "parent: Folder"]
        );

        let folder = table.members(&ClassifierId::new("p", "Folder")).unwrap();
        assert_eq!(folder.identifiers, vec!["id".to_string()]);
        assert_eq!(
            folder.containments,
            vec![Containment { reference: "items".into(), target: ClassifierId::new("p", "Item") }]
        );

        assert!(table.is_contained(&ClassifierId::new("p", "Item")));
        assert!(table.is_contained(&ClassifierId::new("p", "File")));
        assert!(!table.is_contained(&ClassifierId::new("p", "Special")));
        assert!(!table.is_contained(&ClassifierId::new("p", "Folder")));
        assert!(table.collections().contains(&ClassifierId::new("p", "Item")));
    }

    #[test]
    fn test_getter_renames_and_shadows_reference() {
        let (table, diags) = map(
            r#"{"packages": [{"name": "p", "classifiers": [
                {"kind": "class", "name": "Base", "abstract": true, "members": [
                    {"kind": "operation", "name": "getOwner", "type": "Person",
                     "annotations": {"getterOf": "owner"}}
                ]},
                {"kind": "class", "name": "Doc", "supertypes": ["Base"], "members": [
                    {"kind": "reference", "name": "owner", "type": "Person"},
                    {"kind": "operation", "name": "pages", "type": "Int", "multiplicity": "1",
                     "parameters": [{"name": "from", "type": "Int", "multiplicity": "1"},
                                    {"name": "labels", "type": "String", "multiplicity": "*"}]}
                ]},
                {"kind": "class", "name": "Person"}
            ]}]}"#,
        );

        assert_eq!(shape(&table, "Base"), vec!["owner: Person"]);
        assert_eq!(shape(&table, "Doc"), vec!["pages: Int!"]);
        assert_eq!(diags.with_code(DiagnosticCode::ShadowedReference).count(), 1);

        let doc = table.members(&ClassifierId::new("p", "Doc")).unwrap();
        let args: Vec<String> = doc.fields[0]
            .arguments
            .iter()
            .map(|a| format!("{}: {}", a.name, a.ty))
            .collect();
        assert_eq!(args, vec!["from: Int!", "labels: [String]"]);
    }

    #[test]
    fn test_enum_literals() {
        let (table, _) = map(
            r#"{"packages": [{"name": "p", "classifiers": [
                {"kind": "enum", "name": "Mode", "literals": [
                    {"name": "read", "literal": "r"},
                    {"name": "readWrite"}
                ]}
            ]}]}"#,
        );
        let values = table.enum_values(&ClassifierId::new("p", "Mode"));
        assert_eq!(
            values,
            &[
                EnumValue { name: "READ".into(), value: "r".into() },
                EnumValue { name: "READWRITE".into(), value: "readWrite".into() },
            ]
        );
    }

    #[test]
    fn test_missing_bookkeeping_is_invariant_error() {
        let mut table = MemberTable::default();
        let err = table
            .add_field(&ClassifierId::new("p", "Ghost"), FieldDef::new("x", TypeRef::named("Int")))
            .unwrap_err();
        assert!(matches!(err, TransformError::Invariant { .. }));
    }
}
