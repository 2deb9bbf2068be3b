//! Collection Argument Synthesizer
//!
//! Multi-valued class-typed fields become paginated: the result type is
//! rewritten to `<T>PaginatedCollection!` and filter/sort/page arguments are
//! attached. Every element class used this way gets a wrapper type; element
//! classes with subclasses also get an `AllSubtypesOf<T>` enum.

use std::collections::HashSet;

use super::names::{all_subtypes_of, paginated_collection_of, PAGE_INFO};
use super::registrar::Registry;
use crate::graph::{case_insensitive_order, ClassGraph};
use crate::metamodel::ClassifierId;
use crate::schema::{Argument, DefaultValue, EnumType, EnumValue, FieldDef, ObjectType, TypeRef};

/// Element classes that appear as paginated collections
#[derive(Debug, Clone, Default)]
pub struct CollectionUses {
    elements: HashSet<ClassifierId>,
}

impl CollectionUses {
    pub fn record(&mut self, element: &ClassifierId) {
        self.elements.insert(element.clone());
    }

    pub fn contains(&self, element: &ClassifierId) -> bool {
        self.elements.contains(element)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Arguments attached to a paginated field, in order
pub fn collection_arguments(element: &ClassifierId, graph: &ClassGraph) -> Vec<Argument> {
    let mut args = Vec::with_capacity(6);
    if graph.has_subclasses(element) {
        args.push(
            Argument::new("type", TypeRef::named(all_subtypes_of(&element.name))).with_description(Some(
                format!("Restricts the results to one of the subclasses of {}.", element.name),
            )),
        );
    }
    args.push(Argument::new("filter", TypeRef::named("String")).with_description(Some(
        "Boolean expression over an element of `type`, used to select elements of the returned collection."
            .to_string(),
    )));
    args.push(Argument::new("sort", TypeRef::named("String")).with_description(Some(
        "Expression over an element of `type` by which the filtered collection is sorted.".to_string(),
    )));
    args.push(
        Argument::new("reverse", TypeRef::named("Boolean"))
            .with_default(DefaultValue::Boolean(false))
            .with_description(Some(
                "If true, reverses the filtered and sorted collection.".to_string(),
            )),
    );
    args.push(
        Argument::new("skip", TypeRef::named("Int"))
            .with_default(DefaultValue::Int(0))
            .with_description(Some(
                "Number of elements to skip from the start of the sorted collection.".to_string(),
            )),
    );
    args.push(
        Argument::new("take", TypeRef::named("Int"))
            .with_default(DefaultValue::Int(-1))
            .with_description(Some(
                "Maximum number of elements returned after the skipped ones; -1 means taking all available elements."
                    .to_string(),
            )),
    );
    args
}

/// Rewrite a multi-valued field over `element` as a paginated collection.
///
/// Arguments the field already has (operation parameters) stay in front.
pub fn paginate(
    mut field: FieldDef,
    element: &ClassifierId,
    graph: &ClassGraph,
    uses: &mut CollectionUses,
) -> FieldDef {
    uses.record(element);
    field.ty = TypeRef::non_null(TypeRef::named(paginated_collection_of(&element.name)));
    field.arguments.extend(collection_arguments(element, graph));
    field
}

/// Types synthesized for paginated collections
#[derive(Debug, Clone, Default)]
pub struct CollectionTypes {
    pub wrappers: Vec<ObjectType>,
    pub page_info: Option<ObjectType>,
    pub subtype_enums: Vec<EnumType>,
}

/// Build wrapper types, `PageInfo` and subtype enums for every recorded
/// element, in class declaration order
pub fn synthesize(registry: &Registry<'_>, uses: &CollectionUses) -> CollectionTypes {
    let graph = registry.graph();
    let mut types = CollectionTypes::default();

    for (shell, _) in registry.classes() {
        if !uses.contains(&shell.id) {
            continue;
        }
        types.wrappers.push(wrapper_type(&shell.id));
        if let Some(subtypes) = all_subtypes_enum(&shell.id, graph) {
            types.subtype_enums.push(subtypes);
        }
    }

    if !types.wrappers.is_empty() {
        types.page_info = Some(page_info_type());
    }

    tracing::debug!(
        wrappers = types.wrappers.len(),
        subtype_enums = types.subtype_enums.len(),
        "collection types synthesized"
    );

    types
}

fn wrapper_type(element: &ClassifierId) -> ObjectType {
    let name = &element.name;
    let mut wrapper = ObjectType::new(paginated_collection_of(name));
    wrapper.description = Some(format!("Paginated collection of {} elements.", name));
    wrapper.fields = vec![
        FieldDef::new(
            "collection",
            TypeRef::non_null(TypeRef::list(TypeRef::named(name.as_str()))),
        )
        .with_description(Some(format!("A collection of {} elements.", name))),
        FieldDef::new("pageInfo", TypeRef::non_null(TypeRef::named(PAGE_INFO)))
            .with_description(Some(format!(
                "The pagination data for the collection of {} elements.",
                name
            ))),
    ];
    wrapper
}

/// `AllSubtypesOf<T>`: every transitive subclass plus `T`; `None` without subclasses
fn all_subtypes_enum(element: &ClassifierId, graph: &ClassGraph) -> Option<EnumType> {
    let subclasses = graph.subclasses(element);
    if subclasses.is_empty() {
        return None;
    }

    let mut names: Vec<&str> = subclasses.iter().map(|c| c.name.as_str()).collect();
    names.push(element.name.as_str());
    names.sort_by(|a, b| case_insensitive_order(a, b));
    names.dedup();

    Some(EnumType {
        name: all_subtypes_of(&element.name),
        values: names
            .into_iter()
            .map(|n| EnumValue { name: n.to_string(), value: n.to_string() })
            .collect(),
        description: None,
    })
}

fn page_info_type() -> ObjectType {
    let mut page_info = ObjectType::new(PAGE_INFO);
    page_info.fields = vec![
        FieldDef::new("nextSkip", TypeRef::named("Int")).with_description(Some(
            "The value for the skip argument of a subsequent call if hasNext is true.".to_string(),
        )),
        FieldDef::new("hasNext", TypeRef::non_null(TypeRef::named("Boolean"))).with_description(
            Some("If true, nextSkip provides the value for the skip argument of a subsequent call.".to_string()),
        ),
        FieldDef::new("totalCount", TypeRef::non_null(TypeRef::named("Int"))).with_description(
            Some(
                "The total count of elements of the filtered collection; if hasNext is true, the remaining number of elements is totalCount - nextSkip."
                    .to_string(),
            ),
        ),
    ];
    page_info
}
