//! Derived Names
//!
//! Every synthesized type and field name is built here so the stages agree
//! on spelling: pluralized root queries, pagination wrappers, subtype enums,
//! and containment mutations.

use regex::Regex;

use crate::error::Result;

pub const QUERY: &str = "Query";
pub const MUTATION: &str = "Mutation";
pub const PAGE_INFO: &str = "PageInfo";

const PAGINATED_COLLECTION_SUFFIX: &str = "PaginatedCollection";
const ALL_SUBTYPES_PREFIX: &str = "AllSubtypesOf";
const ALL_CONCRETE_SUBTYPES_PREFIX: &str = "AllConcreteSubtypesOf";

/// Names no metamodel classifier may take
pub const RESERVED_TYPE_NAMES: &[&str] = &[
    QUERY, MUTATION, PAGE_INFO, "String", "Boolean", "Int", "Float", "ID",
];

/// English plural used for root query fields
pub fn pluralize(name: &str) -> String {
    if name.ends_with('x') || name.ends_with("ss") {
        format!("{}es", name)
    } else if let Some(stem) = name.strip_suffix('y') {
        format!("{}ies", stem)
    } else {
        format!("{}s", name)
    }
}

/// `all<Plural>` root query field
pub fn all_query_field(class_name: &str) -> String {
    format!("all{}", pluralize(class_name))
}

pub fn paginated_collection_of(element: &str) -> String {
    format!("{}{}", element, PAGINATED_COLLECTION_SUFFIX)
}

pub fn all_subtypes_of(class_name: &str) -> String {
    format!("{}{}", ALL_SUBTYPES_PREFIX, class_name)
}

pub fn all_concrete_subtypes_of(class_name: &str) -> String {
    format!("{}{}", ALL_CONCRETE_SUBTYPES_PREFIX, class_name)
}

/// `<reference>Of<Class>By<Id>` creation mutation
pub fn mutation_field(reference: &str, class_name: &str, identifier: &str) -> String {
    format!("{}Of{}By{}", reference, class_name, capitalize(identifier))
}

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Enum value name for a metamodel literal
pub fn enum_value_name(literal_name: &str) -> String {
    literal_name.to_uppercase()
}

/// GraphQL `Name` production check
pub struct NameValidator {
    pattern: Regex,
}

impl NameValidator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(r"^[_A-Za-z][_0-9A-Za-z]*$")?,
        })
    }

    pub fn is_valid(&self, name: &str) -> bool {
        // Leading double underscore is reserved for introspection
        self.pattern.is_match(name) && !name.starts_with("__")
    }
}
