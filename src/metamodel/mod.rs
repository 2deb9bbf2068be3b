//! Metamodel Source
//!
//! Read-only input model: packages of classifiers (scalars, enums, classes)
//! with typed members and multiplicities. Deserialized from JSON resources by
//! the [`loader`].
//!
//! Classifiers and members are tagged unions with a `kind` discriminator so
//! every later stage matches on them exhaustively.

pub mod loader;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::TransformError;

pub use loader::{collect_resources, load_resource, LoadConfig, Resource};

/// Annotation key marking an attribute as the identifier of its class
pub const IDENTIFIER_ANNOTATION: &str = "identifier";

/// Annotation key renaming an operation to the reference it reads
pub const GETTER_OF_ANNOTATION: &str = "getterOf";

// =============================================================================
// Identity
// =============================================================================

/// Qualified identity of a classifier: unique within its package
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassifierId {
    pub package: String,
    pub name: String,
}

impl ClassifierId {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ClassifierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.package, self.name)
    }
}

// =============================================================================
// Metamodel
// =============================================================================

/// One input resource: a set of packages transformed together
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metamodel {
    #[serde(default)]
    pub packages: Vec<Package>,
}

impl Metamodel {
    /// Parse a metamodel from JSON text
    pub fn from_json(content: &str) -> Result<Self, TransformError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Iterate every classifier with the package that declares it
    pub fn classifiers(&self) -> impl Iterator<Item = (&Package, &Classifier)> {
        self.packages
            .iter()
            .flat_map(|p| p.classifiers.iter().map(move |c| (p, c)))
    }
}

/// A named grouping of classifiers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ns_uri: Option<String>,
    #[serde(default)]
    pub classifiers: Vec<Classifier>,
}

// =============================================================================
// Classifiers
// =============================================================================

/// A named type declared in a package
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    Scalar(ScalarDecl),
    Enum(EnumDecl),
    Class(ClassDecl),
}

impl Classifier {
    pub fn name(&self) -> &str {
        match self {
            Classifier::Scalar(s) => &s.name,
            Classifier::Enum(e) => &e.name,
            Classifier::Class(c) => &c.name,
        }
    }

    /// Whether the classifier declares type parameters (unsupported)
    pub fn is_generic(&self) -> bool {
        match self {
            Classifier::Scalar(s) => !s.type_parameters.is_empty(),
            Classifier::Enum(_) => false,
            Classifier::Class(c) => !c.type_parameters.is_empty(),
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Classifier::Scalar(s) => s.description.as_deref(),
            Classifier::Enum(e) => e.description.as_deref(),
            Classifier::Class(c) => c.description.as_deref(),
        }
    }

    pub fn as_class(&self) -> Option<&ClassDecl> {
        match self {
            Classifier::Class(c) => Some(c),
            _ => None,
        }
    }
}

/// Datatype backed by a primitive representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalarDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Instance representation, e.g. `java.lang.String` or `long`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub representation: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_parameters: Vec<String>,
}

/// Enumeration with ordered literals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub literals: Vec<EnumLiteral>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumLiteral {
    pub name: String,
    /// Representation value; defaults to the literal name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal: Option<String>,
}

impl EnumLiteral {
    pub fn value(&self) -> &str {
        self.literal.as_deref().unwrap_or(&self.name)
    }
}

/// Class with supertypes and members
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    /// Direct supertypes, by (optionally qualified) name
    #[serde(default)]
    pub supertypes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_parameters: Vec<String>,
    #[serde(default)]
    pub members: Vec<Member>,
}

impl ClassDecl {
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.members.iter().filter_map(|m| match m {
            Member::Operation(o) => Some(o),
            _ => None,
        })
    }
}

// =============================================================================
// Members
// =============================================================================

/// Typed member of a class
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Member {
    Attribute(Attribute),
    Reference(Reference),
    Operation(Operation),
}

impl Member {
    pub fn name(&self) -> &str {
        match self {
            Member::Attribute(a) => &a.name,
            Member::Reference(r) => &r.name,
            Member::Operation(o) => &o.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub ty: String,
    /// Absent when the metamodel leaves the bounds unspecified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplicity: Option<Multiplicity>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

impl Attribute {
    pub fn is_identifier(&self) -> bool {
        self.annotations
            .get(IDENTIFIER_ANNOTATION)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub ty: String,
    /// Absent when the metamodel leaves the bounds unspecified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplicity: Option<Multiplicity>,
    #[serde(default)]
    pub unique: bool,
    /// Target instances are exclusively owned through this edge
    #[serde(default)]
    pub containment: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Return type; operations without one are not mapped
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    /// Absent when the metamodel leaves the bounds unspecified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplicity: Option<Multiplicity>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_parameters: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

impl Operation {
    /// Name of the reference this operation is a getter for, if annotated
    pub fn getter_of(&self) -> Option<&str> {
        self.annotations.get(GETTER_OF_ANNOTATION).map(String::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    /// Absent when the metamodel leaves the bounds unspecified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplicity: Option<Multiplicity>,
    #[serde(default)]
    pub unique: bool,
}

// =============================================================================
// Multiplicity
// =============================================================================

/// Lower/upper bounds of a typed element; `upper: None` is unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Multiplicity {
    pub lower: u32,
    pub upper: Option<u32>,
}

impl Multiplicity {
    pub const OPTIONAL: Self = Self { lower: 0, upper: Some(1) };
    pub const REQUIRED: Self = Self { lower: 1, upper: Some(1) };
    pub const MANY: Self = Self { lower: 0, upper: None };

    pub fn is_many(&self) -> bool {
        match self.upper {
            None => true,
            Some(u) => u > 1,
        }
    }

    /// Explicit upper bound of exactly one, whatever the lower bound
    pub fn is_single(&self) -> bool {
        self.upper == Some(1)
    }

    /// Parse `0..1`, `1`, `*`, `1..*`, or the words `optional`/`required`/`many`
    pub fn parse(s: &str) -> Result<Self, TransformError> {
        let s = s.trim();
        match s {
            "optional" => return Ok(Self::OPTIONAL),
            "required" => return Ok(Self::REQUIRED),
            "many" => return Ok(Self::MANY),
            _ => {}
        }

        let parse_bound = |b: &str| -> Result<Option<u32>, TransformError> {
            match b.trim() {
                "*" | "-1" => Ok(None),
                n => n
                    .parse::<u32>()
                    .map(Some)
                    .map_err(|_| TransformError::InvalidMultiplicity(s.to_string())),
            }
        };

        let (lower, upper) = match s.split_once("..") {
            Some((lo, hi)) => {
                let lower = parse_bound(lo)?
                    .ok_or_else(|| TransformError::InvalidMultiplicity(s.to_string()))?;
                (lower, parse_bound(hi)?)
            }
            None => match parse_bound(s)? {
                // `*` alone means 0..*
                None => (0, None),
                Some(n) => (n, Some(n)),
            },
        };

        if let Some(u) = upper {
            if u < lower || u == 0 {
                return Err(TransformError::InvalidMultiplicity(s.to_string()));
            }
        }

        Ok(Self { lower, upper })
    }
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upper {
            None => write!(f, "{}..*", self.lower),
            Some(u) => write!(f, "{}..{}", self.lower, u),
        }
    }
}

impl TryFrom<String> for Multiplicity {
    type Error = TransformError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Multiplicity> for String {
    fn from(m: Multiplicity) -> Self {
        m.to_string()
    }
}

// =============================================================================
// Built-in primitives
// =============================================================================

/// Built-in types that map straight onto GraphQL's own scalars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    String,
    Boolean,
    Int,
    Float,
}

impl Primitive {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "String" | "EString" => Some(Self::String),
            "Boolean" | "EBoolean" => Some(Self::Boolean),
            "Int" | "EInt" | "UnsignedInteger" => Some(Self::Int),
            "Float" | "EDouble" => Some(Self::Float),
            _ => None,
        }
    }

    pub fn graphql_name(&self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Boolean => "Boolean",
            Self::Int => "Int",
            Self::Float => "Float",
        }
    }
}

/// Split `package.Name` into its parts; bare names have no package
pub fn split_qualified(name: &str) -> (Option<&str>, &str) {
    match name.rsplit_once('.') {
        Some((pkg, local)) if !pkg.is_empty() && !local.is_empty() => (Some(pkg), local),
        _ => (None, name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplicity_parse() {
        assert_eq!(Multiplicity::parse("0..1").unwrap(), Multiplicity::OPTIONAL);
        assert_eq!(Multiplicity::parse("1").unwrap(), Multiplicity::REQUIRED);
        assert_eq!(Multiplicity::parse("1..1").unwrap(), Multiplicity::REQUIRED);
        assert_eq!(Multiplicity::parse("*").unwrap(), Multiplicity::MANY);
        assert_eq!(Multiplicity::parse("many").unwrap(), Multiplicity::MANY);

        let m = Multiplicity::parse("1..*").unwrap();
        assert!(m.is_many());
        assert!(!m.is_single());
        assert!(Multiplicity::OPTIONAL.is_single());

        assert!(Multiplicity::parse("0..3").unwrap().is_many());
        assert!(Multiplicity::parse("2..1").is_err());
        assert!(Multiplicity::parse("x").is_err());
    }

    #[test]
    fn test_classifier_deserialize() {
        let json = r#"{
            "kind": "class", "name": "Folder", "abstract": false,
            "members": [
                { "kind": "attribute", "name": "id", "type": "String", "multiplicity": "1",
                  "annotations": { "identifier": "TRUE" } },
                { "kind": "reference", "name": "items", "type": "Item", "multiplicity": "*",
                  "containment": true }
            ]
        }"#;
        let c: Classifier = serde_json::from_str(json).unwrap();
        let class = c.as_class().unwrap();
        assert_eq!(class.members.len(), 2);
        match &class.members[0] {
            Member::Attribute(a) => {
                assert!(a.is_identifier());
                assert_eq!(a.multiplicity, Some(Multiplicity::REQUIRED));
            }
            other => panic!("Expected Attribute, got {:?}", other),
        }
        match &class.members[1] {
            Member::Reference(r) => {
                assert!(r.containment);
                assert!(r.multiplicity.is_some_and(|m| m.is_many()));
            }
            other => panic!("Expected Reference, got {:?}", other),
        }
    }

    #[test]
    fn test_split_qualified() {
        assert_eq!(split_qualified("fs.Folder"), (Some("fs"), "Folder"));
        assert_eq!(split_qualified("Folder"), (None, "Folder"));
    }

    #[test]
    fn test_primitive_aliases() {
        assert_eq!(Primitive::from_name("EString"), Some(Primitive::String));
        assert_eq!(Primitive::from_name("UnsignedInteger"), Some(Primitive::Int));
        assert_eq!(Primitive::from_name("EDouble").map(|p| p.graphql_name()), Some("Float"));
        assert_eq!(Primitive::from_name("Folder"), None);
    }
}
