//! GraphQL Schema Model
//!
//! Output side of the transformation: named types with fields, arguments and
//! type references. Built by the assembler, rendered to SDL by [`printer`].

pub mod printer;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use printer::{print_schema, PrintOptions};

// =============================================================================
// Type References
// =============================================================================

/// Reference to a named type, possibly wrapped in list / non-null
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn list(inner: TypeRef) -> Self {
        TypeRef::List(Box::new(inner))
    }

    /// Wrap in non-null; already non-null references are returned unchanged
    pub fn non_null(inner: TypeRef) -> Self {
        match inner {
            TypeRef::NonNull(_) => inner,
            other => TypeRef::NonNull(Box::new(other)),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(n) => write!(f, "{}", n),
            TypeRef::List(inner) => write!(f, "[{}]", inner),
            TypeRef::NonNull(inner) => write!(f, "{}!", inner),
        }
    }
}

// =============================================================================
// Fields and Arguments
// =============================================================================

/// Literal default value of an argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DefaultValue {
    Boolean(bool),
    Int(i64),
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Boolean(b) => write!(f, "{}", b),
            DefaultValue::Int(i) => write!(f, "{}", i),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    pub ty: TypeRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Argument {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            description: None,
        }
    }

    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub ty: TypeRef,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<Argument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            arguments: Vec::new(),
            description: None,
        }
    }

    pub fn with_arguments(mut self, arguments: Vec<Argument>) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn argument(&self, name: &str) -> Option<&Argument> {
        self.arguments.iter().find(|a| a.name == name)
    }
}

// =============================================================================
// Named Types
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectType {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub implements: Vec<String>,
    pub fields: Vec<FieldDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            implements: Vec::new(),
            fields: Vec::new(),
            description: None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceType {
    pub name: String,
    pub fields: Vec<FieldDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl InterfaceType {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValue {
    /// Upper-cased GraphQL value name
    pub name: String,
    /// Underlying literal value, verbatim from the metamodel
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumType {
    pub name: String,
    pub values: Vec<EnumValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EnumType {
    pub fn value_names(&self) -> Vec<&str> {
        self.values.iter().map(|v| v.name.as_str()).collect()
    }
}

/// How a custom scalar coerces values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarCoercion {
    String,
    Int,
    Float,
    Boolean,
}

impl ScalarCoercion {
    /// Coercion for a scalar's instance representation; `None` if unsupported
    pub fn from_representation(representation: &str) -> Option<Self> {
        match representation.trim() {
            "string" | "java.lang.String" => Some(Self::String),
            "int" | "integer" | "long" | "java.lang.Integer" | "java.lang.Long"
            | "java.math.BigInteger" | "java.math.BigDecimal" => Some(Self::Int),
            "float" | "double" | "java.lang.Float" | "java.lang.Double" => Some(Self::Float),
            "boolean" | "java.lang.Boolean" => Some(Self::Boolean),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalarType {
    pub name: String,
    pub coercion: ScalarCoercion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// =============================================================================
// Schema
// =============================================================================

/// Complete assembled schema, grouped in print order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub scalars: Vec<ScalarType>,
    pub enums: Vec<EnumType>,
    pub interfaces: Vec<InterfaceType>,
    pub objects: Vec<ObjectType>,
    /// `<T>PaginatedCollection` wrappers
    pub wrappers: Vec<ObjectType>,
    pub page_info: Option<ObjectType>,
    /// `AllSubtypesOf<T>` and `AllConcreteSubtypesOf<T>` enums
    pub subtype_enums: Vec<EnumType>,
    pub query: ObjectType,
    pub mutation: Option<ObjectType>,
}

impl Schema {
    /// Look up any object-like type by name (objects, wrappers, PageInfo, roots)
    pub fn object(&self, name: &str) -> Option<&ObjectType> {
        self.objects
            .iter()
            .chain(self.wrappers.iter())
            .chain(self.page_info.iter())
            .chain(std::iter::once(&self.query))
            .chain(self.mutation.iter())
            .find(|o| o.name == name)
    }

    pub fn interface(&self, name: &str) -> Option<&InterfaceType> {
        self.interfaces.iter().find(|i| i.name == name)
    }

    /// Look up a metamodel or subtype enum by name
    pub fn enum_type(&self, name: &str) -> Option<&EnumType> {
        self.enums
            .iter()
            .chain(self.subtype_enums.iter())
            .find(|e| e.name == name)
    }

    pub fn scalar(&self, name: &str) -> Option<&ScalarType> {
        self.scalars.iter().find(|s| s.name == name)
    }

    /// Field on an object or interface
    pub fn field(&self, type_name: &str, field_name: &str) -> Option<&FieldDef> {
        match self.object(type_name) {
            Some(o) => o.field(field_name),
            None => self.interface(type_name)?.field(field_name),
        }
    }

    /// Every named type in print order
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        names.extend(self.scalars.iter().map(|s| s.name.as_str()));
        names.extend(self.enums.iter().map(|e| e.name.as_str()));
        names.extend(self.interfaces.iter().map(|i| i.name.as_str()));
        names.extend(self.objects.iter().map(|o| o.name.as_str()));
        names.extend(self.wrappers.iter().map(|o| o.name.as_str()));
        names.extend(self.page_info.iter().map(|o| o.name.as_str()));
        names.extend(self.subtype_enums.iter().map(|e| e.name.as_str()));
        names.push(self.query.name.as_str());
        names.extend(self.mutation.iter().map(|o| o.name.as_str()));
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ref_display() {
        let t = TypeRef::non_null(TypeRef::list(TypeRef::named("Item")));
        assert_eq!(t.to_string(), "[Item]!");

        // non_null is idempotent
        assert_eq!(TypeRef::non_null(t.clone()), t);
    }

    #[test]
    fn test_scalar_representations() {
        assert_eq!(
            ScalarCoercion::from_representation("java.lang.String"),
            Some(ScalarCoercion::String)
        );
        assert_eq!(
            ScalarCoercion::from_representation("java.math.BigInteger"),
            Some(ScalarCoercion::Int)
        );
        assert_eq!(ScalarCoercion::from_representation("double"), Some(ScalarCoercion::Float));
        assert_eq!(ScalarCoercion::from_representation("java.util.Date"), None);
    }

    #[test]
    fn test_default_value_display() {
        assert_eq!(DefaultValue::Boolean(false).to_string(), "false");
        assert_eq!(DefaultValue::Int(-1).to_string(), "-1");
    }
}
