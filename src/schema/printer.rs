//! SDL Printer
//!
//! Renders an assembled [`Schema`] as GraphQL SDL text. Output is fully
//! determined by the schema value and the options: type groups appear in a
//! fixed order, types and fields in the order the schema holds them.

use super::{Argument, EnumType, FieldDef, InterfaceType, ObjectType, ScalarType, Schema};

/// Rendering options
#[derive(Debug, Clone)]
pub struct PrintOptions {
    /// Emit descriptions carried over from the metamodel
    pub descriptions: bool,
    /// Comment lines printed before everything else (without `#`)
    pub header: Vec<String>,
    /// Emit the `schema { query mutation }` definition
    pub schema_definition: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            descriptions: true,
            header: Vec::new(),
            schema_definition: true,
        }
    }
}

/// Render the whole schema
pub fn print_schema(schema: &Schema, options: &PrintOptions) -> String {
    let mut blocks: Vec<String> = Vec::new();

    if !options.header.is_empty() {
        let header: Vec<String> = options
            .header
            .iter()
            .map(|line| if line.is_empty() { "#".to_string() } else { format!("# {}", line) })
            .collect();
        blocks.push(header.join("\n"));
    }

    if options.schema_definition {
        let mut def = String::from("schema {\n");
        def.push_str(&format!("  query: {}\n", schema.query.name));
        if let Some(mutation) = &schema.mutation {
            def.push_str(&format!("  mutation: {}\n", mutation.name));
        }
        def.push('}');
        blocks.push(def);
    }

    blocks.extend(schema.scalars.iter().map(|s| print_scalar(s, options)));
    blocks.extend(schema.enums.iter().map(|e| print_enum(e, options)));
    blocks.extend(schema.interfaces.iter().map(|i| print_interface(i, options)));
    blocks.extend(schema.objects.iter().map(|o| print_object(o, options)));
    blocks.extend(schema.wrappers.iter().map(|o| print_object(o, options)));
    blocks.extend(schema.page_info.iter().map(|o| print_object(o, options)));
    blocks.extend(schema.subtype_enums.iter().map(|e| print_enum(e, options)));
    blocks.push(print_object(&schema.query, options));
    if let Some(mutation) = &schema.mutation {
        blocks.push(print_object(mutation, options));
    }

    let mut out = blocks.join("\n\n");
    out.push('\n');
    out
}

// =============================================================================
// Type Blocks
// =============================================================================

fn print_scalar(scalar: &ScalarType, options: &PrintOptions) -> String {
    let mut out = description_block(scalar.description.as_deref(), "", options);
    out.push_str(&format!("scalar {}", scalar.name));
    out
}

fn print_enum(enum_type: &EnumType, options: &PrintOptions) -> String {
    let mut out = description_block(enum_type.description.as_deref(), "", options);
    out.push_str(&format!("enum {}", enum_type.name));
    if enum_type.values.is_empty() {
        return out;
    }
    out.push_str(" {\n");
    for value in &enum_type.values {
        out.push_str(&format!("  {}\n", value.name));
    }
    out.push('}');
    out
}

fn print_interface(interface: &InterfaceType, options: &PrintOptions) -> String {
    let mut out = description_block(interface.description.as_deref(), "", options);
    out.push_str(&format!("interface {}", interface.name));
    out.push_str(&print_fields(&interface.fields, options));
    out
}

fn print_object(object: &ObjectType, options: &PrintOptions) -> String {
    let mut out = description_block(object.description.as_deref(), "", options);
    out.push_str(&format!("type {}", object.name));
    if !object.implements.is_empty() {
        out.push_str(&format!(" implements {}", object.implements.join(" & ")));
    }
    out.push_str(&print_fields(&object.fields, options));
    out
}

fn print_fields(fields: &[FieldDef], options: &PrintOptions) -> String {
    // A type without fields prints as a bare definition
    if fields.is_empty() {
        return String::new();
    }
    let mut out = String::from(" {\n");
    for field in fields {
        out.push_str(&description_block(field.description.as_deref(), "  ", options));
        out.push_str(&format!(
            "  {}{}: {}\n",
            field.name,
            print_arguments(&field.arguments, options),
            field.ty
        ));
    }
    out.push('}');
    out
}

/// Arguments stay on the field's line; descriptions are printed inline as strings
fn print_arguments(arguments: &[Argument], options: &PrintOptions) -> String {
    if arguments.is_empty() {
        return String::new();
    }
    let rendered: Vec<String> = arguments
        .iter()
        .map(|a| {
            let mut out = String::new();
            if let Some(text) = inline_description(a.description.as_deref(), options) {
                out.push_str(&format!("\"{}\" ", escape_string(text)));
            }
            out.push_str(&format!("{}: {}", a.name, a.ty));
            if let Some(default) = &a.default {
                out.push_str(&format!(" = {}", default));
            }
            out
        })
        .collect();
    format!("({})", rendered.join(", "))
}

// =============================================================================
// Descriptions
// =============================================================================

fn inline_description<'a>(description: Option<&'a str>, options: &PrintOptions) -> Option<&'a str> {
    if !options.descriptions {
        return None;
    }
    description.map(str::trim).filter(|d| !d.is_empty())
}

fn description_block(description: Option<&str>, indent: &str, options: &PrintOptions) -> String {
    let Some(text) = inline_description(description, options) else {
        return String::new();
    };

    if text.contains('\n') {
        let mut out = format!("{}\"\"\"\n", indent);
        for line in text.lines() {
            out.push_str(&format!("{}{}\n", indent, line.replace("\"\"\"", "\\\"\"\"")));
        }
        out.push_str(&format!("{}\"\"\"\n", indent));
        out
    } else {
        format!("{}\"{}\"\n", indent, escape_string(text))
    }
}

/// Escape a value for a single-line GraphQL string literal
pub(crate) fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DefaultValue, EnumValue, TypeRef};

    fn minimal() -> Schema {
        let mut shape = ObjectType::new("Circle");
        shape.implements = vec!["Shape".to_string()];
        shape.fields = vec![
            FieldDef::new("id", TypeRef::non_null(TypeRef::named("String")))
                .with_description(Some("Unique key".to_string())),
            FieldDef::new("radius", TypeRef::named("Float")),
        ];

        let mut query = ObjectType::new("Query");
        query.fields = vec![FieldDef::new(
            "allCircles",
            TypeRef::list(TypeRef::named("Circle")),
        )
        .with_arguments(vec![
            Argument::new("skip", TypeRef::named("Int")).with_default(DefaultValue::Int(0)),
            Argument::new("reverse", TypeRef::named("Boolean"))
                .with_default(DefaultValue::Boolean(false)),
        ])];

        Schema {
            scalars: Vec::new(),
            enums: vec![EnumType {
                name: "Mode".to_string(),
                values: vec![EnumValue { name: "READ".to_string(), value: "r".to_string() }],
                description: None,
            }],
            interfaces: vec![InterfaceType {
                name: "Shape".to_string(),
                fields: vec![FieldDef::new("id", TypeRef::non_null(TypeRef::named("String")))],
                description: None,
            }],
            objects: vec![shape],
            wrappers: Vec::new(),
            page_info: None,
            subtype_enums: Vec::new(),
            query,
            mutation: None,
        }
    }

    #[test]
    fn test_print_order_and_shape() {
        let sdl = print_schema(&minimal(), &PrintOptions::default());
        let expected = r#"schema {
  query: Query
}

enum Mode {
  READ
}

interface Shape {
  id: String!
}

type Circle implements Shape {
  "Unique key"
  id: String!
  radius: Float
}

type Query {
  allCircles(skip: Int = 0, reverse: Boolean = false): [Circle]
}
"#;
        assert_eq!(sdl, expected);
    }

    #[test]
    fn test_options_toggle_header_and_descriptions() {
        let options = PrintOptions {
            descriptions: false,
            header: vec!["Generated from fs.json".to_string()],
            schema_definition: false,
        };
        let sdl = print_schema(&minimal(), &options);
        assert!(sdl.starts_with("# Generated from fs.json\n\nenum Mode"));
        assert!(!sdl.contains("Unique key"));
        assert!(!sdl.contains("schema {"));
    }

    #[test]
    fn test_argument_descriptions_inline() {
        let field = FieldDef::new("items", TypeRef::named("Int")).with_arguments(vec![
            Argument::new("take", TypeRef::named("Int"))
                .with_default(DefaultValue::Int(-1))
                .with_description(Some("-1 means \"all\"".to_string())),
            Argument::new("filter", TypeRef::named("String")),
        ]);

        let described = print_fields(std::slice::from_ref(&field), &PrintOptions::default());
        assert_eq!(
            described,
            " {\n  items(\"-1 means \\\"all\\\"\" take: Int = -1, filter: String): Int\n}"
        );

        let plain = PrintOptions { descriptions: false, ..PrintOptions::default() };
        let bare = print_fields(std::slice::from_ref(&field), &plain);
        assert_eq!(bare, " {\n  items(take: Int = -1, filter: String): Int\n}");
    }

    #[test]
    fn test_multiline_description_uses_block_string() {
        let block = description_block(Some("first\nsecond"), "  ", &PrintOptions::default());
        assert_eq!(block, "  \"\"\"\n  first\n  second\n  \"\"\"\n");
    }
}
