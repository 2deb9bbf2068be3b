//! Metamodel → GraphQL Transformation
//!
//! Strictly ordered pipeline, each stage reading the previous stage's output:
//!
//! ```text
//! Metamodel
//!   └─ Scope::build         name index, collisions, reserved names
//!   └─ Registrar::run       type shells + inheritance graph   → Registry
//!   └─ Mapper::run          fields, enum values, bookkeeping  → MemberTable
//!   └─ flatten              inherited fields                  → FlatTypes
//!   └─ collections / roots / mutations                        → synthesized parts
//!   └─ assemble                                               → Schema
//! ```
//!
//! Unsupported constructs are skipped with a diagnostic. Error-severity
//! diagnostics reject the resource as a whole; no partial schema is returned.

pub mod assemble;
pub mod collections;
pub mod flatten;
pub mod mapper;
pub mod mutations;
pub mod names;
pub mod registrar;
pub mod roots;
pub mod scope;

use crate::error::{Result, TransformError};
use crate::graph::Diagnostics;
use crate::metamodel::Metamodel;
use crate::schema::Schema;

use assemble::{assemble, Parts};
use mapper::Mapper;
use names::NameValidator;
use registrar::Registrar;
use scope::Scope;

/// Successful transformation: the schema plus non-fatal diagnostics
#[derive(Debug, Clone)]
pub struct TransformOutput {
    pub schema: Schema,
    pub diagnostics: Diagnostics,
}

/// Transform one metamodel resource into a GraphQL schema
pub fn transform(metamodel: &Metamodel) -> Result<TransformOutput> {
    let mut diagnostics = Diagnostics::new();
    let names = NameValidator::new()?;

    let scope = Scope::build(metamodel, &mut diagnostics);
    let registry = Registrar::run(scope, &names, &mut diagnostics)?;
    reject_on_errors(&mut diagnostics)?;

    let table = Mapper::run(&registry, &names, &mut diagnostics)?;
    let flat = flatten::flatten(&registry, &table)?;

    let collection_types = collections::synthesize(&registry, table.collections());
    let roots = roots::root_fields(&registry, table.contained());
    let mutation_types = mutations::synthesize(&registry, &table, &mut diagnostics);

    let schema = assemble(
        &registry,
        Parts {
            table: &table,
            flat: &flat,
            collections: collection_types,
            roots,
            mutations: mutation_types,
        },
        &mut diagnostics,
    );
    reject_on_errors(&mut diagnostics)?;

    tracing::info!(
        types = schema.type_names().len(),
        warnings = diagnostics.warning_count(),
        "metamodel transformed"
    );

    Ok(TransformOutput { schema, diagnostics })
}

fn reject_on_errors(diagnostics: &mut Diagnostics) -> Result<()> {
    if diagnostics.has_errors() {
        return Err(TransformError::Rejected(std::mem::take(diagnostics)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DiagnosticCode;

    #[test]
    fn test_empty_metamodel_has_bare_query() {
        let out = transform(&Metamodel::default()).unwrap();
        assert!(out.schema.query.fields.is_empty());
        assert!(out.schema.mutation.is_none());
        assert!(out.schema.page_info.is_none());
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_collision_rejects_resource() {
        let m = Metamodel::from_json(
            r#"{"packages": [
                {"name": "a", "classifiers": [{"kind": "class", "name": "Node"}]},
                {"name": "b", "classifiers": [{"kind": "class", "name": "Node"}]}
            ]}"#,
        )
        .unwrap();

        match transform(&m) {
            Err(TransformError::Rejected(diags)) => {
                assert_eq!(diags.with_code(DiagnosticCode::TypeNameCollision).count(), 1);
                // The informational union note is carried along
                assert_eq!(diags.with_code(DiagnosticCode::MultiplePackages).count(), 1);
            }
            other => panic!("Expected Rejected, got {:?}", other.map(|o| o.schema)),
        }
    }
}
