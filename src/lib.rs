//! Metamodel → GraphQL
//!
//! Compiles class-based metamodels (packages of scalars, enumerations and
//! classes with attributes, references and operations) into GraphQL schemas.
//!
//! ## Features
//!
//! - **Type Mapping**: Scalars, enums, interfaces for abstract classes, objects
//!   for concrete ones, with inherited fields flattened into every subtype
//! - **Pagination**: Multi-valued class-typed fields return a
//!   `<T>PaginatedCollection!` with filter/sort/reverse/skip/take arguments
//! - **Root Inference**: Classes nothing contains become `Query.all<Plural>`
//! - **Mutations**: Containment references of identified classes become
//!   creation mutations keyed by the container's identifier
//! - **Diagnostics**: Unsupported constructs are skipped and reported;
//!   errors reject the resource as a whole
//!
//! ## Pipeline
//!
//! ```text
//! metamodel.json
//!   └─ Scope → Registrar → Mapper → flatten → synthesis → assemble
//!        └─ Schema ──print_schema──▶ metamodel.json.graphqls
//! ```

pub mod checksum;
pub mod config;
pub mod error;
pub mod graph;
pub mod metamodel;
pub mod schema;
pub mod transform;

pub use checksum::Checksum;
pub use config::TransformConfig;
pub use error::{Result, TransformError};
pub use graph::{DiagnosticCode, Diagnostics, Severity};
pub use metamodel::Metamodel;
pub use schema::{print_schema, PrintOptions, Schema};
pub use transform::{transform, TransformOutput};
