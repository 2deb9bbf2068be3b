//! Classifier Registrar (pass 1)
//!
//! Visits every classifier once and creates its type shell: scalar with a
//! coercion, enum, interface (abstract class) or object (concrete class).
//! Supertype edges go into the [`ClassGraph`]; the subclass index falls out
//! of it. No members are looked at here.

use std::collections::HashMap;

use super::names::NameValidator;
use super::scope::{Resolution, Scope};
use crate::error::{Result, TransformError};
use crate::graph::{ClassGraph, ClassGraphBuilder, DiagnosticCode, Diagnostics};
use crate::metamodel::{ClassDecl, Classifier, ClassifierId};
use crate::schema::ScalarCoercion;

/// Kind of type shell created for a classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellKind {
    Scalar(ScalarCoercion),
    Enum,
    Interface,
    Object {
        /// Abstract ancestors, in ancestor order
        implements: Vec<String>,
    },
}

/// Empty type skeleton for one registered classifier
#[derive(Debug, Clone)]
pub struct Shell {
    pub id: ClassifierId,
    pub kind: ShellKind,
    pub description: Option<String>,
}

impl Shell {
    pub fn name(&self) -> &str {
        &self.id.name
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind, ShellKind::Interface | ShellKind::Object { .. })
    }
}

/// Output of pass 1: registered shells plus the inheritance graph
#[derive(Debug)]
pub struct Registry<'m> {
    scope: Scope<'m>,
    shells: Vec<Shell>,
    index: HashMap<ClassifierId, usize>,
    graph: ClassGraph,
}

impl<'m> Registry<'m> {
    pub fn scope(&self) -> &Scope<'m> {
        &self.scope
    }

    pub fn graph(&self) -> &ClassGraph {
        &self.graph
    }

    /// Shells in declaration order
    pub fn shells(&self) -> &[Shell] {
        &self.shells
    }

    pub fn shell(&self, id: &ClassifierId) -> Option<&Shell> {
        self.index.get(id).map(|&i| &self.shells[i])
    }

    pub fn is_registered(&self, id: &ClassifierId) -> bool {
        self.index.contains_key(id)
    }

    pub fn is_class(&self, id: &ClassifierId) -> bool {
        self.shell(id).map(Shell::is_class).unwrap_or(false)
    }

    /// Declaration of a registered class
    pub fn class_decl(&self, id: &ClassifierId) -> Option<&'m ClassDecl> {
        if !self.is_class(id) {
            return None;
        }
        self.scope.get(id).and_then(Classifier::as_class)
    }

    /// Registered classes in declaration order
    pub fn classes(&self) -> impl Iterator<Item = (&Shell, &'m ClassDecl)> + '_ {
        self.shells
            .iter()
            .filter(|s| s.is_class())
            .filter_map(move |s| self.scope.get(&s.id).and_then(Classifier::as_class).map(|c| (s, c)))
    }
}

/// Pass 1 driver
pub struct Registrar<'a, 'm> {
    scope: Scope<'m>,
    names: &'a NameValidator,
    diagnostics: &'a mut Diagnostics,
    shells: Vec<Shell>,
    index: HashMap<ClassifierId, usize>,
    builder: ClassGraphBuilder,
}

impl<'a, 'm> Registrar<'a, 'm> {
    /// Register every classifier of the scope.
    ///
    /// An inheritance cycle aborts with [`TransformError::Rejected`] carrying
    /// everything reported so far.
    pub fn run(
        scope: Scope<'m>,
        names: &'a NameValidator,
        diagnostics: &'a mut Diagnostics,
    ) -> Result<Registry<'m>> {
        let mut registrar = Registrar {
            scope,
            names,
            diagnostics,
            shells: Vec::new(),
            index: HashMap::new(),
            builder: ClassGraphBuilder::new(),
        };

        let classifiers: Vec<(ClassifierId, &'m Classifier)> = registrar
            .scope
            .iter()
            .map(|(id, c)| (id.clone(), c))
            .collect();

        for (id, classifier) in &classifiers {
            registrar.register(id, *classifier);
        }
        for (id, classifier) in &classifiers {
            if let Classifier::Class(class) = classifier {
                registrar.link_supertypes(id, class);
            }
        }

        registrar.finish()
    }

    fn register(&mut self, id: &ClassifierId, classifier: &'m Classifier) {
        if self.index.contains_key(id) {
            return;
        }

        if !self.names.is_valid(classifier.name()) {
            self.diagnostics.report(
                id.to_string(),
                DiagnosticCode::InvalidName,
                format!("'{}' is not a valid GraphQL name; classifier skipped", classifier.name()),
            );
            return;
        }

        if classifier.is_generic() {
            self.diagnostics.report(
                id.to_string(),
                DiagnosticCode::TypeParameters,
                "classifiers with type parameters are not supported; skipped",
            );
            return;
        }

        let kind = match classifier {
            Classifier::Scalar(scalar) => {
                let coercion = scalar
                    .representation
                    .as_deref()
                    .and_then(ScalarCoercion::from_representation);
                match coercion {
                    Some(c) => ShellKind::Scalar(c),
                    None => {
                        self.diagnostics.report(
                            id.to_string(),
                            DiagnosticCode::UnsupportedScalar,
                            format!(
                                "no GraphQL coercion for representation '{}'; scalar skipped",
                                scalar.representation.as_deref().unwrap_or("<none>")
                            ),
                        );
                        return;
                    }
                }
            }
            Classifier::Enum(_) => ShellKind::Enum,
            Classifier::Class(class) => {
                self.builder.add_class(id.clone(), class.is_abstract);
                if class.is_abstract {
                    ShellKind::Interface
                } else {
                    // Filled in once the graph is frozen
                    ShellKind::Object { implements: Vec::new() }
                }
            }
        };

        tracing::debug!(classifier = %id, kind = ?kind, "registered");

        self.index.insert(id.clone(), self.shells.len());
        self.shells.push(Shell {
            id: id.clone(),
            kind,
            description: classifier.description().map(str::to_string),
        });
    }

    fn link_supertypes(&mut self, id: &ClassifierId, class: &ClassDecl) {
        if !self.builder.contains(id) {
            return;
        }

        for name in &class.supertypes {
            let target = match self.scope.resolve(&id.package, name) {
                Resolution::Classifier(sup, _) if self.builder.contains(sup) => Some(sup.clone()),
                _ => None,
            };
            match target {
                Some(sup) => {
                    self.builder.add_supertype(id, &sup);
                }
                None => {
                    self.diagnostics.report(
                        id.to_string(),
                        DiagnosticCode::UnresolvedSupertype,
                        format!("supertype '{}' is not a registered class; edge ignored", name),
                    );
                }
            }
        }
    }

    fn finish(self) -> Result<Registry<'m>> {
        let Registrar {
            scope,
            diagnostics,
            mut shells,
            index,
            builder,
            ..
        } = self;

        let graph = match builder.build() {
            Ok(graph) => graph,
            Err(cycles) => {
                for members in cycles {
                    let names: Vec<String> = members.iter().map(ToString::to_string).collect();
                    diagnostics.report(
                        names.join(" -> "),
                        DiagnosticCode::InheritanceCycle,
                        "supertype chain loops back on itself",
                    );
                }
                return Err(TransformError::Rejected(std::mem::take(diagnostics)));
            }
        };

        for shell in &mut shells {
            if let ShellKind::Object { implements } = &mut shell.kind {
                *implements = graph
                    .abstract_ancestors(&shell.id)
                    .map(|a| a.name.clone())
                    .collect();
            }
        }

        tracing::debug!(
            shells = shells.len(),
            classes = graph.class_count(),
            edges = graph.edge_count(),
            "registration complete"
        );

        Ok(Registry {
            scope,
            shells,
            index,
            graph,
        })
    }
}
