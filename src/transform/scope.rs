//! Name Resolution Scope
//!
//! Indexes every classifier of the processed packages by qualified identity
//! and by bare name. Resolution order for a bare name: built-in primitive,
//! the declaring package, then any processed package.
//!
//! GraphQL type names are global, so a bare name declared by two packages is
//! rejected here rather than silently merged.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use std::collections::HashMap;

use super::names::RESERVED_TYPE_NAMES;
use crate::graph::{DiagnosticCode, Diagnostics};
use crate::metamodel::{split_qualified, Classifier, ClassifierId, Metamodel, Primitive};

/// Outcome of resolving a type name
#[derive(Debug, Clone, Copy)]
pub enum Resolution<'s> {
    Builtin(Primitive),
    Classifier(&'s ClassifierId, &'s Classifier),
    /// Outside the processed packages
    External,
}

#[derive(Debug)]
pub struct Scope<'m> {
    classifiers: HashMap<ClassifierId, &'m Classifier>,
    /// Declaration order
    order: Vec<ClassifierId>,
    by_name: HashMap<String, Vec<ClassifierId>>,
    packages: Vec<String>,
}

impl<'m> Scope<'m> {
    /// Index the metamodel, reporting duplicates, collisions and reserved names
    pub fn build(metamodel: &'m Metamodel, diagnostics: &mut Diagnostics) -> Self {
        let mut scope = Scope {
            classifiers: HashMap::new(),
            order: Vec::new(),
            by_name: HashMap::new(),
            packages: metamodel.packages.iter().map(|p| p.name.clone()).collect(),
        };

        if metamodel.packages.len() > 1 {
            diagnostics.report(
                scope.packages.join(", "),
                DiagnosticCode::MultiplePackages,
                format!(
                    "schema is the union of all {} input packages",
                    metamodel.packages.len()
                ),
            );
        }

        for (package, classifier) in metamodel.classifiers() {
            let id = ClassifierId::new(&package.name, classifier.name());
            if scope.classifiers.contains_key(&id) {
                diagnostics.report(
                    id.to_string(),
                    DiagnosticCode::DuplicateClassifier,
                    "classifier declared more than once; later declaration ignored",
                );
                continue;
            }

            if RESERVED_TYPE_NAMES.contains(&classifier.name()) {
                diagnostics.report(
                    id.to_string(),
                    DiagnosticCode::ReservedTypeName,
                    format!("'{}' is reserved in the generated schema", classifier.name()),
                );
            }

            scope
                .by_name
                .entry(classifier.name().to_string())
                .or_default()
                .push(id.clone());
            scope.classifiers.insert(id.clone(), classifier);
            scope.order.push(id);
        }

        // Deterministic report order
        let mut collisions: Vec<(&String, &Vec<ClassifierId>)> =
            scope.by_name.iter().filter(|(_, ids)| ids.len() > 1).collect();
        collisions.sort_by(|a, b| a.0.cmp(b.0));
        for (name, ids) in collisions {
            let packages: Vec<&str> = ids.iter().map(|id| id.package.as_str()).collect();
            diagnostics.name_collision(name, &packages);
        }

        scope
    }

    /// Classifiers in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&ClassifierId, &'m Classifier)> + '_ {
        self.order
            .iter()
            .filter_map(move |id| self.classifiers.get(id).map(|c| (id, *c)))
    }

    pub fn get(&self, id: &ClassifierId) -> Option<&'m Classifier> {
        self.classifiers.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn is_processed_package(&self, name: &str) -> bool {
        self.packages.iter().any(|p| p == name)
    }

    /// Resolve a type name as seen from `from_package`
    pub fn resolve(&self, from_package: &str, name: &str) -> Resolution<'_> {
        let (qualifier, local) = split_qualified(name);

        if let Some(package) = qualifier {
            let id = ClassifierId::new(package, local);
            if let Some((id, c)) = self.classifiers.get_key_value(&id) {
                return Resolution::Classifier(id, *c);
            }
            // `ecore.EString` and friends from an unprocessed package
            if !self.is_processed_package(package) {
                if let Some(p) = Primitive::from_name(local) {
                    return Resolution::Builtin(p);
                }
            }
            return Resolution::External;
        }

        if let Some(p) = Primitive::from_name(local) {
            return Resolution::Builtin(p);
        }

        let local_id = ClassifierId::new(from_package, local);
        if let Some((id, c)) = self.classifiers.get_key_value(&local_id) {
            return Resolution::Classifier(id, *c);
        }

        match self.by_name.get(local).and_then(|ids| ids.first()) {
            Some(id) => match self.classifiers.get_key_value(id) {
                Some((id, c)) => Resolution::Classifier(id, *c),
                None => Resolution::External,
            },
            None => Resolution::External,
        }
    }

    /// Closest known classifier name, for "did you mean" hints
    pub fn suggest(&self, name: &str) -> Option<String> {
        let (_, local) = split_qualified(name);
        let matcher = SkimMatcherV2::default();

        let mut best: Option<(i64, &str)> = None;
        for candidate in self.by_name.keys() {
            let Some(score) = matcher.fuzzy_match(candidate, local) else {
                continue;
            };
            let better = match best {
                None => true,
                Some((s, n)) => score > s || (score == s && candidate.as_str() < n),
            };
            if better {
                best = Some((score, candidate.as_str()));
            }
        }

        best.map(|(_, n)| n.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metamodel(json: &str) -> Metamodel {
        Metamodel::from_json(json).unwrap()
    }

    #[test]
    fn test_resolution_order() {
        let m = metamodel(
            r#"{"packages": [
                {"name": "a", "classifiers": [{"kind": "class", "name": "Node"}]},
                {"name": "b", "classifiers": [{"kind": "enum", "name": "Mode"}]}
            ]}"#,
        );
        let mut diags = Diagnostics::new();
        let scope = Scope::build(&m, &mut diags);

        assert_eq!(diags.with_code(DiagnosticCode::MultiplePackages).count(), 1);
        assert!(!diags.has_errors());

        assert!(matches!(scope.resolve("a", "EString"), Resolution::Builtin(Primitive::String)));
        assert!(matches!(
            scope.resolve("a", "ecore.EInt"),
            Resolution::Builtin(Primitive::Int)
        ));
        match scope.resolve("a", "Mode") {
            Resolution::Classifier(id, _) => assert_eq!(id, &ClassifierId::new("b", "Mode")),
            other => panic!("Expected Classifier, got {:?}", other),
        }
        assert!(matches!(scope.resolve("b", "a.Node"), Resolution::Classifier(..)));
        assert!(matches!(scope.resolve("a", "b.Node"), Resolution::External));
        assert!(matches!(scope.resolve("a", "Person"), Resolution::External));
    }

    #[test]
    fn test_collision_and_reserved_are_errors() {
        let m = metamodel(
            r#"{"packages": [
                {"name": "a", "classifiers": [
                    {"kind": "class", "name": "Node"},
                    {"kind": "class", "name": "Query"}
                ]},
                {"name": "b", "classifiers": [{"kind": "class", "name": "Node"}]}
            ]}"#,
        );
        let mut diags = Diagnostics::new();
        Scope::build(&m, &mut diags);

        assert_eq!(diags.with_code(DiagnosticCode::TypeNameCollision).count(), 1);
        assert_eq!(diags.with_code(DiagnosticCode::ReservedTypeName).count(), 1);
        assert_eq!(diags.error_count(), 2);
    }

    #[test]
    fn test_duplicate_is_ignored_with_warning() {
        let m = metamodel(
            r#"{"packages": [{"name": "a", "classifiers": [
                {"kind": "class", "name": "Node", "abstract": true},
                {"kind": "enum", "name": "Node"}
            ]}]}"#,
        );
        let mut diags = Diagnostics::new();
        let scope = Scope::build(&m, &mut diags);

        assert_eq!(scope.len(), 1);
        assert!(scope.get(&ClassifierId::new("a", "Node")).and_then(|c| c.as_class()).is_some());
        assert_eq!(diags.with_code(DiagnosticCode::DuplicateClassifier).count(), 1);
    }

    #[test]
    fn test_suggest() {
        let m = metamodel(
            r#"{"packages": [{"name": "a", "classifiers": [
                {"kind": "class", "name": "Person"},
                {"kind": "class", "name": "Folder"}
            ]}]}"#,
        );
        let mut diags = Diagnostics::new();
        let scope = Scope::build(&m, &mut diags);

        assert_eq!(scope.suggest("other.Persn").as_deref(), Some("Person"));
        assert_eq!(scope.suggest("zzz"), None);
    }
}
