//! Diagnostics
//!
//! Collects warnings and errors raised while transforming a metamodel.
//! Unsupported constructs are recorded and skipped; error-severity items make
//! the whole resource fail.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Diagnostic Codes
// =============================================================================

/// Diagnostic code for categorizing issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    // === Unsupported constructs ===
    /// Classifier or operation declares type parameters
    TypeParameters,
    /// Scalar representation has no GraphQL coercion
    UnsupportedScalar,
    /// Member type lies outside the processed packages
    ExternalType,
    /// Reference target is not a class
    NonClassReference,
    /// Operation has no return type
    MissingReturnType,
    /// Name is not a valid GraphQL name
    InvalidName,
    /// Supertype does not resolve to a registered class
    UnresolvedSupertype,

    // === Model quality ===
    /// Same qualified classifier declared twice
    DuplicateClassifier,
    /// More than one identifier attribute visible on a class
    AmbiguousIdentifier,
    /// Reference hidden by a getter operation of the same name
    ShadowedReference,
    /// Resource contains more than one package
    MultiplePackages,

    // === Fatal ===
    /// Two packages declare the same classifier name
    TypeNameCollision,
    /// Classifier name clashes with a synthesized type
    ReservedTypeName,
    /// Supertype chain loops back on itself
    InheritanceCycle,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TypeParameters => "W001",
            Self::UnsupportedScalar => "W002",
            Self::ExternalType => "W003",
            Self::NonClassReference => "W004",
            Self::MissingReturnType => "W005",
            Self::InvalidName => "W006",
            Self::UnresolvedSupertype => "W007",
            Self::DuplicateClassifier => "W008",
            Self::AmbiguousIdentifier => "W009",
            Self::ShadowedReference => "I001",
            Self::MultiplePackages => "I002",
            Self::TypeNameCollision => "E001",
            Self::ReservedTypeName => "E002",
            Self::InheritanceCycle => "E003",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::TypeNameCollision | Self::ReservedTypeName | Self::InheritanceCycle => {
                Severity::Error
            }

            Self::ShadowedReference | Self::MultiplePackages => Severity::Info,

            Self::TypeParameters
            | Self::UnsupportedScalar
            | Self::ExternalType
            | Self::NonClassReference
            | Self::MissingReturnType
            | Self::InvalidName
            | Self::UnresolvedSupertype
            | Self::DuplicateClassifier
            | Self::AmbiguousIdentifier => Severity::Warning,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Severity
// =============================================================================

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

// =============================================================================
// Diagnostic Item
// =============================================================================

/// A single diagnostic item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticItem {
    /// Classifier or member the diagnostic is about (`pkg.Class::member`)
    pub subject: String,
    pub code: DiagnosticCode,
    pub message: String,
    /// Additional context (suggestions, related classifiers)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
}

impl DiagnosticItem {
    pub fn new(subject: impl Into<String>, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            code,
            message: message.into(),
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for DiagnosticItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({})",
            self.code,
            self.code.severity(),
            self.message,
            self.subject
        )?;

        for ctx in &self.context {
            write!(f, "\n  - {}", ctx)?;
        }

        Ok(())
    }
}

// =============================================================================
// Diagnostics Collection
// =============================================================================

/// Collection of diagnostics from one transformation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<DiagnosticItem>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic item, mirroring it to the log
    pub fn push(&mut self, item: DiagnosticItem) {
        match item.severity() {
            Severity::Error => tracing::error!(code = %item.code, subject = %item.subject, "{}", item.message),
            Severity::Warning => tracing::warn!(code = %item.code, subject = %item.subject, "{}", item.message),
            Severity::Info => tracing::info!(code = %item.code, subject = %item.subject, "{}", item.message),
        }
        self.items.push(item);
    }

    /// Record a diagnostic; severity follows from the code
    pub fn report(
        &mut self,
        subject: impl Into<String>,
        code: DiagnosticCode,
        message: impl Into<String>,
    ) {
        self.push(DiagnosticItem::new(subject, code, message));
    }

    /// Record a type that resolves to no processed package
    pub fn external_type(&mut self, subject: impl Into<String>, type_name: &str, suggestion: Option<&str>) {
        let mut item = DiagnosticItem::new(
            subject,
            DiagnosticCode::ExternalType,
            format!("type '{}' is outside the processed packages; member skipped", type_name),
        );
        if let Some(s) = suggestion {
            item = item.with_context(format!("did you mean '{}'?", s));
        }
        self.push(item);
    }

    /// Record a classifier name declared by more than one package
    pub fn name_collision(&mut self, name: &str, packages: &[&str]) {
        self.push(
            DiagnosticItem::new(
                name,
                DiagnosticCode::TypeNameCollision,
                format!("classifier name '{}' is declared by more than one package", name),
            )
            .with_context(format!("Packages: {}", packages.join(", "))),
        );
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|i| i.severity() == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(|i| i.severity() == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(|i| i.severity() == Severity::Warning)
    }

    /// Items carrying a given code
    pub fn with_code(&self, code: DiagnosticCode) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(move |i| i.code == code)
    }

    pub fn all(&self) -> &[DiagnosticItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Format all diagnostics for display
    pub fn format_all(&self) -> String {
        let mut output = String::new();

        for item in &self.items {
            output.push_str(&format!("{}\n", item));
        }

        if self.has_errors() {
            output.push_str(&format!(
                "\n{} error(s), {} warning(s)\n",
                self.error_count(),
                self.warning_count()
            ));
        } else if !self.is_empty() {
            output.push_str(&format!("\n{} warning(s)\n", self.warning_count()));
        }

        output
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_all())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_severity() {
        assert_eq!(DiagnosticCode::TypeNameCollision.severity(), Severity::Error);
        assert_eq!(DiagnosticCode::UnsupportedScalar.severity(), Severity::Warning);
        assert_eq!(DiagnosticCode::MultiplePackages.severity(), Severity::Info);
    }

    #[test]
    fn test_diagnostics_collection() {
        let mut diags = Diagnostics::new();
        diags.name_collision("Node", &["a", "b"]);
        diags.external_type("a.Folder::owner", "Person", Some("Persona"));
        diags.report("a", DiagnosticCode::MultiplePackages, "two packages");

        assert_eq!(diags.error_count(), 1);
        assert_eq!(diags.warning_count(), 1);
        assert!(diags.has_errors());
        assert_eq!(diags.with_code(DiagnosticCode::ExternalType).count(), 1);

        let text = diags.format_all();
        assert!(text.contains("[E001] error"));
        assert!(text.contains("did you mean 'Persona'?"));
        assert!(text.contains("1 error(s), 1 warning(s)"));
    }
}
