//! Error types for DMF component construction and validation.

use std::fmt;

use thiserror::Error;

/// Categories of fatal construction failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Wrong element shape: bad name, missing required field, cardinality
    /// or exclusivity violation, use of a removed component.
    Structural,
    /// A field, attachment, or token used outside its legal revision window.
    VersionGate,
    /// A value that fails its syntax rules: malformed URI, date, number,
    /// or unknown enumerated token.
    ContentSyntax,
    /// A cross-field rule violated (e.g. minimum exceeds maximum).
    Invariant,
}

impl ErrorKind {
    /// Returns the stable label used in rendered messages (e.g., "structural").
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::Structural => "structural",
            ErrorKind::VersionGate => "version gate",
            ErrorKind::ContentSyntax => "content syntax",
            ErrorKind::Invariant => "invariant",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Breadcrumb path from the outermost component down to the offending node.
///
/// Segments accumulate front-first: each enclosing construction frame prepends
/// its own element name, so a fully propagated error reads
/// `root:child:grandchild`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Locator {
    segments: Vec<String>,
}

impl Locator {
    /// An empty path (error raised outside any element frame).
    pub fn none() -> Self {
        Locator::default()
    }

    /// Prepends `segment` to the path.
    pub fn push_front(&mut self, segment: impl Into<String>) {
        self.segments.insert(0, segment.into());
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Display suffix for error messages: `" (locator: a:b:c)"`, or empty.
    fn suffix(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!(" (locator: {})", self)
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join(":"))
    }
}

/// Fatal failure raised while constructing or validating a component.
///
/// Carries the failure category, a human-readable message, and the locator
/// path accumulated while the error propagated out of nested constructions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} error: {message}{}", .locator.suffix())]
pub struct ComponentError {
    kind: ErrorKind,
    message: String,
    locator: Locator,
}

impl ComponentError {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::debug!(kind = %kind, message = %message, "validation failure");
        ComponentError {
            kind,
            message,
            locator: Locator::none(),
        }
    }

    pub fn structural(message: impl Into<String>) -> Self {
        ComponentError::new(ErrorKind::Structural, message)
    }

    pub fn version_gate(message: impl Into<String>) -> Self {
        ComponentError::new(ErrorKind::VersionGate, message)
    }

    pub fn content_syntax(message: impl Into<String>) -> Self {
        ComponentError::new(ErrorKind::ContentSyntax, message)
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        ComponentError::new(ErrorKind::Invariant, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    /// Prepends `segment` to the locator path and returns the error.
    ///
    /// Each construction frame annotates errors from deeper frames with its
    /// own element name; the path grows root-ward and is never replaced.
    #[must_use]
    pub fn at(mut self, segment: impl Into<String>) -> Self {
        self.locator.push_front(segment);
        self
    }
}

/// Error from the XML parse boundary, before any component exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    #[error("malformed markup: {0}")]
    Malformed(String),

    #[error("document has no element content")]
    NoDocumentElement,
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_accumulates_front_first() {
        let err = ComponentError::structural("a dmf:value attribute is required")
            .at("keyword")
            .at("subjectCoverage");
        assert_eq!(err.locator().segments(), ["subjectCoverage", "keyword"]);
        assert_eq!(
            err.to_string(),
            "structural error: a dmf:value attribute is required \
             (locator: subjectCoverage:keyword)"
        );
    }

    #[test]
    fn test_display_without_locator() {
        let err = ComponentError::content_syntax("not a valid decimal value: \"abc\"");
        assert_eq!(
            err.to_string(),
            "content syntax error: not a valid decimal value: \"abc\""
        );
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(ErrorKind::Structural.label(), "structural");
        assert_eq!(ErrorKind::VersionGate.label(), "version gate");
        assert_eq!(ErrorKind::ContentSyntax.label(), "content syntax");
        assert_eq!(ErrorKind::Invariant.label(), "invariant");
    }
}
