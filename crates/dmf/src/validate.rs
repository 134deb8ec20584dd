//! Validation findings and shared structural rule checks.
//!
//! Fatal findings surface as [`ComponentError`] and abort construction on the
//! first failure; warnings are collected in discovery order and ride on the
//! built component as [`ValidationMessage`]s.

use rustc_hash::FxHashSet;

use crate::error::ComponentError;
use crate::version::FormatVersion;

/// Finding severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

/// A single validation finding with its tree location.
///
/// Locators use the same `root:child:grandchild` form as
/// [`ComponentError`] locators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidationMessage {
    severity: Severity,
    text: String,
    locator: String,
}

impl ValidationMessage {
    pub fn warning(text: impl Into<String>, locator: impl Into<String>) -> ValidationMessage {
        ValidationMessage {
            severity: Severity::Warning,
            text: text.into(),
            locator: locator.into(),
        }
    }

    pub fn error(text: impl Into<String>, locator: impl Into<String>) -> ValidationMessage {
        ValidationMessage {
            severity: Severity::Error,
            text: text.into(),
            locator: locator.into(),
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    /// Returns a copy whose locator is extended with an enclosing segment.
    pub(crate) fn nested_under(&self, segment: &str) -> ValidationMessage {
        let locator = if self.locator.is_empty() {
            segment.to_string()
        } else {
            format!("{segment}:{}", self.locator)
        };
        ValidationMessage {
            severity: self.severity,
            text: self.text.clone(),
            locator,
        }
    }
}

impl From<&ComponentError> for ValidationMessage {
    /// Presents a fatal error in the uniform finding shape.
    fn from(error: &ComponentError) -> ValidationMessage {
        ValidationMessage::error(error.message(), error.locator().to_string())
    }
}

// ============ Rule helpers ============
//
// Each helper encodes one recurring rule shape; the caller passes names
// already resolved for the active revision so messages match the document.

/// Fails structurally when a required piece is absent.
pub(crate) fn require(present: bool, what: &str) -> Result<(), ComponentError> {
    if present {
        Ok(())
    } else {
        Err(ComponentError::structural(format!("{what} is required")))
    }
}

/// Fails structurally when none of `what` is present.
pub(crate) fn at_least_one(count: usize, what: &str) -> Result<(), ComponentError> {
    if count >= 1 {
        Ok(())
    } else {
        Err(ComponentError::structural(format!(
            "at least one {what} is required"
        )))
    }
}

/// Fails structurally when more than `max` of `what` are present.
pub(crate) fn at_most(count: usize, max: usize, what: &str) -> Result<(), ComponentError> {
    if count <= max {
        Ok(())
    } else {
        Err(ComponentError::structural(format!(
            "no more than {max} {what} elements are allowed"
        )))
    }
}

/// Fails structurally when both sides of an exclusive pair are present.
pub(crate) fn not_in_tandem(
    first_present: bool,
    first: &str,
    second_present: bool,
    second: &str,
) -> Result<(), ComponentError> {
    if first_present && second_present {
        Err(ComponentError::structural(format!(
            "{first} must not be used in tandem with {second}"
        )))
    } else {
        Ok(())
    }
}

/// Version gate for a piece introduced at `min`.
pub(crate) fn not_before(
    version: FormatVersion,
    min: FormatVersion,
    what: &str,
) -> Result<(), ComponentError> {
    if version.is_at_least(min) {
        Ok(())
    } else {
        Err(ComponentError::version_gate(format!(
            "{what} must not be used before DMF {min}"
        )))
    }
}

/// Version gate for a piece retired after `max`.
pub(crate) fn not_after(
    version: FormatVersion,
    max: FormatVersion,
    what: &str,
) -> Result<(), ComponentError> {
    if version <= max {
        Ok(())
    } else {
        Err(ComponentError::version_gate(format!(
            "{what} must not be used after DMF {max}"
        )))
    }
}

/// True when `values` contains any exact duplicate.
pub(crate) fn has_duplicates<'a>(values: impl IntoIterator<Item = &'a str>) -> bool {
    let mut seen = FxHashSet::default();
    values.into_iter().any(|value| !seen.insert(value))
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_helpers() {
        assert!(require(true, "a value attribute").is_ok());
        let err = require(false, "a value attribute").unwrap_err();
        assert_eq!(err.message(), "a value attribute is required");

        assert!(at_least_one(2, "keyword").is_ok());
        assert!(at_least_one(0, "keyword").is_err());

        assert!(at_most(6, 6, "street").is_ok());
        let err = at_most(7, 6, "street").unwrap_err();
        assert_eq!(err.message(), "no more than 6 street elements are allowed");

        assert!(not_in_tandem(true, "facilityIdentifier", false, "name").is_ok());
        let err = not_in_tandem(true, "facilityIdentifier", true, "name").unwrap_err();
        assert_eq!(
            err.message(),
            "facilityIdentifier must not be used in tandem with name"
        );
    }

    #[test]
    fn test_version_gates() {
        use crate::error::ErrorKind;

        assert!(not_before(FormatVersion::V4_1, FormatVersion::V4_1, "label").is_ok());
        let err = not_before(FormatVersion::V3_1, FormatVersion::V4_1, "label").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VersionGate);
        assert_eq!(err.message(), "label must not be used before DMF 4.1");

        assert!(not_after(FormatVersion::V3_1, FormatVersion::V3_1, "unitOfMeasure").is_ok());
        let err = not_after(FormatVersion::V4_1, FormatVersion::V3_1, "unitOfMeasure").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VersionGate);
    }

    #[test]
    fn test_duplicates() {
        assert!(!has_duplicates(["a", "b", "c"]));
        assert!(has_duplicates(["a", "b", "a"]));
        assert!(!has_duplicates([]));
    }

    #[test]
    fn test_message_nesting() {
        let finding = ValidationMessage::warning("A completely empty element was found.", "keyword");
        let nested = finding.nested_under("subjectCoverage");
        assert_eq!(nested.locator(), "subjectCoverage:keyword");
        assert_eq!(nested.text(), finding.text());
        assert_eq!(nested.severity(), Severity::Warning);
    }
}
