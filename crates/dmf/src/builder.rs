//! Two-phase staging builders.
//!
//! Builders mirror their component one slot per field, accept partial or
//! invalid state freely, and defer every rule to commit time. An empty
//! builder commits to `None`: the absence of an optional component is not
//! an error.

use crate::error::ComponentError;
use crate::version::FormatVersion;

/// Mutable staging mirror of a component type.
pub trait Builder: Default {
    type Target;

    /// True when every scalar slot is unset and every nested builder is
    /// empty.
    fn is_empty(&self) -> bool;

    /// Validates staged state and produces the immutable component.
    ///
    /// Returns `Ok(None)` when the builder is empty. Does not consume the
    /// builder; commit may be called any number of times, interleaved with
    /// further mutation.
    fn commit(&self, version: FormatVersion) -> Result<Option<Self::Target>, ComponentError>;
}

/// Commits a list of child builders, dropping those that commit to nothing.
pub(crate) fn commit_list<B: Builder>(
    builders: &[B],
    version: FormatVersion,
) -> Result<Vec<B::Target>, ComponentError> {
    let mut targets = Vec::new();
    for builder in builders {
        if let Some(target) = builder.commit(version)? {
            targets.push(target);
        }
    }
    Ok(targets)
}

/// True when an optional text slot holds no usable value.
pub(crate) fn blank(slot: &Option<String>) -> bool {
    slot.as_deref().map_or(true, str::is_empty)
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct StubBuilder {
        value: Option<String>,
    }

    impl Builder for StubBuilder {
        type Target = String;

        fn is_empty(&self) -> bool {
            blank(&self.value)
        }

        fn commit(&self, _version: FormatVersion) -> Result<Option<String>, ComponentError> {
            if self.is_empty() {
                return Ok(None);
            }
            match self.value.as_deref() {
                Some("bad") => Err(ComponentError::structural("bad value")),
                Some(v) => Ok(Some(v.to_string())),
                None => Ok(None),
            }
        }
    }

    #[test]
    fn test_blank() {
        assert!(blank(&None));
        assert!(blank(&Some(String::new())));
        assert!(!blank(&Some("x".to_string())));
    }

    #[test]
    fn test_commit_list_drops_empty_children() {
        let builders = vec![
            StubBuilder { value: Some("one".to_string()) },
            StubBuilder { value: None },
            StubBuilder { value: Some(String::new()) },
            StubBuilder { value: Some("two".to_string()) },
        ];
        let committed = commit_list(&builders, FormatVersion::V4_1).unwrap();
        assert_eq!(committed, ["one", "two"]);
    }

    #[test]
    fn test_commit_list_surfaces_child_errors() {
        let builders = vec![
            StubBuilder { value: Some("one".to_string()) },
            StubBuilder { value: Some("bad".to_string()) },
        ];
        assert!(commit_list(&builders, FormatVersion::V4_1).is_err());
    }
}
