//! Shared component lifecycle machinery.
//!
//! Every catalog component follows the same path: resolve its prescribed
//! name for the active revision, extract fields under revision-correct
//! names, construct children (annotating their errors with the enclosing
//! element name), validate, freeze. From-values constructors synthesize the
//! canonical fragment and run through the identical path, so the two entry
//! points cannot diverge.

use crate::error::ComponentError;
use crate::fragment::{Fragment, QName};
use crate::registry;
use crate::render::FlatWriter;
use crate::validate::ValidationMessage;
use crate::version::{FormatVersion, Vocabulary};

/// Shared state carried by every concrete component.
#[derive(Debug, Clone)]
pub struct ComponentCore {
    qname: QName,
    version: FormatVersion,
    warnings: Vec<ValidationMessage>,
}

impl ComponentCore {
    pub(crate) fn new(qname: QName, version: FormatVersion) -> ComponentCore {
        ComponentCore {
            qname,
            version,
            warnings: Vec::new(),
        }
    }

    pub(crate) fn attach_warnings(&mut self, warnings: Vec<ValidationMessage>) {
        if !warnings.is_empty() {
            tracing::trace!(
                element = %self.qname,
                count = warnings.len(),
                "validation warnings attached"
            );
        }
        self.warnings = warnings;
    }

    pub fn qname(&self) -> &QName {
        &self.qname
    }

    pub fn version(&self) -> FormatVersion {
        self.version
    }

    pub fn warnings(&self) -> &[ValidationMessage] {
        &self.warnings
    }
}

/// Contract shared by every DMF component.
///
/// Components are deeply immutable once constructed; mutation goes through
/// the paired builder type.
pub trait Component {
    /// Resolved qualified name under the construction revision.
    fn qname(&self) -> &QName;

    /// Revision the component was constructed and validated against.
    fn version(&self) -> FormatVersion;

    /// Non-fatal findings recorded during construction, in discovery order.
    fn warnings(&self) -> &[ValidationMessage];

    /// Synthesizes the canonical fragment shape for this component.
    fn to_fragment(&self) -> Fragment;

    /// Emits scalar fields in logical order to the flat output formats.
    fn write_flat(&self, writer: &mut FlatWriter);

    /// Directly nested components, for aggregate reporting.
    fn child_components(&self) -> Vec<&dyn Component> {
        Vec::new()
    }

    /// This component's warnings plus every nested component's, nested
    /// findings prefixed with the enclosing element name.
    fn nested_warnings(&self) -> Vec<ValidationMessage> {
        let mut findings: Vec<ValidationMessage> = self.warnings().to_vec();
        for child in self.child_components() {
            for finding in child.nested_warnings() {
                findings.push(finding.nested_under(self.qname().local()));
            }
        }
        findings
    }
}

/// Serialized name of `logical` under `version`, or the logical key itself
/// when the revision does not define it. Used for locator segments, which
/// must exist even for errors about undefined elements.
pub(crate) fn locator_segment(version: FormatVersion, logical: &'static str) -> &'static str {
    registry::element_name(version, logical).unwrap_or(logical)
}

/// Resolves `logical` for `version`, failing structurally when the revision
/// does not define it.
pub(crate) fn resolve_name(
    version: FormatVersion,
    logical: &str,
) -> Result<&'static str, ComponentError> {
    registry::element_name(version, logical).ok_or_else(|| {
        ComponentError::structural(format!("{logical} is not defined in DMF {version}"))
    })
}

/// Parses a finite decimal field value; `name` is the serialized field name
/// used in messages.
pub(crate) fn parse_decimal(name: &str, raw: &str) -> Result<f64, ComponentError> {
    let trimmed = raw.trim();
    let value: f64 = trimmed.parse().map_err(|_| {
        ComponentError::content_syntax(format!(
            "{name} is not a valid decimal value: \"{trimmed}\""
        ))
    })?;
    if !value.is_finite() {
        return Err(ComponentError::content_syntax(format!(
            "{name} must be a finite decimal value"
        )));
    }
    Ok(value)
}

/// Field extraction helpers over a fragment, under one revision.
///
/// Lookup names are logical registry keys; the extractor resolves them to
/// serialized names once and reports failures with those resolved names.
#[derive(Debug)]
pub(crate) struct Extractor<'a> {
    fragment: &'a Fragment,
    version: FormatVersion,
}

impl<'a> Extractor<'a> {
    pub(crate) fn new(fragment: &'a Fragment, version: FormatVersion) -> Extractor<'a> {
        Extractor { fragment, version }
    }

    pub(crate) fn fragment(&self) -> &'a Fragment {
        self.fragment
    }

    pub(crate) fn version(&self) -> FormatVersion {
        self.version
    }

    fn core_ns(&self) -> &'static str {
        self.version.namespace(Vocabulary::Core)
    }

    fn resolve(&self, logical: &str) -> Result<&'static str, ComponentError> {
        resolve_name(self.version, logical)
    }

    /// Resolves `logical` and confirms the fragment carries that name.
    pub(crate) fn expect_name(&self, logical: &str) -> Result<QName, ComponentError> {
        let local = self.resolve(logical)?;
        let expected = QName::new(self.core_ns(), local);
        if self.fragment.name() != &expected {
            return Err(ComponentError::structural(format!(
                "unexpected element name: {} (expected {expected})",
                self.fragment.name()
            )));
        }
        tracing::trace!(element = %expected, version = %self.version, "constructing component");
        Ok(expected)
    }

    /// Steps into the wrapper element the revision prescribes for `logical`,
    /// or stays on the current fragment when there is none.
    pub(crate) fn step_into_wrapper(&self, logical: &str) -> Result<Extractor<'a>, ComponentError> {
        let Some(wrapper) = registry::wrapper_name(self.version, logical) else {
            return Ok(Extractor::new(self.fragment, self.version));
        };
        let mut matches = self.fragment.children_named(self.core_ns(), wrapper);
        let Some(inner) = matches.next() else {
            return Err(ComponentError::structural(format!(
                "a {wrapper} element is required"
            )));
        };
        if matches.next().is_some() {
            return Err(ComponentError::structural(format!(
                "only one {wrapper} element is allowed"
            )));
        }
        Ok(Extractor::new(inner, self.version))
    }

    /// All child elements under the resolved name of `logical`. Empty when
    /// the revision does not define the field.
    pub(crate) fn children(&self, logical: &str) -> Vec<&'a Fragment> {
        match registry::element_name(self.version, logical) {
            Some(name) => self.fragment.children_named(self.core_ns(), name).collect(),
            None => Vec::new(),
        }
    }

    /// The at-most-one child under `logical`'s resolved name.
    pub(crate) fn optional_child(&self, logical: &str) -> Result<Option<&'a Fragment>, ComponentError> {
        match self.children(logical).as_slice() {
            [] => Ok(None),
            [only] => Ok(Some(*only)),
            _ => Err(self.only_one(logical)),
        }
    }

    /// Text of the at-most-one child under `logical`'s resolved name.
    pub(crate) fn optional_child_text(&self, logical: &str) -> Result<Option<String>, ComponentError> {
        Ok(self.optional_child(logical)?.map(|c| c.text().to_string()))
    }

    /// The exactly-one child under `logical`'s resolved name.
    pub(crate) fn exactly_one_child(&self, logical: &str) -> Result<&'a Fragment, ComponentError> {
        match self.children(logical).as_slice() {
            [] => Err(ComponentError::structural(format!(
                "a {} element is required",
                self.resolved(logical)
            ))),
            [only] => Ok(*only),
            _ => Err(self.only_one(logical)),
        }
    }

    /// Serialized name for messages; falls back to the logical key when the
    /// revision does not define the field.
    pub(crate) fn resolved<'l>(&self, logical: &'l str) -> &'l str {
        registry::element_name(self.version, logical).unwrap_or(logical)
    }

    /// Unqualified attribute under `logical`'s resolved name.
    pub(crate) fn local_attr(&self, logical: &str) -> Option<&'a str> {
        registry::element_name(self.version, logical)
            .and_then(|name| self.fragment.attribute("", name))
    }

    /// Attribute in a vocabulary namespace under `logical`'s resolved name.
    pub(crate) fn vocab_attr(&self, vocabulary: Vocabulary, logical: &str) -> Option<&'a str> {
        registry::element_name(self.version, logical)
            .and_then(|name| self.fragment.attribute(self.version.namespace(vocabulary), name))
    }

    fn only_one(&self, logical: &str) -> ComponentError {
        let name = registry::element_name(self.version, logical).unwrap_or(logical);
        ComponentError::structural(format!("only one {name} element is allowed"))
    }
}

/// Implements markup-based equality and hashing for a component type.
///
/// Canonical markup encodes every field under version-resolved names, which
/// is exactly the field-for-field identity the format prescribes; warnings
/// never participate.
macro_rules! impl_markup_identity {
    ($type:ty) => {
        impl PartialEq for $type {
            fn eq(&self, other: &Self) -> bool {
                crate::render::markup(self) == crate::render::markup(other)
            }
        }

        impl Eq for $type {}

        impl std::hash::Hash for $type {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                crate::render::markup(self).hash(state);
            }
        }
    };
}
pub(crate) use impl_markup_identity;

// ============ Tests ============
