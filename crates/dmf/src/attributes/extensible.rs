//! Foreign-namespace attribute pass-through.

use crate::error::ComponentError;
use crate::fragment::{Fragment, QName};
use crate::render::FlatWriter;
use crate::validate;
use crate::version::{is_reserved_namespace, FormatVersion};

/// Attributes from namespaces outside every DMF vocabulary, preserved
/// verbatim as (name, value) pairs.
///
/// Pairs are held in canonical order (namespace, then local name) so every
/// downstream rendering is deterministic. Introduced in DMF 3.0: any
/// presence under 2.0 is a version-gate error on hosts that accept them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ExtensibleAttributes {
    attributes: Vec<(QName, String)>,
}

impl ExtensibleAttributes {
    /// Builds and validates the attribute set from explicit pairs.
    pub fn new(
        pairs: Vec<(QName, String)>,
        version: FormatVersion,
    ) -> Result<ExtensibleAttributes, ComponentError> {
        for (name, _) in &pairs {
            if is_reserved_namespace(name.namespace()) {
                return Err(ComponentError::structural(format!(
                    "{name} is in a reserved namespace and cannot be extensible"
                )));
            }
        }
        let mut attributes = pairs;
        attributes.sort_by(|(a, _), (b, _)| {
            (a.namespace(), a.local()).cmp(&(b.namespace(), b.local()))
        });
        for pair in attributes.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(ComponentError::structural(format!(
                    "duplicate extensible attribute: {}",
                    pair[0].0
                )));
            }
        }
        if !attributes.is_empty() {
            validate::not_before(version, FormatVersion::V3_0, "extensible attributes")?;
        }
        Ok(ExtensibleAttributes { attributes })
    }

    /// Collects the foreign-namespace attributes present on `fragment`.
    pub fn from_fragment(
        fragment: &Fragment,
        version: FormatVersion,
    ) -> Result<ExtensibleAttributes, ComponentError> {
        let pairs = fragment
            .attributes()
            .iter()
            .filter(|(name, _)| !is_reserved_namespace(name.namespace()))
            .cloned()
            .collect();
        ExtensibleAttributes::new(pairs, version)
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (&QName, &str)> {
        self.attributes
            .iter()
            .map(|(name, value)| (name, value.as_str()))
    }

    /// Writes the pairs onto a synthesized fragment.
    pub(crate) fn apply(&self, fragment: &mut Fragment) {
        for (name, value) in &self.attributes {
            fragment.set_attribute(name.namespace(), name.local(), value.clone());
        }
    }

    /// Emits the pairs to the flat formats, after everything else.
    pub(crate) fn write_flat(&self, writer: &mut FlatWriter) {
        for (name, value) in &self.attributes {
            writer.field(name.local(), value);
        }
    }
}

/// Staging builder for [`ExtensibleAttributes`].
///
/// Slots are raw (namespace, local, value) triples; fully empty triples are
/// dropped at commit. Like the marking builder, an empty commit yields an
/// empty set rather than `None`.
#[derive(Debug, Clone, Default)]
pub struct ExtensibleAttributesBuilder {
    pub attributes: Vec<(String, String, String)>,
}

impl ExtensibleAttributesBuilder {
    pub fn is_empty(&self) -> bool {
        self.attributes
            .iter()
            .all(|(ns, local, value)| ns.is_empty() && local.is_empty() && value.is_empty())
    }

    /// Writes the staged triples onto a host's staged fragment.
    ///
    /// Reserved namespaces are rejected here (a structural claim error);
    /// the version gate is left to the host's from-fragment pass so it
    /// fires in stage order.
    pub(crate) fn stage_raw(&self, fragment: &mut Fragment) -> Result<(), ComponentError> {
        for (ns, local, value) in &self.attributes {
            if ns.is_empty() && local.is_empty() && value.is_empty() {
                continue;
            }
            let name = QName::new(ns.clone(), local.clone());
            if is_reserved_namespace(name.namespace()) {
                return Err(ComponentError::structural(format!(
                    "{name} is in a reserved namespace and cannot be extensible"
                )));
            }
            fragment.set_attribute(ns.clone(), local.clone(), value.clone());
        }
        Ok(())
    }

    pub fn commit(&self, version: FormatVersion) -> Result<ExtensibleAttributes, ComponentError> {
        let pairs = self
            .attributes
            .iter()
            .filter(|(ns, local, value)| !(ns.is_empty() && local.is_empty() && value.is_empty()))
            .map(|(ns, local, value)| (QName::new(ns.clone(), local.clone()), value.clone()))
            .collect();
        ExtensibleAttributes::new(pairs, version)
    }
}

impl From<&ExtensibleAttributes> for ExtensibleAttributesBuilder {
    fn from(attributes: &ExtensibleAttributes) -> ExtensibleAttributesBuilder {
        ExtensibleAttributesBuilder {
            attributes: attributes
                .iter()
                .map(|(name, value)| {
                    (
                        name.namespace().to_string(),
                        name.local().to_string(),
                        value.to_string(),
                    )
                })
                .collect(),
        }
    }
}

// ============ Tests ============
