//! Resource identifier component.

use crate::attributes::{ExtensibleAttributes, ExtensibleAttributesBuilder};
use crate::builder::{blank, Builder};
use crate::component::{
    impl_markup_identity, locator_segment, resolve_name, Component, ComponentCore, Extractor,
};
use crate::error::ComponentError;
use crate::fragment::{Fragment, QName};
use crate::registry::{self, logical};
use crate::render::FlatWriter;
use crate::util::is_uri;
use crate::validate::{self, ValidationMessage};
use crate::version::{FormatVersion, Vocabulary};

/// Qualified identifier of the described resource.
///
/// The qualifier names the identifier scheme and must be a URI reference;
/// the value is free text within that scheme. Foreign-namespace attributes
/// ride along as extensible attributes (3.0+).
#[derive(Debug, Clone)]
pub struct Identifier {
    core: ComponentCore,
    canonical: Fragment,
    qualifier: String,
    value: String,
    extensible: ExtensibleAttributes,
}

impl Identifier {
    pub fn from_fragment(
        fragment: &Fragment,
        version: FormatVersion,
    ) -> Result<Identifier, ComponentError> {
        Identifier::build(fragment, version)
            .map_err(|e| e.at(locator_segment(version, logical::IDENTIFIER)))
    }

    pub fn new(
        qualifier: impl Into<String>,
        value: impl Into<String>,
        extensible: ExtensibleAttributes,
        version: FormatVersion,
    ) -> Result<Identifier, ComponentError> {
        let staged = synthesize(&qualifier.into(), &value.into(), &extensible, version)
            .map_err(|e| e.at(locator_segment(version, logical::IDENTIFIER)))?;
        Identifier::from_fragment(&staged, version)
    }

    fn build(fragment: &Fragment, version: FormatVersion) -> Result<Identifier, ComponentError> {
        let extractor = Extractor::new(fragment, version);
        let qname = extractor.expect_name(logical::IDENTIFIER)?;

        // structure
        let qualifier = extractor
            .local_attr(logical::IDENTIFIER_QUALIFIER)
            .filter(|raw| !raw.is_empty());
        validate::require(qualifier.is_some(), "a qualifier attribute")?;
        let value = extractor
            .local_attr(logical::IDENTIFIER_VALUE)
            .filter(|raw| !raw.is_empty());
        validate::require(value.is_some(), "a value attribute")?;

        // version gates: the only fatal an extensible read can raise here
        let extensible = ExtensibleAttributes::from_fragment(fragment, version)?;

        // content
        let qualifier = qualifier.unwrap_or_default().to_string();
        if !is_uri(&qualifier) {
            return Err(ComponentError::content_syntax(format!(
                "qualifier is not a valid URI value: \"{qualifier}\""
            )));
        }

        let value = value.unwrap_or_default().to_string();
        let canonical = synthesize(&qualifier, &value, &extensible, version)?;
        Ok(Identifier {
            core: ComponentCore::new(qname, version),
            canonical,
            qualifier,
            value,
            extensible,
        })
    }

    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn extensible(&self) -> &ExtensibleAttributes {
        &self.extensible
    }
}

fn synthesize(
    qualifier: &str,
    value: &str,
    extensible: &ExtensibleAttributes,
    version: FormatVersion,
) -> Result<Fragment, ComponentError> {
    let ns = version.namespace(Vocabulary::Core);
    let mut fragment = Fragment::new(ns, resolve_name(version, logical::IDENTIFIER)?);
    fragment.set_attribute("", resolve_name(version, logical::IDENTIFIER_QUALIFIER)?, qualifier);
    fragment.set_attribute("", resolve_name(version, logical::IDENTIFIER_VALUE)?, value);
    extensible.apply(&mut fragment);
    Ok(fragment)
}

impl Component for Identifier {
    fn qname(&self) -> &QName {
        self.core.qname()
    }

    fn version(&self) -> FormatVersion {
        self.core.version()
    }

    fn warnings(&self) -> &[ValidationMessage] {
        self.core.warnings()
    }

    fn to_fragment(&self) -> Fragment {
        self.canonical.clone()
    }

    fn write_flat(&self, writer: &mut FlatWriter) {
        let version = self.core.version();
        writer.nested(self.core.qname().local(), |w| {
            if let Some(name) = registry::element_name(version, logical::IDENTIFIER_QUALIFIER) {
                w.field(name, &self.qualifier);
            }
            if let Some(name) = registry::element_name(version, logical::IDENTIFIER_VALUE) {
                w.field(name, &self.value);
            }
            self.extensible.write_flat(w);
        });
    }
}

impl_markup_identity!(Identifier);

/// Staging builder for [`Identifier`].
#[derive(Debug, Clone, Default)]
pub struct IdentifierBuilder {
    pub qualifier: Option<String>,
    pub value: Option<String>,
    pub extensible: ExtensibleAttributesBuilder,
}

impl Builder for IdentifierBuilder {
    type Target = Identifier;

    fn is_empty(&self) -> bool {
        blank(&self.qualifier) && blank(&self.value) && self.extensible.is_empty()
    }

    fn commit(&self, version: FormatVersion) -> Result<Option<Identifier>, ComponentError> {
        if self.is_empty() {
            return Ok(None);
        }
        let annotate = |e: ComponentError| e.at(locator_segment(version, logical::IDENTIFIER));
        let ns = version.namespace(Vocabulary::Core);
        let mut fragment =
            Fragment::new(ns, resolve_name(version, logical::IDENTIFIER).map_err(annotate)?);
        for (field, slot) in [
            (logical::IDENTIFIER_QUALIFIER, &self.qualifier),
            (logical::IDENTIFIER_VALUE, &self.value),
        ] {
            if let Some(value) = slot {
                let name = resolve_name(version, field).map_err(annotate)?;
                fragment.set_attribute("", name, value.clone());
            }
        }
        self.extensible.stage_raw(&mut fragment).map_err(annotate)?;
        Identifier::from_fragment(&fragment, version).map(Some)
    }
}

impl From<&Identifier> for IdentifierBuilder {
    fn from(component: &Identifier) -> IdentifierBuilder {
        IdentifierBuilder {
            qualifier: Some(component.qualifier.clone()),
            value: Some(component.value.clone()),
            extensible: ExtensibleAttributesBuilder::from(&component.extensible),
        }
    }
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::render::{markup, render, OutputFormat};

    fn identifier(version: FormatVersion) -> Identifier {
        Identifier::new(
            "urn:example:ids",
            "ABC-123",
            ExtensibleAttributes::default(),
            version,
        )
        .unwrap()
    }

    #[test]
    fn test_markup() {
        assert_eq!(
            markup(&identifier(FormatVersion::V4_1)),
            "<dmf:identifier xmlns:dmf=\"urn:dmf:meta:4\" \
             qualifier=\"urn:example:ids\" value=\"ABC-123\"/>"
        );
    }

    #[test]
    fn test_required_attributes() {
        let err = Identifier::new(
            "",
            "ABC-123",
            ExtensibleAttributes::default(),
            FormatVersion::V4_1,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
        assert_eq!(
            err.to_string(),
            "structural error: a qualifier attribute is required (locator: identifier)"
        );

        let fragment =
            Fragment::parse("<dmf:identifier xmlns:dmf=\"urn:dmf:meta:4\" qualifier=\"urn:x\"/>")
                .unwrap();
        let err = Identifier::from_fragment(&fragment, FormatVersion::V4_1).unwrap_err();
        assert_eq!(err.message(), "a value attribute is required");
    }

    #[test]
    fn test_qualifier_must_be_a_uri() {
        let err = Identifier::new(
            "not a uri",
            "ABC-123",
            ExtensibleAttributes::default(),
            FormatVersion::V4_1,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ContentSyntax);
        assert_eq!(
            err.message(),
            "qualifier is not a valid URI value: \"not a uri\""
        );

        // relative references are fine for scheme qualifiers
        assert!(Identifier::new(
            "identifiers/local",
            "ABC-123",
            ExtensibleAttributes::default(),
            FormatVersion::V4_1,
        )
        .is_ok());
    }

    #[test]
    fn test_extensible_attributes_ride_along() {
        let fragment = Fragment::parse(
            "<dmf:identifier xmlns:dmf=\"urn:dmf:meta:4\" xmlns:x=\"urn:example:claims\" \
             qualifier=\"urn:example:ids\" value=\"ABC-123\" x:relevance=\"0.9\"/>",
        )
        .unwrap();
        let identifier = Identifier::from_fragment(&fragment, FormatVersion::V4_1).unwrap();
        assert_eq!(identifier.extensible().iter().count(), 1);
        assert_eq!(
            markup(&identifier),
            "<dmf:identifier xmlns:dmf=\"urn:dmf:meta:4\" xmlns:ns1=\"urn:example:claims\" \
             qualifier=\"urn:example:ids\" value=\"ABC-123\" ns1:relevance=\"0.9\"/>"
        );
    }

    #[test]
    fn test_extensible_attributes_gated_before_3_0() {
        let fragment = Fragment::parse(
            "<dmf:identifier xmlns:dmf=\"urn:dmf:meta:2.0\" xmlns:x=\"urn:example:claims\" \
             qualifier=\"urn:example:ids\" value=\"ABC-123\" x:relevance=\"0.9\"/>",
        )
        .unwrap();
        let err = Identifier::from_fragment(&fragment, FormatVersion::V2_0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VersionGate);
        assert_eq!(
            err.to_string(),
            "version gate error: extensible attributes must not be used before DMF 3.0 \
             (locator: identifier)"
        );
    }

    #[test]
    fn test_structural_outranks_extensible_gate() {
        // missing value AND early extensible: the structural finding wins
        let fragment = Fragment::parse(
            "<dmf:identifier xmlns:dmf=\"urn:dmf:meta:2.0\" xmlns:x=\"urn:example:claims\" \
             qualifier=\"urn:example:ids\" x:relevance=\"0.9\"/>",
        )
        .unwrap();
        let err = Identifier::from_fragment(&fragment, FormatVersion::V2_0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
        assert_eq!(err.message(), "a value attribute is required");
    }

    #[test]
    fn test_round_trip_all_revisions() {
        for version in FormatVersion::ALL {
            let built = identifier(version);
            let reparsed = Identifier::from_fragment(
                &Fragment::parse(&markup(&built)).unwrap(),
                version,
            )
            .unwrap();
            assert_eq!(built, reparsed);
        }
    }

    #[test]
    fn test_flat_output() {
        let mut staged = IdentifierBuilder::default();
        staged.qualifier = Some("urn:example:ids".to_string());
        staged.value = Some("ABC-123".to_string());
        staged.extensible.attributes.push((
            "urn:example:claims".to_string(),
            "relevance".to_string(),
            "0.9".to_string(),
        ));
        let committed = staged.commit(FormatVersion::V4_1).unwrap().unwrap();
        assert_eq!(
            render(&committed, OutputFormat::Text, ""),
            "identifier.qualifier: urn:example:ids\n\
             identifier.value: ABC-123\n\
             identifier.relevance: 0.9"
        );
    }

    #[test]
    fn test_builder_lifecycle() {
        let mut staged = IdentifierBuilder::default();
        assert!(staged.is_empty());
        assert!(staged.commit(FormatVersion::V4_1).unwrap().is_none());

        staged.qualifier = Some("urn:example:ids".to_string());
        let err = staged.commit(FormatVersion::V4_1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);

        staged.value = Some("ABC-123".to_string());
        let committed = staged.commit(FormatVersion::V4_1).unwrap().unwrap();
        assert_eq!(committed, identifier(FormatVersion::V4_1));

        let reseeded = IdentifierBuilder::from(&committed);
        assert_eq!(
            reseeded.commit(FormatVersion::V4_1).unwrap().unwrap(),
            committed
        );
    }

    #[test]
    fn test_builder_rejects_reserved_namespace_claim() {
        let mut staged = IdentifierBuilder::default();
        staged.qualifier = Some("urn:example:ids".to_string());
        staged.value = Some("ABC-123".to_string());
        staged.extensible.attributes.push((
            "urn:dmf:marking:9".to_string(),
            "classification".to_string(),
            "U".to_string(),
        ));
        let err = staged.commit(FormatVersion::V4_1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
        assert!(err.message().contains("reserved namespace"));
        assert_eq!(err.locator().to_string(), "identifier");
    }
}
