//! Security marking attribute group (Marking vocabulary).

use crate::builder;
use crate::error::ComponentError;
use crate::fragment::Fragment;
use crate::registry::{self, logical};
use crate::render::FlatWriter;
use crate::validate;
use crate::version::{FormatVersion, Vocabulary};

/// Classification level tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    U,
    C,
    S,
    TS,
    /// Restricted. Only legal from DMF 3.0.
    R,
}

impl Classification {
    /// Serialized token.
    pub fn token(self) -> &'static str {
        match self {
            Classification::U => "U",
            Classification::C => "C",
            Classification::S => "S",
            Classification::TS => "TS",
            Classification::R => "R",
        }
    }

    /// Parses a serialized token (case-sensitive).
    pub fn parse(s: &str) -> Option<Classification> {
        match s {
            "U" => Some(Classification::U),
            "C" => Some(Classification::C),
            "S" => Some(Classification::S),
            "TS" => Some(Classification::TS),
            "R" => Some(Classification::R),
            _ => None,
        }
    }

    /// Earliest revision in which the token is legal.
    fn introduced(self) -> FormatVersion {
        match self {
            Classification::R => FormatVersion::V3_0,
            _ => FormatVersion::V2_0,
        }
    }
}

/// Security marking attached to a component.
///
/// The two halves are required together: a classification without at least
/// one ownerProducer token (or the reverse) is a partial marking and fails
/// structurally. A fully empty marking is legal and renders nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SecurityAttributes {
    classification: Option<Classification>,
    owner_producers: Vec<String>,
}

impl SecurityAttributes {
    /// Builds and validates a marking from typed values.
    pub fn new(
        classification: Option<Classification>,
        owner_producers: Vec<String>,
        version: FormatVersion,
    ) -> Result<SecurityAttributes, ComponentError> {
        let marking = SecurityAttributes {
            classification,
            owner_producers,
        };
        marking.validate(version)?;
        Ok(marking)
    }

    /// Reads the marking attributes present on `fragment` under `version`.
    pub fn from_fragment(
        fragment: &Fragment,
        version: FormatVersion,
    ) -> Result<SecurityAttributes, ComponentError> {
        SecurityAttributes::check_structure(fragment, version)?;
        let classification = raw_classification(fragment, version)
            .map(|raw| {
                Classification::parse(raw).ok_or_else(|| {
                    ComponentError::content_syntax(format!(
                        "\"{raw}\" is not a valid classification token"
                    ))
                })
            })
            .transpose()?;
        SecurityAttributes::new(classification, raw_owner_producers(fragment, version), version)
    }

    /// Structural half of marking validation: both halves or neither.
    ///
    /// Hosts call this in their structural stage, before any marking token
    /// is parsed.
    pub(crate) fn check_structure(
        fragment: &Fragment,
        version: FormatVersion,
    ) -> Result<(), ComponentError> {
        require_paired(
            raw_classification(fragment, version).is_some(),
            !raw_owner_producers(fragment, version).is_empty(),
        )
    }

    /// True when `fragment` carries a non-empty marking, parsed or not.
    /// Hosts that gate the whole marking check this in their gate stage.
    pub(crate) fn is_present(fragment: &Fragment, version: FormatVersion) -> bool {
        raw_classification(fragment, version).is_some()
            || !raw_owner_producers(fragment, version).is_empty()
    }

    fn validate(&self, version: FormatVersion) -> Result<(), ComponentError> {
        require_paired(self.classification.is_some(), !self.owner_producers.is_empty())?;
        if let Some(classification) = self.classification {
            validate::not_before(
                version,
                classification.introduced(),
                &format!("the {} classification token", classification.token()),
            )?;
        }
        for token in &self.owner_producers {
            if token.is_empty() || token.chars().any(char::is_whitespace) {
                return Err(ComponentError::content_syntax(format!(
                    "\"{token}\" is not a valid ownerProducer token"
                )));
            }
        }
        Ok(())
    }

    /// Writes raw marking slots onto a staged fragment without validating;
    /// the host's from-fragment pass judges them.
    pub(crate) fn stage_raw(
        fragment: &mut Fragment,
        classification: Option<&str>,
        owner_producers: &[String],
        version: FormatVersion,
    ) {
        let ns = version.namespace(Vocabulary::Marking);
        if let (Some(raw), Some(name)) = (
            classification.filter(|raw| !raw.is_empty()),
            registry::element_name(version, logical::SECURITY_CLASSIFICATION),
        ) {
            fragment.set_attribute(ns, name, raw);
        }
        let tokens: Vec<&str> = owner_producers
            .iter()
            .filter(|token| !token.is_empty())
            .map(String::as_str)
            .collect();
        if let (false, Some(name)) = (
            tokens.is_empty(),
            registry::element_name(version, logical::SECURITY_OWNER_PRODUCER),
        ) {
            fragment.set_attribute(ns, name, tokens.join(" "));
        }
    }

    /// True when no marking is present.
    pub fn is_empty(&self) -> bool {
        self.classification.is_none() && self.owner_producers.is_empty()
    }

    pub fn classification(&self) -> Option<Classification> {
        self.classification
    }

    /// Producer tokens in document order.
    pub fn owner_producers(&self) -> &[String] {
        &self.owner_producers
    }

    /// Writes the marking attributes onto a synthesized fragment.
    pub(crate) fn apply(&self, fragment: &mut Fragment, version: FormatVersion) {
        let ns = version.namespace(Vocabulary::Marking);
        if let Some(classification) = self.classification {
            if let Some(name) = registry::element_name(version, logical::SECURITY_CLASSIFICATION) {
                fragment.set_attribute(ns, name, classification.token());
            }
        }
        if !self.owner_producers.is_empty() {
            if let Some(name) = registry::element_name(version, logical::SECURITY_OWNER_PRODUCER) {
                fragment.set_attribute(ns, name, self.owner_producers.join(" "));
            }
        }
    }

    /// Emits marking fields to the flat formats, after substantive fields.
    pub(crate) fn write_flat(&self, writer: &mut FlatWriter, version: FormatVersion) {
        if let Some(classification) = self.classification {
            if let Some(name) = registry::element_name(version, logical::SECURITY_CLASSIFICATION) {
                writer.field(name, classification.token());
            }
        }
        if let Some(name) = registry::element_name(version, logical::SECURITY_OWNER_PRODUCER) {
            for owner in &self.owner_producers {
                writer.field(name, owner);
            }
        }
    }
}

/// Unparsed classification attribute value, empty treated as absent.
fn raw_classification<'f>(fragment: &'f Fragment, version: FormatVersion) -> Option<&'f str> {
    let ns = version.namespace(Vocabulary::Marking);
    registry::element_name(version, logical::SECURITY_CLASSIFICATION)
        .and_then(|name| fragment.attribute(ns, name))
        .filter(|raw| !raw.is_empty())
}

/// Whitespace-split ownerProducer tokens, possibly none.
fn raw_owner_producers(fragment: &Fragment, version: FormatVersion) -> Vec<String> {
    let ns = version.namespace(Vocabulary::Marking);
    registry::element_name(version, logical::SECURITY_OWNER_PRODUCER)
        .and_then(|name| fragment.attribute(ns, name))
        .map(|raw| raw.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

fn require_paired(has_classification: bool, has_owners: bool) -> Result<(), ComponentError> {
    match (has_classification, has_owners) {
        (true, false) => Err(ComponentError::structural(
            "an ownerProducer attribute is required when classification is set",
        )),
        (false, true) => Err(ComponentError::structural(
            "a classification attribute is required when ownerProducer is set",
        )),
        _ => Ok(()),
    }
}

/// Staging builder for [`SecurityAttributes`].
///
/// Unlike component builders, commit yields an empty marking (not `None`)
/// when nothing is staged: hosts always carry a marking slot, possibly
/// empty.
#[derive(Debug, Clone, Default)]
pub struct SecurityAttributesBuilder {
    pub classification: Option<String>,
    pub owner_producers: Vec<String>,
}

impl SecurityAttributesBuilder {
    pub fn is_empty(&self) -> bool {
        builder::blank(&self.classification)
            && self.owner_producers.iter().all(|token| token.is_empty())
    }

    pub fn commit(&self, version: FormatVersion) -> Result<SecurityAttributes, ComponentError> {
        if self.is_empty() {
            return Ok(SecurityAttributes::default());
        }
        let classification = match self.classification.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(Classification::parse(raw).ok_or_else(|| {
                ComponentError::content_syntax(format!(
                    "\"{raw}\" is not a valid classification token"
                ))
            })?),
        };
        let owner_producers = self
            .owner_producers
            .iter()
            .filter(|token| !token.is_empty())
            .cloned()
            .collect();
        SecurityAttributes::new(classification, owner_producers, version)
    }
}

impl From<&SecurityAttributes> for SecurityAttributesBuilder {
    fn from(attributes: &SecurityAttributes) -> SecurityAttributesBuilder {
        SecurityAttributesBuilder {
            classification: attributes.classification().map(|c| c.token().to_string()),
            owner_producers: attributes.owner_producers().to_vec(),
        }
    }
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_partial_marking_is_structural() {
        let err = SecurityAttributes::new(
            Some(Classification::U),
            Vec::new(),
            FormatVersion::V4_1,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);

        let err = SecurityAttributes::new(
            None,
            vec!["USA".to_string()],
            FormatVersion::V4_1,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
    }

    #[test]
    fn test_restricted_gated_at_3_0() {
        let marking = SecurityAttributes::new(
            Some(Classification::R),
            vec!["USA".to_string()],
            FormatVersion::V3_0,
        )
        .unwrap();
        assert_eq!(marking.classification(), Some(Classification::R));

        let err = SecurityAttributes::new(
            Some(Classification::R),
            vec!["USA".to_string()],
            FormatVersion::V2_0,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VersionGate);
        assert_eq!(
            err.message(),
            "the R classification token must not be used before DMF 3.0"
        );
    }

    #[test]
    fn test_from_fragment_reads_marking_namespace() {
        let fragment = Fragment::parse(
            "<dmf:keyword xmlns:dmf=\"urn:dmf:meta:4\" xmlns:mrk=\"urn:dmf:marking:9\" \
             dmf:ignore=\"\" value=\"x\" mrk:classification=\"TS\" \
             mrk:ownerProducer=\"USA AUS\"/>",
        )
        .unwrap();
        let marking = SecurityAttributes::from_fragment(&fragment, FormatVersion::V4_1).unwrap();
        assert_eq!(marking.classification(), Some(Classification::TS));
        assert_eq!(marking.owner_producers(), ["USA", "AUS"]);
    }

    #[test]
    fn test_empty_marking_round_trip() {
        let fragment = Fragment::parse("<dmf:keyword xmlns:dmf=\"urn:dmf:meta:4\" value=\"x\"/>")
            .unwrap();
        let marking = SecurityAttributes::from_fragment(&fragment, FormatVersion::V4_1).unwrap();
        assert!(marking.is_empty());

        let mut out = Fragment::new("urn:dmf:meta:4", "keyword");
        marking.apply(&mut out, FormatVersion::V4_1);
        assert!(out.attributes().is_empty());
    }

    #[test]
    fn test_partial_marking_outranks_bad_token() {
        // classification present without ownerProducer AND malformed: the
        // structural finding wins over the token syntax finding
        let fragment = Fragment::parse(
            "<dmf:keyword xmlns:dmf=\"urn:dmf:meta:4\" xmlns:mrk=\"urn:dmf:marking:9\" \
             mrk:classification=\"X\"/>",
        )
        .unwrap();
        let err = SecurityAttributes::from_fragment(&fragment, FormatVersion::V4_1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
        assert_eq!(
            err.message(),
            "an ownerProducer attribute is required when classification is set"
        );
    }

    #[test]
    fn test_invalid_token() {
        let fragment = Fragment::parse(
            "<dmf:keyword xmlns:dmf=\"urn:dmf:meta:4\" xmlns:mrk=\"urn:dmf:marking:9\" \
             mrk:classification=\"X\" mrk:ownerProducer=\"USA\"/>",
        )
        .unwrap();
        let err = SecurityAttributes::from_fragment(&fragment, FormatVersion::V4_1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ContentSyntax);
        assert_eq!(err.message(), "\"X\" is not a valid classification token");
    }

    #[test]
    fn test_builder_lifecycle() {
        let mut staged = SecurityAttributesBuilder::default();
        assert!(staged.is_empty());
        assert!(staged.commit(FormatVersion::V4_1).unwrap().is_empty());

        staged.classification = Some("S".to_string());
        staged.owner_producers = vec!["USA".to_string(), String::new()];
        assert!(!staged.is_empty());
        let marking = staged.commit(FormatVersion::V4_1).unwrap();
        assert_eq!(marking.classification(), Some(Classification::S));
        assert_eq!(marking.owner_producers(), ["USA"]);

        let reseeded = SecurityAttributesBuilder::from(&marking);
        assert_eq!(reseeded.commit(FormatVersion::V4_1).unwrap(), marking);
    }
}
