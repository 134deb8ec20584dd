//! Subject coverage component and its keywords.

use crate::attributes::{SecurityAttributes, SecurityAttributesBuilder};
use crate::builder::{self, blank, Builder};
use crate::component::{
    impl_markup_identity, locator_segment, resolve_name, Component, ComponentCore, Extractor,
};
use crate::error::ComponentError;
use crate::fragment::{Fragment, QName};
use crate::registry::{self, logical};
use crate::render::FlatWriter;
use crate::validate::{self, ValidationMessage};
use crate::version::{FormatVersion, Vocabulary};

// ============ Keyword ============

/// Single subject keyword.
///
/// Per-keyword marking attributes are host-gated to 4.1+.
#[derive(Debug, Clone)]
pub struct Keyword {
    core: ComponentCore,
    canonical: Fragment,
    value: String,
    security: SecurityAttributes,
}

impl Keyword {
    pub fn from_fragment(
        fragment: &Fragment,
        version: FormatVersion,
    ) -> Result<Keyword, ComponentError> {
        Keyword::build(fragment, version)
            .map_err(|e| e.at(locator_segment(version, logical::KEYWORD)))
    }

    pub fn new(
        value: impl Into<String>,
        security: SecurityAttributes,
        version: FormatVersion,
    ) -> Result<Keyword, ComponentError> {
        let staged = synthesize_keyword(&value.into(), &security, version)
            .map_err(|e| e.at(locator_segment(version, logical::KEYWORD)))?;
        Keyword::from_fragment(&staged, version)
    }

    fn build(fragment: &Fragment, version: FormatVersion) -> Result<Keyword, ComponentError> {
        let extractor = Extractor::new(fragment, version);
        let qname = extractor.expect_name(logical::KEYWORD)?;

        // structure
        SecurityAttributes::check_structure(fragment, version)?;
        let value = extractor
            .local_attr(logical::KEYWORD_VALUE)
            .filter(|raw| !raw.is_empty());
        validate::require(value.is_some(), "a value attribute")?;

        // version gates
        if SecurityAttributes::is_present(fragment, version) {
            validate::not_before(version, FormatVersion::V4_1, "security attributes")?;
        }

        // content
        let security = SecurityAttributes::from_fragment(fragment, version)?;

        let value = value.unwrap_or_default().to_string();
        let canonical = synthesize_keyword(&value, &security, version)?;
        Ok(Keyword {
            core: ComponentCore::new(qname, version),
            canonical,
            value,
            security,
        })
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn security(&self) -> &SecurityAttributes {
        &self.security
    }
}

fn synthesize_keyword(
    value: &str,
    security: &SecurityAttributes,
    version: FormatVersion,
) -> Result<Fragment, ComponentError> {
    let ns = version.namespace(Vocabulary::Core);
    let mut fragment = Fragment::new(ns, resolve_name(version, logical::KEYWORD)?);
    fragment.set_attribute("", resolve_name(version, logical::KEYWORD_VALUE)?, value);
    security.apply(&mut fragment, version);
    Ok(fragment)
}

impl Component for Keyword {
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
            if let Some(name) = registry::element_name(version, logical::KEYWORD_VALUE) {
                w.field(name, &self.value);
            }
            self.security.write_flat(w, version);
        });
    }
}

impl_markup_identity!(Keyword);

/// Staging builder for [`Keyword`].
#[derive(Debug, Clone, Default)]
pub struct KeywordBuilder {
    pub value: Option<String>,
    pub security: SecurityAttributesBuilder,
}

impl Builder for KeywordBuilder {
    type Target = Keyword;

    fn is_empty(&self) -> bool {
        blank(&self.value) && self.security.is_empty()
    }

    fn commit(&self, version: FormatVersion) -> Result<Option<Keyword>, ComponentError> {
        if self.is_empty() {
            return Ok(None);
        }
        let annotate = |e: ComponentError| e.at(locator_segment(version, logical::KEYWORD));
        let ns = version.namespace(Vocabulary::Core);
        let mut fragment =
            Fragment::new(ns, resolve_name(version, logical::KEYWORD).map_err(annotate)?);
        if let Some(value) = self.value.as_deref().filter(|v| !v.is_empty()) {
            fragment.set_attribute(
                "",
                resolve_name(version, logical::KEYWORD_VALUE).map_err(annotate)?,
                value,
            );
        }
        SecurityAttributes::stage_raw(
            &mut fragment,
            self.security.classification.as_deref(),
            &self.security.owner_producers,
            version,
        );
        Keyword::from_fragment(&fragment, version).map(Some)
    }
}

impl From<&Keyword> for KeywordBuilder {
    fn from(component: &Keyword) -> KeywordBuilder {
        KeywordBuilder {
            value: Some(component.value.clone()),
            security: SecurityAttributesBuilder::from(&component.security),
        }
    }
}

// ============ SubjectCoverage ============

/// Subject matter of the described resource, as a set of keywords.
///
/// Before 4.1 the keywords sit inside a `Subject` wrapper; from 4.1 they sit
/// directly under the component. At least one keyword is required; exact
/// duplicates draw a warning. Marking attributes on the component itself are
/// host-gated to 3.0+.
#[derive(Debug, Clone)]
pub struct SubjectCoverage {
    core: ComponentCore,
    canonical: Fragment,
    keywords: Vec<Keyword>,
    security: SecurityAttributes,
}

impl SubjectCoverage {
    pub fn from_fragment(
        fragment: &Fragment,
        version: FormatVersion,
    ) -> Result<SubjectCoverage, ComponentError> {
        SubjectCoverage::build(fragment, version)
            .map_err(|e| e.at(locator_segment(version, logical::SUBJECT_COVERAGE)))
    }

    pub fn new(
        keywords: Vec<Keyword>,
        security: SecurityAttributes,
        version: FormatVersion,
    ) -> Result<SubjectCoverage, ComponentError> {
        let staged = synthesize_subject(&keywords, &security, version)
            .map_err(|e| e.at(locator_segment(version, logical::SUBJECT_COVERAGE)))?;
        SubjectCoverage::from_fragment(&staged, version)
    }

    fn build(
        fragment: &Fragment,
        version: FormatVersion,
    ) -> Result<SubjectCoverage, ComponentError> {
        let extractor = Extractor::new(fragment, version);
        let qname = extractor.expect_name(logical::SUBJECT_COVERAGE)?;

        // structure
        SecurityAttributes::check_structure(fragment, version)?;
        let inner = extractor.step_into_wrapper(logical::SUBJECT_COVERAGE)?;
        let keyword_children = inner.children(logical::KEYWORD);
        validate::at_least_one(keyword_children.len(), "keyword element")?;

        // version gates
        if SecurityAttributes::is_present(fragment, version) {
            validate::not_before(version, FormatVersion::V3_0, "security attributes")?;
        }

        // children run their own pipelines, errors arrive pre-annotated
        let keywords = keyword_children
            .iter()
            .map(|c| Keyword::from_fragment(c, version))
            .collect::<Result<Vec<Keyword>, ComponentError>>()?;

        // content
        let security = SecurityAttributes::from_fragment(fragment, version)?;

        let mut warnings = Vec::new();
        if validate::has_duplicates(keywords.iter().map(Keyword::value)) {
            warnings.push(ValidationMessage::warning(
                "Duplicate keyword values were found.",
                locator_segment(version, logical::SUBJECT_COVERAGE),
            ));
        }

        let canonical = synthesize_subject(&keywords, &security, version)?;
        let mut core = ComponentCore::new(qname, version);
        core.attach_warnings(warnings);
        Ok(SubjectCoverage {
            core,
            canonical,
            keywords,
            security,
        })
    }

    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    pub fn security(&self) -> &SecurityAttributes {
        &self.security
    }
}

fn synthesize_subject(
    keywords: &[Keyword],
    security: &SecurityAttributes,
    version: FormatVersion,
) -> Result<Fragment, ComponentError> {
    let ns = version.namespace(Vocabulary::Core);
    let mut fragment = Fragment::new(ns, resolve_name(version, logical::SUBJECT_COVERAGE)?);
    security.apply(&mut fragment, version);
    let children = keywords.iter().map(Keyword::to_fragment).collect();
    attach_subject(&mut fragment, children, version);
    Ok(fragment)
}

/// Places keyword children under the `Subject` wrapper when the revision
/// prescribes one.
fn attach_subject(fragment: &mut Fragment, children: Vec<Fragment>, version: FormatVersion) {
    match registry::wrapper_name(version, logical::SUBJECT_COVERAGE) {
        Some(wrapper) => {
            let ns = version.namespace(Vocabulary::Core);
            let mut subject = Fragment::new(ns, wrapper);
            for child in children {
                subject.push_child(child);
            }
            fragment.push_child(subject);
        }
        None => {
            for child in children {
                fragment.push_child(child);
            }
        }
    }
}

impl Component for SubjectCoverage {
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
            for keyword in &self.keywords {
                keyword.write_flat(w);
            }
            self.security.write_flat(w, version);
        });
    }

    fn child_components(&self) -> Vec<&dyn Component> {
        self.keywords.iter().map(|k| k as &dyn Component).collect()
    }
}

impl_markup_identity!(SubjectCoverage);

/// Staging builder for [`SubjectCoverage`].
#[derive(Debug, Clone, Default)]
pub struct SubjectCoverageBuilder {
    pub keywords: Vec<KeywordBuilder>,
    pub security: SecurityAttributesBuilder,
}

impl Builder for SubjectCoverageBuilder {
    type Target = SubjectCoverage;

    fn is_empty(&self) -> bool {
        self.keywords.iter().all(KeywordBuilder::is_empty) && self.security.is_empty()
    }

    fn commit(&self, version: FormatVersion) -> Result<Option<SubjectCoverage>, ComponentError> {
        if self.is_empty() {
            return Ok(None);
        }
        let annotate =
            |e: ComponentError| e.at(locator_segment(version, logical::SUBJECT_COVERAGE));
        let ns = version.namespace(Vocabulary::Core);
        let mut fragment = Fragment::new(
            ns,
            resolve_name(version, logical::SUBJECT_COVERAGE).map_err(annotate)?,
        );
        SecurityAttributes::stage_raw(
            &mut fragment,
            self.security.classification.as_deref(),
            &self.security.owner_producers,
            version,
        );
        let keywords = builder::commit_list(&self.keywords, version).map_err(annotate)?;
        let children = keywords.iter().map(Keyword::to_fragment).collect();
        attach_subject(&mut fragment, children, version);
        SubjectCoverage::from_fragment(&fragment, version).map(Some)
    }
}

impl From<&SubjectCoverage> for SubjectCoverageBuilder {
    fn from(component: &SubjectCoverage) -> SubjectCoverageBuilder {
        SubjectCoverageBuilder {
            keywords: component.keywords.iter().map(KeywordBuilder::from).collect(),
            security: SecurityAttributesBuilder::from(&component.security),
        }
    }
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Classification;
    use crate::error::ErrorKind;
    use crate::render::{markup, render, OutputFormat};

    fn keyword(value: &str, version: FormatVersion) -> Keyword {
        Keyword::new(value, SecurityAttributes::default(), version).unwrap()
    }

    fn coverage(version: FormatVersion) -> SubjectCoverage {
        SubjectCoverage::new(
            vec![keyword("caves", version), keyword("mines", version)],
            SecurityAttributes::default(),
            version,
        )
        .unwrap()
    }

    #[test]
    fn test_keyword_markup() {
        let marked = Keyword::new(
            "caves",
            SecurityAttributes::new(
                Some(Classification::U),
                vec!["USA".to_string()],
                FormatVersion::V4_1,
            )
            .unwrap(),
            FormatVersion::V4_1,
        )
        .unwrap();
        assert_eq!(
            markup(&marked),
            "<dmf:keyword xmlns:dmf=\"urn:dmf:meta:4\" xmlns:mrk=\"urn:dmf:marking:9\" \
             value=\"caves\" mrk:classification=\"U\" mrk:ownerProducer=\"USA\"/>"
        );
    }

    #[test]
    fn test_keyword_requires_value() {
        let err = Keyword::new("", SecurityAttributes::default(), FormatVersion::V4_1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
        assert_eq!(
            err.to_string(),
            "structural error: a value attribute is required (locator: keyword)"
        );
    }

    #[test]
    fn test_keyword_value_newline_round_trips() {
        let fragment = Fragment::parse(
            "<dmf:keyword xmlns:dmf=\"urn:dmf:meta:4\" value=\"line1&#10;line2\"/>",
        )
        .unwrap();
        let built = Keyword::from_fragment(&fragment, FormatVersion::V4_1).unwrap();
        assert_eq!(built.value(), "line1\nline2");
        assert!(markup(&built).contains("value=\"line1&#10;line2\""));

        let reparsed = Keyword::from_fragment(
            &Fragment::parse(&markup(&built)).unwrap(),
            FormatVersion::V4_1,
        )
        .unwrap();
        assert_eq!(built, reparsed);
    }

    #[test]
    fn test_keyword_security_gated_before_4_1() {
        let marking = SecurityAttributes::new(
            Some(Classification::U),
            vec!["USA".to_string()],
            FormatVersion::V3_1,
        )
        .unwrap();
        let err = Keyword::new("caves", marking.clone(), FormatVersion::V3_1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VersionGate);
        assert_eq!(
            err.to_string(),
            "version gate error: security attributes must not be used before DMF 4.1 \
             (locator: keyword)"
        );

        let marked = Keyword::new("caves", marking, FormatVersion::V4_1).unwrap();
        assert_eq!(marked.security().classification(), Some(Classification::U));
    }

    #[test]
    fn test_markup_wrapped_and_unwrapped() {
        assert_eq!(
            markup(&coverage(FormatVersion::V3_1)),
            "<dmf:subjectCoverage xmlns:dmf=\"urn:dmf:meta:3.1\"><dmf:Subject>\
             <dmf:keyword value=\"caves\"/><dmf:keyword value=\"mines\"/>\
             </dmf:Subject></dmf:subjectCoverage>"
        );
        assert_eq!(
            markup(&coverage(FormatVersion::V4_1)),
            "<dmf:subjectCoverage xmlns:dmf=\"urn:dmf:meta:4\">\
             <dmf:keyword value=\"caves\"/><dmf:keyword value=\"mines\"/>\
             </dmf:subjectCoverage>"
        );
    }

    #[test]
    fn test_wrapper_required_before_4_1() {
        let fragment = Fragment::parse(
            "<dmf:subjectCoverage xmlns:dmf=\"urn:dmf:meta:3.1\">\
             <dmf:keyword value=\"caves\"/>\
             </dmf:subjectCoverage>",
        )
        .unwrap();
        let err = SubjectCoverage::from_fragment(&fragment, FormatVersion::V3_1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
        assert_eq!(
            err.to_string(),
            "structural error: a Subject element is required (locator: subjectCoverage)"
        );
    }

    #[test]
    fn test_at_least_one_keyword_required() {
        let fragment = Fragment::parse(
            "<dmf:subjectCoverage xmlns:dmf=\"urn:dmf:meta:3.1\"><dmf:Subject/>\
             </dmf:subjectCoverage>",
        )
        .unwrap();
        let err = SubjectCoverage::from_fragment(&fragment, FormatVersion::V3_1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "structural error: at least one keyword element is required \
             (locator: subjectCoverage)"
        );

        let err = SubjectCoverage::new(
            Vec::new(),
            SecurityAttributes::default(),
            FormatVersion::V4_1,
        )
        .unwrap_err();
        assert_eq!(err.message(), "at least one keyword element is required");
    }

    #[test]
    fn test_duplicate_keywords_warn() {
        let doubled = SubjectCoverage::new(
            vec![
                keyword("caves", FormatVersion::V4_1),
                keyword("caves", FormatVersion::V4_1),
            ],
            SecurityAttributes::default(),
            FormatVersion::V4_1,
        )
        .unwrap();
        assert_eq!(doubled.keywords().len(), 2);
        assert_eq!(doubled.warnings().len(), 1);
        assert_eq!(doubled.warnings()[0].text(), "Duplicate keyword values were found.");
        assert_eq!(doubled.warnings()[0].locator(), "subjectCoverage");

        assert!(coverage(FormatVersion::V4_1).warnings().is_empty());
    }

    #[test]
    fn test_host_security_gated_before_3_0() {
        let marking = SecurityAttributes::new(
            Some(Classification::U),
            vec!["USA".to_string()],
            FormatVersion::V2_0,
        )
        .unwrap();
        let err = SubjectCoverage::new(
            vec![keyword("caves", FormatVersion::V2_0)],
            marking,
            FormatVersion::V2_0,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VersionGate);
        assert_eq!(
            err.message(),
            "security attributes must not be used before DMF 3.0"
        );
    }

    #[test]
    fn test_keyword_error_locator_nests() {
        let fragment = Fragment::parse(
            "<dmf:subjectCoverage xmlns:dmf=\"urn:dmf:meta:4\">\
             <dmf:keyword/>\
             </dmf:subjectCoverage>",
        )
        .unwrap();
        let err = SubjectCoverage::from_fragment(&fragment, FormatVersion::V4_1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "structural error: a value attribute is required (locator: subjectCoverage:keyword)"
        );
    }

    #[test]
    fn test_round_trip_all_revisions() {
        for version in FormatVersion::ALL {
            let built = coverage(version);
            let reparsed = SubjectCoverage::from_fragment(
                &Fragment::parse(&markup(&built)).unwrap(),
                version,
            )
            .unwrap();
            assert_eq!(built, reparsed);
        }
    }

    #[test]
    fn test_flat_output() {
        let marked = SubjectCoverage::new(
            vec![
                keyword("caves", FormatVersion::V4_1),
                keyword("mines", FormatVersion::V4_1),
            ],
            SecurityAttributes::new(
                Some(Classification::U),
                vec!["USA".to_string()],
                FormatVersion::V4_1,
            )
            .unwrap(),
            FormatVersion::V4_1,
        )
        .unwrap();
        assert_eq!(
            render(&marked, OutputFormat::Text, ""),
            "subjectCoverage.keyword.value: caves\n\
             subjectCoverage.keyword.value: mines\n\
             subjectCoverage.classification: U\n\
             subjectCoverage.ownerProducer: USA"
        );
    }

    #[test]
    fn test_builder_lifecycle() {
        let mut staged = SubjectCoverageBuilder::default();
        assert!(staged.is_empty());
        assert!(staged.commit(FormatVersion::V3_1).unwrap().is_none());

        staged.keywords.push(KeywordBuilder {
            value: Some("caves".to_string()),
            ..KeywordBuilder::default()
        });
        staged.keywords.push(KeywordBuilder::default());
        let committed = staged.commit(FormatVersion::V3_1).unwrap().unwrap();
        assert_eq!(committed.keywords().len(), 1);
        assert_eq!(committed.keywords()[0].value(), "caves");

        let reseeded = SubjectCoverageBuilder::from(&committed);
        assert_eq!(
            reseeded.commit(FormatVersion::V3_1).unwrap().unwrap(),
            committed
        );
    }

    #[test]
    fn test_builder_keyword_error_locator() {
        let mut staged = SubjectCoverageBuilder::default();
        staged.keywords.push(KeywordBuilder {
            security: SecurityAttributesBuilder {
                classification: Some("U".to_string()),
                owner_producers: vec!["USA".to_string()],
            },
            ..KeywordBuilder::default()
        });
        let err = staged.commit(FormatVersion::V4_1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "structural error: a value attribute is required (locator: subjectCoverage:keyword)"
        );
    }
}
