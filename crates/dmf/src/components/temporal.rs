//! Temporal coverage component.

use crate::attributes::{SecurityAttributes, SecurityAttributesBuilder};
use crate::builder::{blank, Builder};
use crate::component::{
    impl_markup_identity, locator_segment, resolve_name, Component, ComponentCore, Extractor,
};
use crate::error::ComponentError;
use crate::fragment::{Fragment, QName};
use crate::registry::{self, logical};
use crate::render::FlatWriter;
use crate::util::{detect_date_format, is_date_sentinel, DateFormat};
use crate::validate::{self, ValidationMessage};
use crate::version::{FormatVersion, Vocabulary};

/// Value substituted for absent or empty time-frame fields.
const DEFAULT_TIME_POINT: &str = "Unknown";

/// Named period of time with a start and end point.
///
/// Before 4.1 the fields sit inside a `TimePeriod` wrapper; from 4.1 they
/// sit directly under the component. All three fields default to `Unknown`
/// when absent; an element that is present but empty draws a warning on top
/// of the default. Start and end accept the recognized date shapes and the
/// sentinel tokens. Marking attributes are host-gated to 3.0+.
#[derive(Debug, Clone)]
pub struct TemporalCoverage {
    core: ComponentCore,
    canonical: Fragment,
    name: String,
    start: String,
    end: String,
    security: SecurityAttributes,
}

impl TemporalCoverage {
    pub fn from_fragment(
        fragment: &Fragment,
        version: FormatVersion,
    ) -> Result<TemporalCoverage, ComponentError> {
        TemporalCoverage::build(fragment, version)
            .map_err(|e| e.at(locator_segment(version, logical::TEMPORAL_COVERAGE)))
    }

    pub fn new(
        name: Option<String>,
        start: Option<String>,
        end: Option<String>,
        security: SecurityAttributes,
        version: FormatVersion,
    ) -> Result<TemporalCoverage, ComponentError> {
        let staged = stage(name.as_deref(), start.as_deref(), end.as_deref(), &security, version)
            .map_err(|e| e.at(locator_segment(version, logical::TEMPORAL_COVERAGE)))?;
        TemporalCoverage::from_fragment(&staged, version)
    }

    fn build(
        fragment: &Fragment,
        version: FormatVersion,
    ) -> Result<TemporalCoverage, ComponentError> {
        let extractor = Extractor::new(fragment, version);
        let qname = extractor.expect_name(logical::TEMPORAL_COVERAGE)?;

        // structure
        SecurityAttributes::check_structure(fragment, version)?;
        let inner = extractor.step_into_wrapper(logical::TEMPORAL_COVERAGE)?;
        let raw_name = inner.optional_child_text(logical::TEMPORAL_COVERAGE_NAME)?;
        let raw_start = inner.optional_child_text(logical::TEMPORAL_COVERAGE_START)?;
        let raw_end = inner.optional_child_text(logical::TEMPORAL_COVERAGE_END)?;

        // version gates
        if SecurityAttributes::is_present(fragment, version) {
            validate::not_before(version, FormatVersion::V3_0, "security attributes")?;
        }
        for (field, raw) in [
            (logical::TEMPORAL_COVERAGE_START, &raw_start),
            (logical::TEMPORAL_COVERAGE_END, &raw_end),
        ] {
            if let Some(raw) = raw {
                if detect_date_format(raw.trim()) == Some(DateFormat::HourMin) {
                    validate::not_before(
                        version,
                        FormatVersion::V4_1,
                        &format!("the hh:mm date format in {}", inner.resolved(field)),
                    )?;
                }
            }
        }

        // content
        let security = SecurityAttributes::from_fragment(fragment, version)?;
        let mut warnings = Vec::new();
        let name = defaulted(
            raw_name.as_deref(),
            inner.resolved(logical::TEMPORAL_COVERAGE_NAME),
            version,
            &mut warnings,
        );
        let start = defaulted(
            raw_start.as_deref(),
            inner.resolved(logical::TEMPORAL_COVERAGE_START),
            version,
            &mut warnings,
        );
        let end = defaulted(
            raw_end.as_deref(),
            inner.resolved(logical::TEMPORAL_COVERAGE_END),
            version,
            &mut warnings,
        );
        for (field, value) in [
            (logical::TEMPORAL_COVERAGE_START, &start),
            (logical::TEMPORAL_COVERAGE_END, &end),
        ] {
            if !is_date_sentinel(value) && detect_date_format(value).is_none() {
                return Err(ComponentError::content_syntax(format!(
                    "{} is not a valid date value: \"{value}\"",
                    inner.resolved(field)
                )));
            }
        }

        let canonical = stage(Some(&name), Some(&start), Some(&end), &security, version)?;
        let mut core = ComponentCore::new(qname, version);
        core.attach_warnings(warnings);
        Ok(TemporalCoverage {
            core,
            canonical,
            name,
            start,
            end,
            security,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    /// Detected shape of the start value; `None` for sentinel tokens.
    pub fn start_format(&self) -> Option<DateFormat> {
        detect_date_format(&self.start)
    }

    /// Detected shape of the end value; `None` for sentinel tokens.
    pub fn end_format(&self) -> Option<DateFormat> {
        detect_date_format(&self.end)
    }

    pub fn security(&self) -> &SecurityAttributes {
        &self.security
    }
}

/// Applies the `Unknown` default, warning when the element was present but
/// carried no value.
fn defaulted(
    raw: Option<&str>,
    field: &str,
    version: FormatVersion,
    warnings: &mut Vec<ValidationMessage>,
) -> String {
    match raw {
        None => DEFAULT_TIME_POINT.to_string(),
        Some(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                warnings.push(ValidationMessage::warning(
                    format!("An empty {field} element was found; defaulting to \"Unknown\"."),
                    locator_segment(version, logical::TEMPORAL_COVERAGE),
                ));
                DEFAULT_TIME_POINT.to_string()
            } else {
                trimmed.to_string()
            }
        }
    }
}

/// Synthesizes the component shape, wrapping the time-frame children in a
/// `TimePeriod` element when the revision prescribes one.
fn stage(
    name: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
    security: &SecurityAttributes,
    version: FormatVersion,
) -> Result<Fragment, ComponentError> {
    let ns = version.namespace(Vocabulary::Core);
    let mut fragment = Fragment::new(ns, resolve_name(version, logical::TEMPORAL_COVERAGE)?);
    security.apply(&mut fragment, version);
    let mut points = Vec::new();
    for (field, value) in [
        (logical::TEMPORAL_COVERAGE_NAME, name),
        (logical::TEMPORAL_COVERAGE_START, start),
        (logical::TEMPORAL_COVERAGE_END, end),
    ] {
        if let Some(value) = value {
            let mut child = Fragment::new(ns, resolve_name(version, field)?);
            child.set_text(value);
            points.push(child);
        }
    }
    attach_time_period(&mut fragment, points, version);
    Ok(fragment)
}

fn attach_time_period(fragment: &mut Fragment, points: Vec<Fragment>, version: FormatVersion) {
    match registry::wrapper_name(version, logical::TEMPORAL_COVERAGE) {
        Some(wrapper) => {
            let ns = version.namespace(Vocabulary::Core);
            let mut period = Fragment::new(ns, wrapper);
            for point in points {
                period.push_child(point);
            }
            fragment.push_child(period);
        }
        None => {
            for point in points {
                fragment.push_child(point);
            }
        }
    }
}

impl Component for TemporalCoverage {
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
            for (field, value) in [
                (logical::TEMPORAL_COVERAGE_NAME, &self.name),
                (logical::TEMPORAL_COVERAGE_START, &self.start),
                (logical::TEMPORAL_COVERAGE_END, &self.end),
            ] {
                if let Some(name) = registry::element_name(version, field) {
                    w.field(name, value);
                }
            }
            self.security.write_flat(w, version);
        });
    }
}

impl_markup_identity!(TemporalCoverage);

/// Staging builder for [`TemporalCoverage`].
#[derive(Debug, Clone, Default)]
pub struct TemporalCoverageBuilder {
    pub name: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub security: SecurityAttributesBuilder,
}

impl Builder for TemporalCoverageBuilder {
    type Target = TemporalCoverage;

    fn is_empty(&self) -> bool {
        blank(&self.name) && blank(&self.start) && blank(&self.end) && self.security.is_empty()
    }

    fn commit(&self, version: FormatVersion) -> Result<Option<TemporalCoverage>, ComponentError> {
        if self.is_empty() {
            return Ok(None);
        }
        let annotate =
            |e: ComponentError| e.at(locator_segment(version, logical::TEMPORAL_COVERAGE));
        let ns = version.namespace(Vocabulary::Core);
        let mut fragment = Fragment::new(
            ns,
            resolve_name(version, logical::TEMPORAL_COVERAGE).map_err(annotate)?,
        );
        SecurityAttributes::stage_raw(
            &mut fragment,
            self.security.classification.as_deref(),
            &self.security.owner_producers,
            version,
        );
        let mut points = Vec::new();
        for (field, slot) in [
            (logical::TEMPORAL_COVERAGE_NAME, &self.name),
            (logical::TEMPORAL_COVERAGE_START, &self.start),
            (logical::TEMPORAL_COVERAGE_END, &self.end),
        ] {
            if let Some(value) = slot {
                let mut child =
                    Fragment::new(ns, resolve_name(version, field).map_err(annotate)?);
                child.set_text(value.clone());
                points.push(child);
            }
        }
        attach_time_period(&mut fragment, points, version);
        TemporalCoverage::from_fragment(&fragment, version).map(Some)
    }
}

impl From<&TemporalCoverage> for TemporalCoverageBuilder {
    fn from(component: &TemporalCoverage) -> TemporalCoverageBuilder {
        TemporalCoverageBuilder {
            name: Some(component.name.clone()),
            start: Some(component.start.clone()),
            end: Some(component.end.clone()),
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
    use proptest::prelude::*;

    fn period(version: FormatVersion) -> TemporalCoverage {
        TemporalCoverage::new(
            Some("The Mission".to_string()),
            Some("2011-08-15".to_string()),
            Some("Unknown".to_string()),
            SecurityAttributes::default(),
            version,
        )
        .unwrap()
    }

    #[test]
    fn test_markup_wrapped_and_unwrapped() {
        assert_eq!(
            markup(&period(FormatVersion::V3_1)),
            "<dmf:temporalCoverage xmlns:dmf=\"urn:dmf:meta:3.1\"><dmf:TimePeriod>\
             <dmf:name>The Mission</dmf:name>\
             <dmf:start>2011-08-15</dmf:start>\
             <dmf:end>Unknown</dmf:end>\
             </dmf:TimePeriod></dmf:temporalCoverage>"
        );
        assert_eq!(
            markup(&period(FormatVersion::V4_1)),
            "<dmf:temporalCoverage xmlns:dmf=\"urn:dmf:meta:4\">\
             <dmf:name>The Mission</dmf:name>\
             <dmf:start>2011-08-15</dmf:start>\
             <dmf:end>Unknown</dmf:end>\
             </dmf:temporalCoverage>"
        );
    }

    #[test]
    fn test_wrapper_required_before_4_1() {
        let fragment = Fragment::parse(
            "<dmf:temporalCoverage xmlns:dmf=\"urn:dmf:meta:3.1\">\
             <dmf:start>2011</dmf:start>\
             </dmf:temporalCoverage>",
        )
        .unwrap();
        let err = TemporalCoverage::from_fragment(&fragment, FormatVersion::V3_1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
        assert_eq!(
            err.to_string(),
            "structural error: a TimePeriod element is required (locator: temporalCoverage)"
        );
    }

    #[test]
    fn test_all_fields_default_to_unknown() {
        let empty = TemporalCoverage::new(
            None,
            None,
            None,
            SecurityAttributes::default(),
            FormatVersion::V4_1,
        )
        .unwrap();
        assert_eq!(empty.name(), "Unknown");
        assert_eq!(empty.start(), "Unknown");
        assert_eq!(empty.end(), "Unknown");
        assert!(empty.warnings().is_empty());
        assert_eq!(empty.start_format(), None);
    }

    #[test]
    fn test_present_but_empty_field_warns() {
        let fragment = Fragment::parse(
            "<dmf:temporalCoverage xmlns:dmf=\"urn:dmf:meta:4\">\
             <dmf:name>  </dmf:name>\
             <dmf:start>2011</dmf:start>\
             </dmf:temporalCoverage>",
        )
        .unwrap();
        let coverage = TemporalCoverage::from_fragment(&fragment, FormatVersion::V4_1).unwrap();
        assert_eq!(coverage.name(), "Unknown");
        assert_eq!(coverage.warnings().len(), 1);
        assert_eq!(
            coverage.warnings()[0].text(),
            "An empty name element was found; defaulting to \"Unknown\"."
        );
        assert_eq!(coverage.warnings()[0].locator(), "temporalCoverage");
    }

    #[test]
    fn test_warnings_do_not_affect_equality() {
        let fragment = Fragment::parse(
            "<dmf:temporalCoverage xmlns:dmf=\"urn:dmf:meta:4\">\
             <dmf:name/>\
             </dmf:temporalCoverage>",
        )
        .unwrap();
        let with_warning = TemporalCoverage::from_fragment(&fragment, FormatVersion::V4_1).unwrap();
        assert_eq!(with_warning.warnings().len(), 1);

        let reparsed = TemporalCoverage::from_fragment(
            &Fragment::parse(&markup(&with_warning)).unwrap(),
            FormatVersion::V4_1,
        )
        .unwrap();
        assert!(reparsed.warnings().is_empty());
        assert_eq!(with_warning, reparsed);
    }

    #[test]
    fn test_date_shapes_and_sentinels() {
        let coverage = TemporalCoverage::new(
            None,
            Some("2011-08".to_string()),
            Some("Not Applicable".to_string()),
            SecurityAttributes::default(),
            FormatVersion::V4_1,
        )
        .unwrap();
        assert_eq!(coverage.start_format(), Some(DateFormat::YearMonth));
        assert_eq!(coverage.end_format(), None);

        let err = TemporalCoverage::new(
            None,
            Some("15-08-2011".to_string()),
            None,
            SecurityAttributes::default(),
            FormatVersion::V4_1,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ContentSyntax);
        assert_eq!(
            err.to_string(),
            "content syntax error: start is not a valid date value: \"15-08-2011\" \
             (locator: temporalCoverage)"
        );
    }

    #[test]
    fn test_multibyte_date_text_is_a_content_error() {
        // byte 19 of the start text falls inside 'é'
        let fragment = Fragment::parse(
            "<dmf:temporalCoverage xmlns:dmf=\"urn:dmf:meta:4\">\
             <dmf:start>2011-08-15T12:00:0é</dmf:start>\
             </dmf:temporalCoverage>",
        )
        .unwrap();
        let err = TemporalCoverage::from_fragment(&fragment, FormatVersion::V4_1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ContentSyntax);
        assert_eq!(
            err.to_string(),
            "content syntax error: start is not a valid date value: \"2011-08-15T12:00:0é\" \
             (locator: temporalCoverage)"
        );
    }

    #[test]
    fn test_hour_min_gated_before_4_1() {
        let err = TemporalCoverage::new(
            None,
            Some("09:30".to_string()),
            None,
            SecurityAttributes::default(),
            FormatVersion::V3_1,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VersionGate);
        assert_eq!(
            err.message(),
            "the hh:mm date format in start must not be used before DMF 4.1"
        );

        let coverage = TemporalCoverage::new(
            None,
            Some("09:30".to_string()),
            None,
            SecurityAttributes::default(),
            FormatVersion::V4_1,
        )
        .unwrap();
        assert_eq!(coverage.start_format(), Some(DateFormat::HourMin));
    }

    #[test]
    fn test_security_gated_before_3_0() {
        let marking = SecurityAttributes::new(
            Some(Classification::U),
            vec!["USA".to_string()],
            FormatVersion::V2_0,
        )
        .unwrap();
        let err = TemporalCoverage::new(
            None,
            Some("2011".to_string()),
            None,
            marking.clone(),
            FormatVersion::V2_0,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VersionGate);
        assert_eq!(
            err.message(),
            "security attributes must not be used before DMF 3.0"
        );

        let coverage = TemporalCoverage::new(
            None,
            Some("2011".to_string()),
            None,
            marking,
            FormatVersion::V3_0,
        )
        .unwrap();
        assert_eq!(coverage.security().classification(), Some(Classification::U));
    }

    #[test]
    fn test_round_trip_all_revisions() {
        for version in FormatVersion::ALL {
            let built = period(version);
            let reparsed = TemporalCoverage::from_fragment(
                &Fragment::parse(&markup(&built)).unwrap(),
                version,
            )
            .unwrap();
            assert_eq!(built, reparsed);
        }
    }

    #[test]
    fn test_flat_output_with_marking() {
        let coverage = TemporalCoverage::new(
            Some("The Mission".to_string()),
            Some("2011-08-15".to_string()),
            None,
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
            render(&coverage, OutputFormat::Text, ""),
            "temporalCoverage.name: The Mission\n\
             temporalCoverage.start: 2011-08-15\n\
             temporalCoverage.end: Unknown\n\
             temporalCoverage.classification: U\n\
             temporalCoverage.ownerProducer: USA"
        );
    }

    #[test]
    fn test_builder_lifecycle() {
        let mut staged = TemporalCoverageBuilder::default();
        assert!(staged.is_empty());
        assert!(staged.commit(FormatVersion::V3_1).unwrap().is_none());

        staged.start = Some("2011-08-15".to_string());
        staged.security.classification = Some("U".to_string());
        staged.security.owner_producers.push("USA".to_string());
        let committed = staged.commit(FormatVersion::V3_1).unwrap().unwrap();
        assert_eq!(committed.start(), "2011-08-15");
        assert_eq!(committed.end(), "Unknown");
        assert_eq!(
            committed.security().classification(),
            Some(Classification::U)
        );

        let reseeded = TemporalCoverageBuilder::from(&committed);
        assert_eq!(
            reseeded.commit(FormatVersion::V3_1).unwrap().unwrap(),
            committed
        );

        staged.start = None;
        staged.security = SecurityAttributesBuilder::default();
        assert!(staged.is_empty());
    }

    #[test]
    fn test_builder_partial_marking_fails_structurally() {
        let mut staged = TemporalCoverageBuilder::default();
        staged.security.classification = Some("U".to_string());
        let err = staged.commit(FormatVersion::V4_1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
        assert_eq!(
            err.to_string(),
            "structural error: an ownerProducer attribute is required when classification is \
             set (locator: temporalCoverage)"
        );
    }

    #[test]
    fn test_double_validation_is_deterministic() {
        let fragment = Fragment::parse(
            "<dmf:temporalCoverage xmlns:dmf=\"urn:dmf:meta:4\">\
             <dmf:name/><dmf:start>  </dmf:start>\
             </dmf:temporalCoverage>",
        )
        .unwrap();
        let first = TemporalCoverage::from_fragment(&fragment, FormatVersion::V4_1).unwrap();
        let second = TemporalCoverage::from_fragment(&fragment, FormatVersion::V4_1).unwrap();
        assert_eq!(first.warnings(), second.warnings());
        assert_eq!(first.warnings().len(), 2);
        assert_eq!(first, second);

        let bad = Fragment::parse(
            "<dmf:temporalCoverage xmlns:dmf=\"urn:dmf:meta:4\">\
             <dmf:start>someday</dmf:start>\
             </dmf:temporalCoverage>",
        )
        .unwrap();
        let first = TemporalCoverage::from_fragment(&bad, FormatVersion::V4_1).unwrap_err();
        let second = TemporalCoverage::from_fragment(&bad, FormatVersion::V4_1).unwrap_err();
        assert_eq!(first, second);
        assert_eq!(first.to_string(), second.to_string());
    }

    proptest! {
        #[test]
        fn prop_date_formats_survive_round_trip(
            year in 1583u32..=9999,
            month in 1u32..=12,
            day in 1u32..=28,
            hour in 0u32..=23,
            minute in 0u32..=59,
            pick in 0usize..5,
        ) {
            let value = match pick {
                0 => format!("{year:04}"),
                1 => format!("{year:04}-{month:02}"),
                2 => format!("{year:04}-{month:02}-{day:02}"),
                3 => format!("{hour:02}:{minute:02}"),
                _ => format!("{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:00Z"),
            };
            let built = TemporalCoverage::new(
                None,
                Some(value),
                None,
                SecurityAttributes::default(),
                FormatVersion::V4_1,
            )
            .unwrap();
            prop_assert!(built.start_format().is_some());
            let reparsed = TemporalCoverage::from_fragment(
                &Fragment::parse(&markup(&built)).unwrap(),
                FormatVersion::V4_1,
            )
            .unwrap();
            prop_assert_eq!(built.start_format(), reparsed.start_format());
            prop_assert_eq!(&built, &reparsed);
        }
    }
}
