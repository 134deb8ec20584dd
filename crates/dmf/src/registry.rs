//! Capability matrix for the supported revisions.
//!
//! Maps a *logical* element or field name to its *serialized* local name
//! under each revision, or to nothing when the revision does not define it.
//! The matrix only reports availability; callers decide what a missing name
//! means (a component removed in a later revision is a structural error, a
//! field introduced in a later revision is a version-gate error).

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

use crate::version::FormatVersion;

/// Logical identifiers used for matrix lookups.
///
/// A logical name identifies an element or field across revisions
/// independently of its serialized spelling. Component-level keys are bare
/// (`"boundingBox"`); field-level keys are dotted (`"boundingBox.west"`).
pub mod logical {
    pub const IDENTIFIER: &str = "identifier";
    pub const IDENTIFIER_QUALIFIER: &str = "identifier.qualifier";
    pub const IDENTIFIER_VALUE: &str = "identifier.value";

    pub const LANGUAGE: &str = "language";
    pub const LANGUAGE_QUALIFIER: &str = "language.qualifier";
    pub const LANGUAGE_VALUE: &str = "language.value";

    pub const BOUNDING_BOX: &str = "boundingBox";
    pub const BOUNDING_BOX_WEST: &str = "boundingBox.west";
    pub const BOUNDING_BOX_EAST: &str = "boundingBox.east";
    pub const BOUNDING_BOX_SOUTH: &str = "boundingBox.south";
    pub const BOUNDING_BOX_NORTH: &str = "boundingBox.north";

    pub const VERTICAL_EXTENT: &str = "verticalExtent";
    pub const VERTICAL_EXTENT_MIN: &str = "verticalExtent.min";
    pub const VERTICAL_EXTENT_MAX: &str = "verticalExtent.max";
    pub const VERTICAL_EXTENT_UOM: &str = "verticalExtent.unitOfMeasure";
    pub const VERTICAL_EXTENT_DATUM: &str = "verticalExtent.datum";

    pub const GEOGRAPHIC_IDENTIFIER: &str = "geographicIdentifier";
    pub const GEOGRAPHIC_IDENTIFIER_NAME: &str = "geographicIdentifier.name";
    pub const GEOGRAPHIC_IDENTIFIER_REGION: &str = "geographicIdentifier.region";
    pub const GEOGRAPHIC_IDENTIFIER_SUBDIVISION: &str = "geographicIdentifier.subDivisionCode";

    pub const COUNTRY_CODE: &str = "countryCode";
    pub const COUNTRY_CODE_QUALIFIER: &str = "countryCode.qualifier";
    pub const COUNTRY_CODE_VALUE: &str = "countryCode.value";

    pub const FACILITY_IDENTIFIER: &str = "facilityIdentifier";
    pub const FACILITY_IDENTIFIER_BE_NUMBER: &str = "facilityIdentifier.beNumber";
    pub const FACILITY_IDENTIFIER_OSUFFIX: &str = "facilityIdentifier.osuffix";

    pub const TEMPORAL_COVERAGE: &str = "temporalCoverage";
    pub const TEMPORAL_COVERAGE_NAME: &str = "temporalCoverage.name";
    pub const TEMPORAL_COVERAGE_START: &str = "temporalCoverage.start";
    pub const TEMPORAL_COVERAGE_END: &str = "temporalCoverage.end";

    pub const POSTAL_ADDRESS: &str = "postalAddress";
    pub const POSTAL_ADDRESS_STREET: &str = "postalAddress.street";
    pub const POSTAL_ADDRESS_CITY: &str = "postalAddress.city";
    pub const POSTAL_ADDRESS_STATE: &str = "postalAddress.state";
    pub const POSTAL_ADDRESS_PROVINCE: &str = "postalAddress.province";
    pub const POSTAL_ADDRESS_POSTAL_CODE: &str = "postalAddress.postalCode";

    pub const SUBJECT_COVERAGE: &str = "subjectCoverage";

    pub const KEYWORD: &str = "keyword";
    pub const KEYWORD_VALUE: &str = "keyword.value";

    pub const LINK: &str = "link";
    pub const LINK_HREF: &str = "link.href";
    pub const LINK_TYPE: &str = "link.type";
    pub const LINK_LABEL: &str = "link.label";

    pub const SECURITY_CLASSIFICATION: &str = "security.classification";
    pub const SECURITY_OWNER_PRODUCER: &str = "security.ownerProducer";
}

/// Serialized names per revision, index-aligned with [`FormatVersion::ALL`].
type NameRow = [Option<&'static str>; 5];

fn all(name: &'static str) -> NameRow {
    [Some(name); 5]
}

fn from_4_1(name: &'static str) -> NameRow {
    [None, None, None, Some(name), Some(name)]
}

fn removed_5_0(name: &'static str) -> NameRow {
    [Some(name), Some(name), Some(name), Some(name), None]
}

fn renamed_4_1(old: &'static str, new: &'static str) -> NameRow {
    [Some(old), Some(old), Some(old), Some(new), Some(new)]
}

/// PascalCase until 4.1, camelCase from 4.1, gone at 5.0.
fn renamed_4_1_removed_5_0(old: &'static str, new: &'static str) -> NameRow {
    [Some(old), Some(old), Some(old), Some(new), None]
}

lazy_static! {
    static ref CAPABILITIES: FxHashMap<&'static str, NameRow> = {
        let mut m = FxHashMap::default();

        m.insert(logical::IDENTIFIER, all("identifier"));
        m.insert(logical::IDENTIFIER_QUALIFIER, all("qualifier"));
        m.insert(logical::IDENTIFIER_VALUE, all("value"));

        m.insert(logical::LANGUAGE, all("language"));
        m.insert(logical::LANGUAGE_QUALIFIER, all("qualifier"));
        m.insert(logical::LANGUAGE_VALUE, all("value"));

        m.insert(logical::BOUNDING_BOX, removed_5_0("boundingBox"));
        m.insert(logical::BOUNDING_BOX_WEST, renamed_4_1_removed_5_0("WestBL", "westBL"));
        m.insert(logical::BOUNDING_BOX_EAST, renamed_4_1_removed_5_0("EastBL", "eastBL"));
        m.insert(logical::BOUNDING_BOX_SOUTH, renamed_4_1_removed_5_0("SouthBL", "southBL"));
        m.insert(logical::BOUNDING_BOX_NORTH, renamed_4_1_removed_5_0("NorthBL", "northBL"));

        m.insert(logical::VERTICAL_EXTENT, all("verticalExtent"));
        m.insert(
            logical::VERTICAL_EXTENT_MIN,
            renamed_4_1("MinVerticalExtent", "minVerticalExtent"),
        );
        m.insert(
            logical::VERTICAL_EXTENT_MAX,
            renamed_4_1("MaxVerticalExtent", "maxVerticalExtent"),
        );
        m.insert(logical::VERTICAL_EXTENT_UOM, all("unitOfMeasure"));
        m.insert(logical::VERTICAL_EXTENT_DATUM, all("datum"));

        m.insert(logical::GEOGRAPHIC_IDENTIFIER, all("geographicIdentifier"));
        m.insert(logical::GEOGRAPHIC_IDENTIFIER_NAME, all("name"));
        m.insert(logical::GEOGRAPHIC_IDENTIFIER_REGION, all("region"));
        m.insert(logical::GEOGRAPHIC_IDENTIFIER_SUBDIVISION, from_4_1("subDivisionCode"));

        m.insert(logical::COUNTRY_CODE, all("countryCode"));
        m.insert(logical::COUNTRY_CODE_QUALIFIER, all("qualifier"));
        m.insert(logical::COUNTRY_CODE_VALUE, all("value"));

        m.insert(logical::FACILITY_IDENTIFIER, all("facilityIdentifier"));
        m.insert(logical::FACILITY_IDENTIFIER_BE_NUMBER, all("beNumber"));
        m.insert(logical::FACILITY_IDENTIFIER_OSUFFIX, all("osuffix"));

        m.insert(logical::TEMPORAL_COVERAGE, all("temporalCoverage"));
        m.insert(logical::TEMPORAL_COVERAGE_NAME, all("name"));
        m.insert(logical::TEMPORAL_COVERAGE_START, all("start"));
        m.insert(logical::TEMPORAL_COVERAGE_END, all("end"));

        m.insert(logical::POSTAL_ADDRESS, removed_5_0("postalAddress"));
        m.insert(logical::POSTAL_ADDRESS_STREET, removed_5_0("street"));
        m.insert(logical::POSTAL_ADDRESS_CITY, removed_5_0("city"));
        m.insert(logical::POSTAL_ADDRESS_STATE, removed_5_0("state"));
        m.insert(logical::POSTAL_ADDRESS_PROVINCE, removed_5_0("province"));
        m.insert(logical::POSTAL_ADDRESS_POSTAL_CODE, removed_5_0("postalCode"));

        m.insert(logical::SUBJECT_COVERAGE, all("subjectCoverage"));

        m.insert(logical::KEYWORD, all("keyword"));
        m.insert(logical::KEYWORD_VALUE, all("value"));

        m.insert(logical::LINK, all("link"));
        m.insert(logical::LINK_HREF, all("href"));
        m.insert(logical::LINK_TYPE, all("type"));
        m.insert(logical::LINK_LABEL, from_4_1("label"));

        m.insert(logical::SECURITY_CLASSIFICATION, all("classification"));
        m.insert(logical::SECURITY_OWNER_PRODUCER, all("ownerProducer"));

        m
    };

    /// Wrapper elements interposed between a component and its fields.
    static ref WRAPPERS: FxHashMap<&'static str, NameRow> = {
        let mut m = FxHashMap::default();
        m.insert(
            logical::TEMPORAL_COVERAGE,
            [Some("TimePeriod"), Some("TimePeriod"), Some("TimePeriod"), None, None],
        );
        m.insert(
            logical::SUBJECT_COVERAGE,
            [Some("Subject"), Some("Subject"), Some("Subject"), None, None],
        );
        m
    };
}

/// Serialized local name of `logical` under `version`.
///
/// `None` means the element or field does not exist in that revision.
pub fn element_name(version: FormatVersion, logical: &str) -> Option<&'static str> {
    CAPABILITIES
        .get(logical)
        .and_then(|row| row[version.index()])
}

/// True when `logical` exists at all under `version`.
pub fn supports(version: FormatVersion, logical: &str) -> bool {
    element_name(version, logical).is_some()
}

/// Wrapper element name for `logical` under `version`, if the revision
/// prescribes one (e.g. `TimePeriod` inside `temporalCoverage` before 4.1).
pub fn wrapper_name(version: FormatVersion, logical: &str) -> Option<&'static str> {
    WRAPPERS.get(logical).and_then(|row| row[version.index()])
}

// ============ Tests ============
