//! Geographic identification components.

use crate::builder::{blank, Builder};
use crate::component::{
    impl_markup_identity, locator_segment, resolve_name, Component, ComponentCore, Extractor,
};
use crate::error::ComponentError;
use crate::fragment::{Fragment, QName};
use crate::registry::{self, logical};
use crate::render::FlatWriter;
use crate::validate::{self, ValidationMessage};
use crate::version::{FormatVersion, Vocabulary};

/// Serialized name carried by `subDivisionCode` since its introduction; used
/// to recognize attempted use under revisions that predate it.
const SUB_DIVISION_NAME: &str = "subDivisionCode";

// ============ CountryCode ============

/// Qualified country code pair.
///
/// The qualifier names the code vocabulary but is deliberately not resolved
/// against one; both attributes are required and otherwise advisory.
#[derive(Debug, Clone)]
pub struct CountryCode {
    core: ComponentCore,
    canonical: Fragment,
    qualifier: String,
    value: String,
}

impl CountryCode {
    pub fn from_fragment(
        fragment: &Fragment,
        version: FormatVersion,
    ) -> Result<CountryCode, ComponentError> {
        CountryCode::build(fragment, version)
            .map_err(|e| e.at(locator_segment(version, logical::COUNTRY_CODE)))
    }

    pub fn new(
        qualifier: impl Into<String>,
        value: impl Into<String>,
        version: FormatVersion,
    ) -> Result<CountryCode, ComponentError> {
        let staged = synthesize_country_code(&qualifier.into(), &value.into(), version)
            .map_err(|e| e.at(locator_segment(version, logical::COUNTRY_CODE)))?;
        CountryCode::from_fragment(&staged, version)
    }

    fn build(fragment: &Fragment, version: FormatVersion) -> Result<CountryCode, ComponentError> {
        let extractor = Extractor::new(fragment, version);
        let qname = extractor.expect_name(logical::COUNTRY_CODE)?;

        let qualifier = extractor
            .local_attr(logical::COUNTRY_CODE_QUALIFIER)
            .filter(|raw| !raw.is_empty());
        validate::require(qualifier.is_some(), "a qualifier attribute")?;
        let value = extractor
            .local_attr(logical::COUNTRY_CODE_VALUE)
            .filter(|raw| !raw.is_empty());
        validate::require(value.is_some(), "a value attribute")?;

        let qualifier = qualifier.unwrap_or_default().to_string();
        let value = value.unwrap_or_default().to_string();
        let canonical = synthesize_country_code(&qualifier, &value, version)?;
        Ok(CountryCode {
            core: ComponentCore::new(qname, version),
            canonical,
            qualifier,
            value,
        })
    }

    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

fn synthesize_country_code(
    qualifier: &str,
    value: &str,
    version: FormatVersion,
) -> Result<Fragment, ComponentError> {
    let ns = version.namespace(Vocabulary::Core);
    let mut fragment = Fragment::new(ns, resolve_name(version, logical::COUNTRY_CODE)?);
    fragment.set_attribute("", resolve_name(version, logical::COUNTRY_CODE_QUALIFIER)?, qualifier);
    fragment.set_attribute("", resolve_name(version, logical::COUNTRY_CODE_VALUE)?, value);
    Ok(fragment)
}

impl Component for CountryCode {
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
            if let Some(name) = registry::element_name(version, logical::COUNTRY_CODE_QUALIFIER) {
                w.field(name, &self.qualifier);
            }
            if let Some(name) = registry::element_name(version, logical::COUNTRY_CODE_VALUE) {
                w.field(name, &self.value);
            }
        });
    }
}

impl_markup_identity!(CountryCode);

/// Staging builder for [`CountryCode`].
#[derive(Debug, Clone, Default)]
pub struct CountryCodeBuilder {
    pub qualifier: Option<String>,
    pub value: Option<String>,
}

impl Builder for CountryCodeBuilder {
    type Target = CountryCode;

    fn is_empty(&self) -> bool {
        blank(&self.qualifier) && blank(&self.value)
    }

    fn commit(&self, version: FormatVersion) -> Result<Option<CountryCode>, ComponentError> {
        if self.is_empty() {
            return Ok(None);
        }
        CountryCode::new(
            self.qualifier.clone().unwrap_or_default(),
            self.value.clone().unwrap_or_default(),
            version,
        )
        .map(Some)
    }
}

impl From<&CountryCode> for CountryCodeBuilder {
    fn from(component: &CountryCode) -> CountryCodeBuilder {
        CountryCodeBuilder {
            qualifier: Some(component.qualifier.clone()),
            value: Some(component.value.clone()),
        }
    }
}

// ============ FacilityIdentifier ============

/// Facility reference by basic-encyclopedia number.
///
/// `osuffix` survives in 5.0 but is deprecated there; its use draws a
/// warning, never an error.
#[derive(Debug, Clone)]
pub struct FacilityIdentifier {
    core: ComponentCore,
    canonical: Fragment,
    be_number: String,
    osuffix: Option<String>,
}

impl FacilityIdentifier {
    pub fn from_fragment(
        fragment: &Fragment,
        version: FormatVersion,
    ) -> Result<FacilityIdentifier, ComponentError> {
        FacilityIdentifier::build(fragment, version)
            .map_err(|e| e.at(locator_segment(version, logical::FACILITY_IDENTIFIER)))
    }

    pub fn new(
        be_number: impl Into<String>,
        osuffix: Option<String>,
        version: FormatVersion,
    ) -> Result<FacilityIdentifier, ComponentError> {
        let staged = synthesize_facility(&be_number.into(), osuffix.as_deref(), version)
            .map_err(|e| e.at(locator_segment(version, logical::FACILITY_IDENTIFIER)))?;
        FacilityIdentifier::from_fragment(&staged, version)
    }

    fn build(
        fragment: &Fragment,
        version: FormatVersion,
    ) -> Result<FacilityIdentifier, ComponentError> {
        let extractor = Extractor::new(fragment, version);
        let qname = extractor.expect_name(logical::FACILITY_IDENTIFIER)?;

        let be_number = extractor
            .local_attr(logical::FACILITY_IDENTIFIER_BE_NUMBER)
            .filter(|raw| !raw.is_empty());
        validate::require(be_number.is_some(), "a beNumber attribute")?;
        let osuffix = extractor
            .local_attr(logical::FACILITY_IDENTIFIER_OSUFFIX)
            .filter(|raw| !raw.is_empty())
            .map(str::to_string);

        let mut warnings = Vec::new();
        if osuffix.is_some() && version.is_at_least(FormatVersion::V5_0) {
            warnings.push(ValidationMessage::warning(
                "The osuffix attribute is deprecated in DMF 5.0.",
                locator_segment(version, logical::FACILITY_IDENTIFIER),
            ));
        }

        let be_number = be_number.unwrap_or_default().to_string();
        let canonical = synthesize_facility(&be_number, osuffix.as_deref(), version)?;
        let mut core = ComponentCore::new(qname, version);
        core.attach_warnings(warnings);
        Ok(FacilityIdentifier {
            core,
            canonical,
            be_number,
            osuffix,
        })
    }

    pub fn be_number(&self) -> &str {
        &self.be_number
    }

    pub fn osuffix(&self) -> Option<&str> {
        self.osuffix.as_deref()
    }
}

fn synthesize_facility(
    be_number: &str,
    osuffix: Option<&str>,
    version: FormatVersion,
) -> Result<Fragment, ComponentError> {
    let ns = version.namespace(Vocabulary::Core);
    let mut fragment = Fragment::new(ns, resolve_name(version, logical::FACILITY_IDENTIFIER)?);
    fragment.set_attribute(
        "",
        resolve_name(version, logical::FACILITY_IDENTIFIER_BE_NUMBER)?,
        be_number,
    );
    if let Some(osuffix) = osuffix {
        fragment.set_attribute(
            "",
            resolve_name(version, logical::FACILITY_IDENTIFIER_OSUFFIX)?,
            osuffix,
        );
    }
    Ok(fragment)
}

impl Component for FacilityIdentifier {
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
            if let Some(name) =
                registry::element_name(version, logical::FACILITY_IDENTIFIER_BE_NUMBER)
            {
                w.field(name, &self.be_number);
            }
            if let (Some(name), Some(osuffix)) = (
                registry::element_name(version, logical::FACILITY_IDENTIFIER_OSUFFIX),
                &self.osuffix,
            ) {
                w.field(name, osuffix);
            }
        });
    }
}

impl_markup_identity!(FacilityIdentifier);

/// Staging builder for [`FacilityIdentifier`].
#[derive(Debug, Clone, Default)]
pub struct FacilityIdentifierBuilder {
    pub be_number: Option<String>,
    pub osuffix: Option<String>,
}

impl Builder for FacilityIdentifierBuilder {
    type Target = FacilityIdentifier;

    fn is_empty(&self) -> bool {
        blank(&self.be_number) && blank(&self.osuffix)
    }

    fn commit(&self, version: FormatVersion) -> Result<Option<FacilityIdentifier>, ComponentError> {
        if self.is_empty() {
            return Ok(None);
        }
        FacilityIdentifier::new(
            self.be_number.clone().unwrap_or_default(),
            self.osuffix.clone().filter(|s| !s.is_empty()),
            version,
        )
        .map(Some)
    }
}

impl From<&FacilityIdentifier> for FacilityIdentifierBuilder {
    fn from(component: &FacilityIdentifier) -> FacilityIdentifierBuilder {
        FacilityIdentifierBuilder {
            be_number: Some(component.be_number.clone()),
            osuffix: component.osuffix.clone(),
        }
    }
}

// ============ GeographicIdentifier ============

/// Names, regions, codes, and facility references identifying a place.
///
/// At least one child is required. A `facilityIdentifier` stands alone: it
/// must not be used in tandem with any sibling. `subDivisionCode` exists
/// from 4.1; earlier use fails the version gate.
#[derive(Debug, Clone)]
pub struct GeographicIdentifier {
    core: ComponentCore,
    canonical: Fragment,
    names: Vec<String>,
    regions: Vec<String>,
    country_code: Option<CountryCode>,
    sub_division_codes: Vec<String>,
    facility_identifier: Option<FacilityIdentifier>,
}

impl GeographicIdentifier {
    pub fn from_fragment(
        fragment: &Fragment,
        version: FormatVersion,
    ) -> Result<GeographicIdentifier, ComponentError> {
        GeographicIdentifier::build(fragment, version)
            .map_err(|e| e.at(locator_segment(version, logical::GEOGRAPHIC_IDENTIFIER)))
    }

    pub fn new(
        names: Vec<String>,
        regions: Vec<String>,
        country_code: Option<CountryCode>,
        sub_division_codes: Vec<String>,
        facility_identifier: Option<FacilityIdentifier>,
        version: FormatVersion,
    ) -> Result<GeographicIdentifier, ComponentError> {
        let staged = synthesize_geographic(
            &names,
            &regions,
            country_code.as_ref(),
            &sub_division_codes,
            facility_identifier.as_ref(),
            version,
        )
        .map_err(|e| e.at(locator_segment(version, logical::GEOGRAPHIC_IDENTIFIER)))?;
        GeographicIdentifier::from_fragment(&staged, version)
    }

    fn build(
        fragment: &Fragment,
        version: FormatVersion,
    ) -> Result<GeographicIdentifier, ComponentError> {
        let extractor = Extractor::new(fragment, version);
        let qname = extractor.expect_name(logical::GEOGRAPHIC_IDENTIFIER)?;

        let names: Vec<String> = extractor
            .children(logical::GEOGRAPHIC_IDENTIFIER_NAME)
            .iter()
            .map(|c| c.text().to_string())
            .collect();
        let regions: Vec<String> = extractor
            .children(logical::GEOGRAPHIC_IDENTIFIER_REGION)
            .iter()
            .map(|c| c.text().to_string())
            .collect();
        let country_child = extractor.optional_child(logical::COUNTRY_CODE)?;
        let facility_child = extractor.optional_child(logical::FACILITY_IDENTIFIER)?;
        let sub_children = sub_division_children(fragment, version);

        // structure: presence counts what the author wrote, legal or not
        let written = names.len()
            + regions.len()
            + usize::from(country_child.is_some())
            + usize::from(facility_child.is_some())
            + sub_children.len();
        validate::at_least_one(written, &child_menu(version))?;
        for (present, sibling) in [
            (!names.is_empty(), extractor.resolved(logical::GEOGRAPHIC_IDENTIFIER_NAME)),
            (!regions.is_empty(), extractor.resolved(logical::GEOGRAPHIC_IDENTIFIER_REGION)),
            (country_child.is_some(), extractor.resolved(logical::COUNTRY_CODE)),
            (!sub_children.is_empty(), SUB_DIVISION_NAME),
        ] {
            validate::not_in_tandem(
                facility_child.is_some(),
                extractor.resolved(logical::FACILITY_IDENTIFIER),
                present,
                sibling,
            )?;
        }

        // version gates
        if !registry::supports(version, logical::GEOGRAPHIC_IDENTIFIER_SUBDIVISION)
            && !sub_children.is_empty()
        {
            validate::not_before(version, FormatVersion::V4_1, SUB_DIVISION_NAME)?;
        }

        // children run their own pipelines, errors arrive pre-annotated
        let country_code = country_child
            .map(|c| CountryCode::from_fragment(c, version))
            .transpose()?;
        let facility_identifier = facility_child
            .map(|c| FacilityIdentifier::from_fragment(c, version))
            .transpose()?;
        let sub_division_codes: Vec<String> =
            sub_children.iter().map(|c| c.text().to_string()).collect();

        let canonical = synthesize_geographic(
            &names,
            &regions,
            country_code.as_ref(),
            &sub_division_codes,
            facility_identifier.as_ref(),
            version,
        )?;
        Ok(GeographicIdentifier {
            core: ComponentCore::new(qname, version),
            canonical,
            names,
            regions,
            country_code,
            sub_division_codes,
            facility_identifier,
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    pub fn country_code(&self) -> Option<&CountryCode> {
        self.country_code.as_ref()
    }

    pub fn sub_division_codes(&self) -> &[String] {
        &self.sub_division_codes
    }

    pub fn facility_identifier(&self) -> Option<&FacilityIdentifier> {
        self.facility_identifier.as_ref()
    }
}

/// Children under the sub-division name, including attempted use in
/// revisions that predate it.
fn sub_division_children<'a>(fragment: &'a Fragment, version: FormatVersion) -> Vec<&'a Fragment> {
    let ns = version.namespace(Vocabulary::Core);
    let name = registry::element_name(version, logical::GEOGRAPHIC_IDENTIFIER_SUBDIVISION)
        .unwrap_or(SUB_DIVISION_NAME);
    fragment.children_named(ns, name).collect()
}

/// The child kinds a revision offers, for the at-least-one message.
fn child_menu(version: FormatVersion) -> String {
    let mut menu = String::from("name, region, countryCode");
    if registry::supports(version, logical::GEOGRAPHIC_IDENTIFIER_SUBDIVISION) {
        menu.push_str(", facilityIdentifier, or subDivisionCode element");
    } else {
        menu.push_str(", or facilityIdentifier element");
    }
    menu
}

fn synthesize_geographic(
    names: &[String],
    regions: &[String],
    country_code: Option<&CountryCode>,
    sub_division_codes: &[String],
    facility_identifier: Option<&FacilityIdentifier>,
    version: FormatVersion,
) -> Result<Fragment, ComponentError> {
    let ns = version.namespace(Vocabulary::Core);
    let mut fragment = Fragment::new(ns, resolve_name(version, logical::GEOGRAPHIC_IDENTIFIER)?);
    for (field, values) in [
        (logical::GEOGRAPHIC_IDENTIFIER_NAME, names),
        (logical::GEOGRAPHIC_IDENTIFIER_REGION, regions),
    ] {
        for value in values {
            let mut child = Fragment::new(ns, resolve_name(version, field)?);
            child.set_text(value.clone());
            fragment.push_child(child);
        }
    }
    if let Some(country_code) = country_code {
        fragment.push_child(country_code.to_fragment());
    }
    // synthesized under the introduced name even pre-4.1, so the gate stage
    // reports the attempt instead of a name-resolution failure
    let sub_name = registry::element_name(version, logical::GEOGRAPHIC_IDENTIFIER_SUBDIVISION)
        .unwrap_or(SUB_DIVISION_NAME);
    for value in sub_division_codes {
        let mut child = Fragment::new(ns, sub_name);
        child.set_text(value.clone());
        fragment.push_child(child);
    }
    if let Some(facility) = facility_identifier {
        fragment.push_child(facility.to_fragment());
    }
    Ok(fragment)
}

impl Component for GeographicIdentifier {
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
            if let Some(name) = registry::element_name(version, logical::GEOGRAPHIC_IDENTIFIER_NAME)
            {
                for value in &self.names {
                    w.field(name, value);
                }
            }
            if let Some(name) =
                registry::element_name(version, logical::GEOGRAPHIC_IDENTIFIER_REGION)
            {
                for value in &self.regions {
                    w.field(name, value);
                }
            }
            if let Some(country_code) = &self.country_code {
                country_code.write_flat(w);
            }
            if let Some(name) =
                registry::element_name(version, logical::GEOGRAPHIC_IDENTIFIER_SUBDIVISION)
            {
                for value in &self.sub_division_codes {
                    w.field(name, value);
                }
            }
            if let Some(facility) = &self.facility_identifier {
                facility.write_flat(w);
            }
        });
    }

    fn child_components(&self) -> Vec<&dyn Component> {
        let mut children: Vec<&dyn Component> = Vec::new();
        if let Some(country_code) = &self.country_code {
            children.push(country_code);
        }
        if let Some(facility) = &self.facility_identifier {
            children.push(facility);
        }
        children
    }
}

impl_markup_identity!(GeographicIdentifier);

/// Staging builder for [`GeographicIdentifier`]; nested slots are nested
/// builders.
#[derive(Debug, Clone, Default)]
pub struct GeographicIdentifierBuilder {
    pub names: Vec<String>,
    pub regions: Vec<String>,
    pub country_code: CountryCodeBuilder,
    pub sub_division_codes: Vec<String>,
    pub facility_identifier: FacilityIdentifierBuilder,
}

impl Builder for GeographicIdentifierBuilder {
    type Target = GeographicIdentifier;

    fn is_empty(&self) -> bool {
        self.names.iter().all(String::is_empty)
            && self.regions.iter().all(String::is_empty)
            && self.sub_division_codes.iter().all(String::is_empty)
            && self.country_code.is_empty()
            && self.facility_identifier.is_empty()
    }

    fn commit(
        &self,
        version: FormatVersion,
    ) -> Result<Option<GeographicIdentifier>, ComponentError> {
        if self.is_empty() {
            return Ok(None);
        }
        let annotate =
            |e: ComponentError| e.at(locator_segment(version, logical::GEOGRAPHIC_IDENTIFIER));
        let ns = version.namespace(Vocabulary::Core);
        let mut fragment = Fragment::new(
            ns,
            resolve_name(version, logical::GEOGRAPHIC_IDENTIFIER).map_err(annotate)?,
        );
        for (field, values) in [
            (logical::GEOGRAPHIC_IDENTIFIER_NAME, &self.names),
            (logical::GEOGRAPHIC_IDENTIFIER_REGION, &self.regions),
        ] {
            for value in values.iter().filter(|v| !v.is_empty()) {
                let mut child = Fragment::new(ns, resolve_name(version, field).map_err(annotate)?);
                child.set_text(value.clone());
                fragment.push_child(child);
            }
        }
        if let Some(country_code) = self.country_code.commit(version).map_err(annotate)? {
            fragment.push_child(country_code.to_fragment());
        }
        let sub_name = registry::element_name(version, logical::GEOGRAPHIC_IDENTIFIER_SUBDIVISION)
            .unwrap_or(SUB_DIVISION_NAME);
        for value in self.sub_division_codes.iter().filter(|v| !v.is_empty()) {
            let mut child = Fragment::new(ns, sub_name);
            child.set_text(value.clone());
            fragment.push_child(child);
        }
        if let Some(facility) = self.facility_identifier.commit(version).map_err(annotate)? {
            fragment.push_child(facility.to_fragment());
        }
        GeographicIdentifier::from_fragment(&fragment, version).map(Some)
    }
}

impl From<&GeographicIdentifier> for GeographicIdentifierBuilder {
    fn from(component: &GeographicIdentifier) -> GeographicIdentifierBuilder {
        GeographicIdentifierBuilder {
            names: component.names.clone(),
            regions: component.regions.clone(),
            country_code: component
                .country_code
                .as_ref()
                .map(CountryCodeBuilder::from)
                .unwrap_or_default(),
            sub_division_codes: component.sub_division_codes.clone(),
            facility_identifier: component
                .facility_identifier
                .as_ref()
                .map(FacilityIdentifierBuilder::from)
                .unwrap_or_default(),
        }
    }
}

// ============ Tests ============
