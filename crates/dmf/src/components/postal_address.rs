//! Postal address component, retired in DMF 5.0.

use crate::builder::{blank, Builder};
use crate::component::{
    impl_markup_identity, locator_segment, resolve_name, Component, ComponentCore, Extractor,
};
use crate::components::geographic::{CountryCode, CountryCodeBuilder};
use crate::error::ComponentError;
use crate::fragment::{Fragment, QName};
use crate::registry::{self, logical};
use crate::render::FlatWriter;
use crate::validate::{self, ValidationMessage};
use crate::version::{FormatVersion, Vocabulary};

/// Most streets a single address may carry.
const MAX_STREETS: usize = 6;

/// Mailing address of the described resource's point of contact.
///
/// Every piece is optional, but a state excludes a province and at most six
/// street lines are allowed. DMF 5.0 drops the component entirely; use under
/// 5.0 fails structurally.
#[derive(Debug, Clone)]
pub struct PostalAddress {
    core: ComponentCore,
    canonical: Fragment,
    streets: Vec<String>,
    city: Option<String>,
    state: Option<String>,
    province: Option<String>,
    postal_code: Option<String>,
    country_code: Option<CountryCode>,
}

impl PostalAddress {
    pub fn from_fragment(
        fragment: &Fragment,
        version: FormatVersion,
    ) -> Result<PostalAddress, ComponentError> {
        PostalAddress::build(fragment, version)
            .map_err(|e| e.at(locator_segment(version, logical::POSTAL_ADDRESS)))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        streets: Vec<String>,
        city: Option<String>,
        state: Option<String>,
        province: Option<String>,
        postal_code: Option<String>,
        country_code: Option<CountryCode>,
        version: FormatVersion,
    ) -> Result<PostalAddress, ComponentError> {
        let staged = synthesize(
            &streets,
            city.as_deref(),
            state.as_deref(),
            province.as_deref(),
            postal_code.as_deref(),
            country_code.as_ref(),
            version,
        )
        .map_err(|e| e.at(locator_segment(version, logical::POSTAL_ADDRESS)))?;
        PostalAddress::from_fragment(&staged, version)
    }

    fn build(fragment: &Fragment, version: FormatVersion) -> Result<PostalAddress, ComponentError> {
        let extractor = Extractor::new(fragment, version);
        let qname = extractor.expect_name(logical::POSTAL_ADDRESS)?;

        let streets: Vec<String> = extractor
            .children(logical::POSTAL_ADDRESS_STREET)
            .iter()
            .map(|c| c.text().to_string())
            .collect();
        let city = extractor.optional_child_text(logical::POSTAL_ADDRESS_CITY)?;
        let state = extractor.optional_child_text(logical::POSTAL_ADDRESS_STATE)?;
        let province = extractor.optional_child_text(logical::POSTAL_ADDRESS_PROVINCE)?;
        let postal_code = extractor.optional_child_text(logical::POSTAL_ADDRESS_POSTAL_CODE)?;
        let country_child = extractor.optional_child(logical::COUNTRY_CODE)?;

        // structure
        validate::at_most(
            streets.len(),
            MAX_STREETS,
            extractor.resolved(logical::POSTAL_ADDRESS_STREET),
        )?;
        validate::not_in_tandem(
            state.is_some(),
            extractor.resolved(logical::POSTAL_ADDRESS_STATE),
            province.is_some(),
            extractor.resolved(logical::POSTAL_ADDRESS_PROVINCE),
        )?;

        // children run their own pipelines, errors arrive pre-annotated
        let country_code = country_child
            .map(|c| CountryCode::from_fragment(c, version))
            .transpose()?;

        let mut warnings = Vec::new();
        let empty = streets.is_empty()
            && city.is_none()
            && state.is_none()
            && province.is_none()
            && postal_code.is_none()
            && country_code.is_none();
        if empty {
            warnings.push(ValidationMessage::warning(
                "A completely empty postalAddress element was found.",
                locator_segment(version, logical::POSTAL_ADDRESS),
            ));
        }

        let canonical = synthesize(
            &streets,
            city.as_deref(),
            state.as_deref(),
            province.as_deref(),
            postal_code.as_deref(),
            country_code.as_ref(),
            version,
        )?;
        let mut core = ComponentCore::new(qname, version);
        core.attach_warnings(warnings);
        Ok(PostalAddress {
            core,
            canonical,
            streets,
            city,
            state,
            province,
            postal_code,
            country_code,
        })
    }

    pub fn streets(&self) -> &[String] {
        &self.streets
    }

    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn province(&self) -> Option<&str> {
        self.province.as_deref()
    }

    pub fn postal_code(&self) -> Option<&str> {
        self.postal_code.as_deref()
    }

    pub fn country_code(&self) -> Option<&CountryCode> {
        self.country_code.as_ref()
    }
}

fn synthesize(
    streets: &[String],
    city: Option<&str>,
    state: Option<&str>,
    province: Option<&str>,
    postal_code: Option<&str>,
    country_code: Option<&CountryCode>,
    version: FormatVersion,
) -> Result<Fragment, ComponentError> {
    let ns = version.namespace(Vocabulary::Core);
    let mut fragment = Fragment::new(ns, resolve_name(version, logical::POSTAL_ADDRESS)?);
    for street in streets {
        let mut child = Fragment::new(ns, resolve_name(version, logical::POSTAL_ADDRESS_STREET)?);
        child.set_text(street.clone());
        fragment.push_child(child);
    }
    for (field, value) in [
        (logical::POSTAL_ADDRESS_CITY, city),
        (logical::POSTAL_ADDRESS_STATE, state),
        (logical::POSTAL_ADDRESS_PROVINCE, province),
        (logical::POSTAL_ADDRESS_POSTAL_CODE, postal_code),
    ] {
        if let Some(value) = value {
            let mut child = Fragment::new(ns, resolve_name(version, field)?);
            child.set_text(value.to_string());
            fragment.push_child(child);
        }
    }
    if let Some(country_code) = country_code {
        fragment.push_child(country_code.to_fragment());
    }
    Ok(fragment)
}

impl Component for PostalAddress {
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
            if let Some(name) = registry::element_name(version, logical::POSTAL_ADDRESS_STREET) {
                for street in &self.streets {
                    w.field(name, street);
                }
            }
            for (field, value) in [
                (logical::POSTAL_ADDRESS_CITY, &self.city),
                (logical::POSTAL_ADDRESS_STATE, &self.state),
                (logical::POSTAL_ADDRESS_PROVINCE, &self.province),
                (logical::POSTAL_ADDRESS_POSTAL_CODE, &self.postal_code),
            ] {
                if let (Some(name), Some(value)) = (registry::element_name(version, field), value) {
                    w.field(name, value);
                }
            }
            if let Some(country_code) = &self.country_code {
                country_code.write_flat(w);
            }
        });
    }

    fn child_components(&self) -> Vec<&dyn Component> {
        match &self.country_code {
            Some(country_code) => vec![country_code],
            None => Vec::new(),
        }
    }
}

impl_markup_identity!(PostalAddress);

/// Staging builder for [`PostalAddress`].
#[derive(Debug, Clone, Default)]
pub struct PostalAddressBuilder {
    pub streets: Vec<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,
    pub country_code: CountryCodeBuilder,
}

impl Builder for PostalAddressBuilder {
    type Target = PostalAddress;

    fn is_empty(&self) -> bool {
        self.streets.iter().all(String::is_empty)
            && blank(&self.city)
            && blank(&self.state)
            && blank(&self.province)
            && blank(&self.postal_code)
            && self.country_code.is_empty()
    }

    fn commit(&self, version: FormatVersion) -> Result<Option<PostalAddress>, ComponentError> {
        if self.is_empty() {
            return Ok(None);
        }
        let annotate = |e: ComponentError| e.at(locator_segment(version, logical::POSTAL_ADDRESS));
        let ns = version.namespace(Vocabulary::Core);
        let mut fragment = Fragment::new(
            ns,
            resolve_name(version, logical::POSTAL_ADDRESS).map_err(annotate)?,
        );
        for street in self.streets.iter().filter(|s| !s.is_empty()) {
            let mut child = Fragment::new(
                ns,
                resolve_name(version, logical::POSTAL_ADDRESS_STREET).map_err(annotate)?,
            );
            child.set_text(street.clone());
            fragment.push_child(child);
        }
        for (field, value) in [
            (logical::POSTAL_ADDRESS_CITY, &self.city),
            (logical::POSTAL_ADDRESS_STATE, &self.state),
            (logical::POSTAL_ADDRESS_PROVINCE, &self.province),
            (logical::POSTAL_ADDRESS_POSTAL_CODE, &self.postal_code),
        ] {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                let mut child =
                    Fragment::new(ns, resolve_name(version, field).map_err(annotate)?);
                child.set_text(value.to_string());
                fragment.push_child(child);
            }
        }
        if let Some(country_code) = self.country_code.commit(version).map_err(annotate)? {
            fragment.push_child(country_code.to_fragment());
        }
        PostalAddress::from_fragment(&fragment, version).map(Some)
    }
}

impl From<&PostalAddress> for PostalAddressBuilder {
    fn from(component: &PostalAddress) -> PostalAddressBuilder {
        PostalAddressBuilder {
            streets: component.streets.clone(),
            city: component.city.clone(),
            state: component.state.clone(),
            province: component.province.clone(),
            postal_code: component.postal_code.clone(),
            country_code: component
                .country_code
                .as_ref()
                .map(CountryCodeBuilder::from)
                .unwrap_or_default(),
        }
    }
}

// ============ Tests ============
