//! Vertical extent component.

use crate::builder::{blank, Builder};
use crate::component::{
    impl_markup_identity, locator_segment, parse_decimal, resolve_name, Component, ComponentCore,
    Extractor,
};
use crate::error::ComponentError;
use crate::fragment::{Fragment, QName};
use crate::registry::{self, logical};
use crate::render::FlatWriter;
use crate::validate::{self, ValidationMessage};
use crate::version::{FormatVersion, Vocabulary};

/// Length units for vertical extents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtentUnit {
    Meter,
    Kilometer,
    Foot,
    StatuteMile,
    NauticalMile,
    Fathom,
    Inch,
}

impl ExtentUnit {
    pub fn token(self) -> &'static str {
        match self {
            ExtentUnit::Meter => "Meter",
            ExtentUnit::Kilometer => "Kilometer",
            ExtentUnit::Foot => "Foot",
            ExtentUnit::StatuteMile => "StatuteMile",
            ExtentUnit::NauticalMile => "NauticalMile",
            ExtentUnit::Fathom => "Fathom",
            ExtentUnit::Inch => "Inch",
        }
    }

    pub fn parse(s: &str) -> Option<ExtentUnit> {
        match s {
            "Meter" => Some(ExtentUnit::Meter),
            "Kilometer" => Some(ExtentUnit::Kilometer),
            "Foot" => Some(ExtentUnit::Foot),
            "StatuteMile" => Some(ExtentUnit::StatuteMile),
            "NauticalMile" => Some(ExtentUnit::NauticalMile),
            "Fathom" => Some(ExtentUnit::Fathom),
            "Inch" => Some(ExtentUnit::Inch),
            _ => None,
        }
    }
}

/// Vertical datums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtentDatum {
    /// Mean sea level.
    Msl,
    /// Above ground level.
    Agl,
    /// Height above ellipsoid.
    Hae,
}

impl ExtentDatum {
    pub fn token(self) -> &'static str {
        match self {
            ExtentDatum::Msl => "MSL",
            ExtentDatum::Agl => "AGL",
            ExtentDatum::Hae => "HAE",
        }
    }

    pub fn parse(s: &str) -> Option<ExtentDatum> {
        match s {
            "MSL" => Some(ExtentDatum::Msl),
            "AGL" => Some(ExtentDatum::Agl),
            "HAE" => Some(ExtentDatum::Hae),
            _ => None,
        }
    }
}

/// Vertical span between two elevations, under one unit and datum.
///
/// Bound elements are PascalCase before 4.1 (`MinVerticalExtent`) and
/// camelCase from 4.1. Before 4.1 each bound may carry its own
/// `unitOfMeasure`/`datum`; when present they must match the parent's.
/// From 4.1 the child-level attributes are retired.
#[derive(Debug, Clone)]
pub struct VerticalExtent {
    core: ComponentCore,
    canonical: Fragment,
    unit: ExtentUnit,
    datum: ExtentDatum,
    min: f64,
    max: f64,
}

impl VerticalExtent {
    /// Constructs from a parsed fragment under `version`.
    pub fn from_fragment(
        fragment: &Fragment,
        version: FormatVersion,
    ) -> Result<VerticalExtent, ComponentError> {
        VerticalExtent::build(fragment, version)
            .map_err(|e| e.at(locator_segment(version, logical::VERTICAL_EXTENT)))
    }

    /// Constructs from typed values under `version`.
    pub fn new(
        unit: ExtentUnit,
        datum: ExtentDatum,
        min: f64,
        max: f64,
        version: FormatVersion,
    ) -> Result<VerticalExtent, ComponentError> {
        let staged = synthesize(unit, datum, min, max, version)
            .map_err(|e| e.at(locator_segment(version, logical::VERTICAL_EXTENT)))?;
        VerticalExtent::from_fragment(&staged, version)
    }

    fn build(fragment: &Fragment, version: FormatVersion) -> Result<VerticalExtent, ComponentError> {
        let extractor = Extractor::new(fragment, version);
        let qname = extractor.expect_name(logical::VERTICAL_EXTENT)?;

        // structure
        let unit_raw = extractor
            .local_attr(logical::VERTICAL_EXTENT_UOM)
            .filter(|raw| !raw.is_empty());
        validate::require(unit_raw.is_some(), "a unitOfMeasure attribute")?;
        let datum_raw = extractor
            .local_attr(logical::VERTICAL_EXTENT_DATUM)
            .filter(|raw| !raw.is_empty());
        validate::require(datum_raw.is_some(), "a datum attribute")?;
        let min_element = extractor.exactly_one_child(logical::VERTICAL_EXTENT_MIN)?;
        let max_element = extractor.exactly_one_child(logical::VERTICAL_EXTENT_MAX)?;

        // version gates: bound-level overrides were retired at 4.1
        for (element, field) in [
            (min_element, logical::VERTICAL_EXTENT_MIN),
            (max_element, logical::VERTICAL_EXTENT_MAX),
        ] {
            for attr in ["unitOfMeasure", "datum"] {
                if element.attribute("", attr).is_some() {
                    validate::not_after(
                        version,
                        FormatVersion::V3_1,
                        &format!("a {attr} attribute on {}", extractor.resolved(field)),
                    )?;
                }
            }
        }

        // content syntax
        let unit = parse_unit(unit_raw.unwrap_or_default())?;
        let datum = parse_datum(datum_raw.unwrap_or_default())?;
        let min = parse_decimal(extractor.resolved(logical::VERTICAL_EXTENT_MIN), min_element.text())?;
        let max = parse_decimal(extractor.resolved(logical::VERTICAL_EXTENT_MAX), max_element.text())?;
        let min_override = bound_override(min_element)?;
        let max_override = bound_override(max_element)?;

        // cross-field invariants
        if min > max {
            return Err(ComponentError::invariant(format!(
                "{} must be less than or equal to {}",
                extractor.resolved(logical::VERTICAL_EXTENT_MIN),
                extractor.resolved(logical::VERTICAL_EXTENT_MAX),
            )));
        }
        for (field, (child_unit, child_datum)) in [
            (logical::VERTICAL_EXTENT_MIN, min_override),
            (logical::VERTICAL_EXTENT_MAX, max_override),
        ] {
            if child_unit.is_some_and(|u| u != unit) {
                return Err(ComponentError::invariant(format!(
                    "the unitOfMeasure on {} does not match the parent value {}",
                    extractor.resolved(field),
                    unit.token()
                )));
            }
            if child_datum.is_some_and(|d| d != datum) {
                return Err(ComponentError::invariant(format!(
                    "the datum on {} does not match the parent value {}",
                    extractor.resolved(field),
                    datum.token()
                )));
            }
        }

        let canonical = synthesize(unit, datum, min, max, version)?;
        Ok(VerticalExtent {
            core: ComponentCore::new(qname, version),
            canonical,
            unit,
            datum,
            min,
            max,
        })
    }

    pub fn unit(&self) -> ExtentUnit {
        self.unit
    }

    pub fn datum(&self) -> ExtentDatum {
        self.datum
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

fn parse_unit(raw: &str) -> Result<ExtentUnit, ComponentError> {
    ExtentUnit::parse(raw).ok_or_else(|| {
        ComponentError::content_syntax(format!("\"{raw}\" is not a valid unitOfMeasure token"))
    })
}

fn parse_datum(raw: &str) -> Result<ExtentDatum, ComponentError> {
    ExtentDatum::parse(raw).ok_or_else(|| {
        ComponentError::content_syntax(format!("\"{raw}\" is not a valid datum token"))
    })
}

/// Pre-4.1 bound-level overrides, parsed but not yet matched.
fn bound_override(
    element: &Fragment,
) -> Result<(Option<ExtentUnit>, Option<ExtentDatum>), ComponentError> {
    let unit = element
        .attribute("", "unitOfMeasure")
        .filter(|raw| !raw.is_empty())
        .map(parse_unit)
        .transpose()?;
    let datum = element
        .attribute("", "datum")
        .filter(|raw| !raw.is_empty())
        .map(parse_datum)
        .transpose()?;
    Ok((unit, datum))
}

fn synthesize(
    unit: ExtentUnit,
    datum: ExtentDatum,
    min: f64,
    max: f64,
    version: FormatVersion,
) -> Result<Fragment, ComponentError> {
    let ns = version.namespace(Vocabulary::Core);
    let mut fragment = Fragment::new(ns, resolve_name(version, logical::VERTICAL_EXTENT)?);
    fragment.set_attribute("", resolve_name(version, logical::VERTICAL_EXTENT_UOM)?, unit.token());
    fragment.set_attribute("", resolve_name(version, logical::VERTICAL_EXTENT_DATUM)?, datum.token());
    for (field, value) in [
        (logical::VERTICAL_EXTENT_MIN, min),
        (logical::VERTICAL_EXTENT_MAX, max),
    ] {
        let mut bound = Fragment::new(ns, resolve_name(version, field)?);
        bound.set_text(value.to_string());
        fragment.push_child(bound);
    }
    Ok(fragment)
}

impl Component for VerticalExtent {
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
            if let Some(name) = registry::element_name(version, logical::VERTICAL_EXTENT_UOM) {
                w.field(name, self.unit.token());
            }
            if let Some(name) = registry::element_name(version, logical::VERTICAL_EXTENT_DATUM) {
                w.field(name, self.datum.token());
            }
            if let Some(name) = registry::element_name(version, logical::VERTICAL_EXTENT_MIN) {
                w.field(name, &self.min.to_string());
            }
            if let Some(name) = registry::element_name(version, logical::VERTICAL_EXTENT_MAX) {
                w.field(name, &self.max.to_string());
            }
        });
    }
}

impl_markup_identity!(VerticalExtent);

/// Staging builder for [`VerticalExtent`].
#[derive(Debug, Clone, Default)]
pub struct VerticalExtentBuilder {
    pub unit: Option<String>,
    pub datum: Option<String>,
    pub min: Option<String>,
    pub max: Option<String>,
}

impl Builder for VerticalExtentBuilder {
    type Target = VerticalExtent;

    fn is_empty(&self) -> bool {
        blank(&self.unit) && blank(&self.datum) && blank(&self.min) && blank(&self.max)
    }

    fn commit(&self, version: FormatVersion) -> Result<Option<VerticalExtent>, ComponentError> {
        if self.is_empty() {
            return Ok(None);
        }
        let annotate = |e: ComponentError| e.at(locator_segment(version, logical::VERTICAL_EXTENT));
        let ns = version.namespace(Vocabulary::Core);
        let mut fragment =
            Fragment::new(ns, resolve_name(version, logical::VERTICAL_EXTENT).map_err(annotate)?);
        if let Some(unit) = &self.unit {
            let name = resolve_name(version, logical::VERTICAL_EXTENT_UOM).map_err(annotate)?;
            fragment.set_attribute("", name, unit.clone());
        }
        if let Some(datum) = &self.datum {
            let name = resolve_name(version, logical::VERTICAL_EXTENT_DATUM).map_err(annotate)?;
            fragment.set_attribute("", name, datum.clone());
        }
        for (field, slot) in [
            (logical::VERTICAL_EXTENT_MIN, &self.min),
            (logical::VERTICAL_EXTENT_MAX, &self.max),
        ] {
            if let Some(value) = slot {
                let mut bound = Fragment::new(ns, resolve_name(version, field).map_err(annotate)?);
                bound.set_text(value.clone());
                fragment.push_child(bound);
            }
        }
        VerticalExtent::from_fragment(&fragment, version).map(Some)
    }
}

impl From<&VerticalExtent> for VerticalExtentBuilder {
    fn from(component: &VerticalExtent) -> VerticalExtentBuilder {
        VerticalExtentBuilder {
            unit: Some(component.unit.token().to_string()),
            datum: Some(component.datum.token().to_string()),
            min: Some(component.min.to_string()),
            max: Some(component.max.to_string()),
        }
    }
}

// ============ Tests ============
