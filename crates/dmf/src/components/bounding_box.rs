//! Geographic bounding box component.

use crate::builder::{blank, Builder};
use crate::component::{
    impl_markup_identity, locator_segment, parse_decimal, resolve_name, Component, ComponentCore,
    Extractor,
};
use crate::error::ComponentError;
use crate::fragment::{Fragment, QName};
use crate::registry::{self, logical};
use crate::render::FlatWriter;
use crate::validate::ValidationMessage;
use crate::version::{FormatVersion, Vocabulary};

const EDGES: [(&str, f64, f64); 4] = [
    (logical::BOUNDING_BOX_WEST, -180.0, 180.0),
    (logical::BOUNDING_BOX_EAST, -180.0, 180.0),
    (logical::BOUNDING_BOX_SOUTH, -90.0, 90.0),
    (logical::BOUNDING_BOX_NORTH, -90.0, 90.0),
];

/// Geographic extent as four WGS84 bounding meridians and parallels.
///
/// Edge elements are PascalCase before 4.1 (`WestBL`) and camelCase from
/// 4.1 (`westBL`); the component was retired in 5.0.
#[derive(Debug, Clone)]
pub struct BoundingBox {
    core: ComponentCore,
    canonical: Fragment,
    west: f64,
    east: f64,
    south: f64,
    north: f64,
}

impl BoundingBox {
    /// Constructs from a parsed fragment under `version`.
    pub fn from_fragment(
        fragment: &Fragment,
        version: FormatVersion,
    ) -> Result<BoundingBox, ComponentError> {
        BoundingBox::build(fragment, version)
            .map_err(|e| e.at(locator_segment(version, logical::BOUNDING_BOX)))
    }

    /// Constructs from typed values under `version`.
    ///
    /// Synthesizes the canonical fragment and runs the from-fragment path,
    /// so both entry points validate identically.
    pub fn new(
        west: f64,
        east: f64,
        south: f64,
        north: f64,
        version: FormatVersion,
    ) -> Result<BoundingBox, ComponentError> {
        let staged = synthesize(west, east, south, north, version)
            .map_err(|e| e.at(locator_segment(version, logical::BOUNDING_BOX)))?;
        BoundingBox::from_fragment(&staged, version)
    }

    fn build(fragment: &Fragment, version: FormatVersion) -> Result<BoundingBox, ComponentError> {
        let extractor = Extractor::new(fragment, version);
        let qname = extractor.expect_name(logical::BOUNDING_BOX)?;
        // structure first, then content: all four edges must exist before
        // any value is parsed
        let mut elements = Vec::with_capacity(EDGES.len());
        for (field, _, _) in EDGES {
            elements.push(extractor.exactly_one_child(field)?);
        }
        let mut values = [0.0f64; 4];
        for (slot, ((field, min, max), element)) in
            values.iter_mut().zip(EDGES.iter().zip(&elements))
        {
            let name = extractor.resolved(field);
            *slot = parse_decimal(name, element.text())?;
            check_range(name, *slot, *min, *max)?;
        }
        let [west, east, south, north] = values;
        let canonical = synthesize(west, east, south, north, version)?;
        Ok(BoundingBox {
            core: ComponentCore::new(qname, version),
            canonical,
            west,
            east,
            south,
            north,
        })
    }

    pub fn west(&self) -> f64 {
        self.west
    }

    pub fn east(&self) -> f64 {
        self.east
    }

    pub fn south(&self) -> f64 {
        self.south
    }

    pub fn north(&self) -> f64 {
        self.north
    }
}

fn check_range(name: &str, value: f64, min: f64, max: f64) -> Result<(), ComponentError> {
    if value < min || value > max {
        return Err(ComponentError::content_syntax(format!(
            "{name} value {value} is out of range [{min}, {max}]"
        )));
    }
    Ok(())
}

fn synthesize(
    west: f64,
    east: f64,
    south: f64,
    north: f64,
    version: FormatVersion,
) -> Result<Fragment, ComponentError> {
    let ns = version.namespace(Vocabulary::Core);
    let mut fragment = Fragment::new(ns, resolve_name(version, logical::BOUNDING_BOX)?);
    for ((field, _, _), value) in EDGES.iter().zip([west, east, south, north]) {
        let mut edge = Fragment::new(ns, resolve_name(version, field)?);
        edge.set_text(value.to_string());
        fragment.push_child(edge);
    }
    Ok(fragment)
}

impl Component for BoundingBox {
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
            for ((field, _, _), value) in
                EDGES.iter().zip([self.west, self.east, self.south, self.north])
            {
                if let Some(name) = registry::element_name(version, field) {
                    w.field(name, &value.to_string());
                }
            }
        });
    }
}

impl_markup_identity!(BoundingBox);

/// Staging builder for [`BoundingBox`].
///
/// Slots hold raw text; syntax and range rules run only at commit, through
/// the same path as fragment construction.
#[derive(Debug, Clone, Default)]
pub struct BoundingBoxBuilder {
    pub west: Option<String>,
    pub east: Option<String>,
    pub south: Option<String>,
    pub north: Option<String>,
}

impl Builder for BoundingBoxBuilder {
    type Target = BoundingBox;

    fn is_empty(&self) -> bool {
        blank(&self.west) && blank(&self.east) && blank(&self.south) && blank(&self.north)
    }

    fn commit(&self, version: FormatVersion) -> Result<Option<BoundingBox>, ComponentError> {
        if self.is_empty() {
            return Ok(None);
        }
        let annotate = |e: ComponentError| e.at(locator_segment(version, logical::BOUNDING_BOX));
        let ns = version.namespace(Vocabulary::Core);
        let mut fragment =
            Fragment::new(ns, resolve_name(version, logical::BOUNDING_BOX).map_err(annotate)?);
        let slots = [&self.west, &self.east, &self.south, &self.north];
        for ((field, _, _), slot) in EDGES.iter().zip(slots) {
            if let Some(value) = slot {
                let mut edge =
                    Fragment::new(ns, resolve_name(version, field).map_err(annotate)?);
                edge.set_text(value.clone());
                fragment.push_child(edge);
            }
        }
        BoundingBox::from_fragment(&fragment, version).map(Some)
    }
}

impl From<&BoundingBox> for BoundingBoxBuilder {
    fn from(component: &BoundingBox) -> BoundingBoxBuilder {
        BoundingBoxBuilder {
            west: Some(component.west.to_string()),
            east: Some(component.east.to_string()),
            south: Some(component.south.to_string()),
            north: Some(component.north.to_string()),
        }
    }
}

// ============ Tests ============
