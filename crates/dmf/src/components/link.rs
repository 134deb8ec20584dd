//! Related-resource link component (Linking vocabulary).

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

/// The only legal `xlink:type` token on a link.
const FIXED_TYPE: &str = "locator";

/// Serialized name carried by `xlink:label` since its introduction; used to
/// recognize attempted use under revisions that predate it.
const LABEL_NAME: &str = "label";

/// Locator link to a related resource.
///
/// All attributes live in the Linking vocabulary. `xlink:type` is fixed to
/// `locator` and carries no information; `xlink:label` exists from 4.1.
#[derive(Debug, Clone)]
pub struct Link {
    core: ComponentCore,
    canonical: Fragment,
    href: String,
    label: Option<String>,
}

impl Link {
    pub fn from_fragment(
        fragment: &Fragment,
        version: FormatVersion,
    ) -> Result<Link, ComponentError> {
        Link::build(fragment, version).map_err(|e| e.at(locator_segment(version, logical::LINK)))
    }

    pub fn new(
        href: impl Into<String>,
        label: Option<String>,
        version: FormatVersion,
    ) -> Result<Link, ComponentError> {
        let staged = synthesize(&href.into(), label.as_deref(), version)
            .map_err(|e| e.at(locator_segment(version, logical::LINK)))?;
        Link::from_fragment(&staged, version)
    }

    fn build(fragment: &Fragment, version: FormatVersion) -> Result<Link, ComponentError> {
        let extractor = Extractor::new(fragment, version);
        let qname = extractor.expect_name(logical::LINK)?;
        let linking_ns = version.namespace(Vocabulary::Linking);

        // structure
        let href = extractor
            .vocab_attr(Vocabulary::Linking, logical::LINK_HREF)
            .filter(|raw| !raw.is_empty());
        validate::require(href.is_some(), "an xlink:href attribute")?;

        // version gates
        let label = fragment
            .attribute(linking_ns, LABEL_NAME)
            .filter(|raw| !raw.is_empty());
        if label.is_some() && !registry::supports(version, logical::LINK_LABEL) {
            validate::not_before(version, FormatVersion::V4_1, "the xlink:label attribute")?;
        }

        // content
        let href = href.unwrap_or_default().to_string();
        if !is_uri(&href) {
            return Err(ComponentError::content_syntax(format!(
                "xlink:href is not a valid URI value: \"{href}\""
            )));
        }
        if let Some(raw) = extractor
            .vocab_attr(Vocabulary::Linking, logical::LINK_TYPE)
            .filter(|raw| !raw.is_empty())
        {
            if raw != FIXED_TYPE {
                return Err(ComponentError::content_syntax(format!(
                    "the xlink:type attribute must have the fixed value \"{FIXED_TYPE}\""
                )));
            }
        }

        let label = label.map(str::to_string);
        let canonical = synthesize(&href, label.as_deref(), version)?;
        Ok(Link {
            core: ComponentCore::new(qname, version),
            canonical,
            href,
            label,
        })
    }

    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

fn synthesize(
    href: &str,
    label: Option<&str>,
    version: FormatVersion,
) -> Result<Fragment, ComponentError> {
    let ns = version.namespace(Vocabulary::Core);
    let linking_ns = version.namespace(Vocabulary::Linking);
    let mut fragment = Fragment::new(ns, resolve_name(version, logical::LINK)?);
    fragment.set_attribute(linking_ns, resolve_name(version, logical::LINK_TYPE)?, FIXED_TYPE);
    fragment.set_attribute(linking_ns, resolve_name(version, logical::LINK_HREF)?, href);
    // staged under the introduced name even pre-4.1, so the gate stage
    // reports the attempt instead of dropping it
    if let Some(label) = label.filter(|raw| !raw.is_empty()) {
        let name = registry::element_name(version, logical::LINK_LABEL).unwrap_or(LABEL_NAME);
        fragment.set_attribute(linking_ns, name, label);
    }
    Ok(fragment)
}

impl Component for Link {
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
            if let Some(name) = registry::element_name(version, logical::LINK_TYPE) {
                w.field(name, FIXED_TYPE);
            }
            if let Some(name) = registry::element_name(version, logical::LINK_HREF) {
                w.field(name, &self.href);
            }
            if let (Some(name), Some(label)) =
                (registry::element_name(version, logical::LINK_LABEL), &self.label)
            {
                w.field(name, label);
            }
        });
    }
}

impl_markup_identity!(Link);

/// Staging builder for [`Link`].
#[derive(Debug, Clone, Default)]
pub struct LinkBuilder {
    pub href: Option<String>,
    pub label: Option<String>,
}

impl Builder for LinkBuilder {
    type Target = Link;

    fn is_empty(&self) -> bool {
        blank(&self.href) && blank(&self.label)
    }

    fn commit(&self, version: FormatVersion) -> Result<Option<Link>, ComponentError> {
        if self.is_empty() {
            return Ok(None);
        }
        Link::new(
            self.href.clone().unwrap_or_default(),
            self.label.clone().filter(|raw| !raw.is_empty()),
            version,
        )
        .map(Some)
    }
}

impl From<&Link> for LinkBuilder {
    fn from(component: &Link) -> LinkBuilder {
        LinkBuilder {
            href: Some(component.href.clone()),
            label: component.label.clone(),
        }
    }
}

// ============ Tests ============
