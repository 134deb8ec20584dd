//! Language component.

use crate::builder::{blank, Builder};
use crate::component::{
    impl_markup_identity, locator_segment, resolve_name, Component, ComponentCore, Extractor,
};
use crate::error::ComponentError;
use crate::fragment::{Fragment, QName};
use crate::registry::{self, logical};
use crate::render::FlatWriter;
use crate::validate::ValidationMessage;
use crate::version::{FormatVersion, Vocabulary};

/// Primary language of the described resource.
///
/// Both attributes are optional; a language with neither is legal but draws
/// a completely-empty warning.
#[derive(Debug, Clone)]
pub struct Language {
    core: ComponentCore,
    canonical: Fragment,
    qualifier: Option<String>,
    value: Option<String>,
}

impl Language {
    pub fn from_fragment(
        fragment: &Fragment,
        version: FormatVersion,
    ) -> Result<Language, ComponentError> {
        Language::build(fragment, version)
            .map_err(|e| e.at(locator_segment(version, logical::LANGUAGE)))
    }

    pub fn new(
        qualifier: Option<String>,
        value: Option<String>,
        version: FormatVersion,
    ) -> Result<Language, ComponentError> {
        let staged = synthesize(qualifier.as_deref(), value.as_deref(), version)
            .map_err(|e| e.at(locator_segment(version, logical::LANGUAGE)))?;
        Language::from_fragment(&staged, version)
    }

    fn build(fragment: &Fragment, version: FormatVersion) -> Result<Language, ComponentError> {
        let extractor = Extractor::new(fragment, version);
        let qname = extractor.expect_name(logical::LANGUAGE)?;

        let qualifier = extractor
            .local_attr(logical::LANGUAGE_QUALIFIER)
            .filter(|raw| !raw.is_empty())
            .map(str::to_string);
        let value = extractor
            .local_attr(logical::LANGUAGE_VALUE)
            .filter(|raw| !raw.is_empty())
            .map(str::to_string);

        let mut warnings = Vec::new();
        if qualifier.is_none() && value.is_none() {
            warnings.push(ValidationMessage::warning(
                "A completely empty language element was found.",
                locator_segment(version, logical::LANGUAGE),
            ));
        }

        let canonical = synthesize(qualifier.as_deref(), value.as_deref(), version)?;
        let mut core = ComponentCore::new(qname, version);
        core.attach_warnings(warnings);
        Ok(Language {
            core,
            canonical,
            qualifier,
            value,
        })
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

fn synthesize(
    qualifier: Option<&str>,
    value: Option<&str>,
    version: FormatVersion,
) -> Result<Fragment, ComponentError> {
    let ns = version.namespace(Vocabulary::Core);
    let mut fragment = Fragment::new(ns, resolve_name(version, logical::LANGUAGE)?);
    if let Some(qualifier) = qualifier.filter(|raw| !raw.is_empty()) {
        fragment.set_attribute("", resolve_name(version, logical::LANGUAGE_QUALIFIER)?, qualifier);
    }
    if let Some(value) = value.filter(|raw| !raw.is_empty()) {
        fragment.set_attribute("", resolve_name(version, logical::LANGUAGE_VALUE)?, value);
    }
    Ok(fragment)
}

impl Component for Language {
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
            if let (Some(name), Some(qualifier)) = (
                registry::element_name(version, logical::LANGUAGE_QUALIFIER),
                &self.qualifier,
            ) {
                w.field(name, qualifier);
            }
            if let (Some(name), Some(value)) = (
                registry::element_name(version, logical::LANGUAGE_VALUE),
                &self.value,
            ) {
                w.field(name, value);
            }
        });
    }
}

impl_markup_identity!(Language);

/// Staging builder for [`Language`].
#[derive(Debug, Clone, Default)]
pub struct LanguageBuilder {
    pub qualifier: Option<String>,
    pub value: Option<String>,
}

impl Builder for LanguageBuilder {
    type Target = Language;

    fn is_empty(&self) -> bool {
        blank(&self.qualifier) && blank(&self.value)
    }

    fn commit(&self, version: FormatVersion) -> Result<Option<Language>, ComponentError> {
        if self.is_empty() {
            return Ok(None);
        }
        Language::new(self.qualifier.clone(), self.value.clone(), version).map(Some)
    }
}

impl From<&Language> for LanguageBuilder {
    fn from(component: &Language) -> LanguageBuilder {
        LanguageBuilder {
            qualifier: component.qualifier.clone(),
            value: component.value.clone(),
        }
    }
}

// ============ Tests ============
