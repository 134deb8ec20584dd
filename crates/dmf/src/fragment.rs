//! Document fragment abstraction.
//!
//! Components never touch the XML parse layer directly; they construct from
//! and synthesize into [`Fragment`] trees. [`Fragment::parse`] is the single
//! seam to the `xot` parser.

use std::fmt;

use crate::error::MarkupError;

/// Namespace-qualified name of an element or attribute.
///
/// The empty namespace means an unqualified (local) name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    namespace: String,
    local: String,
}

impl QName {
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> QName {
        QName {
            namespace: namespace.into(),
            local: local.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn local(&self) -> &str {
        &self.local
    }
}

impl fmt::Display for QName {
    /// Clark notation: `{namespace}local`, or bare `local` when unqualified.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            f.write_str(&self.local)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.local)
        }
    }
}

/// An attributed element tree node, decoupled from the parse layer.
///
/// Holds the qualified name, attributes in document order, child elements in
/// document order, and the concatenated immediate text content. Mixed-content
/// ordering is not preserved: a DMF element carries either text or children,
/// never an interleaving that matters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    name: QName,
    attributes: Vec<(QName, String)>,
    children: Vec<Fragment>,
    text: String,
}

impl Fragment {
    /// An empty element with the given qualified name.
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Fragment {
        Fragment {
            name: QName::new(namespace, local),
            attributes: Vec::new(),
            children: Vec::new(),
            text: String::new(),
        }
    }

    /// Parses a markup document and converts its document element.
    pub fn parse(markup: &str) -> Result<Fragment, MarkupError> {
        tracing::debug!(bytes = markup.len(), "parsing markup document");
        let mut xot = xot::Xot::new();
        let document = xot
            .parse(markup)
            .map_err(|e| MarkupError::Malformed(e.to_string()))?;
        let root = xot
            .document_element(document)
            .map_err(|_| MarkupError::NoDocumentElement)?;
        convert(&xot, root)
    }

    pub fn name(&self) -> &QName {
        &self.name
    }

    /// Concatenated text directly under this element.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    fn append_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Attributes in document (or synthesis) order.
    pub fn attributes(&self) -> &[(QName, String)] {
        &self.attributes
    }

    /// Namespace-scoped attribute lookup. The empty namespace selects
    /// unqualified attributes.
    pub fn attribute(&self, namespace: &str, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name.namespace() == namespace && name.local() == local)
            .map(|(_, value)| value.as_str())
    }

    /// Sets an attribute, replacing any existing value under the same name.
    pub fn set_attribute(
        &mut self,
        namespace: impl Into<String>,
        local: impl Into<String>,
        value: impl Into<String>,
    ) {
        let name = QName::new(namespace, local);
        if let Some(slot) = self.attributes.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value.into();
        } else {
            self.attributes.push((name, value.into()));
        }
    }

    /// Child elements in document (or synthesis) order.
    pub fn children(&self) -> &[Fragment] {
        &self.children
    }

    pub fn push_child(&mut self, child: Fragment) {
        self.children.push(child);
    }

    /// Ordered child lookup by qualified name. Yielded children borrow from
    /// `self` only, not from the name arguments.
    pub fn children_named<'a>(
        &'a self,
        namespace: &str,
        local: &str,
    ) -> impl Iterator<Item = &'a Fragment> {
        self.children
            .iter()
            .filter(move |c| c.name.namespace() == namespace && c.name.local() == local)
    }

    /// First child with the given qualified name.
    pub fn first_child(&self, namespace: &str, local: &str) -> Option<&Fragment> {
        self.children_named(namespace, local).next()
    }
}

/// Converts an `xot` element node into an owned [`Fragment`].
fn convert(xot: &xot::Xot, node: xot::Node) -> Result<Fragment, MarkupError> {
    let Some(element) = xot.element(node) else {
        return Err(MarkupError::Malformed("expected an element node".to_string()));
    };
    let (local, uri) = xot.name_ns_str(element.name());
    let mut fragment = Fragment::new(uri, local);
    for (name, value) in xot.attributes(node).iter() {
        let (attr_local, attr_uri) = xot.name_ns_str(name);
        fragment.set_attribute(attr_uri, attr_local, value.to_string());
    }
    for child in xot.children(node) {
        if xot.element(child).is_some() {
            fragment.push_child(convert(xot, child)?);
        } else if let Some(text) = xot.text_str(child) {
            fragment.append_text(text);
        }
    }
    Ok(fragment)
}

// ============ Tests ============
