//! Output multiplexer: canonical markup, flat text, HTML preview.
//!
//! All three formats are deterministic: the same component under the same
//! revision produces byte-for-byte identical output.

use rustc_hash::FxHashMap;

use crate::component::Component;
use crate::fragment::{Fragment, QName};
use crate::version::prefix_for_namespace;

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// `<meta name="key" content="value" />` preview lines.
    Html,
    /// `key: value` lines.
    Text,
    /// Canonical single-line XML.
    Markup,
}

/// Renders `component` to `format`.
///
/// `prefix` seeds the key path of the flat formats (pass `""` for none, or
/// an enclosing path ending in `.`); markup ignores it.
pub fn render<C: Component + ?Sized>(component: &C, format: OutputFormat, prefix: &str) -> String {
    match format {
        OutputFormat::Markup => markup(component),
        OutputFormat::Html | OutputFormat::Text => {
            let mut writer = FlatWriter::new(format == OutputFormat::Html, prefix);
            component.write_flat(&mut writer);
            writer.finish()
        }
    }
}

/// Canonical markup of `component`'s synthesized fragment.
pub fn markup<C: Component + ?Sized>(component: &C) -> String {
    fragment_markup(&component.to_fragment())
}

// ============ Flat formats ============

/// Accumulates flat output lines with dotted key paths.
///
/// Keys are `prefix` + enclosing path segments + field name; repeated fields
/// simply repeat the key.
pub struct FlatWriter {
    html: bool,
    prefix: String,
    path: Vec<String>,
    lines: Vec<String>,
}

impl FlatWriter {
    pub(crate) fn new(html: bool, prefix: &str) -> FlatWriter {
        FlatWriter {
            html,
            prefix: prefix.to_string(),
            path: Vec::new(),
            lines: Vec::new(),
        }
    }

    /// Emits one scalar under the current key path.
    pub fn field(&mut self, name: &str, value: &str) {
        let key = self.key(name);
        let line = if self.html {
            format!(
                "<meta name=\"{}\" content=\"{}\" />",
                escape(&key, true),
                escape(value, true)
            )
        } else {
            format!("{key}: {value}")
        };
        self.lines.push(line);
    }

    /// Extends the key path with `name` while `f` runs.
    pub fn nested(&mut self, name: &str, f: impl FnOnce(&mut FlatWriter)) {
        self.path.push(name.to_string());
        f(self);
        self.path.pop();
    }

    fn key(&self, name: &str) -> String {
        let mut key = self.prefix.clone();
        for segment in &self.path {
            key.push_str(segment);
            key.push('.');
        }
        key.push_str(name);
        key
    }

    pub(crate) fn finish(self) -> String {
        self.lines.join("\n")
    }
}

// ============ Canonical markup ============

/// Serializes a fragment as canonical single-line markup.
///
/// No XML declaration. Namespace declarations are collected from the whole
/// subtree and emitted on the root element sorted by prefix; known
/// vocabularies keep their canonical prefixes, foreign namespaces get
/// `ns1`, `ns2`, ... in first-use order. Attributes keep synthesis order.
pub fn fragment_markup(fragment: &Fragment) -> String {
    let mut uris: Vec<&str> = Vec::new();
    collect_namespaces(fragment, &mut uris);

    let mut prefixes: FxHashMap<&str, String> = FxHashMap::default();
    let mut generated = 0usize;
    for uri in &uris {
        let prefix = match prefix_for_namespace(uri) {
            Some(known) => known.to_string(),
            None => {
                generated += 1;
                format!("ns{generated}")
            }
        };
        prefixes.insert(*uri, prefix);
    }

    // the xml prefix is predeclared and must not be redeclared
    let mut declarations: Vec<(String, String)> = prefixes
        .iter()
        .filter(|(uri, _)| **uri != XML_NS)
        .map(|(uri, prefix)| (prefix.clone(), (*uri).to_string()))
        .collect();
    declarations.sort();

    let mut out = String::new();
    write_element(fragment, &prefixes, Some(&declarations), &mut out);
    out
}

fn collect_namespaces<'a>(fragment: &'a Fragment, uris: &mut Vec<&'a str>) {
    fn add<'a>(uris: &mut Vec<&'a str>, uri: &'a str) {
        if !uri.is_empty() && !uris.contains(&uri) {
            uris.push(uri);
        }
    }
    add(uris, fragment.name().namespace());
    for (name, _) in fragment.attributes() {
        add(uris, name.namespace());
    }
    for child in fragment.children() {
        collect_namespaces(child, uris);
    }
}

fn qualified(name: &QName, prefixes: &FxHashMap<&str, String>) -> String {
    if name.namespace().is_empty() {
        return name.local().to_string();
    }
    match prefixes.get(name.namespace()) {
        Some(prefix) => format!("{prefix}:{}", name.local()),
        None => name.local().to_string(),
    }
}

fn write_element(
    fragment: &Fragment,
    prefixes: &FxHashMap<&str, String>,
    declarations: Option<&[(String, String)]>,
    out: &mut String,
) {
    let tag = qualified(fragment.name(), prefixes);
    out.push('<');
    out.push_str(&tag);
    if let Some(declarations) = declarations {
        for (prefix, uri) in declarations {
            out.push_str(" xmlns:");
            out.push_str(prefix);
            out.push_str("=\"");
            out.push_str(&escape(uri, true));
            out.push('"');
        }
    }
    for (name, value) in fragment.attributes() {
        out.push(' ');
        out.push_str(&qualified(name, prefixes));
        out.push_str("=\"");
        out.push_str(&escape(value, true));
        out.push('"');
    }
    if fragment.text().is_empty() && fragment.children().is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    out.push_str(&escape(fragment.text(), false));
    for child in fragment.children() {
        write_element(child, prefixes, None, out);
    }
    out.push_str("</");
    out.push_str(&tag);
    out.push('>');
}

/// Minimal escaping: `&`, `<`, `>` everywhere; `"`, tab, and newline become
/// character references inside attributes; `\r` always does. Parser
/// whitespace normalization must find nothing to rewrite in canonical
/// output.
fn escape(value: &str, in_attribute: bool) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' if in_attribute => escaped.push_str("&quot;"),
            '\t' if in_attribute => escaped.push_str("&#9;"),
            '\n' if in_attribute => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_shape() {
        let mut fragment = Fragment::new("urn:dmf:meta:3.1", "language");
        fragment.set_attribute("", "qualifier", "http://example.com/lang");
        fragment.set_attribute("", "value", "en");
        assert_eq!(
            fragment_markup(&fragment),
            "<dmf:language xmlns:dmf=\"urn:dmf:meta:3.1\" \
             qualifier=\"http://example.com/lang\" value=\"en\"/>"
        );
    }

    #[test]
    fn test_markup_nested_declarations_sorted_by_prefix() {
        let mut fragment = Fragment::new("urn:dmf:meta:4", "keyword");
        fragment.set_attribute("", "value", "x");
        fragment.set_attribute("urn:dmf:marking:9", "classification", "U");
        // mrk sorts after dmf
        assert_eq!(
            fragment_markup(&fragment),
            "<dmf:keyword xmlns:dmf=\"urn:dmf:meta:4\" xmlns:mrk=\"urn:dmf:marking:9\" \
             value=\"x\" mrk:classification=\"U\"/>"
        );
    }

    #[test]
    fn test_markup_children_and_text() {
        let mut west = Fragment::new("urn:dmf:meta:3.1", "WestBL");
        west.set_text("12.3");
        let mut outer = Fragment::new("urn:dmf:meta:3.1", "boundingBox");
        outer.push_child(west);
        assert_eq!(
            fragment_markup(&outer),
            "<dmf:boundingBox xmlns:dmf=\"urn:dmf:meta:3.1\">\
             <dmf:WestBL>12.3</dmf:WestBL></dmf:boundingBox>"
        );
    }

    #[test]
    fn test_markup_escapes() {
        let mut fragment = Fragment::new("urn:dmf:meta:4", "keyword");
        fragment.set_attribute("", "value", "a \"quoted\" <tag> & more");
        let markup = fragment_markup(&fragment);
        assert!(markup.contains("value=\"a &quot;quoted&quot; &lt;tag&gt; &amp; more\""));

        let mut text = Fragment::new("urn:dmf:meta:4", "name");
        text.set_text("R&D <lab>");
        assert!(fragment_markup(&text).contains(">R&amp;D &lt;lab&gt;</dmf:name>"));
    }

    #[test]
    fn test_markup_escapes_control_whitespace() {
        let mut fragment = Fragment::new("urn:dmf:meta:4", "keyword");
        fragment.set_attribute("", "value", "line1\nline2\ttabbed\rreturn");
        let first = fragment_markup(&fragment);
        assert!(first.contains("value=\"line1&#10;line2&#9;tabbed&#13;return\""));

        // attribute normalization finds nothing to rewrite on re-parse
        let reparsed = Fragment::parse(&first).unwrap();
        assert_eq!(
            reparsed.attribute("", "value"),
            Some("line1\nline2\ttabbed\rreturn")
        );
        assert_eq!(fragment_markup(&reparsed), first);

        // in text content only \r needs a reference; \n and \t survive raw
        let mut text = Fragment::new("urn:dmf:meta:4", "name");
        text.set_text("before\rafter\nbelow\ttabbed");
        let first = fragment_markup(&text);
        assert!(first.contains(">before&#13;after\nbelow\ttabbed</dmf:name>"));
        let reparsed = Fragment::parse(&first).unwrap();
        assert_eq!(reparsed.text(), "before\rafter\nbelow\ttabbed");
        assert_eq!(fragment_markup(&reparsed), first);
    }

    #[test]
    fn test_markup_foreign_namespace_prefixes() {
        let mut fragment = Fragment::new("urn:dmf:meta:4", "identifier");
        fragment.set_attribute("", "qualifier", "q");
        fragment.set_attribute("", "value", "v");
        fragment.set_attribute("urn:example:claims", "relevance", "0.9");
        assert_eq!(
            fragment_markup(&fragment),
            "<dmf:identifier xmlns:dmf=\"urn:dmf:meta:4\" xmlns:ns1=\"urn:example:claims\" \
             qualifier=\"q\" value=\"v\" ns1:relevance=\"0.9\"/>"
        );
    }

    #[test]
    fn test_flat_writer_text() {
        let mut writer = FlatWriter::new(false, "");
        writer.nested("boundingBox", |w| {
            w.field("westBL", "12.3");
            w.field("eastBL", "23.4");
        });
        assert_eq!(writer.finish(), "boundingBox.westBL: 12.3\nboundingBox.eastBL: 23.4");
    }

    #[test]
    fn test_flat_writer_html_with_prefix() {
        let mut writer = FlatWriter::new(true, "geospatialCoverage.");
        writer.nested("boundingBox", |w| w.field("westBL", "12.3"));
        assert_eq!(
            writer.finish(),
            "<meta name=\"geospatialCoverage.boundingBox.westBL\" content=\"12.3\" />"
        );
    }

    #[test]
    fn test_flat_writer_repeats_keys() {
        let mut writer = FlatWriter::new(false, "");
        writer.field("keyword", "alpha");
        writer.field("keyword", "beta");
        assert_eq!(writer.finish(), "keyword: alpha\nkeyword: beta");
    }
}
