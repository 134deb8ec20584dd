//! Supported format revisions and the namespace catalog.
//!
//! Every operation in the crate takes the active [`FormatVersion`] as an
//! explicit parameter; there is no ambient "current version" state.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Sub-vocabularies that make up a DMF document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vocabulary {
    /// Core discovery elements (`dmf` prefix).
    Core,
    /// Security marking attributes (`mrk` prefix).
    Marking,
    /// XLink locator attributes (`xlink` prefix).
    Linking,
    /// GML geospatial payloads (`gml` prefix).
    Geospatial,
    /// The XML namespace itself (`xml` prefix).
    Xml,
}

impl Vocabulary {
    pub const ALL: [Vocabulary; 5] = [
        Vocabulary::Core,
        Vocabulary::Marking,
        Vocabulary::Linking,
        Vocabulary::Geospatial,
        Vocabulary::Xml,
    ];

    /// Canonical prefix for this vocabulary, stable across revisions.
    pub fn prefix(self) -> &'static str {
        match self {
            Vocabulary::Core => "dmf",
            Vocabulary::Marking => "mrk",
            Vocabulary::Linking => "xlink",
            Vocabulary::Geospatial => "gml",
            Vocabulary::Xml => "xml",
        }
    }
}

/// A supported DMF schema revision.
///
/// The five revisions are mutually incompatible; ordering is numeric
/// (`V2_0 < V3_0 < V3_1 < V4_1 < V5_0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormatVersion {
    V2_0,
    V3_0,
    V3_1,
    V4_1,
    V5_0,
}

impl FormatVersion {
    /// All supported revisions in ascending order.
    pub const ALL: [FormatVersion; 5] = [
        FormatVersion::V2_0,
        FormatVersion::V3_0,
        FormatVersion::V3_1,
        FormatVersion::V4_1,
        FormatVersion::V5_0,
    ];

    /// The most recent supported revision.
    pub fn latest() -> FormatVersion {
        FormatVersion::V5_0
    }

    /// Parses a revision number string ("2.0", "3.0", "3.1", "4.1", "5.0").
    pub fn parse(s: &str) -> Option<FormatVersion> {
        match s {
            "2.0" => Some(FormatVersion::V2_0),
            "3.0" => Some(FormatVersion::V3_0),
            "3.1" => Some(FormatVersion::V3_1),
            "4.1" => Some(FormatVersion::V4_1),
            "5.0" => Some(FormatVersion::V5_0),
            _ => None,
        }
    }

    /// Returns the revision number string.
    pub fn as_str(self) -> &'static str {
        match self {
            FormatVersion::V2_0 => "2.0",
            FormatVersion::V3_0 => "3.0",
            FormatVersion::V3_1 => "3.1",
            FormatVersion::V4_1 => "4.1",
            FormatVersion::V5_0 => "5.0",
        }
    }

    /// True when this revision is `other` or later.
    pub fn is_at_least(self, other: FormatVersion) -> bool {
        self >= other
    }

    /// Namespace URI of `vocabulary` under this revision.
    pub fn namespace(self, vocabulary: Vocabulary) -> &'static str {
        match vocabulary {
            Vocabulary::Core => match self {
                FormatVersion::V2_0 => "urn:dmf:meta:2.0",
                FormatVersion::V3_0 => "urn:dmf:meta:3.0",
                FormatVersion::V3_1 => "urn:dmf:meta:3.1",
                FormatVersion::V4_1 => "urn:dmf:meta:4",
                FormatVersion::V5_0 => "urn:dmf:meta:5",
            },
            Vocabulary::Marking => match self {
                FormatVersion::V2_0 => "urn:dmf:marking:2",
                FormatVersion::V3_0 | FormatVersion::V3_1 => "urn:dmf:marking:5",
                FormatVersion::V4_1 => "urn:dmf:marking:9",
                FormatVersion::V5_0 => "urn:dmf:marking:13",
            },
            Vocabulary::Linking => "http://www.w3.org/1999/xlink",
            Vocabulary::Geospatial => match self {
                FormatVersion::V2_0 => "http://www.opengis.net/gml",
                _ => "http://www.opengis.net/gml/3.2",
            },
            Vocabulary::Xml => "http://www.w3.org/XML/1998/namespace",
        }
    }

    /// Index into per-revision capability arrays (ascending order).
    pub(crate) fn index(self) -> usize {
        match self {
            FormatVersion::V2_0 => 0,
            FormatVersion::V3_0 => 1,
            FormatVersion::V3_1 => 2,
            FormatVersion::V4_1 => 3,
            FormatVersion::V5_0 => 4,
        }
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error from parsing an unrecognized revision string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("\"{0}\" is not a supported DMF revision")]
pub struct ParseVersionError(String);

impl FromStr for FormatVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<FormatVersion, ParseVersionError> {
        FormatVersion::parse(s).ok_or_else(|| ParseVersionError(s.to_string()))
    }
}

/// Canonical prefix for a known namespace URI, across all revisions.
///
/// Returns `None` for foreign namespaces; the markup writer assigns those
/// generated prefixes at render time.
pub(crate) fn prefix_for_namespace(uri: &str) -> Option<&'static str> {
    for version in FormatVersion::ALL {
        for vocabulary in Vocabulary::ALL {
            if version.namespace(vocabulary) == uri {
                return Some(vocabulary.prefix());
            }
        }
    }
    None
}

/// True when `uri` belongs to any revision of any DMF vocabulary, or is the
/// empty (local) namespace. Reserved namespaces are never extensible.
pub(crate) fn is_reserved_namespace(uri: &str) -> bool {
    uri.is_empty() || prefix_for_namespace(uri).is_some()
}

// ============ Tests ============
