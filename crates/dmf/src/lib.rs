//! DMF: versioned XML metadata component model.
//!
//! This crate provides construction, validation, and rendering for Discovery
//! Metadata Format (DMF) components across the five supported schema
//! revisions (2.0, 3.0, 3.1, 4.1, 5.0).
//!
//! # Overview
//!
//! DMF components are built around three commitments:
//! - **Revision-aware**: every rule is judged against an explicit
//!   [`FormatVersion`] parameter; there is no ambient current version
//! - **Staged validation**: structure, then revision gates, then content
//!   syntax, then cross-field invariants; the first failing stage aborts
//! - **Convergent construction**: parsing a fragment and building from typed
//!   values run the identical pipeline and cannot disagree
//!
//! # Quick Start
//!
//! ```rust
//! use dmf::{BoundingBox, FormatVersion, Fragment, OutputFormat};
//!
//! // Build a component from values under the 4.1 revision
//! let bounds = BoundingBox::new(12.3, 23.4, 34.5, 45.6, FormatVersion::V4_1).unwrap();
//!
//! // Canonical markup uses the revision's serialized names
//! let xml = dmf::markup(&bounds);
//! assert!(xml.contains("<dmf:westBL>12.3</dmf:westBL>"));
//!
//! // Parse incoming markup back through the same validation
//! let fragment = Fragment::parse(&xml).unwrap();
//! let reparsed = BoundingBox::from_fragment(&fragment, FormatVersion::V4_1).unwrap();
//! assert_eq!(bounds, reparsed);
//!
//! // Flat text output for search indexing
//! let text = dmf::render(&bounds, OutputFormat::Text, "");
//! assert!(text.starts_with("boundingBox.westBL: 12.3"));
//! ```
//!
//! # Modules
//!
//! - [`components`]: The component catalog (bounding box, identifiers, coverage, ...)
//! - [`attributes`]: Cross-cutting marking and extensible attribute groups
//! - [`component`]: The lifecycle contract shared by every component
//! - [`builder`]: Two-phase staging builders
//! - [`fragment`]: Markup fragments and the parse boundary
//! - [`registry`]: Per-revision element name capability matrix
//! - [`render`]: Canonical markup, flat text, and HTML preview output
//! - [`validate`]: Validation findings and severities
//! - [`version`]: Supported revisions and the namespace catalog
//! - [`util`]: Date and URI value syntax
//! - [`error`]: Error types
//!
//! # Validation order
//!
//! Fatal findings are ordered: all structural checks run before any version
//! gate, all gates before any content syntax check, and all syntax checks
//! before cross-field invariants. Construction stops at the first failure and
//! reports it with a locator path (`root:child:grandchild`). Non-fatal
//! findings are collected as warnings on the built component, in discovery
//! order, and never abort construction.
//!
//! # Revisions
//!
//! Serialized names, namespaces, wrapper elements, and attachment
//! availability all shift between revisions. The [`registry`] capability
//! matrix is the single source for what each revision calls each field and
//! whether it exists there at all; components removed by a later revision
//! fail structurally, components introduced by a later revision fail the
//! version gate.

pub mod attributes;
pub mod builder;
pub mod component;
pub mod components;
pub mod error;
pub mod fragment;
pub mod registry;
pub mod render;
pub mod util;
pub mod validate;
pub mod version;

// Re-export commonly used types at crate root
pub use attributes::{
    Classification, ExtensibleAttributes, ExtensibleAttributesBuilder, SecurityAttributes,
    SecurityAttributesBuilder,
};
pub use builder::Builder;
pub use component::Component;
pub use components::{
    BoundingBox, BoundingBoxBuilder, CountryCode, CountryCodeBuilder, ExtentDatum, ExtentUnit,
    FacilityIdentifier, FacilityIdentifierBuilder, GeographicIdentifier,
    GeographicIdentifierBuilder, Identifier, IdentifierBuilder, Keyword, KeywordBuilder, Language,
    LanguageBuilder, Link, LinkBuilder, PostalAddress, PostalAddressBuilder, SubjectCoverage,
    SubjectCoverageBuilder, TemporalCoverage, TemporalCoverageBuilder, VerticalExtent,
    VerticalExtentBuilder,
};
pub use error::{ComponentError, ErrorKind, Locator, MarkupError};
pub use fragment::{Fragment, QName};
pub use render::{fragment_markup, markup, render, FlatWriter, OutputFormat};
pub use util::{detect_date_format, is_date_sentinel, is_uri, DateFormat};
pub use validate::{Severity, ValidationMessage};
pub use version::{FormatVersion, ParseVersionError, Vocabulary};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
