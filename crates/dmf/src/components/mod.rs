//! The component catalog.
//!
//! Each module instantiates the shared lifecycle for one family of catalog
//! components: construct from a fragment or from values, validate in stage
//! order, freeze with canonical markup. Catalog rules live here; the
//! machinery they share lives in [`crate::component`].

pub mod bounding_box;
pub mod geographic;
pub mod identifier;
pub mod language;
pub mod link;
pub mod postal_address;
pub mod subject;
pub mod temporal;
pub mod vertical_extent;

pub use bounding_box::{BoundingBox, BoundingBoxBuilder};
pub use geographic::{
    CountryCode, CountryCodeBuilder, FacilityIdentifier, FacilityIdentifierBuilder,
    GeographicIdentifier, GeographicIdentifierBuilder,
};
pub use identifier::{Identifier, IdentifierBuilder};
pub use language::{Language, LanguageBuilder};
pub use link::{Link, LinkBuilder};
pub use postal_address::{PostalAddress, PostalAddressBuilder};
pub use subject::{Keyword, KeywordBuilder, SubjectCoverage, SubjectCoverageBuilder};
pub use temporal::{TemporalCoverage, TemporalCoverageBuilder};
pub use vertical_extent::{ExtentDatum, ExtentUnit, VerticalExtent, VerticalExtentBuilder};
