//! Cross-cutting attribute groups attached to components.
//!
//! Attachments are validated on their own and composed into host components;
//! they are not components themselves (an empty attachment is legal and
//! renders nothing).

pub mod extensible;
pub mod security;

pub use extensible::{ExtensibleAttributes, ExtensibleAttributesBuilder};
pub use security::{Classification, SecurityAttributes, SecurityAttributesBuilder};
