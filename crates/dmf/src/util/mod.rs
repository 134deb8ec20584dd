//! Utility modules for DMF value syntax.

pub mod dates;
pub mod uris;

pub use dates::{detect_date_format, is_date_sentinel, DateFormat};
pub use uris::is_uri;
