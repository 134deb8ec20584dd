//! URI syntax checking for qualifier and link attributes.

use url::Url;

/// True when `s` is a well-formed absolute URI or a relative reference.
///
/// Qualifier attributes frequently carry relative references, so a bare
/// `Url::parse` is too strict; relative candidates are resolved against a
/// synthetic base instead. Spaces and control characters are rejected up
/// front because the resolver would silently percent-encode them.
pub fn is_uri(s: &str) -> bool {
    if s.is_empty() || s.chars().any(|c| c == ' ' || c.is_ascii_control()) {
        return false;
    }
    match Url::parse(s) {
        Ok(_) => true,
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse("http://relative.invalid/")
            .and_then(|base| base.join(s))
            .is_ok(),
        Err(_) => false,
    }
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_uris() {
        assert!(is_uri("http://example.com/path"));
        assert!(is_uri("urn:us:mil:books"));
        assert!(is_uri("mailto:someone@example.com"));
    }

    #[test]
    fn test_relative_references() {
        assert!(is_uri("books/catalog"));
        assert!(is_uri("#section"));
        assert!(is_uri("../up/one"));
    }

    #[test]
    fn test_rejections() {
        assert!(!is_uri(""));
        assert!(!is_uri("not a uri"));
        assert!(!is_uri("tab\there"));
        assert!(!is_uri("line\nbreak"));
    }
}
