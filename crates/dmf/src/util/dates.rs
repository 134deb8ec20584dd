//! Date value shapes used by temporal fields.
//!
//! DMF date values come in five shapes of decreasing coarseness plus two
//! sentinel tokens for indefinite points. Shape is checked byte-for-byte
//! first; calendar validity (month ranges, leap days) is delegated to
//! `chrono`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Recognized date value shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateFormat {
    /// `YYYY`
    Year,
    /// `YYYY-MM`
    YearMonth,
    /// `YYYY-MM-DD`
    Date,
    /// `hh:mm`, only legal from DMF 4.1 (the caller gates).
    HourMin,
    /// `YYYY-MM-DDThh:mm:ss` with optional fractional seconds and
    /// optional `Z`/`±hh:mm` offset.
    DateTime,
}

/// Matches `s` against a fixed byte pattern where `d` means ASCII digit and
/// every other byte matches literally.
fn shape(s: &str, pattern: &str) -> bool {
    s.len() == pattern.len()
        && s.bytes().zip(pattern.bytes()).all(|(b, p)| match p {
            b'd' => b.is_ascii_digit(),
            _ => b == p,
        })
}

fn valid_offset(rest: &str) -> bool {
    match rest {
        "" | "Z" => true,
        _ => {
            if !(shape(rest, "+dd:dd") || shape(rest, "-dd:dd")) {
                return false;
            }
            // xs:dateTime offsets top out at ±14:00
            let hours: u8 = match rest[1..3].parse() {
                Ok(h) => h,
                Err(_) => return false,
            };
            let minutes: u8 = match rest[4..6].parse() {
                Ok(m) => m,
                Err(_) => return false,
            };
            hours < 14 && minutes < 60 || hours == 14 && minutes == 0
        }
    }
}

fn is_date_time(s: &str) -> bool {
    // get() also rejects a multibyte character straddling byte 19
    let Some(head) = s.get(..19) else {
        return false;
    };
    if !shape(head, "dddd-dd-ddTdd:dd:dd") {
        return false;
    }
    let mut rest = &s[19..];
    if let Some(fraction) = rest.strip_prefix('.') {
        let digits = fraction.bytes().take_while(|b| b.is_ascii_digit()).count();
        if digits == 0 {
            return false;
        }
        rest = &fraction[digits..];
    }
    valid_offset(rest) && NaiveDateTime::parse_from_str(head, "%Y-%m-%dT%H:%M:%S").is_ok()
}

/// Detects which [`DateFormat`] `s` conforms to, if any.
///
/// Sentinel tokens are not dates; use [`is_date_sentinel`] for those.
pub fn detect_date_format(s: &str) -> Option<DateFormat> {
    if shape(s, "dddd") {
        return Some(DateFormat::Year);
    }
    if shape(s, "dddd-dd") {
        // month range check via a synthetic first-of-month
        let candidate = format!("{s}-01");
        return NaiveDate::parse_from_str(&candidate, "%Y-%m-%d")
            .ok()
            .map(|_| DateFormat::YearMonth);
    }
    if shape(s, "dddd-dd-dd") {
        return NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .map(|_| DateFormat::Date);
    }
    if shape(s, "dd:dd") {
        return NaiveTime::parse_from_str(s, "%H:%M")
            .ok()
            .map(|_| DateFormat::HourMin);
    }
    if is_date_time(s) {
        return Some(DateFormat::DateTime);
    }
    None
}

/// True for the indefinite-date sentinel tokens, exactly `"Unknown"` and
/// `"Not Applicable"` (case-sensitive).
pub fn is_date_sentinel(s: &str) -> bool {
    s == "Unknown" || s == "Not Applicable"
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_each_shape() {
        assert_eq!(detect_date_format("2011"), Some(DateFormat::Year));
        assert_eq!(detect_date_format("2011-08"), Some(DateFormat::YearMonth));
        assert_eq!(detect_date_format("2011-08-15"), Some(DateFormat::Date));
        assert_eq!(detect_date_format("09:30"), Some(DateFormat::HourMin));
        assert_eq!(
            detect_date_format("2011-08-15T12:00:00"),
            Some(DateFormat::DateTime)
        );
        assert_eq!(
            detect_date_format("2011-08-15T12:00:00Z"),
            Some(DateFormat::DateTime)
        );
        assert_eq!(
            detect_date_format("2011-08-15T12:00:00.123-05:00"),
            Some(DateFormat::DateTime)
        );
    }

    #[test]
    fn test_calendar_validity() {
        assert_eq!(detect_date_format("2012-02-29"), Some(DateFormat::Date));
        assert_eq!(detect_date_format("2011-02-29"), None);
        assert_eq!(detect_date_format("2011-13"), None);
        assert_eq!(detect_date_format("2011-00"), None);
        assert_eq!(detect_date_format("2011-01-32"), None);
    }

    #[test]
    fn test_rejects_bad_shapes() {
        assert_eq!(detect_date_format(""), None);
        assert_eq!(detect_date_format("201"), None);
        assert_eq!(detect_date_format("20111"), None);
        assert_eq!(detect_date_format("2011-8"), None);
        assert_eq!(detect_date_format("2011/08/15"), None);
        assert_eq!(detect_date_format("25:00"), None);
        assert_eq!(detect_date_format("09:60"), None);
        assert_eq!(detect_date_format("2011-08-15T12:00"), None);
        assert_eq!(detect_date_format("2011-08-15T12:00:00."), None);
        assert_eq!(detect_date_format("2011-08-15T12:00:00+15:00"), None);
        assert_eq!(detect_date_format("Unknown"), None);
    }

    #[test]
    fn test_rejects_multibyte_text_without_panicking() {
        // 'é' spans bytes 18..20, putting byte 19 mid-character
        assert_eq!(detect_date_format("2011-08-15T12:00:0é"), None);
        assert_eq!(detect_date_format("2011-08-15T12:00:0é0:00"), None);
        // multibyte after the seconds field lands in the offset tail
        assert_eq!(detect_date_format("2011-08-15T12:00:00.5é"), None);
        assert_eq!(detect_date_format("日付でない値です、形式照合対象"), None);
    }

    #[test]
    fn test_sentinels_are_case_sensitive() {
        assert!(is_date_sentinel("Unknown"));
        assert!(is_date_sentinel("Not Applicable"));
        assert!(!is_date_sentinel("unknown"));
        assert!(!is_date_sentinel("NOT APPLICABLE"));
        assert!(!is_date_sentinel("Not  Applicable"));
        assert!(!is_date_sentinel(""));
    }
}
