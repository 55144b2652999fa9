//! Named string-shape predicates for the `format` keyword (component C).
use std::{collections::HashMap, net::{Ipv4Addr, Ipv6Addr}, sync::Arc};

use email_address::EmailAddress;
use once_cell::sync::Lazy;
use serde_json::Value;

use crate::primitive_type::PrimitiveType;

/// A named predicate registered under `format`. Implementors must not panic
/// or otherwise raise on malformed input: per §7's propagation policy,
/// predicate failure always normalizes to a boolean `false`, never an error.
pub trait Format: Send + Sync {
    /// The JSON type this predicate applies to; instances of any other type
    /// vacuously satisfy the format (§4.C).
    fn applies_to(&self) -> PrimitiveType {
        PrimitiveType::String
    }

    fn is_valid(&self, value: &Value) -> bool;
}

impl<F> Format for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_valid(&self, value: &Value) -> bool {
        match value {
            Value::String(s) => self(s),
            _ => true,
        }
    }
}

/// Whether the `format` keyword behaves as an assertion or as an
/// annotation-only keyword (§4.C).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatMode {
    #[default]
    Annotation,
    Assertion,
}

/// A mapping from format name to predicate, owned by the compiler and frozen
/// after `compile` returns (§5).
#[derive(Clone)]
pub struct FormatRegistry {
    formats: HashMap<String, Arc<dyn Format>>,
}

impl FormatRegistry {
    #[must_use]
    pub fn new() -> Self {
        FormatRegistry {
            formats: default_formats(),
        }
    }

    pub fn register(&mut self, name: impl Into<String>, format: impl Format + 'static) {
        self.formats.insert(name.into(), Arc::new(format));
    }

    pub fn unregister(&mut self, name: &str) {
        self.formats.remove(name);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Format>> {
        self.formats.get(name)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn default_formats() -> HashMap<String, Arc<dyn Format>> {
    let mut map: HashMap<String, Arc<dyn Format>> = HashMap::new();
    map.insert("date-time".into(), Arc::new(is_valid_date_time as fn(&str) -> bool));
    map.insert("date".into(), Arc::new(is_valid_date as fn(&str) -> bool));
    map.insert("time".into(), Arc::new(is_valid_time as fn(&str) -> bool));
    map.insert("duration".into(), Arc::new(is_valid_duration as fn(&str) -> bool));
    map.insert("email".into(), Arc::new(is_valid_email as fn(&str) -> bool));
    map.insert("hostname".into(), Arc::new(is_valid_hostname as fn(&str) -> bool));
    map.insert("ipv4".into(), Arc::new(is_valid_ipv4 as fn(&str) -> bool));
    map.insert("ipv6".into(), Arc::new(is_valid_ipv6 as fn(&str) -> bool));
    map.insert("uri".into(), Arc::new(is_valid_uri as fn(&str) -> bool));
    map.insert("uri-reference".into(), Arc::new(is_valid_uri_reference as fn(&str) -> bool));
    map.insert("iri".into(), Arc::new(is_valid_iri as fn(&str) -> bool));
    map.insert("iri-reference".into(), Arc::new(is_valid_iri_reference as fn(&str) -> bool));
    map.insert("uuid".into(), Arc::new(is_valid_uuid as fn(&str) -> bool));
    map.insert("json-pointer".into(), Arc::new(is_valid_json_pointer as fn(&str) -> bool));
    map.insert(
        "relative-json-pointer".into(),
        Arc::new(is_valid_relative_json_pointer as fn(&str) -> bool),
    );
    map.insert("regex".into(), Arc::new(is_valid_regex as fn(&str) -> bool));
    map.insert("uri-template".into(), Arc::new(is_valid_uri_template as fn(&str) -> bool));
    map
}

fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn is_valid_date(date: &str) -> bool {
    if date.len() != 10 {
        return false;
    }
    let bytes = date.as_bytes();
    if bytes[4] != b'-' || bytes[7] != b'-' || !bytes.iter().enumerate().all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit()) {
        return false;
    }
    let year = parse_u16(&bytes[0..4]);
    let month = parse_u8(&bytes[5..7]);
    let day = parse_u8(&bytes[8..10]);
    let (Some(year), Some(month), Some(day)) = (year, month, day) else {
        return false;
    };
    if !(1..=12).contains(&month) {
        return false;
    }
    let max_day = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => return false,
    };
    (1..=max_day).contains(&day)
}

fn parse_u16(bytes: &[u8]) -> Option<u16> {
    std::str::from_utf8(bytes).ok()?.parse().ok()
}

fn parse_u8(bytes: &[u8]) -> Option<u8> {
    std::str::from_utf8(bytes).ok()?.parse().ok()
}

fn is_valid_time(time: &str) -> bool {
    let (main, offset) = if let Some(stripped) = time.strip_suffix('Z') {
        (stripped, true)
    } else if let Some(pos) = time.rfind(['+', '-']) {
        if pos < 8 {
            (time, false)
        } else {
            (&time[..pos], validate_offset(&time[pos..]))
        }
    } else {
        (time, false)
    };
    offset && validate_time_core(main)
}

fn validate_offset(offset: &str) -> bool {
    let bytes = offset.as_bytes();
    bytes.len() == 6
        && (bytes[0] == b'+' || bytes[0] == b'-')
        && bytes[1..3].iter().all(u8::is_ascii_digit)
        && bytes[3] == b':'
        && bytes[4..6].iter().all(u8::is_ascii_digit)
}

fn validate_time_core(main: &str) -> bool {
    let (hms, frac) = match main.split_once('.') {
        Some((h, f)) => (h, Some(f)),
        None => (main, None),
    };
    if let Some(frac) = frac {
        if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
    }
    let parts: Vec<&str> = hms.split(':').collect();
    let [h, m, s] = parts[..] else { return false };
    let (Some(h), Some(m), Some(s)) = (h.parse::<u8>().ok(), m.parse::<u8>().ok(), s.parse::<u8>().ok()) else {
        return false;
    };
    h < 24 && m < 60 && s <= 60
}

fn is_valid_date_time(value: &str) -> bool {
    let Some(sep) = value.find(['T', 't']) else {
        return false;
    };
    is_valid_date(&value[..sep]) && is_valid_time(&value[sep + 1..])
}

fn is_valid_duration(value: &str) -> bool {
    let Some(rest) = value.strip_prefix('P') else {
        return false;
    };
    if rest.is_empty() {
        return false;
    }
    let (date_part, time_part) = match rest.split_once('T') {
        Some((d, t)) => (d, Some(t)),
        None => (rest, None),
    };
    if date_part.is_empty() && time_part.is_none() {
        return false;
    }
    if date_part == "W" {
        return false;
    }
    let date_ok = date_part.is_empty() || has_designators(date_part, "YMWD");
    let time_ok = match time_part {
        Some(t) => !t.is_empty() && has_designators(t, "HMS"),
        None => true,
    };
    date_ok && time_ok
}

fn has_designators(segment: &str, allowed: &str) -> bool {
    let mut digits_seen = false;
    let mut chars = segment.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_ascii_digit() {
            digits_seen = true;
            continue;
        }
        if !digits_seen || !allowed.contains(c) {
            return false;
        }
        digits_seen = false;
    }
    !digits_seen
}

fn is_valid_email(value: &str) -> bool {
    EmailAddress::is_valid(value)
}

fn is_valid_hostname(value: &str) -> bool {
    if value.len() > 253 || value.is_empty() {
        return false;
    }
    idna::domain_to_ascii(value).is_ok()
        && value
            .split('.')
            .all(|label| !label.is_empty() && label.len() <= 63)
}

fn is_valid_ipv4(value: &str) -> bool {
    value.parse::<Ipv4Addr>().is_ok() && !value.contains(':')
}

fn is_valid_ipv6(value: &str) -> bool {
    value.parse::<Ipv6Addr>().is_ok()
}

/// RFC 3986 URI: ASCII-only, per the grammar's `pchar`/`reg-name` productions.
/// Non-ASCII input must be percent-encoded first to qualify.
fn is_valid_uri(value: &str) -> bool {
    value.is_ascii() && url::Url::parse(value).is_ok()
}

fn is_valid_uri_reference(value: &str) -> bool {
    value.is_ascii() && (url::Url::parse(value).is_ok() || url::Url::parse(&format!("json-schema:///{value}")).is_ok())
}

/// RFC 3987 IRI: like `"uri"` but Unicode characters are permitted directly,
/// without requiring percent-encoding first (`url::Url::parse` already
/// accepts and normalizes them per WHATWG, which is what makes this check
/// strictly more permissive than `is_valid_uri`).
fn is_valid_iri(value: &str) -> bool {
    url::Url::parse(value).is_ok()
}

fn is_valid_iri_reference(value: &str) -> bool {
    url::Url::parse(value).is_ok() || url::Url::parse(&format!("json-schema:///{value}")).is_ok()
}

fn is_valid_uuid(value: &str) -> bool {
    let mut out = [0u8; 16];
    uuid_simd::parse_hyphenated(value.as_bytes(), uuid_simd::Out::from_mut(&mut out)).is_ok()
}

static JSON_POINTER_RE: Lazy<fancy_regex::Regex> =
    Lazy::new(|| fancy_regex::Regex::new(r"^(/(([^/~])|(~[01]))*)*$").expect("static regex is valid"));
static RELATIVE_JSON_POINTER_RE: Lazy<fancy_regex::Regex> = Lazy::new(|| {
    fancy_regex::Regex::new(r"^(?:0|[1-9][0-9]*)(?:#|(?:/(?:[^~/]|~0|~1)*)*)$").expect("static regex is valid")
});
static URI_TEMPLATE_RE: Lazy<fancy_regex::Regex> = Lazy::new(|| {
    fancy_regex::Regex::new(
        r#"^(?:(?:[^\x00-\x20"'<>%\\^`{|}]|%[0-9a-f]{2})|\{[+#./;?&=,!@|]?(?:[a-z0-9_]|%[0-9a-f]{2})+(?::[1-9][0-9]{0,3}|\*)?(?:,(?:[a-z0-9_]|%[0-9a-f]{2})+(?::[1-9][0-9]{0,3}|\*)?)*\})*$"#,
    )
    .expect("static regex is valid")
});

fn is_valid_json_pointer(value: &str) -> bool {
    JSON_POINTER_RE.is_match(value).unwrap_or(false)
}

fn is_valid_relative_json_pointer(value: &str) -> bool {
    RELATIVE_JSON_POINTER_RE.is_match(value).unwrap_or(false)
}

fn is_valid_uri_template(value: &str) -> bool {
    URI_TEMPLATE_RE.is_match(value).unwrap_or(false)
}

fn is_valid_regex(value: &str) -> bool {
    crate::ecma::compile(value).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_boundary_leap_year() {
        assert!(is_valid_date("2024-02-29"));
        assert!(!is_valid_date("2023-02-29"));
    }

    #[test]
    fn uuid_roundtrip() {
        assert!(is_valid_uuid("550e8400-e29b-41d4-a716-446655440000"));
        assert!(!is_valid_uuid("not-a-uuid"));
    }

    #[test]
    fn duration_basic() {
        assert!(is_valid_duration("P1Y2M3D"));
        assert!(is_valid_duration("PT1H"));
        assert!(!is_valid_duration("P"));
    }

    #[test]
    fn iri_accepts_unicode_but_uri_rejects_it() {
        assert!(is_valid_iri("https://例え.テスト/パス"));
        assert!(!is_valid_uri("https://例え.テスト/パス"));
    }

    #[test]
    fn iri_reference_accepts_relative_unicode() {
        assert!(is_valid_iri_reference("パス/名前"));
    }
}
