//! String sub-format validators.
//!
//! Formats are ordinary checks over the generic string schema: each one is
//! either a precompiled regex or a small bespoke routine (URL parsing, JWT
//! header decoding, base64 charset/padding + decode). Every format records
//! its tag (and pattern, when regex-backed) into the node's metadata bag so
//! introspection can surface it.

use std::net::{Ipv4Addr, Ipv6Addr};

use chrono::{DateTime, NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::check::{self, Check};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$")
        .expect("email regex")
});

static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("uuid regex")
});

static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("iso date regex"));

static ISO_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}:\d{2}(:\d{2}(\.\d+)?)?$").expect("iso time regex"));

/// The closed set of supported string formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    /// RFC 5322-style email address.
    Email,
    /// Absolute URL (parse-and-reserialize via the `url` crate).
    Url,
    /// RFC 4122 UUID.
    Uuid,
    /// Dotted-quad IPv4 address.
    Ipv4,
    /// RFC 4291 IPv6 address.
    Ipv6,
    /// `YYYY-MM-DD` calendar date.
    IsoDate,
    /// `HH:MM[:SS[.fff]]` time of day.
    IsoTime,
    /// RFC 3339 date-time.
    IsoDateTime,
    /// JSON Web Token (three base64url segments, JSON header).
    Jwt,
    /// Standard-alphabet base64 with valid padding.
    Base64,
}

impl StringFormat {
    /// Wire/introspection name of the format.
    pub fn name(self) -> &'static str {
        match self {
            StringFormat::Email => "email",
            StringFormat::Url => "url",
            StringFormat::Uuid => "uuid",
            StringFormat::Ipv4 => "ipv4",
            StringFormat::Ipv6 => "ipv6",
            StringFormat::IsoDate => "date",
            StringFormat::IsoTime => "time",
            StringFormat::IsoDateTime => "date-time",
            StringFormat::Jwt => "jwt",
            StringFormat::Base64 => "base64",
        }
    }

    /// Source pattern for regex-backed formats, if any.
    pub fn pattern(self) -> Option<&'static str> {
        match self {
            StringFormat::Email => Some(EMAIL_RE.as_str()),
            StringFormat::Uuid => Some(UUID_RE.as_str()),
            StringFormat::IsoDate => Some(ISO_DATE_RE.as_str()),
            StringFormat::IsoTime => Some(ISO_TIME_RE.as_str()),
            _ => None,
        }
    }

    /// Validates `input` against this format.
    pub fn validate(self, input: &str) -> bool {
        match self {
            StringFormat::Email => EMAIL_RE.is_match(input),
            StringFormat::Url => url::Url::parse(input).is_ok(),
            StringFormat::Uuid => UUID_RE.is_match(input),
            StringFormat::Ipv4 => input.parse::<Ipv4Addr>().is_ok(),
            StringFormat::Ipv6 => input.parse::<Ipv6Addr>().is_ok(),
            StringFormat::IsoDate => {
                ISO_DATE_RE.is_match(input)
                    && NaiveDate::parse_from_str(input, "%Y-%m-%d").is_ok()
            }
            StringFormat::IsoTime => {
                if !ISO_TIME_RE.is_match(input) {
                    return false;
                }
                NaiveTime::parse_from_str(input, "%H:%M:%S%.f")
                    .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M"))
                    .is_ok()
            }
            StringFormat::IsoDateTime => DateTime::parse_from_rfc3339(input).is_ok(),
            StringFormat::Jwt => validate_jwt(input),
            StringFormat::Base64 => decode_base64(input, false).is_some(),
        }
    }
}

/// Decodes base64, standard or url-safe alphabet, rejecting bad charset or
/// padding. Returns `None` on any violation.
fn decode_base64(input: &str, url_safe: bool) -> Option<Vec<u8>> {
    fn sextet(c: u8, url_safe: bool) -> Option<u8> {
        match c {
            b'A'..=b'Z' => Some(c - b'A'),
            b'a'..=b'z' => Some(c - b'a' + 26),
            b'0'..=b'9' => Some(c - b'0' + 52),
            b'+' if !url_safe => Some(62),
            b'/' if !url_safe => Some(63),
            b'-' if url_safe => Some(62),
            b'_' if url_safe => Some(63),
            _ => None,
        }
    }

    let bytes = input.as_bytes();
    let padding = bytes.iter().rev().take_while(|&&b| b == b'=').count();
    if padding > 2 {
        return None;
    }
    let body = &bytes[..bytes.len() - padding];
    // Padded input must be a whole number of 4-byte groups; unpadded
    // (url-safe) input may not leave a single trailing sextet.
    if padding > 0 && bytes.len() % 4 != 0 {
        return None;
    }
    if body.len() % 4 == 1 {
        return None;
    }

    let mut out = Vec::with_capacity(body.len() / 4 * 3 + 2);
    let mut acc: u32 = 0;
    let mut bits = 0;
    for &b in body {
        acc = (acc << 6) | u32::from(sextet(b, url_safe)?);
        bits += 6;
        if bits >= 8 {
            bits -= 8;
            out.push((acc >> bits) as u8);
        }
    }
    Some(out)
}

/// Splits into three segments and decodes the header, which must be a JSON
/// object.
fn validate_jwt(input: &str) -> bool {
    let mut segments = input.split('.');
    let (Some(header), Some(payload), Some(signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return false;
    };
    if header.is_empty() || payload.is_empty() || signature.is_empty() {
        return false;
    }
    match decode_base64(header, true) {
        Some(decoded) => decoded.first() == Some(&b'{'),
        None => false,
    }
}

/// Email-format check.
pub fn email() -> Check {
    check::format(StringFormat::Email)
}

/// URL-format check.
pub fn url() -> Check {
    check::format(StringFormat::Url)
}

/// UUID-format check.
pub fn uuid() -> Check {
    check::format(StringFormat::Uuid)
}

/// IPv4-format check.
pub fn ipv4() -> Check {
    check::format(StringFormat::Ipv4)
}

/// IPv6-format check.
pub fn ipv6() -> Check {
    check::format(StringFormat::Ipv6)
}

/// ISO calendar-date check (`YYYY-MM-DD`).
pub fn iso_date() -> Check {
    check::format(StringFormat::IsoDate)
}

/// ISO time-of-day check.
pub fn iso_time() -> Check {
    check::format(StringFormat::IsoTime)
}

/// RFC 3339 date-time check.
pub fn iso_datetime() -> Check {
    check::format(StringFormat::IsoDateTime)
}

/// JWT check.
pub fn jwt() -> Check {
    check::format(StringFormat::Jwt)
}

/// Base64 check.
pub fn base64() -> Check {
    check::format(StringFormat::Base64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_format() {
        assert!(StringFormat::Email.validate("al@example.com"));
        assert!(!StringFormat::Email.validate("not-an-email"));
        assert!(!StringFormat::Email.validate("a@b@c.com"));
    }

    #[test]
    fn test_url_round_trips_through_parser() {
        assert!(StringFormat::Url.validate("https://example.com/a?b=1"));
        assert!(!StringFormat::Url.validate("example.com/no-scheme"));
    }

    #[test]
    fn test_uuid_format() {
        assert!(StringFormat::Uuid.validate("9f0c8b55-86b1-4da7-9e6f-1a2b3c4d5e6f"));
        assert!(!StringFormat::Uuid.validate("9f0c8b55-86b1-4da7"));
    }

    #[test]
    fn test_ip_formats() {
        assert!(StringFormat::Ipv4.validate("192.168.0.1"));
        assert!(!StringFormat::Ipv4.validate("256.0.0.1"));
        assert!(StringFormat::Ipv6.validate("::1"));
        assert!(!StringFormat::Ipv6.validate("not:an:ip"));
    }

    #[test]
    fn test_iso_formats_reject_out_of_range_components() {
        assert!(StringFormat::IsoDate.validate("2026-08-31"));
        assert!(!StringFormat::IsoDate.validate("2026-13-01"));
        assert!(StringFormat::IsoTime.validate("23:59:59.125"));
        assert!(!StringFormat::IsoTime.validate("24:00:00"));
        assert!(StringFormat::IsoDateTime.validate("2026-08-31T12:00:00Z"));
        assert!(!StringFormat::IsoDateTime.validate("2026-08-31 12:00:00"));
    }

    #[test]
    fn test_base64_checks_charset_and_padding() {
        assert!(StringFormat::Base64.validate("aGVsbG8="));
        assert!(!StringFormat::Base64.validate("aGVsbG8===")); // over-padded
        assert!(!StringFormat::Base64.validate("a GVsbG8=")); // bad charset
    }

    #[test]
    fn test_jwt_decodes_header_segment() {
        // header: {"alg":"HS256","typ":"JWT"}
        let jwt = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.eyJzdWIiOiIxIn0.c2ln";
        assert!(StringFormat::Jwt.validate(jwt));
        assert!(!StringFormat::Jwt.validate("only.two"));
        assert!(!StringFormat::Jwt.validate("bm90anNvbg.eyJzdWIiOiIxIn0.c2ln"));
    }
}
