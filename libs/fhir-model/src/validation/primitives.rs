//! Lexical rules for leaf values
//!
//! A leaf keeps the lexical form it was given; these checks decide whether
//! that form is valid for the leaf's kind. They return a human readable
//! reason, which [`check_leaf`] wraps into [`Error::InvalidLeafValue`].

use crate::error::{Error, Result};
use crate::model::{Leaf, LeafValue};
use crate::schema::LeafKind;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

/// Maximum length of textual leaf values, in characters.
pub const MAX_STRING_LENGTH: usize = 1_048_576;

const MAX_ID_LENGTH: usize = 64;

type Reason = std::result::Result<(), String>;

static DATE_TIME: OnceLock<Regex> = OnceLock::new();
static INSTANT: OnceLock<Regex> = OnceLock::new();
static TIME: OnceLock<Regex> = OnceLock::new();
static OID: OnceLock<Regex> = OnceLock::new();

fn date_time_regex() -> &'static Regex {
    DATE_TIME.get_or_init(|| {
        Regex::new(
            r"^(\d{4})(?:-(\d{2})(?:-(\d{2})(?:T(\d{2}):(\d{2}):(\d{2})(?:\.\d{1,9})?(Z|[+-]\d{2}:\d{2}))?)?)?$",
        )
        .expect("valid dateTime regex")
    })
}

fn instant_regex() -> &'static Regex {
    INSTANT.get_or_init(|| {
        Regex::new(
            r"^(\d{4})-(\d{2})-(\d{2})T(\d{2}):(\d{2}):(\d{2})(?:\.\d{1,9})?(Z|[+-]\d{2}:\d{2})$",
        )
        .expect("valid instant regex")
    })
}

fn time_regex() -> &'static Regex {
    TIME.get_or_init(|| {
        Regex::new(r"^(\d{2}):(\d{2}):(\d{2})(?:\.\d{1,9})?$").expect("valid time regex")
    })
}

fn oid_regex() -> &'static Regex {
    OID.get_or_init(|| {
        Regex::new(r"^urn:oid:[0-2](\.(0|[1-9][0-9]*))+$").expect("valid oid regex")
    })
}

/// Check `leaf` against the rules of its kind; `field` names it in the error.
pub fn check_leaf(leaf: &Leaf, field: &str) -> Result<()> {
    leaf_reason(leaf).map_err(|reason| Error::InvalidLeafValue {
        field: field.to_string(),
        reason,
    })
}

/// Check only that the payload of `leaf` is one its kind can carry. Unlike
/// [`check_leaf`] this does not look at lexical forms or ranges.
pub fn check_leaf_shape(leaf: &Leaf, field: &str) -> Result<()> {
    shape_reason(leaf).map_err(|reason| Error::InvalidLeafValue {
        field: field.to_string(),
        reason,
    })
}

fn shape_reason(leaf: &Leaf) -> Reason {
    if leaf.value().fits(leaf.kind()) {
        Ok(())
    } else {
        Err(format!(
            "a {} value cannot hold {}",
            leaf.kind(),
            leaf.value().shape()
        ))
    }
}

fn leaf_reason(leaf: &Leaf) -> Reason {
    shape_reason(leaf)?;
    let kind = leaf.kind();
    match (kind, leaf.value()) {
        (LeafKind::Boolean, LeafValue::Boolean(_)) => Ok(()),
        (LeafKind::Decimal, LeafValue::Decimal(_)) => Ok(()),
        (LeafKind::Integer, LeafValue::Integer(i)) => {
            check_range(*i, i64::from(i32::MIN), i64::from(i32::MAX))
        }
        (LeafKind::Integer64, LeafValue::Integer(_)) => Ok(()),
        (LeafKind::UnsignedInt, LeafValue::Integer(i)) => check_range(*i, 0, i64::from(i32::MAX)),
        (LeafKind::PositiveInt, LeafValue::Integer(i)) => check_range(*i, 1, i64::from(i32::MAX)),
        (kind, LeafValue::Text(text)) if kind.is_textual() => check_text(kind, text),
        (kind, value) => Err(format!("a {} value cannot hold {}", kind, value.shape())),
    }
}

fn check_range(value: i64, min: i64, max: i64) -> Reason {
    if value < min || value > max {
        Err(format!("{value} is outside the range {min}..={max}"))
    } else {
        Ok(())
    }
}

fn check_text(kind: LeafKind, text: &str) -> Reason {
    match kind {
        LeafKind::String | LeafKind::Markdown => check_string(text),
        LeafKind::Code => check_code(text),
        LeafKind::Id => check_id(text),
        LeafKind::Uri | LeafKind::Url | LeafKind::Canonical => check_uri(text),
        LeafKind::Oid => check_pattern(oid_regex(), text, "oid"),
        LeafKind::Uuid => check_uuid(text),
        LeafKind::Base64Binary => check_base64(text),
        LeafKind::Date => check_date(text),
        LeafKind::DateTime => check_date_time(text),
        LeafKind::Instant => check_instant(text),
        LeafKind::Time => check_time(text),
        LeafKind::Boolean
        | LeafKind::Integer
        | LeafKind::Integer64
        | LeafKind::UnsignedInt
        | LeafKind::PositiveInt
        | LeafKind::Decimal => Err(format!("a {kind} value cannot hold text")),
    }
}

/// Control characters other than tab, line feed and carriage return.
fn is_unsupported_control(c: char) -> bool {
    (c as u32) < 32 && !matches!(c, '\t' | '\n' | '\r')
}

fn check_length(text: &str) -> Reason {
    let length = text.chars().count();
    if length > MAX_STRING_LENGTH {
        return Err(format!(
            "length {length} is greater than maximum allowed length {MAX_STRING_LENGTH}"
        ));
    }
    Ok(())
}

pub fn check_string(text: &str) -> Reason {
    check_length(text)?;
    let mut has_content = false;
    for c in text.chars() {
        if is_unsupported_control(c) {
            return Err(format!("contains unsupported control character U+{:04X}", c as u32));
        }
        if c.is_whitespace() {
            if !matches!(c, ' ' | '\t' | '\r' | '\n') {
                return Err(format!("contains illegal whitespace character U+{:04X}", c as u32));
            }
        } else {
            has_content = true;
        }
    }
    if !has_content {
        return Err("must contain at least one non-whitespace character".to_string());
    }
    Ok(())
}

pub fn check_code(text: &str) -> Reason {
    check_length(text)?;
    if text.starts_with(char::is_whitespace) || text.is_empty() {
        return Err(format!("code '{text}' must begin with a non-whitespace character"));
    }
    if text.ends_with(char::is_whitespace) {
        return Err(format!("code '{text}' must end with a non-whitespace character"));
    }
    let mut previous_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if c != ' ' {
                return Err(format!(
                    "code '{text}' must not contain whitespace other than a single space"
                ));
            }
            if previous_space {
                return Err(format!("code '{text}' must not contain consecutive spaces"));
            }
            previous_space = true;
        } else {
            if is_unsupported_control(c) {
                return Err(format!(
                    "code '{text}' contains unsupported control character U+{:04X}",
                    c as u32
                ));
            }
            previous_space = false;
        }
    }
    Ok(())
}

pub fn check_id(text: &str) -> Reason {
    if text.is_empty() {
        return Err("id must not be empty".to_string());
    }
    if text.len() > MAX_ID_LENGTH {
        return Err(format!(
            "id length {} is greater than maximum allowed length {MAX_ID_LENGTH}",
            text.len()
        ));
    }
    match text
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '.')))
    {
        Some(c) => Err(format!("id '{text}' contains invalid character '{c}'")),
        None => Ok(()),
    }
}

pub fn check_uri(text: &str) -> Reason {
    check_length(text)?;
    for c in text.chars() {
        if is_unsupported_control(c) {
            return Err(format!(
                "uri '{text}' contains unsupported control character U+{:04X}",
                c as u32
            ));
        }
        if c.is_whitespace() {
            return Err(format!("uri '{text}' must not contain whitespace"));
        }
    }
    Ok(())
}

fn check_pattern(regex: &Regex, text: &str, what: &str) -> Reason {
    if regex.is_match(text) {
        Ok(())
    } else {
        Err(format!("'{text}' is not a valid {what}"))
    }
}

pub fn check_uuid(text: &str) -> Reason {
    let invalid = || format!("'{text}' is not a valid urn:uuid");
    let uuid = text.strip_prefix("urn:uuid:").ok_or_else(invalid)?;
    let lower_hyphenated = uuid.len() == 36 && !uuid.chars().any(|c| c.is_ascii_uppercase());
    if lower_hyphenated && uuid::Uuid::try_parse(uuid).is_ok() {
        Ok(())
    } else {
        Err(invalid())
    }
}

pub fn check_base64(text: &str) -> Reason {
    STANDARD
        .decode(text)
        .map(|_| ())
        .map_err(|err| format!("invalid base64 value: {err}"))
}

fn number(caps: &regex::Captures<'_>, group: usize) -> Option<u32> {
    caps.get(group).and_then(|m| m.as_str().parse().ok())
}

/// Calendar checks shared by date, dateTime and instant.
fn check_calendar(caps: &regex::Captures<'_>, text: &str) -> Reason {
    let invalid = || format!("'{text}' is not a valid calendar value");
    let year = number(caps, 1).ok_or_else(invalid)?;
    if year == 0 {
        return Err(invalid());
    }
    match (number(caps, 2), number(caps, 3)) {
        (Some(month), Some(day)) => {
            NaiveDate::from_ymd_opt(year as i32, month, day).ok_or_else(invalid)?;
        }
        (Some(month), None) if !(1..=12).contains(&month) => return Err(invalid()),
        _ => {}
    }
    if let (Some(hour), Some(minute), Some(second)) = (number(caps, 4), number(caps, 5), number(caps, 6)) {
        check_clock(hour, minute, second).map_err(|_| invalid())?;
    }
    if let Some(zone) = caps.get(7).map(|m| m.as_str()) {
        check_zone(zone).map_err(|_| invalid())?;
    }
    Ok(())
}

fn check_clock(hour: u32, minute: u32, second: u32) -> Reason {
    // 60 allows a leap second
    if hour > 23 || minute > 59 || second > 60 {
        return Err(format!("{hour:02}:{minute:02}:{second:02} is not a valid time"));
    }
    Ok(())
}

fn check_zone(zone: &str) -> Reason {
    if zone == "Z" {
        return Ok(());
    }
    let (hours, minutes) = zone[1..]
        .split_once(':')
        .ok_or_else(|| format!("'{zone}' is not a valid offset"))?;
    let hours: u32 = hours.parse().map_err(|_| format!("'{zone}' is not a valid offset"))?;
    let minutes: u32 = minutes.parse().map_err(|_| format!("'{zone}' is not a valid offset"))?;
    if hours > 14 || minutes > 59 || (hours == 14 && minutes != 0) {
        return Err(format!("'{zone}' is not a valid offset"));
    }
    Ok(())
}

pub fn check_date(text: &str) -> Reason {
    if text.contains('T') {
        return Err(format!("'{text}' is not a valid date"));
    }
    check_date_time(text).map_err(|_| format!("'{text}' is not a valid date"))
}

pub fn check_date_time(text: &str) -> Reason {
    let caps = date_time_regex()
        .captures(text)
        .ok_or_else(|| format!("'{text}' is not a valid dateTime"))?;
    check_calendar(&caps, text)
}

pub fn check_instant(text: &str) -> Reason {
    let caps = instant_regex()
        .captures(text)
        .ok_or_else(|| format!("'{text}' is not a valid instant"))?;
    check_calendar(&caps, text)
}

pub fn check_time(text: &str) -> Reason {
    let caps = time_regex()
        .captures(text)
        .ok_or_else(|| format!("'{text}' is not a valid time"))?;
    match (number(&caps, 1), number(&caps, 2), number(&caps, 3)) {
        (Some(hour), Some(minute), Some(second)) => check_clock(hour, minute, second),
        _ => Err(format!("'{text}' is not a valid time")),
    }
}
