//! Primitive values

use crate::schema::LeafKind;
use rust_decimal::Decimal;
use std::fmt;

/// The payload of a leaf.
///
/// Textual kinds (dates, codes, uris, ...) keep their lexical form; whether
/// that form is valid for the leaf's kind is a validation concern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LeafValue {
    Boolean(bool),
    Integer(i64),
    Decimal(Decimal),
    Text(String),
}

impl LeafValue {
    /// Short name of the payload shape, for error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            LeafValue::Boolean(_) => "boolean",
            LeafValue::Integer(_) => "integer",
            LeafValue::Decimal(_) => "decimal",
            LeafValue::Text(_) => "text",
        }
    }

    /// Whether a leaf of `kind` can carry this payload.
    pub fn fits(&self, kind: LeafKind) -> bool {
        match self {
            LeafValue::Boolean(_) => kind == LeafKind::Boolean,
            LeafValue::Integer(_) => kind.is_integral(),
            LeafValue::Decimal(_) => kind == LeafKind::Decimal,
            LeafValue::Text(_) => kind.is_textual(),
        }
    }
}

impl fmt::Display for LeafValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeafValue::Boolean(b) => write!(f, "{b}"),
            LeafValue::Integer(i) => write!(f, "{i}"),
            LeafValue::Decimal(d) => write!(f, "{d}"),
            LeafValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for LeafValue {
    fn from(value: bool) -> Self {
        LeafValue::Boolean(value)
    }
}

impl From<i32> for LeafValue {
    fn from(value: i32) -> Self {
        LeafValue::Integer(i64::from(value))
    }
}

impl From<i64> for LeafValue {
    fn from(value: i64) -> Self {
        LeafValue::Integer(value)
    }
}

impl From<u32> for LeafValue {
    fn from(value: u32) -> Self {
        LeafValue::Integer(i64::from(value))
    }
}

impl From<Decimal> for LeafValue {
    fn from(value: Decimal) -> Self {
        LeafValue::Decimal(value)
    }
}

impl From<String> for LeafValue {
    fn from(value: String) -> Self {
        LeafValue::Text(value)
    }
}

impl From<&str> for LeafValue {
    fn from(value: &str) -> Self {
        LeafValue::Text(value.to_string())
    }
}

/// A primitive value of a known [`LeafKind`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Leaf {
    kind: LeafKind,
    value: LeafValue,
}

macro_rules! text_leaf {
    ($($(#[$doc:meta])* $ctor:ident => $kind:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $ctor(value: impl Into<String>) -> Self {
                Self::new(LeafKind::$kind, LeafValue::Text(value.into()))
            }
        )*
    };
}

impl Leaf {
    pub fn new(kind: LeafKind, value: impl Into<LeafValue>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(LeafKind::Boolean, value)
    }

    pub fn integer(value: i32) -> Self {
        Self::new(LeafKind::Integer, value)
    }

    pub fn integer64(value: i64) -> Self {
        Self::new(LeafKind::Integer64, value)
    }

    pub fn unsigned_int(value: u32) -> Self {
        Self::new(LeafKind::UnsignedInt, value)
    }

    pub fn positive_int(value: u32) -> Self {
        Self::new(LeafKind::PositiveInt, value)
    }

    pub fn decimal(value: Decimal) -> Self {
        Self::new(LeafKind::Decimal, value)
    }

    text_leaf! {
        string => String,
        markdown => Markdown,
        code => Code,
        id => Id,
        uri => Uri,
        url => Url,
        canonical => Canonical,
        oid => Oid,
        /// A `urn:uuid:` uri.
        uuid => Uuid,
        base64_binary => Base64Binary,
        /// A partial or full calendar date (`2024`, `2024-05`, `2024-05-01`).
        date => Date,
        date_time => DateTime,
        instant => Instant,
        time => Time,
    }

    pub fn kind(&self) -> LeafKind {
        self.kind
    }

    pub fn value(&self) -> &LeafValue {
        &self.value
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            LeafValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.value {
            LeafValue::Boolean(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self.value {
            LeafValue::Integer(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self.value {
            LeafValue::Decimal(d) => Some(d),
            _ => None,
        }
    }
}

impl fmt::Debug for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", self.kind, self.value.to_string())
    }
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_constructors_keep_kind() {
        let leaf = Leaf::uri("http://example.org");
        assert_eq!(leaf.kind(), LeafKind::Uri);
        assert_eq!(leaf.as_str(), Some("http://example.org"));
        assert_eq!(leaf.as_bool(), None);
        assert_eq!(Leaf::date_time("2024-05-01T10:00:00Z").kind(), LeafKind::DateTime);
    }

    #[test]
    fn test_numeric_constructors() {
        assert_eq!(Leaf::positive_int(3).as_integer(), Some(3));
        assert_eq!(Leaf::integer(-7).kind(), LeafKind::Integer);
        assert_eq!(
            Leaf::decimal(Decimal::new(150, 2)).as_decimal(),
            Some(Decimal::new(150, 2))
        );
    }

    #[test]
    fn test_equality_includes_kind() {
        assert_ne!(Leaf::code("abc"), Leaf::string("abc"));
        assert_eq!(Leaf::code("abc"), Leaf::code("abc"));
    }

    #[test]
    fn test_debug_shows_kind_and_value() {
        assert_eq!(format!("{:?}", Leaf::boolean(true)), "boolean(\"true\")");
        assert_eq!(Leaf::code("final").to_string(), "final");
    }
}
