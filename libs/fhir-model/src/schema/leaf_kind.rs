//! Primitive (leaf) value kinds

use serde::{Deserialize, Serialize};
use std::fmt;

/// The primitive kinds a leaf value can have.
///
/// Names follow the conventional lower-camel spelling used by schema
/// declarations (`dateTime`, `base64Binary`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LeafKind {
    Boolean,
    Integer,
    Integer64,
    UnsignedInt,
    PositiveInt,
    Decimal,
    String,
    Markdown,
    Code,
    Id,
    Uri,
    Url,
    Canonical,
    Oid,
    Uuid,
    Base64Binary,
    Date,
    DateTime,
    Instant,
    Time,
}

static LEAF_KINDS: phf::Map<&'static str, LeafKind> = phf::phf_map! {
    "boolean" => LeafKind::Boolean,
    "integer" => LeafKind::Integer,
    "integer64" => LeafKind::Integer64,
    "unsignedInt" => LeafKind::UnsignedInt,
    "positiveInt" => LeafKind::PositiveInt,
    "decimal" => LeafKind::Decimal,
    "string" => LeafKind::String,
    "markdown" => LeafKind::Markdown,
    "code" => LeafKind::Code,
    "id" => LeafKind::Id,
    "uri" => LeafKind::Uri,
    "url" => LeafKind::Url,
    "canonical" => LeafKind::Canonical,
    "oid" => LeafKind::Oid,
    "uuid" => LeafKind::Uuid,
    "base64Binary" => LeafKind::Base64Binary,
    "date" => LeafKind::Date,
    "dateTime" => LeafKind::DateTime,
    "instant" => LeafKind::Instant,
    "time" => LeafKind::Time,
};

impl LeafKind {
    /// Every leaf kind, in declaration order.
    pub const ALL: [LeafKind; 20] = [
        LeafKind::Boolean,
        LeafKind::Integer,
        LeafKind::Integer64,
        LeafKind::UnsignedInt,
        LeafKind::PositiveInt,
        LeafKind::Decimal,
        LeafKind::String,
        LeafKind::Markdown,
        LeafKind::Code,
        LeafKind::Id,
        LeafKind::Uri,
        LeafKind::Url,
        LeafKind::Canonical,
        LeafKind::Oid,
        LeafKind::Uuid,
        LeafKind::Base64Binary,
        LeafKind::Date,
        LeafKind::DateTime,
        LeafKind::Instant,
        LeafKind::Time,
    ];

    /// Look up a kind by its schema name (case-sensitive).
    pub fn from_name(name: &str) -> Option<LeafKind> {
        LEAF_KINDS.get(name).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            LeafKind::Boolean => "boolean",
            LeafKind::Integer => "integer",
            LeafKind::Integer64 => "integer64",
            LeafKind::UnsignedInt => "unsignedInt",
            LeafKind::PositiveInt => "positiveInt",
            LeafKind::Decimal => "decimal",
            LeafKind::String => "string",
            LeafKind::Markdown => "markdown",
            LeafKind::Code => "code",
            LeafKind::Id => "id",
            LeafKind::Uri => "uri",
            LeafKind::Url => "url",
            LeafKind::Canonical => "canonical",
            LeafKind::Oid => "oid",
            LeafKind::Uuid => "uuid",
            LeafKind::Base64Binary => "base64Binary",
            LeafKind::Date => "date",
            LeafKind::DateTime => "dateTime",
            LeafKind::Instant => "instant",
            LeafKind::Time => "time",
        }
    }

    /// Kinds whose value is carried as text.
    pub fn is_textual(self) -> bool {
        !matches!(
            self,
            LeafKind::Boolean
                | LeafKind::Integer
                | LeafKind::Integer64
                | LeafKind::UnsignedInt
                | LeafKind::PositiveInt
                | LeafKind::Decimal
        )
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            LeafKind::Integer | LeafKind::Integer64 | LeafKind::UnsignedInt | LeafKind::PositiveInt
        )
    }
}

impl fmt::Display for LeafKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<String> for LeafKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        LeafKind::from_name(&value).ok_or_else(|| format!("unknown leaf kind: {value}"))
    }
}

impl From<LeafKind> for String {
    fn from(kind: LeafKind) -> Self {
        kind.name().to_string()
    }
}
