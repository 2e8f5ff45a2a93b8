//! Type and field declarations
//!
//! A [`TypeDef`] is the schema data for one record or element type: its kind,
//! optional base type and the ordered list of declared fields. The order of
//! `fields` is the schema declaration order used by traversal, equality and
//! validation.

use super::leaf_kind::LeafKind;
use crate::error::{Error, Result};
use crate::model::{Value, ValueRef};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Name under which "any record" is declared in a field's type list.
pub const ANY_RECORD: &str = "Resource";

/// Type name of the core reference element.
pub const REFERENCE_TYPE: &str = "Reference";

/// Type name of the core extension element.
pub const EXTENSION_TYPE: &str = "Extension";

/// Type name of the core record metadata element.
pub const META_TYPE: &str = "Meta";

/// Header field names every node carries; they cannot be redeclared.
pub const HEADER_FIELDS: [&str; 3] = ["id", "extension", "modifierExtension"];

// ============================================================================
// Type references
// ============================================================================

/// A type a field may hold.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TypeRef {
    /// A primitive leaf of the given kind
    Leaf(LeafKind),
    /// A named composite or record type (matches derived types too)
    Complex(String),
    /// Any record
    AnyRecord,
}

impl TypeRef {
    pub fn complex(name: impl Into<String>) -> Self {
        TypeRef::Complex(name.into())
    }

    pub fn reference() -> Self {
        TypeRef::Complex(REFERENCE_TYPE.to_string())
    }

    pub fn name(&self) -> &str {
        match self {
            TypeRef::Leaf(kind) => kind.name(),
            TypeRef::Complex(name) => name,
            TypeRef::AnyRecord => ANY_RECORD,
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, TypeRef::Complex(name) if name == REFERENCE_TYPE)
    }

    /// Whether `value` is an instance of this type.
    pub fn accepts(&self, value: ValueRef<'_>) -> bool {
        match (self, value) {
            (TypeRef::Leaf(kind), ValueRef::Leaf(leaf)) => leaf.kind() == *kind,
            (TypeRef::Complex(name), ValueRef::Node(node)) => node.is_a(name),
            (TypeRef::AnyRecord, ValueRef::Node(node)) => node.is_record(),
            _ => false,
        }
    }
}

impl From<String> for TypeRef {
    fn from(name: String) -> Self {
        if let Some(kind) = LeafKind::from_name(&name) {
            TypeRef::Leaf(kind)
        } else if name == ANY_RECORD {
            TypeRef::AnyRecord
        } else {
            TypeRef::Complex(name)
        }
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        TypeRef::from(name.to_string())
    }
}

impl From<LeafKind> for TypeRef {
    fn from(kind: LeafKind) -> Self {
        TypeRef::Leaf(kind)
    }
}

impl From<TypeRef> for String {
    fn from(type_ref: TypeRef) -> Self {
        type_ref.name().to_string()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Cardinality
// ============================================================================

/// Cardinality of a field (min..max)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cardinality {
    /// Minimum occurrences
    pub min: u32,
    /// Maximum occurrences (None means unbounded/*)
    pub max: Option<u32>,
}

impl Cardinality {
    pub const OPTIONAL: Cardinality = Cardinality::new(0, Some(1));
    pub const REQUIRED: Cardinality = Cardinality::new(1, Some(1));
    pub const REPEATED: Cardinality = Cardinality::new(0, None);
    pub const NON_EMPTY: Cardinality = Cardinality::new(1, None);
    pub const PROHIBITED: Cardinality = Cardinality::new(0, Some(0));

    pub const fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Check if this field is a list
    pub fn is_repeated(&self) -> bool {
        self.max.map(|m| m > 1).unwrap_or(true)
    }

    pub fn is_required(&self) -> bool {
        self.min > 0
    }

    pub fn is_prohibited(&self) -> bool {
        self.max == Some(0)
    }
}

impl Default for Cardinality {
    fn default() -> Self {
        Cardinality::OPTIONAL
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}..{}", self.min, max),
            None => write!(f, "{}..*", self.min),
        }
    }
}

impl FromStr for Cardinality {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (min, max) = s
            .split_once("..")
            .ok_or_else(|| format!("invalid cardinality '{s}', expected 'min..max'"))?;
        let min: u32 = min
            .trim()
            .parse()
            .map_err(|_| format!("invalid minimum in cardinality '{s}'"))?;
        let max = match max.trim() {
            "*" => None,
            other => Some(
                other
                    .parse::<u32>()
                    .map_err(|_| format!("invalid maximum in cardinality '{s}'"))?,
            ),
        };
        if let Some(max) = max {
            if min > max {
                return Err(format!("minimum exceeds maximum in cardinality '{s}'"));
            }
        }
        Ok(Cardinality::new(min, max))
    }
}

impl TryFrom<String> for Cardinality {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Cardinality> for String {
    fn from(cardinality: Cardinality) -> Self {
        cardinality.to_string()
    }
}

// ============================================================================
// Fields
// ============================================================================

/// A declared field of a type.
///
/// More than one entry in `types` makes this a choice field. `target_types`
/// is the allow-list of record kinds a reference held by this field may hint
/// at; an empty list leaves the target unconstrained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    pub name: String,
    pub types: Vec<TypeRef>,
    #[serde(default)]
    pub cardinality: Cardinality,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target_types: Vec<String>,
}

impl FieldDef {
    pub fn new<T>(
        name: impl Into<String>,
        types: impl IntoIterator<Item = T>,
        cardinality: Cardinality,
    ) -> Self
    where
        T: Into<TypeRef>,
    {
        Self {
            name: name.into(),
            types: types.into_iter().map(Into::into).collect(),
            cardinality,
            target_types: Vec::new(),
        }
    }

    pub fn optional(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self::new(name, [ty.into()], Cardinality::OPTIONAL)
    }

    pub fn required(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self::new(name, [ty.into()], Cardinality::REQUIRED)
    }

    pub fn list(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self::new(name, [ty.into()], Cardinality::REPEATED)
    }

    pub fn non_empty_list(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self::new(name, [ty.into()], Cardinality::NON_EMPTY)
    }

    /// An optional choice field over `types`.
    pub fn choice<T: Into<TypeRef>>(
        name: impl Into<String>,
        types: impl IntoIterator<Item = T>,
    ) -> Self {
        Self::new(name, types, Cardinality::OPTIONAL)
    }

    /// An optional reference field restricted to `targets`.
    pub fn reference<S: Into<String>>(
        name: impl Into<String>,
        targets: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::optional(name, TypeRef::reference()).with_targets(targets)
    }

    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    pub fn with_targets<S: Into<String>>(mut self, targets: impl IntoIterator<Item = S>) -> Self {
        self.target_types = targets.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_choice(&self) -> bool {
        self.types.len() > 1
    }

    pub fn is_repeated(&self) -> bool {
        self.cardinality.is_repeated()
    }

    pub fn is_required(&self) -> bool {
        self.cardinality.is_required()
    }

    /// Whether any of the declared types is a reference.
    pub fn allows_references(&self) -> bool {
        self.types.iter().any(TypeRef::is_reference)
    }

    /// The leaf kind of a non-choice leaf field.
    pub fn leaf_kind(&self) -> Option<LeafKind> {
        match self.types.as_slice() {
            [TypeRef::Leaf(kind)] => Some(*kind),
            _ => None,
        }
    }

    /// Whether `value` is one of the declared types.
    pub fn accepts(&self, value: ValueRef<'_>) -> bool {
        self.types.iter().any(|t| t.accepts(value))
    }

    /// Comma separated declared type names, for error messages.
    pub fn type_names(&self) -> String {
        join_names(self.types.iter().map(TypeRef::name))
    }

    /// The type-suffixed name a choice value is serialized under
    /// (`value` holding a uri becomes `valueUri`).
    pub fn choice_element_name(&self, value: &Value) -> String {
        if !self.is_choice() {
            return self.name.clone();
        }
        let type_name = value.type_name();
        let mut chars = type_name.chars();
        match chars.next() {
            Some(first) => format!("{}{}{}", self.name, first.to_uppercase(), chars.as_str()),
            None => self.name.clone(),
        }
    }

    fn check(&self, owner: &str) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::InvalidSchema(format!(
                "type '{owner}' declares a field without a name"
            )));
        }
        if HEADER_FIELDS.contains(&self.name.as_str()) {
            return Err(Error::InvalidSchema(format!(
                "field '{owner}.{}' redeclares a header field",
                self.name
            )));
        }
        if self.types.is_empty() {
            return Err(Error::InvalidSchema(format!(
                "field '{owner}.{}' declares no type",
                self.name
            )));
        }
        if let Some(max) = self.cardinality.max {
            if self.cardinality.min > max {
                return Err(Error::InvalidSchema(format!(
                    "field '{owner}.{}' has cardinality {}",
                    self.name, self.cardinality
                )));
            }
        }
        if self.is_choice() && self.is_repeated() {
            return Err(Error::InvalidSchema(format!(
                "choice field '{owner}.{}' cannot repeat",
                self.name
            )));
        }
        if !self.target_types.is_empty() && !self.allows_references() {
            return Err(Error::InvalidSchema(format!(
                "field '{owner}.{}' declares target types but holds no reference",
                self.name
            )));
        }
        Ok(())
    }
}

pub(crate) fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

// ============================================================================
// Types
// ============================================================================

/// Kind of a composite type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Root, independently identifiable value
    Record,
    /// Nested element without identity of its own
    Element,
}

/// Schema data for one record or element type.
#[derive(Debug)]
pub struct TypeDef {
    name: String,
    kind: NodeKind,
    base: Option<Arc<TypeDef>>,
    fields: Vec<FieldDef>,
    index: HashMap<String, usize>,
}

impl TypeDef {
    /// Declare a type without a base.
    ///
    /// Records get the standard record fields (`meta`, `implicitRules`,
    /// `language`, `contained`) ahead of `fields`.
    pub fn new(name: impl Into<String>, kind: NodeKind, fields: Vec<FieldDef>) -> Result<Self> {
        let fields = match kind {
            NodeKind::Record => record_fields().into_iter().chain(fields).collect(),
            NodeKind::Element => fields,
        };
        Self::assemble(name.into(), kind, None, fields)
    }

    pub fn record(name: impl Into<String>, fields: Vec<FieldDef>) -> Result<Self> {
        Self::new(name, NodeKind::Record, fields)
    }

    pub fn element(name: impl Into<String>, fields: Vec<FieldDef>) -> Result<Self> {
        Self::new(name, NodeKind::Element, fields)
    }

    /// Declare a type deriving from `base`; it inherits the base fields and
    /// appends its own.
    pub fn derive(name: impl Into<String>, base: &Arc<TypeDef>, fields: Vec<FieldDef>) -> Result<Self> {
        let all = base.fields.iter().cloned().chain(fields).collect();
        Self::assemble(name.into(), base.kind, Some(Arc::clone(base)), all)
    }

    fn assemble(
        name: String,
        kind: NodeKind,
        base: Option<Arc<TypeDef>>,
        fields: Vec<FieldDef>,
    ) -> Result<Self> {
        if name.is_empty() {
            return Err(Error::InvalidSchema("type without a name".to_string()));
        }
        let mut index = HashMap::with_capacity(fields.len());
        for (position, field) in fields.iter().enumerate() {
            field.check(&name)?;
            if index.insert(field.name.clone(), position).is_some() {
                return Err(Error::InvalidSchema(format!(
                    "field '{name}.{}' is declared twice",
                    field.name
                )));
            }
        }
        Ok(Self {
            name,
            kind,
            base,
            fields,
            index,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_record(&self) -> bool {
        self.kind == NodeKind::Record
    }

    pub fn base(&self) -> Option<&Arc<TypeDef>> {
        self.base.as_ref()
    }

    /// Declared fields in schema order (inherited fields first).
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Whether this type is `name` or derives from it.
    pub fn is_a(&self, name: &str) -> bool {
        let mut current = Some(self);
        while let Some(def) = current {
            if def.name == name {
                return true;
            }
            current = def.base.as_deref();
        }
        false
    }
}

/// Standard fields of every record, in declaration order.
fn record_fields() -> Vec<FieldDef> {
    vec![
        FieldDef::optional("meta", TypeRef::complex(META_TYPE)),
        FieldDef::optional("implicitRules", LeafKind::Uri),
        FieldDef::optional("language", LeafKind::Code),
        FieldDef::list("contained", TypeRef::AnyRecord),
    ]
}
