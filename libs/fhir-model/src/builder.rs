//! Mutable construction state
//!
//! A [`NodeBuilder`] holds the staged contents of one node of a given
//! [`TypeDef`]. Setters replace, list setters append (or replace, through
//! [`NodeBuilder::replace`]), and [`NodeBuilder::build`] validates the staged
//! state and freezes it into an immutable [`Node`].
//!
//! Setter misuse that cannot be represented in the staged state (an unknown
//! field name, appending to a single-valued field) is remembered and reported
//! by `build()`, so setter chains never need a `?` per call.

use crate::config::ModelConfig;
use crate::error::{Error, Result};
use crate::model::{Extension, Leaf, LeafValue, Node, NodeHeader, Reference, Slot, Value};
use crate::schema::{reference_type, FieldDef, LeafKind, TypeDef, TypeRef};
use crate::validation;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, trace};

/// Values a setter accepts. `None` stands for an absent value; inside a list
/// it is a null entry, which `build()` rejects.
pub trait IntoElement {
    fn into_element(self) -> Option<Value>;
}

impl IntoElement for Value {
    fn into_element(self) -> Option<Value> {
        Some(self)
    }
}

impl IntoElement for Leaf {
    fn into_element(self) -> Option<Value> {
        Some(Value::Leaf(self))
    }
}

impl IntoElement for Node {
    fn into_element(self) -> Option<Value> {
        Some(Value::Node(self))
    }
}

impl IntoElement for Reference {
    fn into_element(self) -> Option<Value> {
        Some(Value::from(self))
    }
}

impl IntoElement for Extension {
    fn into_element(self) -> Option<Value> {
        Some(Value::from(self))
    }
}

impl<T: IntoElement> IntoElement for Option<T> {
    fn into_element(self) -> Option<Value> {
        self.and_then(IntoElement::into_element)
    }
}

/// Staged contents of one declared field.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Staged {
    Single(Option<Value>),
    Many(Vec<Option<Value>>),
}

impl Staged {
    fn empty(def: &FieldDef) -> Self {
        if def.is_repeated() {
            Staged::Many(Vec::new())
        } else {
            Staged::Single(None)
        }
    }

    fn from_slot(def: &FieldDef, slot: &Slot) -> Self {
        match slot {
            Slot::Empty => Staged::empty(def),
            Slot::Single(value) => Staged::Single(Some(value.clone())),
            Slot::Many(values) => Staged::Many(values.iter().cloned().map(Some).collect()),
        }
    }

    pub(crate) fn is_populated(&self) -> bool {
        match self {
            Staged::Single(value) => value.is_some(),
            Staged::Many(values) => !values.is_empty(),
        }
    }

    /// Null list entries have been rejected by validation at this point.
    fn freeze(self) -> Slot {
        match self {
            Staged::Single(None) => Slot::Empty,
            Staged::Single(Some(value)) => Slot::Single(value),
            Staged::Many(values) => Slot::Many(values.into_iter().flatten().collect()),
        }
    }
}

/// Builder for a node of one schema type.
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    pub(crate) type_def: Arc<TypeDef>,
    pub(crate) config: ModelConfig,
    pub(crate) id: Option<Leaf>,
    pub(crate) extension: Vec<Option<Value>>,
    pub(crate) modifier_extension: Vec<Option<Value>>,
    pub(crate) staged: Vec<Staged>,
    pub(crate) deferred: Option<Error>,
}

impl NodeBuilder {
    pub fn new(type_def: Arc<TypeDef>) -> Self {
        let staged = type_def.fields().iter().map(Staged::empty).collect();
        Self {
            type_def,
            config: ModelConfig::default(),
            id: None,
            extension: Vec::new(),
            modifier_extension: Vec::new(),
            staged,
            deferred: None,
        }
    }

    /// A builder holding the contents and policy of `node`.
    pub fn from_node(node: &Node) -> Self {
        let type_def = Arc::clone(node.type_def());
        let header = node.header();
        let staged = node
            .fields()
            .map(|(def, slot)| Staged::from_slot(def, slot))
            .collect();
        Self {
            type_def,
            config: *node.config(),
            id: header.id_leaf().cloned(),
            extension: header
                .extension()
                .iter()
                .map(|ext| Some(Value::from(ext.clone())))
                .collect(),
            modifier_extension: header
                .modifier_extension()
                .iter()
                .map(|ext| Some(Value::from(ext.clone())))
                .collect(),
            staged,
            deferred: None,
        }
    }

    pub fn with_config(mut self, config: ModelConfig) -> Self {
        self.config = config;
        self
    }

    /// Turn schema checks on or off for this builder only.
    pub fn validating(mut self, validating: bool) -> Self {
        self.config.validating = validating;
        self
    }

    pub fn type_def(&self) -> &Arc<TypeDef> {
        &self.type_def
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Header
    // ------------------------------------------------------------------

    pub fn id(mut self, id: impl Into<String>) -> Self {
        let kind = if self.type_def.is_record() {
            LeafKind::Id
        } else {
            LeafKind::String
        };
        self.id = Some(Leaf::new(kind, id.into()));
        self
    }

    pub fn clear_id(mut self) -> Self {
        self.id = None;
        self
    }

    /// Append extensions.
    pub fn extension<I>(mut self, extensions: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoElement,
    {
        self.extension
            .extend(extensions.into_iter().map(IntoElement::into_element));
        self
    }

    pub fn replace_extension<I>(mut self, extensions: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoElement,
    {
        self.extension.clear();
        self.extension(extensions)
    }

    /// Append modifier extensions.
    pub fn modifier_extension<I>(mut self, extensions: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoElement,
    {
        self.modifier_extension
            .extend(extensions.into_iter().map(IntoElement::into_element));
        self
    }

    pub fn replace_modifier_extension<I>(mut self, extensions: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoElement,
    {
        self.modifier_extension.clear();
        self.modifier_extension(extensions)
    }

    // ------------------------------------------------------------------
    // Declared fields
    // ------------------------------------------------------------------

    /// Replace the value of `field`. On a repeated field this replaces the
    /// whole list with the single value; `None` clears it.
    pub fn set(mut self, field: &str, value: impl IntoElement) -> Self {
        let value = value.into_element();
        if let Some(staged) = self.staged_mut(field) {
            *staged = match staged {
                Staged::Single(_) => Staged::Single(value),
                Staged::Many(_) => Staged::Many(value.into_iter().map(Some).collect()),
            };
        }
        self
    }

    /// Append entries to a repeated field.
    pub fn add<I>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoElement,
    {
        if let Some(list) = self.list_mut(field) {
            list.extend(values.into_iter().map(IntoElement::into_element));
        }
        self
    }

    /// Replace the entries of a repeated field.
    pub fn replace<I>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoElement,
    {
        if let Some(list) = self.list_mut(field) {
            *list = values.into_iter().map(IntoElement::into_element).collect();
        }
        self
    }

    pub fn clear(mut self, field: &str) -> Self {
        if let Some(staged) = self.staged_mut(field) {
            match staged {
                Staged::Single(value) => *value = None,
                Staged::Many(values) => values.clear(),
            }
        }
        self
    }

    /// Set a leaf field from text; the leaf takes the field's declared kind.
    pub fn set_text(mut self, field: &str, text: impl Into<String>) -> Self {
        let leaf = self.wrap_leaf(field, LeafValue::Text(text.into()));
        match leaf {
            Some(leaf) => self.set(field, leaf),
            None => self,
        }
    }

    /// Append text entries to a repeated leaf field.
    pub fn add_text<I>(mut self, field: &str, texts: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut leaves = Vec::new();
        for text in texts {
            match self.wrap_leaf(field, LeafValue::Text(text.into())) {
                Some(leaf) => leaves.push(leaf),
                None => return self,
            }
        }
        self.add(field, leaves)
    }

    pub fn set_bool(mut self, field: &str, value: bool) -> Self {
        match self.wrap_leaf(field, LeafValue::Boolean(value)) {
            Some(leaf) => self.set(field, leaf),
            None => self,
        }
    }

    pub fn set_integer(mut self, field: &str, value: i64) -> Self {
        match self.wrap_leaf(field, LeafValue::Integer(value)) {
            Some(leaf) => self.set(field, leaf),
            None => self,
        }
    }

    pub fn set_decimal(mut self, field: &str, value: Decimal) -> Self {
        match self.wrap_leaf(field, LeafValue::Decimal(value)) {
            Some(leaf) => self.set(field, leaf),
            None => self,
        }
    }

    /// Set a reference field from a bare locator such as `Patient/123`.
    pub fn set_reference(mut self, field: &str, locator: impl Into<String>) -> Self {
        let reference = NodeBuilder::new(Arc::clone(reference_type()))
            .with_config(self.config)
            .set_text("reference", locator)
            .build();
        match reference {
            Ok(node) => self.set(field, node),
            Err(err) => {
                self.defer(err);
                self
            }
        }
    }

    /// Validate the staged state and freeze it.
    ///
    /// Reports the first violated check in the type's declared order. With
    /// `validating` off, only the checks needed to represent the node run.
    pub fn build(mut self) -> Result<Node> {
        trace!(
            type_name = self.type_def.name(),
            validating = self.config.validating,
            "building node"
        );
        if let Some(err) = self.deferred.take() {
            debug!(type_name = self.type_def.name(), error = %err, "rejected builder input");
            return Err(err);
        }
        if let Err(err) = validation::validate(&self) {
            debug!(type_name = self.type_def.name(), error = %err, "node validation failed");
            return Err(err);
        }
        let node = self.freeze();
        trace!(type_name = node.type_name(), "built node");
        Ok(node)
    }

    fn freeze(self) -> Node {
        let header = NodeHeader {
            id: self.id,
            extension: freeze_extensions(self.extension),
            modifier_extension: freeze_extensions(self.modifier_extension),
        };
        let slots = self.staged.into_iter().map(Staged::freeze).collect();
        Node::from_parts(self.type_def, header, slots, self.config)
    }

    fn defer(&mut self, err: Error) {
        if self.deferred.is_none() {
            self.deferred = Some(err);
        }
    }

    fn field_index(&mut self, field: &str) -> Option<usize> {
        let index = self.type_def.field_index(field);
        if index.is_none() {
            let err = Error::UnknownField {
                type_name: self.type_def.name().to_string(),
                field: field.to_string(),
            };
            self.defer(err);
        }
        index
    }

    fn staged_mut(&mut self, field: &str) -> Option<&mut Staged> {
        let index = self.field_index(field)?;
        Some(&mut self.staged[index])
    }

    fn list_mut(&mut self, field: &str) -> Option<&mut Vec<Option<Value>>> {
        let index = self.field_index(field)?;
        if matches!(self.staged[index], Staged::Single(_)) {
            self.defer(Error::NotRepeating {
                field: field.to_string(),
            });
            return None;
        }
        match &mut self.staged[index] {
            Staged::Many(values) => Some(values),
            Staged::Single(_) => None,
        }
    }

    /// A leaf of the field's declared kind. On a choice field the value is
    /// wrapped into the one leaf alternative that can carry it; composite
    /// fields, and choices with no or several such alternatives, need a
    /// typed value through [`NodeBuilder::set`].
    fn wrap_leaf(&mut self, field: &str, value: LeafValue) -> Option<Leaf> {
        let index = self.field_index(field)?;
        let def = &self.type_def.fields()[index];
        let mut candidates = def.types.iter().filter_map(|ty| match ty {
            TypeRef::Leaf(kind) if value.fits(*kind) => Some(*kind),
            _ => None,
        });
        let expected = match (candidates.next(), candidates.next()) {
            (Some(kind), None) => return Some(Leaf::new(kind, value)),
            (None, _) => format!("one of: {}", def.type_names()),
            (Some(_), Some(_)) => format!(
                "a typed value, as a {} value fits more than one of: {}",
                value.shape(),
                def.type_names()
            ),
        };
        let err = Error::InvalidFieldType {
            field: field.to_string(),
            found: value.shape().to_string(),
            expected,
        };
        self.defer(err);
        None
    }
}

fn freeze_extensions(entries: Vec<Option<Value>>) -> Vec<Extension> {
    entries
        .into_iter()
        .flatten()
        .filter_map(Extension::from_value)
        .collect()
}
