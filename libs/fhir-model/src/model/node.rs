//! Immutable nodes
//!
//! A [`Node`] is a frozen instance of a record or element type. It is a cheap
//! handle (`Arc`) over the node data, so cloning and sharing across threads
//! never copies the tree. Nodes are only produced by [`NodeBuilder::build`].
//!
//! [`NodeBuilder::build`]: crate::NodeBuilder::build

use super::extension::Extension;
use super::leaf::Leaf;
use super::value::{Value, ValueRef};
use crate::builder::NodeBuilder;
use crate::config::ModelConfig;
use crate::schema::{FieldDef, NodeKind, TypeDef};
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::{Arc, OnceLock};

/// Produce a builder pre-filled from an existing value.
pub trait Buildable {
    type Builder;

    fn to_builder(&self) -> Self::Builder;
}

// ============================================================================
// Header
// ============================================================================

/// Fields every node carries ahead of its declared fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodeHeader {
    pub(crate) id: Option<Leaf>,
    pub(crate) extension: Vec<Extension>,
    pub(crate) modifier_extension: Vec<Extension>,
}

impl NodeHeader {
    pub fn id(&self) -> Option<&str> {
        self.id.as_ref().and_then(Leaf::as_str)
    }

    /// The id as a leaf: kind `id` on records, `string` on elements.
    pub fn id_leaf(&self) -> Option<&Leaf> {
        self.id.as_ref()
    }

    pub fn extension(&self) -> &[Extension] {
        &self.extension
    }

    pub fn modifier_extension(&self) -> &[Extension] {
        &self.modifier_extension
    }

    pub fn has_extension(&self) -> bool {
        !self.extension.is_empty() || !self.modifier_extension.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none() && !self.has_extension()
    }
}

// ============================================================================
// Slots
// ============================================================================

/// Storage for one declared field.
///
/// Repeated fields are always `Many` (possibly empty); single fields are
/// `Empty` or `Single`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Slot {
    Empty,
    Single(Value),
    Many(Vec<Value>),
}

impl Slot {
    pub fn is_populated(&self) -> bool {
        match self {
            Slot::Empty => false,
            Slot::Single(_) => true,
            Slot::Many(values) => !values.is_empty(),
        }
    }

    /// The held values as a slice (one entry for `Single`).
    pub fn values(&self) -> &[Value] {
        match self {
            Slot::Empty => &[],
            Slot::Single(value) => std::slice::from_ref(value),
            Slot::Many(values) => values,
        }
    }
}

// ============================================================================
// Node
// ============================================================================

struct NodeData {
    type_def: Arc<TypeDef>,
    header: NodeHeader,
    slots: Box<[Slot]>,
    config: ModelConfig,
    hash: OnceLock<u64>,
}

/// A frozen record or element.
#[derive(Clone)]
pub struct Node {
    inner: Arc<NodeData>,
}

impl Node {
    /// `slots` must line up with `type_def.fields()`.
    pub(crate) fn from_parts(
        type_def: Arc<TypeDef>,
        header: NodeHeader,
        slots: Box<[Slot]>,
        config: ModelConfig,
    ) -> Self {
        debug_assert_eq!(slots.len(), type_def.fields().len());
        Self {
            inner: Arc::new(NodeData {
                type_def,
                header,
                slots,
                config,
                hash: OnceLock::new(),
            }),
        }
    }

    pub fn type_def(&self) -> &Arc<TypeDef> {
        &self.inner.type_def
    }

    pub fn type_name(&self) -> &str {
        self.inner.type_def.name()
    }

    pub fn kind(&self) -> NodeKind {
        self.inner.type_def.kind()
    }

    pub fn is_record(&self) -> bool {
        self.inner.type_def.is_record()
    }

    /// Whether this node's type is `name` or derives from it.
    pub fn is_a(&self, name: &str) -> bool {
        self.inner.type_def.is_a(name)
    }

    /// The construction policy this node was built under.
    pub fn config(&self) -> &ModelConfig {
        &self.inner.config
    }

    pub fn header(&self) -> &NodeHeader {
        &self.inner.header
    }

    pub fn id(&self) -> Option<&str> {
        self.inner.header.id()
    }

    pub fn extension(&self) -> &[Extension] {
        &self.inner.header.extension
    }

    pub fn modifier_extension(&self) -> &[Extension] {
        &self.inner.header.modifier_extension
    }

    /// Extensions (not modifier extensions) with the given url.
    pub fn extensions_by_url<'a>(&'a self, url: &'a str) -> impl Iterator<Item = &'a Extension> + 'a {
        self.extension()
            .iter()
            .filter(move |ext| ext.url() == Some(url))
    }

    pub fn slot(&self, field: &str) -> Option<&Slot> {
        self.inner
            .type_def
            .field_index(field)
            .map(|i| &self.inner.slots[i])
    }

    /// Value of a single-valued field. Returns `None` for repeated fields;
    /// use [`Node::get_list`] for those.
    pub fn get(&self, field: &str) -> Option<&Value> {
        match self.slot(field)? {
            Slot::Single(value) => Some(value),
            _ => None,
        }
    }

    /// Entries of a field; a populated single field yields one entry.
    pub fn get_list(&self, field: &str) -> &[Value] {
        self.slot(field).map_or(&[], Slot::values)
    }

    pub fn child(&self, field: &str) -> Option<&Node> {
        self.get(field).and_then(Value::as_node)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Declared fields and their slots, in schema order.
    pub fn fields(&self) -> impl Iterator<Item = (&FieldDef, &Slot)> {
        self.inner
            .type_def
            .fields()
            .iter()
            .zip(self.inner.slots.iter())
    }

    /// Populated field values in traversal order, header parts first.
    pub fn children(&self) -> impl Iterator<Item = (&str, ValueRef<'_>)> {
        let header = &self.inner.header;
        let id = header.id.iter().map(|leaf| ("id", ValueRef::Leaf(leaf)));
        let extension = header
            .extension
            .iter()
            .map(|ext| ("extension", ValueRef::Node(ext.as_node())));
        let modifier = header
            .modifier_extension
            .iter()
            .map(|ext| ("modifierExtension", ValueRef::Node(ext.as_node())));
        let fields = self.fields().flat_map(|(def, slot)| {
            slot.values()
                .iter()
                .map(move |value| (def.name.as_str(), value.as_ref()))
        });
        id.chain(extension).chain(modifier).chain(fields)
    }

    /// Whether any extension or declared field is populated. The id does not
    /// count as a child.
    pub fn has_children(&self) -> bool {
        self.inner.header.has_extension() || self.inner.slots.iter().any(Slot::is_populated)
    }

    /// Structural hash, computed once and cached.
    pub fn structural_hash(&self) -> u64 {
        *self.inner.hash.get_or_init(|| {
            let mut hasher = DefaultHasher::new();
            self.type_name().hash(&mut hasher);
            self.inner.header.hash(&mut hasher);
            self.inner.slots.hash(&mut hasher);
            hasher.finish()
        })
    }

    /// A builder pre-filled with this node's contents and policy.
    pub fn to_builder(&self) -> NodeBuilder {
        NodeBuilder::from_node(self)
    }

    /// Whether both handles point at the same node data.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Buildable for Node {
    type Builder = NodeBuilder;

    fn to_builder(&self) -> NodeBuilder {
        NodeBuilder::from_node(self)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        if let (Some(a), Some(b)) = (self.inner.hash.get(), other.inner.hash.get()) {
            if a != b {
                return false;
            }
        }
        self.type_name() == other.type_name()
            && self.inner.header == other.inner.header
            && self.inner.slots == other.inner.slots
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.structural_hash());
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.type_name());
        let header = &self.inner.header;
        if let Some(id) = header.id() {
            s.field("id", &id);
        }
        if !header.extension.is_empty() {
            s.field("extension", &header.extension);
        }
        if !header.modifier_extension.is_empty() {
            s.field("modifierExtension", &header.modifier_extension);
        }
        for (def, slot) in self.fields() {
            match slot {
                Slot::Single(value) => {
                    s.field(&def.name, value);
                }
                Slot::Many(values) if !values.is_empty() => {
                    s.field(&def.name, values);
                }
                _ => {}
            }
        }
        s.finish()
    }
}
