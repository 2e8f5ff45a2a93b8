//! Field values

use super::extension::Extension;
use super::leaf::Leaf;
use super::node::Node;
use super::reference::Reference;
use crate::schema::NodeKind;
use std::fmt;

/// What a field holds: a primitive leaf or a composite node.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Leaf(Leaf),
    Node(Node),
}

/// Borrowed view of a [`Value`], also produced from header parts such as
/// the id leaf or extension nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueRef<'a> {
    Leaf(&'a Leaf),
    Node(&'a Node),
}

/// Coarse classification of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Record,
    Element,
    Leaf,
}

impl Value {
    pub fn as_ref(&self) -> ValueRef<'_> {
        match self {
            Value::Leaf(leaf) => ValueRef::Leaf(leaf),
            Value::Node(node) => ValueRef::Node(node),
        }
    }

    pub fn kind(&self) -> ValueKind {
        self.as_ref().kind()
    }

    /// Leaf kind name (`uri`) or node type name (`Coding`).
    pub fn type_name(&self) -> &str {
        match self {
            Value::Leaf(leaf) => leaf.kind().name(),
            Value::Node(node) => node.type_name(),
        }
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Value::Leaf(leaf) => Some(leaf),
            Value::Node(_) => None,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(node) => Some(node),
            Value::Leaf(_) => None,
        }
    }

    pub fn into_node(self) -> Option<Node> {
        match self {
            Value::Node(node) => Some(node),
            Value::Leaf(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_leaf().and_then(Leaf::as_str)
    }
}

impl<'a> ValueRef<'a> {
    pub fn kind(self) -> ValueKind {
        match self {
            ValueRef::Leaf(_) => ValueKind::Leaf,
            ValueRef::Node(node) => match node.kind() {
                NodeKind::Record => ValueKind::Record,
                NodeKind::Element => ValueKind::Element,
            },
        }
    }

    pub fn type_name(self) -> &'a str {
        match self {
            ValueRef::Leaf(leaf) => leaf.kind().name(),
            ValueRef::Node(node) => node.type_name(),
        }
    }

    pub fn as_leaf(self) -> Option<&'a Leaf> {
        match self {
            ValueRef::Leaf(leaf) => Some(leaf),
            ValueRef::Node(_) => None,
        }
    }

    pub fn as_node(self) -> Option<&'a Node> {
        match self {
            ValueRef::Node(node) => Some(node),
            ValueRef::Leaf(_) => None,
        }
    }

    pub fn to_value(self) -> Value {
        match self {
            ValueRef::Leaf(leaf) => Value::Leaf(leaf.clone()),
            ValueRef::Node(node) => Value::Node(node.clone()),
        }
    }
}

impl<'a> From<&'a Value> for ValueRef<'a> {
    fn from(value: &'a Value) -> Self {
        value.as_ref()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Leaf(leaf) => fmt::Debug::fmt(leaf, f),
            Value::Node(node) => fmt::Debug::fmt(node, f),
        }
    }
}

impl From<Leaf> for Value {
    fn from(leaf: Leaf) -> Self {
        Value::Leaf(leaf)
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Value::Node(node)
    }
}

impl From<Reference> for Value {
    fn from(reference: Reference) -> Self {
        Value::Node(reference.into_node())
    }
}

impl From<Extension> for Value {
    fn from(extension: Extension) -> Self {
        Value::Node(extension.into_node())
    }
}
