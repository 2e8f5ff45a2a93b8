//! Visitor collecting every value of one type.

use crate::model::{Node, ValueRef};

use super::visit::{VisitFlow, Visitor};
use super::walk::Traversable;

/// Collects every visited value whose type is `type_name`: a leaf of that
/// kind (`uri`) or a node whose type is or derives from it (`Coding`). The
/// root itself is included when it matches.
#[derive(Debug, Clone)]
pub struct CollectingVisitor<'a> {
    type_name: String,
    collected: Vec<ValueRef<'a>>,
}

impl<'a> CollectingVisitor<'a> {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            collected: Vec::new(),
        }
    }

    /// Walk `root` and return the matching values in traversal order.
    pub fn collect(root: &'a Node, type_name: &str) -> Vec<ValueRef<'a>> {
        let mut visitor = Self::new(type_name);
        let _ = root.accept(&mut visitor);
        visitor.collected
    }

    pub fn values(&self) -> &[ValueRef<'a>] {
        &self.collected
    }

    /// The matching nodes, skipping leaves.
    pub fn nodes(&self) -> impl Iterator<Item = &'a Node> + '_ {
        self.collected.iter().filter_map(|value| value.as_node())
    }

    pub fn into_values(self) -> Vec<ValueRef<'a>> {
        self.collected
    }

    fn matches(&self, value: ValueRef<'_>) -> bool {
        match value {
            ValueRef::Leaf(leaf) => leaf.kind().name() == self.type_name,
            ValueRef::Node(node) => node.is_a(&self.type_name),
        }
    }
}

impl<'a> Visitor<'a> for CollectingVisitor<'a> {
    fn visit(&mut self, _field: &'a str, _index: Option<usize>, value: ValueRef<'a>) -> VisitFlow {
        if self.matches(value) {
            self.collected.push(value);
        }
        VisitFlow::Continue
    }
}
