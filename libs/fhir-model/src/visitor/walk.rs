//! Walk functions driving a [`Visitor`] over a tree.

use std::ops::ControlFlow;

use crate::model::{Extension, Leaf, Node, Reference, Slot, Value, ValueRef};

use super::visit::{VisitFlow, VisitResult, Visitor};

/// Values that take part in traversal.
pub trait Traversable {
    /// Walk this value under `field`, at position `index` within a list.
    fn accept_as<'a, V: Visitor<'a> + ?Sized>(
        &'a self,
        field: &'a str,
        index: Option<usize>,
        visitor: &mut V,
    ) -> VisitResult;

    /// Walk this value as a root: empty field name, no index.
    fn accept<'a, V: Visitor<'a> + ?Sized>(&'a self, visitor: &mut V) -> VisitResult {
        self.accept_as("", None, visitor)
    }
}

impl Traversable for Node {
    fn accept_as<'a, V: Visitor<'a> + ?Sized>(
        &'a self,
        field: &'a str,
        index: Option<usize>,
        visitor: &mut V,
    ) -> VisitResult {
        walk_value(visitor, field, index, ValueRef::Node(self))
    }
}

impl Traversable for Leaf {
    fn accept_as<'a, V: Visitor<'a> + ?Sized>(
        &'a self,
        field: &'a str,
        index: Option<usize>,
        visitor: &mut V,
    ) -> VisitResult {
        walk_value(visitor, field, index, ValueRef::Leaf(self))
    }
}

impl Traversable for Value {
    fn accept_as<'a, V: Visitor<'a> + ?Sized>(
        &'a self,
        field: &'a str,
        index: Option<usize>,
        visitor: &mut V,
    ) -> VisitResult {
        walk_value(visitor, field, index, self.as_ref())
    }
}

impl Traversable for Reference {
    fn accept_as<'a, V: Visitor<'a> + ?Sized>(
        &'a self,
        field: &'a str,
        index: Option<usize>,
        visitor: &mut V,
    ) -> VisitResult {
        self.as_node().accept_as(field, index, visitor)
    }
}

impl Traversable for Extension {
    fn accept_as<'a, V: Visitor<'a> + ?Sized>(
        &'a self,
        field: &'a str,
        index: Option<usize>,
        visitor: &mut V,
    ) -> VisitResult {
        self.as_node().accept_as(field, index, visitor)
    }
}

/// Walk one value: the hooks for the value itself, then its children.
pub fn walk_value<'a, V: Visitor<'a> + ?Sized>(
    visitor: &mut V,
    field: &'a str,
    index: Option<usize>,
    value: ValueRef<'a>,
) -> VisitResult {
    match visitor.pre_visit(value) {
        VisitFlow::Continue => {}
        VisitFlow::SkipSubtree => return ControlFlow::Continue(()),
        VisitFlow::StopAll => return ControlFlow::Break(()),
    }
    visitor.visit_start(field, index, value);
    match visitor.visit(field, index, value) {
        VisitFlow::Continue => {
            if let ValueRef::Node(node) = value {
                walk_children(visitor, node)?;
            }
        }
        VisitFlow::SkipSubtree => {}
        VisitFlow::StopAll => return ControlFlow::Break(()),
    }
    visitor.visit_end(field, index, value);
    visitor.post_visit(value);
    ControlFlow::Continue(())
}

/// Walk the children of `node` in traversal order. Absent fields and empty
/// lists produce no hooks.
pub fn walk_children<'a, V: Visitor<'a> + ?Sized>(visitor: &mut V, node: &'a Node) -> VisitResult {
    let header = node.header();
    if let Some(id) = header.id_leaf() {
        walk_value(visitor, "id", None, ValueRef::Leaf(id))?;
    }
    walk_list(
        visitor,
        "extension",
        header.extension().iter().map(|ext| ValueRef::Node(ext.as_node())),
    )?;
    walk_list(
        visitor,
        "modifierExtension",
        header
            .modifier_extension()
            .iter()
            .map(|ext| ValueRef::Node(ext.as_node())),
    )?;
    for (def, slot) in node.fields() {
        match slot {
            Slot::Empty => {}
            Slot::Single(value) => walk_value(visitor, &def.name, None, value.as_ref())?,
            Slot::Many(values) => walk_list(visitor, &def.name, values.iter().map(Value::as_ref))?,
        }
    }
    ControlFlow::Continue(())
}

fn walk_list<'a, V, I>(visitor: &mut V, field: &'a str, entries: I) -> VisitResult
where
    V: Visitor<'a> + ?Sized,
    I: ExactSizeIterator<Item = ValueRef<'a>>,
{
    let len = entries.len();
    if len == 0 {
        return ControlFlow::Continue(());
    }
    match visitor.visit_list_start(field, len) {
        VisitFlow::Continue => {}
        VisitFlow::SkipSubtree => return ControlFlow::Continue(()),
        VisitFlow::StopAll => return ControlFlow::Break(()),
    }
    for (index, entry) in entries.enumerate() {
        walk_value(visitor, field, Some(index), entry)?;
    }
    visitor.visit_list_end(field, len);
    ControlFlow::Continue(())
}
