//! Visitor trait for traversing nodes.
//!
//! Every hook has a default implementation, so a visitor overrides only what
//! it cares about. Leaves are visited like nodes (they simply have no
//! children), which lets one visitor see every value in a tree.
//!
//! # Example
//!
//! ```rust
//! use ferrum_model::schema::{FieldDef, LeafKind, Schema, TypeDef};
//! use ferrum_model::visitor::{Traversable, VisitFlow, Visitor};
//! use ferrum_model::ValueRef;
//!
//! /// Collects the path of every visited value.
//! #[derive(Default)]
//! struct Paths {
//!     stack: Vec<String>,
//!     paths: Vec<String>,
//! }
//!
//! impl<'a> Visitor<'a> for Paths {
//!     fn visit_start(&mut self, field: &'a str, index: Option<usize>, _value: ValueRef<'a>) {
//!         let segment = match index {
//!             Some(i) => format!("{field}[{i}]"),
//!             None => field.to_string(),
//!         };
//!         self.stack.push(segment);
//!         self.paths.push(self.stack.join("."));
//!     }
//!
//!     fn visit_end(&mut self, _field: &'a str, _index: Option<usize>, _value: ValueRef<'a>) {
//!         self.stack.pop();
//!     }
//! }
//!
//! let mut schema = Schema::new();
//! schema.define(TypeDef::element(
//!     "HumanName",
//!     vec![
//!         FieldDef::optional("family", LeafKind::String),
//!         FieldDef::list("given", LeafKind::String),
//!     ],
//! )?)?;
//! let name = schema
//!     .builder("HumanName")?
//!     .set_text("family", "Doe")
//!     .add_text("given", ["Jane", "Q"])
//!     .build()?;
//!
//! let mut paths = Paths::default();
//! name.accept_as("name", None, &mut paths);
//! assert_eq!(
//!     paths.paths,
//!     vec!["name", "name.family", "name.given[0]", "name.given[1]"]
//! );
//! # Ok::<(), ferrum_model::Error>(())
//! ```

use std::ops::ControlFlow;

use crate::model::ValueRef;

/// What a visitor wants the walk to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisitFlow {
    /// Keep going, descending into children
    #[default]
    Continue,
    /// Do not descend into the current value (or list)
    SkipSubtree,
    /// Abandon the whole traversal; no further hooks fire
    StopAll,
}

/// Result of a walk.
///
/// - `ControlFlow::Continue(())` - the walk finished (possibly skipping subtrees)
/// - `ControlFlow::Break(())` - a visitor returned [`VisitFlow::StopAll`]
pub type VisitResult = ControlFlow<()>;

/// Visitor over values of a node tree.
///
/// # Order
///
/// For each value:
///
/// 1. `pre_visit`; `SkipSubtree` skips the value entirely, no other hook fires
/// 2. `visit_start`
/// 3. `visit`; on `Continue` the children of a node are walked: `id`,
///    `extension`, `modifierExtension`, then declared fields in schema order.
///    Repeated fields are bracketed by `visit_list_start`/`visit_list_end`
///    and each entry is visited with its position.
/// 4. `visit_end`
/// 5. `post_visit`
///
/// `StopAll` from any hook that returns a [`VisitFlow`] unwinds at once.
///
/// # Lifetime
///
/// The `'a` lifetime ties visited values and field names to the tree being
/// walked, so a visitor may keep references into it.
pub trait Visitor<'a> {
    #[inline]
    fn pre_visit(&mut self, _value: ValueRef<'a>) -> VisitFlow {
        VisitFlow::Continue
    }

    #[inline]
    fn visit_start(&mut self, _field: &'a str, _index: Option<usize>, _value: ValueRef<'a>) {}

    #[inline]
    fn visit(&mut self, _field: &'a str, _index: Option<usize>, _value: ValueRef<'a>) -> VisitFlow {
        VisitFlow::Continue
    }

    #[inline]
    fn visit_end(&mut self, _field: &'a str, _index: Option<usize>, _value: ValueRef<'a>) {}

    #[inline]
    fn post_visit(&mut self, _value: ValueRef<'a>) {}

    /// Called before the entries of a non-empty repeated field.
    /// `SkipSubtree` skips all of them (and `visit_list_end`).
    #[inline]
    fn visit_list_start(&mut self, _field: &'a str, _len: usize) -> VisitFlow {
        VisitFlow::Continue
    }

    #[inline]
    fn visit_list_end(&mut self, _field: &'a str, _len: usize) {}
}
