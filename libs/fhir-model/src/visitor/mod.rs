//! Traversal of node trees.
//!
//! - [`Visitor`]: hooks fired for every visited value
//! - [`Traversable`]: `accept` entry points on nodes, leaves and values
//! - [`walk_value`] / [`walk_children`]: the walk itself, for visitors that
//!   want to drive part of it by hand
//! - [`CollectingVisitor`]: gathers every value of one type

pub mod collect;
pub mod visit;
pub mod walk;

pub use collect::CollectingVisitor;
pub use visit::{VisitFlow, VisitResult, Visitor};
pub use walk::{walk_children, walk_value, Traversable};
