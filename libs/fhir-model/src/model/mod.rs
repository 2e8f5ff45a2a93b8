//! Node hierarchy: leaves, nodes and the typed views over core types

pub mod extension;
pub mod leaf;
pub mod node;
pub mod reference;
pub mod value;

pub use extension::{Extension, ExtensionBuilder};
pub use leaf::{Leaf, LeafValue};
pub use node::{Buildable, Node, NodeHeader, Slot};
pub use reference::{Locator, Reference, ReferenceBuilder};
pub use value::{Value, ValueKind, ValueRef};
