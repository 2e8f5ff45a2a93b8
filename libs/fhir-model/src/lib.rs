//! Schema-driven structural object model
//!
//! This crate provides one generic engine for families of schema-defined,
//! hierarchical, extensible records: immutable nodes, builders that validate
//! structure before freezing, and a visitor protocol for walking the result.
//! Per-type field lists are schema data, not code.
//!
//! # Module Organization
//!
//! - `schema`: type declarations (`TypeDef`, `FieldDef`, `Cardinality`) and
//!   the `Schema` registry, including the core `Extension`, `Reference` and
//!   `Meta` types
//! - `model`: the node hierarchy (`Node`, `Value`, `Leaf`) and the typed
//!   `Reference` / `Extension` views
//! - `builder`: `NodeBuilder`, the mutable staging side of every node
//! - `validation`: the structural checks `build()` runs
//! - `visitor`: traversal (`Visitor`, `Traversable`, `VisitFlow`)
//! - `config`: `ModelConfig`, the construction policy
//!
//! # Design Philosophy
//!
//! - **Schema as data**: one builder and one node type serve every record
//!   shape; choice fields, cardinality and reference targets come from the
//!   declaration
//! - **Valid or nothing**: `build()` either returns a node that satisfies its
//!   declaration or the first violated constraint
//! - **Immutable and shareable**: nodes are `Arc`-backed, `Send + Sync`, and
//!   memoize their structural hash
//!
//! # Example
//!
//! ```rust
//! use ferrum_model::schema::{FieldDef, LeafKind, Schema, TypeDef};
//! use ferrum_model::Error;
//!
//! let mut schema = Schema::new();
//! schema.define(TypeDef::record(
//!     "Organization",
//!     vec![
//!         FieldDef::optional("name", LeafKind::String),
//!         FieldDef::reference("partOf", ["Organization"]),
//!     ],
//! )?)?;
//!
//! let parent = schema
//!     .reference()
//!     .reference("Organization/acme")
//!     .type_hint("Organization")
//!     .build()?;
//! let org = schema
//!     .builder("Organization")?
//!     .id("acme-lab")
//!     .set_text("name", "Acme Lab")
//!     .set("partOf", parent)
//!     .build()?;
//! assert_eq!(org.text("name"), Some("Acme Lab"));
//!
//! let wrong = schema.reference().type_hint("Patient").build()?;
//! let err = org.to_builder().set("partOf", wrong).build().unwrap_err();
//! assert!(matches!(err, Error::DisallowedReferenceTargetType { .. }));
//! # Ok::<(), Error>(())
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod model;
pub mod schema;
pub mod validation;
pub mod visitor;

// Re-export commonly used types
pub use builder::{IntoElement, NodeBuilder};
pub use config::{ModelConfig, ModelConfigBuilder, Preset};
pub use error::{Error, ReferenceSource, Result};
pub use model::{
    Buildable, Extension, ExtensionBuilder, Leaf, LeafValue, Locator, Node, NodeHeader, Reference,
    ReferenceBuilder, Slot, Value, ValueKind, ValueRef,
};
pub use schema::{Cardinality, FieldDef, LeafKind, NodeKind, Schema, TypeDef, TypeRef};
pub use validation::Validatable;
pub use visitor::{CollectingVisitor, Traversable, VisitFlow, VisitResult, Visitor};
