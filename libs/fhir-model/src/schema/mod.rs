//! Schema declarations
//!
//! The per-type field lists are data supplied from outside the engine. A
//! [`Schema`] is the registry of those declarations: it resolves base types,
//! checks that every referenced type name exists, and hands out builders
//! parameterized by a [`TypeDef`].
//!
//! # Example
//!
//! ```rust
//! use ferrum_model::schema::{FieldDef, LeafKind, Schema, TypeDef};
//!
//! let mut schema = Schema::new();
//! schema
//!     .define(TypeDef::element(
//!         "ContactPoint",
//!         vec![
//!             FieldDef::optional("system", LeafKind::Code),
//!             FieldDef::optional("value", LeafKind::String),
//!         ],
//!     )?)?;
//!
//! let telecom = schema
//!     .builder("ContactPoint")?
//!     .set_text("system", "email")
//!     .set_text("value", "admin@example.org")
//!     .build()?;
//! assert_eq!(telecom.text("system"), Some("email"));
//! # Ok::<(), ferrum_model::Error>(())
//! ```

pub mod builtin;
pub mod leaf_kind;
pub mod types;

pub use builtin::{extension_type, meta_type, reference_type};
pub use leaf_kind::LeafKind;
pub use types::{
    Cardinality, FieldDef, NodeKind, TypeDef, TypeRef, ANY_RECORD, EXTENSION_TYPE, HEADER_FIELDS,
    META_TYPE, REFERENCE_TYPE,
};

use crate::builder::NodeBuilder;
use crate::config::ModelConfig;
use crate::error::{Error, Result};
use crate::model::{ExtensionBuilder, ReferenceBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Serializable declaration of one type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDecl {
    pub name: String,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

/// Serializable schema: an optional construction policy and type declarations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ModelConfig>,
    #[serde(default)]
    pub types: Vec<TypeDecl>,
}

/// Registry of type declarations.
#[derive(Debug, Clone)]
pub struct Schema {
    types: HashMap<String, Arc<TypeDef>>,
    config: ModelConfig,
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

impl Schema {
    /// A schema holding only the core types.
    pub fn new() -> Self {
        Self::with_config(ModelConfig::default())
    }

    pub fn with_config(config: ModelConfig) -> Self {
        let types = builtin::core_types()
            .into_iter()
            .map(|def| (def.name().to_string(), Arc::clone(def)))
            .collect();
        Self { types, config }
    }

    /// Parse a [`SchemaDocument`] from JSON and resolve it.
    pub fn from_json(json: &str) -> Result<Self> {
        let document: SchemaDocument = serde_json::from_str(json)?;
        Self::from_document(document)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let document: SchemaDocument = serde_json::from_value(value)?;
        Self::from_document(document)
    }

    pub fn from_document(document: SchemaDocument) -> Result<Self> {
        let mut schema = Self::with_config(document.config.unwrap_or_default());
        schema.declare_all(document.types)?;
        schema.check()?;
        tracing::debug!(types = schema.types.len(), "loaded schema");
        Ok(schema)
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ModelConfig) {
        self.config = config;
    }

    /// Register a type. Names must be unique within the schema.
    pub fn define(&mut self, def: TypeDef) -> Result<Arc<TypeDef>> {
        if self.types.contains_key(def.name()) {
            return Err(Error::InvalidSchema(format!(
                "type '{}' is already defined",
                def.name()
            )));
        }
        let def = Arc::new(def);
        self.types.insert(def.name().to_string(), Arc::clone(&def));
        Ok(def)
    }

    /// Register one declaration whose base (if any) is already defined.
    pub fn declare(&mut self, decl: TypeDecl) -> Result<Arc<TypeDef>> {
        let def = match &decl.base {
            Some(base) => {
                let base = self.type_def(base)?.clone();
                if base.kind() != decl.kind {
                    return Err(Error::InvalidSchema(format!(
                        "type '{}' cannot derive from '{}' of a different kind",
                        decl.name,
                        base.name()
                    )));
                }
                TypeDef::derive(decl.name, &base, decl.fields)?
            }
            None => TypeDef::new(decl.name, decl.kind, decl.fields)?,
        };
        self.define(def)
    }

    /// Register declarations in any order; bases are resolved first.
    pub fn declare_all(&mut self, decls: Vec<TypeDecl>) -> Result<()> {
        let mut pending = decls;
        while !pending.is_empty() {
            let (ready, waiting): (Vec<_>, Vec<_>) = pending.into_iter().partition(|decl| {
                decl.base
                    .as_ref()
                    .map_or(true, |base| self.types.contains_key(base))
            });
            if ready.is_empty() {
                let names = waiting
                    .iter()
                    .map(|d| format!("{} (base {})", d.name, d.base.as_deref().unwrap_or("?")))
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(Error::InvalidSchema(format!(
                    "unresolvable base types: {names}"
                )));
            }
            for decl in ready {
                self.declare(decl)?;
            }
            pending = waiting;
        }
        Ok(())
    }

    /// Verify every field type and reference target names a known type.
    pub fn check(&self) -> Result<()> {
        let mut names: Vec<&String> = self.types.keys().collect();
        names.sort();
        for name in names {
            let def = &self.types[name];
            for field in def.fields() {
                for ty in &field.types {
                    if let TypeRef::Complex(type_name) = ty {
                        if !self.types.contains_key(type_name) {
                            return Err(Error::InvalidSchema(format!(
                                "field '{}.{}' uses unknown type '{type_name}'",
                                def.name(),
                                field.name
                            )));
                        }
                    }
                }
                for target in &field.target_types {
                    if !self.is_record_type(target) {
                        return Err(Error::InvalidSchema(format!(
                            "field '{}.{}' targets '{target}', which is not a record type",
                            def.name(),
                            field.name
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<TypeDef>> {
        self.types.get(name)
    }

    pub fn type_def(&self, name: &str) -> Result<&Arc<TypeDef>> {
        self.types
            .get(name)
            .ok_or_else(|| Error::UnknownType(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn is_record_type(&self, name: &str) -> bool {
        self.types.get(name).is_some_and(|def| def.is_record())
    }

    /// Names of all record types, sorted.
    pub fn record_types(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .types
            .values()
            .filter(|def| def.is_record())
            .map(|def| def.name())
            .collect();
        names.sort_unstable();
        names
    }

    /// A fresh builder for `name`, carrying this schema's configuration.
    pub fn builder(&self, name: &str) -> Result<NodeBuilder> {
        let def = self.type_def(name)?;
        Ok(NodeBuilder::new(Arc::clone(def)).with_config(self.config))
    }

    /// A fresh reference builder carrying this schema's configuration.
    pub fn reference(&self) -> ReferenceBuilder {
        ReferenceBuilder::from_builder(
            NodeBuilder::new(Arc::clone(reference_type())).with_config(self.config),
        )
    }

    /// A fresh extension builder for `url`, carrying this schema's configuration.
    pub fn extension(&self, url: impl Into<String>) -> ExtensionBuilder {
        ExtensionBuilder::new(self.config).url(url)
    }
}
