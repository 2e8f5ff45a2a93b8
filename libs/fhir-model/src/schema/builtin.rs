//! Core types every schema contains
//!
//! The engine itself depends on `Extension` (node headers carry extension
//! lists), `Reference` (reference target checks) and `Meta` (record
//! metadata). They are process-wide singletons so typed builders such as
//! [`crate::Reference::builder`] work without a schema at hand.

use super::leaf_kind::LeafKind;
use super::types::{
    Cardinality, FieldDef, TypeDef, TypeRef, EXTENSION_TYPE, META_TYPE, REFERENCE_TYPE,
};
use std::sync::{Arc, OnceLock};

static EXTENSION: OnceLock<Arc<TypeDef>> = OnceLock::new();
static REFERENCE: OnceLock<Arc<TypeDef>> = OnceLock::new();
static META: OnceLock<Arc<TypeDef>> = OnceLock::new();

/// `Extension`: a required `url` and an optional `value[x]` over every leaf
/// kind and `Reference`.
pub fn extension_type() -> &'static Arc<TypeDef> {
    EXTENSION.get_or_init(|| {
        let alternatives = LeafKind::ALL
            .iter()
            .map(|&kind| TypeRef::Leaf(kind))
            .chain(std::iter::once(TypeRef::reference()));
        let fields = vec![
            FieldDef::required("url", LeafKind::Uri),
            FieldDef::new("value", alternatives, Cardinality::OPTIONAL),
        ];
        Arc::new(TypeDef::element(EXTENSION_TYPE, fields).expect("core Extension type is well-formed"))
    })
}

/// `Reference`: locator, type hint and display text.
pub fn reference_type() -> &'static Arc<TypeDef> {
    REFERENCE.get_or_init(|| {
        let fields = vec![
            FieldDef::optional("reference", LeafKind::String),
            FieldDef::optional("type", LeafKind::Uri),
            FieldDef::optional("display", LeafKind::String),
        ];
        Arc::new(TypeDef::element(REFERENCE_TYPE, fields).expect("core Reference type is well-formed"))
    })
}

/// `Meta`: record metadata.
pub fn meta_type() -> &'static Arc<TypeDef> {
    META.get_or_init(|| {
        let fields = vec![
            FieldDef::optional("versionId", LeafKind::Id),
            FieldDef::optional("lastUpdated", LeafKind::Instant),
            FieldDef::optional("source", LeafKind::Uri),
            FieldDef::list("profile", LeafKind::Canonical),
        ];
        Arc::new(TypeDef::element(META_TYPE, fields).expect("core Meta type is well-formed"))
    })
}

pub(crate) fn core_types() -> [&'static Arc<TypeDef>; 3] {
    [extension_type(), reference_type(), meta_type()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_value_is_choice() {
        let value = extension_type().field("value").unwrap();
        assert!(value.is_choice());
        assert!(value.allows_references());
        assert_eq!(value.types.len(), LeafKind::ALL.len() + 1);
        assert!(extension_type().field("url").unwrap().is_required());
    }

    #[test]
    fn test_singletons_are_shared() {
        assert!(Arc::ptr_eq(reference_type(), reference_type()));
        assert_eq!(meta_type().fields().len(), 4);
    }
}
