//! Structural validation
//!
//! `build()` validates the staged state of a builder. Checks run
//! in a fixed order and the first failure is reported:
//!
//! 1. the header: id value, then `extension` and `modifierExtension`
//!    entries (present and of type `Extension`)
//! 2. every declared field, in schema order: prohibited, required, choice
//!    alternatives, single value types, list entries and bounds, leaf values
//! 3. reference targets, per field in schema order
//! 4. elements only: at least an id, an extension or one populated field
//!
//! Some checks guard what a frozen node can represent and run whatever the
//! configuration says: extension entry types, null list entries and whether
//! a leaf's payload fits its kind. Lexical leaf rules run only with
//! `check_leaf_values`, and every other check only with `validating`.

pub mod checks;
pub mod primitives;

pub use checks::{
    check_list, check_max, check_no_null_entries, check_non_empty_list, check_reference_type,
    check_value_type, choice_element, prohibited, require_choice_element, require_non_null,
    require_value_or_children,
};
pub use primitives::{check_leaf, check_leaf_shape};

use crate::builder::{NodeBuilder, Staged};
use crate::config::ModelConfig;
use crate::error::Result;
use crate::model::{Leaf, Node, Value};
use crate::schema::{FieldDef, TypeDef, TypeRef, EXTENSION_TYPE};

/// What the emptiness and header checks need to know about a node or builder.
pub trait Validatable {
    fn type_def(&self) -> &TypeDef;

    fn has_id(&self) -> bool;

    fn has_extension(&self) -> bool;

    /// Any extension or declared field populated; the id does not count.
    fn has_children(&self) -> bool;

    /// Run the full set of structural checks under `config`.
    fn validate_with(&self, config: ModelConfig) -> Result<()>;

    /// Run the structural checks with schema checks on, whatever the node
    /// was built with.
    fn validate(&self) -> Result<()>;
}

impl Validatable for NodeBuilder {
    fn type_def(&self) -> &TypeDef {
        &self.type_def
    }

    fn has_id(&self) -> bool {
        self.id.is_some()
    }

    fn has_extension(&self) -> bool {
        !self.extension.is_empty() || !self.modifier_extension.is_empty()
    }

    fn has_children(&self) -> bool {
        Validatable::has_extension(self) || self.staged.iter().any(Staged::is_populated)
    }

    fn validate_with(&self, config: ModelConfig) -> Result<()> {
        validate(&self.clone().with_config(config))
    }

    fn validate(&self) -> Result<()> {
        validate_with_checks(self)
    }
}

impl Validatable for Node {
    fn type_def(&self) -> &TypeDef {
        Node::type_def(self)
    }

    fn has_id(&self) -> bool {
        self.id().is_some()
    }

    fn has_extension(&self) -> bool {
        self.header().has_extension()
    }

    fn has_children(&self) -> bool {
        Node::has_children(self)
    }

    fn validate_with(&self, config: ModelConfig) -> Result<()> {
        validate(&NodeBuilder::from_node(self).with_config(config))
    }

    fn validate(&self) -> Result<()> {
        validate_with_checks(&NodeBuilder::from_node(self))
    }
}

fn validate_with_checks(builder: &NodeBuilder) -> Result<()> {
    let mut config = builder.config;
    config.validating = true;
    validate(&builder.clone().with_config(config))
}

pub(crate) fn validate(builder: &NodeBuilder) -> Result<()> {
    if let Some(err) = &builder.deferred {
        return Err(err.clone());
    }
    let config = builder.config;
    let schema_checks = config.validating;
    let leaf_checks = schema_checks && config.check_leaf_values;

    if let Some(id) = &builder.id {
        check_leaf_value(id, "id", leaf_checks)?;
    }
    let extension = TypeRef::complex(EXTENSION_TYPE);
    check_list(&builder.extension, "extension", &extension)?;
    check_list(&builder.modifier_extension, "modifierExtension", &extension)?;

    let fields = builder.type_def.fields();
    for (field, staged) in fields.iter().zip(&builder.staged) {
        match staged {
            Staged::Single(value) => check_single(field, value.as_ref(), schema_checks, leaf_checks)?,
            Staged::Many(values) => check_many(field, values, schema_checks, leaf_checks)?,
        }
    }

    if schema_checks && config.check_reference_types {
        for (field, staged) in fields.iter().zip(&builder.staged) {
            if !field.allows_references() {
                continue;
            }
            for value in staged_values(staged) {
                check_reference_type(
                    value,
                    &field.name,
                    &field.target_types,
                    config.check_reference_literals,
                )?;
            }
        }
    }

    if schema_checks && !builder.type_def.is_record() {
        require_value_or_children(builder)?;
    }
    Ok(())
}

fn staged_values(staged: &Staged) -> Box<dyn Iterator<Item = &Value> + '_> {
    match staged {
        Staged::Single(value) => Box::new(value.iter()),
        Staged::Many(values) => Box::new(values.iter().flatten()),
    }
}

fn check_single(
    field: &FieldDef,
    value: Option<&Value>,
    schema_checks: bool,
    leaf_checks: bool,
) -> Result<()> {
    let name = field.name.as_str();
    if !schema_checks {
        return match value {
            Some(Value::Leaf(leaf)) => check_leaf_shape(leaf, name),
            _ => Ok(()),
        };
    }
    if field.cardinality.is_prohibited() {
        return prohibited(value, name);
    }
    if field.is_choice() {
        if field.is_required() {
            require_choice_element(value, name, &field.types)?;
        } else {
            choice_element(value, name, &field.types)?;
        }
    } else {
        let value = if field.is_required() {
            Some(require_non_null(value, name)?)
        } else {
            value
        };
        if let (Some(value), Some(expected)) = (value, field.types.first()) {
            check_value_type(value, name, expected)?;
        }
    }
    if let Some(Value::Leaf(leaf)) = value {
        check_leaf_value(leaf, name, leaf_checks)?;
    }
    Ok(())
}

fn check_many(
    field: &FieldDef,
    values: &[Option<Value>],
    schema_checks: bool,
    leaf_checks: bool,
) -> Result<()> {
    let name = field.name.as_str();
    if !schema_checks {
        check_no_null_entries(values, name)?;
        return check_list_leaves(values, name, false);
    }
    let Some(element_type) = field.types.first() else {
        return check_no_null_entries(values, name);
    };
    if field.is_required() {
        check_non_empty_list(values, name, element_type)?;
    } else {
        check_list(values, name, element_type)?;
    }
    check_max(values.len(), name, field.cardinality)?;
    check_list_leaves(values, name, leaf_checks)
}

fn check_list_leaves(values: &[Option<Value>], name: &str, leaf_checks: bool) -> Result<()> {
    for leaf in values.iter().flatten().filter_map(Value::as_leaf) {
        check_leaf_value(leaf, name, leaf_checks)?;
    }
    Ok(())
}

/// The payload shape is always checked; lexical rules only with `leaf_checks`.
fn check_leaf_value(leaf: &Leaf, name: &str, leaf_checks: bool) -> Result<()> {
    if leaf_checks {
        check_leaf(leaf, name)
    } else {
        check_leaf_shape(leaf, name)
    }
}
