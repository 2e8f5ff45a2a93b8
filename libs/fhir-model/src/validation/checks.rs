//! Stateless structural checks
//!
//! Each check either passes or returns the error describing the first
//! violation it finds. They operate on staged values (`None` is an absent
//! value or a null list entry) and are usable outside of `build()`.

use super::Validatable;
use crate::error::{Error, ReferenceSource, Result};
use crate::model::{Locator, Value};
use crate::schema::types::join_names;
use crate::schema::{Cardinality, TypeRef, REFERENCE_TYPE};

fn missing(field: &str) -> Error {
    Error::MissingRequiredField {
        field: field.to_string(),
    }
}

pub fn require_non_null<'a, T>(value: Option<&'a T>, field: &str) -> Result<&'a T> {
    value.ok_or_else(|| missing(field))
}

/// A populated choice value must be one of `allowed`.
pub fn choice_element(value: Option<&Value>, field: &str, allowed: &[TypeRef]) -> Result<()> {
    match value {
        Some(value) if !allowed.iter().any(|t| t.accepts(value.as_ref())) => {
            Err(Error::InvalidChoiceType {
                field: field.to_string(),
                found: value.type_name().to_string(),
                allowed: join_names(allowed.iter().map(TypeRef::name)),
            })
        }
        _ => Ok(()),
    }
}

pub fn require_choice_element<'a>(
    value: Option<&'a Value>,
    field: &str,
    allowed: &[TypeRef],
) -> Result<&'a Value> {
    let value = require_non_null(value, field)?;
    choice_element(Some(value), field, allowed)?;
    Ok(value)
}

pub fn check_value_type(value: &Value, field: &str, expected: &TypeRef) -> Result<()> {
    if expected.accepts(value.as_ref()) {
        Ok(())
    } else {
        Err(Error::InvalidFieldType {
            field: field.to_string(),
            found: value.type_name().to_string(),
            expected: expected.name().to_string(),
        })
    }
}

fn null_entry(field: &str, index: usize) -> Error {
    Error::InvalidListElement {
        field: field.to_string(),
        reason: format!("entry {index} is null"),
    }
}

pub fn check_no_null_entries(list: &[Option<Value>], field: &str) -> Result<()> {
    match list.iter().position(Option::is_none) {
        Some(index) => Err(null_entry(field, index)),
        None => Ok(()),
    }
}

/// Every entry is present and of `element_type`.
pub fn check_list(list: &[Option<Value>], field: &str, element_type: &TypeRef) -> Result<()> {
    for (index, entry) in list.iter().enumerate() {
        match entry {
            None => return Err(null_entry(field, index)),
            Some(value) if !element_type.accepts(value.as_ref()) => {
                return Err(Error::InvalidListElement {
                    field: field.to_string(),
                    reason: format!(
                        "entry {index} is of type {} but must be {element_type}",
                        value.type_name()
                    ),
                })
            }
            Some(_) => {}
        }
    }
    Ok(())
}

pub fn check_non_empty_list(
    list: &[Option<Value>],
    field: &str,
    element_type: &TypeRef,
) -> Result<()> {
    if list.is_empty() {
        return Err(Error::EmptyRequiredList {
            field: field.to_string(),
        });
    }
    check_list(list, field, element_type)
}

pub fn check_max(count: usize, field: &str, cardinality: Cardinality) -> Result<()> {
    match cardinality.max {
        Some(max) if count > max as usize => Err(Error::TooManyElements {
            field: field.to_string(),
            count,
            max,
        }),
        _ => Ok(()),
    }
}

pub fn prohibited<T>(value: Option<&T>, field: &str) -> Result<()> {
    match value {
        Some(_) => Err(Error::ProhibitedField {
            field: field.to_string(),
        }),
        None => Ok(()),
    }
}

/// Check a reference held by `field` against its allow-list of record
/// types. Non-reference values pass, so choice values can be fed in as is.
///
/// The `Reference.type` hint must be in `allowed`. With `check_literal`, a
/// relative (`Type/id`) or conditional (`Type?query`) locator must also name
/// an allowed type that agrees with the hint; contained (`#id`) and absolute
/// locators are not inspected. An empty allow-list leaves the target
/// unconstrained.
pub fn check_reference_type(
    value: &Value,
    field: &str,
    allowed: &[String],
    check_literal: bool,
) -> Result<()> {
    let Some(node) = value.as_node().filter(|node| node.is_a(REFERENCE_TYPE)) else {
        return Ok(());
    };
    let is_allowed = |record_type: &str| allowed.is_empty() || allowed.iter().any(|a| a == record_type);
    let disallowed = |target: &str, source_kind| Error::DisallowedReferenceTargetType {
        field: field.to_string(),
        target: target.to_string(),
        allowed: join_names(allowed.iter().map(String::as_str)),
        source_kind,
    };

    let mut literal_type = None;
    if check_literal {
        if let Some(locator) = node.text("reference") {
            match Locator::parse(locator) {
                Locator::Contained(_) | Locator::Absolute(_) => {}
                Locator::Unrecognized(value) => {
                    return Err(Error::InvalidReference {
                        field: field.to_string(),
                        reason: format!("record type not found in reference value: '{value}'"),
                    })
                }
                parsed => {
                    if let Some(record_type) = parsed.record_type() {
                        if !is_allowed(record_type) {
                            return Err(disallowed(record_type, ReferenceSource::Literal));
                        }
                        literal_type = Some(record_type);
                    }
                }
            }
        }
    }

    if let Some(hint) = node.text("type") {
        if !is_allowed(hint) {
            return Err(disallowed(hint, ReferenceSource::TypeHint));
        }
        if let Some(literal_type) = literal_type {
            if literal_type != hint {
                return Err(Error::InvalidReference {
                    field: field.to_string(),
                    reason: format!(
                        "record type '{literal_type}' in reference value does not match Reference.type '{hint}'"
                    ),
                });
            }
        }
    }
    Ok(())
}

/// An element must carry an id, an extension or at least one populated
/// field.
pub fn require_value_or_children<T: Validatable + ?Sized>(node: &T) -> Result<()> {
    if node.has_id() || node.has_children() {
        Ok(())
    } else {
        Err(Error::EmptyElement {
            type_name: node.type_def().name().to_string(),
        })
    }
}
