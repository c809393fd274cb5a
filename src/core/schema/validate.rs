//! core::schema::validate
//!
//! Schema-driven validation of raw YAML trees and default generation.
//!
//! Validation is the only gate that produces a [`Value`]. Feeding a
//! validated document back through [`validate_node`] yields the same
//! document.

use std::sync::Arc;

use serde_yaml::Value as Raw;

use crate::core::document::{CollectionValue, Value};

use super::{parse_int_key, ErrorType, Group, KeyKind, SchemaNode, ValidationError};

const EMPTY_MESSAGE: &str = "Empty value is not allowed";

/// Build the default document for `node`.
pub(crate) fn generate(node: &SchemaNode) -> Value {
    match node {
        SchemaNode::Primitive(p) if p.is_required() => Value::Scalar(p.default_value()),
        SchemaNode::Primitive(_) => Value::Null,
        SchemaNode::Array(a) if a.is_required() => a.default_value(),
        SchemaNode::Array(_) => Value::Null,
        SchemaNode::Composite(v) => generate_group(v.group()),
        SchemaNode::Group(g) => generate_group(g),
        SchemaNode::Collection(_) => Value::Collection(CollectionValue::default()),
    }
}

fn generate_group(group: &Group) -> Value {
    Value::Group(
        group
            .fields()
            .map(|(name, node)| (name.to_string(), generate(node)))
            .collect(),
    )
}

/// Check every explicitly set default against its own validator.
pub(crate) fn check_defaults(node: &Arc<SchemaNode>, path: &str) -> Result<(), ValidationError> {
    match node.as_ref() {
        SchemaNode::Primitive(p) => {
            if p.has_explicit_default() {
                p.validate(Some(&p.default_value()), None)
                    .map_err(|e| e.with_path(path))?;
            }
            Ok(())
        }
        SchemaNode::Array(a) => {
            let element = a.element();
            if element.has_explicit_default() {
                element
                    .validate(Some(&element.default_value()), None)
                    .map_err(|e| e.with_path(path))?;
            }
            Ok(())
        }
        SchemaNode::Composite(v) => check_group_defaults(v.group(), path),
        SchemaNode::Group(g) => check_group_defaults(g, path),
        SchemaNode::Collection(c) => check_defaults(c.element(), &format!("{path}/*")),
    }
}

fn check_group_defaults(group: &Group, path: &str) -> Result<(), ValidationError> {
    for (name, child) in group.fields() {
        check_defaults(child, &format!("{path}/{name}"))?;
    }
    Ok(())
}

/// Validate a raw value against `node`.
///
/// `raw` is `None` when the field is missing from its parent mapping; a
/// present YAML `null` is `Some(Raw::Null)`.
pub(crate) fn validate_node(
    node: &SchemaNode,
    raw: Option<&Raw>,
    name: Option<&str>,
    path: &str,
    fill_with_default: bool,
) -> Result<Value, ValidationError> {
    match node {
        SchemaNode::Primitive(p) => match raw {
            None if !p.is_required() => Ok(Value::Null),
            None if fill_with_default => Ok(Value::Scalar(p.default_value())),
            None => Err(empty(name, path)),
            Some(raw) => {
                let text = scalar_text(raw, name).map_err(|e| e.with_path(path))?;
                p.validate(text.as_deref(), name)
                    .map(Value::from_scalar)
                    .map_err(|e| e.with_path(path))
            }
        },
        SchemaNode::Array(a) => match raw {
            None | Some(Raw::Null) if !a.is_required() => Ok(Value::Null),
            None if fill_with_default => Ok(a.default_value()),
            None => Err(empty(name, path)),
            Some(Raw::Sequence(items)) => {
                let texts = items
                    .iter()
                    .map(|item| scalar_text(item, name))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| e.with_path(path))?;
                let borrowed: Vec<Option<&str>> = texts.iter().map(Option::as_deref).collect();
                a.validate_items(&borrowed, name)
                    .map_err(|e| e.with_path(path))
            }
            Some(_) => Err(type_error("A list is required", name, path)),
        },
        SchemaNode::Composite(v) => validate_group(v.group(), raw, name, path, fill_with_default),
        SchemaNode::Group(g) => validate_group(g, raw, name, path, fill_with_default),
        SchemaNode::Collection(c) => {
            let mut members = CollectionValue::default();
            let entries = match raw {
                None | Some(Raw::Null) => return Ok(Value::Collection(members)),
                Some(Raw::Mapping(entries)) => entries,
                Some(_) => return Err(type_error("A mapping is required", name, path)),
            };

            for (raw_key, raw_member) in entries {
                let key = scalar_text(raw_key, name)
                    .map_err(|e| e.with_path(path))?
                    .unwrap_or_default();
                let key = match c.key_kind() {
                    KeyKind::Int => parse_int_key(&key)
                        .map(|k| k.to_string())
                        .ok_or_else(|| {
                            type_error(&format!("'{key}' is not an integer key"), name, path)
                        })?,
                    KeyKind::Text if key.is_empty() => return Err(empty(name, path)),
                    KeyKind::Text => key,
                };
                let member_path = format!("{path}/{key}");
                let member = validate_node(
                    c.element(),
                    Some(raw_member),
                    None,
                    &member_path,
                    fill_with_default,
                )?;
                members.insert(key, member);
            }

            Ok(Value::Collection(members))
        }
    }
}

fn validate_group(
    group: &Group,
    raw: Option<&Raw>,
    name: Option<&str>,
    path: &str,
    fill_with_default: bool,
) -> Result<Value, ValidationError> {
    let empty_mapping = serde_yaml::Mapping::new();
    let entries = match raw {
        Some(Raw::Mapping(entries)) => entries,
        None | Some(Raw::Null) if fill_with_default => &empty_mapping,
        None => return Err(empty(name, path)),
        Some(_) => return Err(type_error("A mapping is required", name, path)),
    };

    let mut fields = indexmap::IndexMap::with_capacity(entries.len());
    for (field, node) in group.fields() {
        let child_path = format!("{path}/{field}");
        let value = validate_node(node, entries.get(field), None, &child_path, fill_with_default)?;
        fields.insert(field.to_string(), value);
    }
    Ok(Value::Group(fields))
}

/// Render a raw YAML scalar as the string a primitive validates.
fn scalar_text(raw: &Raw, name: Option<&str>) -> Result<Option<String>, ValidationError> {
    match raw {
        Raw::Null => Ok(None),
        Raw::Bool(b) => Ok(Some(b.to_string())),
        Raw::Number(n) => Ok(Some(n.to_string())),
        Raw::String(s) => Ok(Some(s.clone())),
        Raw::Tagged(tagged) => scalar_text(&tagged.value, name),
        Raw::Sequence(_) | Raw::Mapping(_) => Err(ValidationError::new(
            ErrorType::TypeError,
            "A scalar value is required",
            name,
        )),
    }
}

fn empty(name: Option<&str>, path: &str) -> ValidationError {
    ValidationError::new(ErrorType::EmptyError, EMPTY_MESSAGE, name).with_path(path)
}

fn type_error(message: &str, name: Option<&str>, path: &str) -> ValidationError {
    ValidationError::new(ErrorType::TypeError, message, name).with_path(path)
}
