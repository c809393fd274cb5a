//! core::schema::collection
//!
//! Keyed collections of child documents sharing one element schema.
//!
//! # Keys
//!
//! - [`KeyKind::Int`]: keys are decimal integers. When no key is requested the
//!   next one comes from a per-collection counter seeded at
//!   `max(existing) + 1` (or `1` for an empty collection). The counter never
//!   moves backwards, so a removed member's key is not issued again.
//! - [`KeyKind::Text`]: the caller always supplies a non-empty key.

use std::sync::Arc;

use crate::core::document::{CollectionValue, Value};

use super::{validate, ErrorType, Group, SchemaNode, ValidationError};

const KEY_NAME: &str = "Key of List";

/// How members of a collection are keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Int,
    Text,
}

/// A keyed collection node.
#[derive(Debug, Clone)]
pub struct Collection {
    element: Arc<SchemaNode>,
    key_kind: KeyKind,
}

impl Collection {
    /// Collection keyed by auto-incrementing integers.
    pub fn int_keyed(element: Group) -> Self {
        Self {
            element: Arc::new(SchemaNode::Group(element)),
            key_kind: KeyKind::Int,
        }
    }

    /// Collection keyed by caller-supplied strings.
    pub fn text_keyed(element: Group) -> Self {
        Self {
            element: Arc::new(SchemaNode::Group(element)),
            key_kind: KeyKind::Text,
        }
    }

    /// The shared element schema. Always a [`SchemaNode::Group`].
    pub fn element(&self) -> &Arc<SchemaNode> {
        &self.element
    }

    pub fn key_kind(&self) -> KeyKind {
        self.key_kind
    }

    /// Resolve the key for a new member.
    ///
    /// Does not check for duplicates; the store does that against the live
    /// members. A requested integer key is taken as given, so it may name a
    /// key the counter issued before.
    ///
    /// # Errors
    ///
    /// - `TypeError` if an int-keyed collection is given a non-integer key
    /// - `EmptyError` if a text-keyed collection is given no key
    pub fn key(
        &self,
        requested: Option<&str>,
        members: &CollectionValue,
    ) -> Result<String, ValidationError> {
        match (self.key_kind, requested.map(str::trim)) {
            (KeyKind::Int, None) => Ok(members.next_key().to_string()),
            (KeyKind::Int, Some(key)) => parse_int_key(key)
                .map(|k| k.to_string())
                .ok_or_else(|| {
                    ValidationError::new(
                        ErrorType::TypeError,
                        format!("'{key}' is not an integer key"),
                        Some(KEY_NAME),
                    )
                }),
            (KeyKind::Text, Some(key)) if !key.is_empty() => {
                if key.contains('/') {
                    return Err(ValidationError::new(
                        ErrorType::TypeError,
                        "Keys cannot contain '/'",
                        Some(KEY_NAME),
                    ));
                }
                Ok(key.to_string())
            }
            (KeyKind::Text, _) => Err(ValidationError::new(
                ErrorType::EmptyError,
                "Empty value is not allowed",
                Some(KEY_NAME),
            )),
        }
    }

    /// Re-validate a whole prospective member against the element schema.
    pub fn validate_element(&self, candidate: &Value, path: &str) -> Result<Value, ValidationError> {
        let raw = candidate.to_raw();
        validate::validate_node(&self.element, Some(&raw), None, path, false)
    }

    /// A member built from element defaults.
    pub fn new_element(&self) -> Value {
        validate::generate(&self.element)
    }
}

/// Parse an integer collection key.
pub(crate) fn parse_int_key(key: &str) -> Option<u64> {
    key.trim().parse::<u64>().ok()
}
