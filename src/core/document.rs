//! core::document
//!
//! In-memory document tree.
//!
//! A [`Value`] mirrors the shape of the schema that produced it. Every
//! primitive is stored as its canonical string; an absent optional value is
//! [`Value::Null`], never an empty string.
//!
//! Documents are only produced by validation (see
//! [`Schema::validate_data`](crate::core::schema::Schema::validate_data)) or
//! by default generation, so the shape always matches the schema.

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::core::schema::parse_int_key;

/// A document node.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent optional value
    Null,
    /// Canonical string of a primitive
    Scalar(String),
    /// Items of a [`SimpleArray`](crate::core::schema::SimpleArray)
    Array(Vec<Value>),
    /// Fields of a group or vector
    Group(IndexMap<String, Value>),
    /// Members of a keyed collection
    Collection(CollectionValue),
}

impl Value {
    /// `Scalar` for a present value, `Null` for an absent one.
    pub fn from_scalar(value: Option<String>) -> Self {
        value.map_or(Value::Null, Value::Scalar)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The scalar string, if this is a present scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Group(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&CollectionValue> {
        match self {
            Value::Collection(members) => Some(members),
            _ => None,
        }
    }

    pub fn as_collection_mut(&mut self) -> Option<&mut CollectionValue> {
        match self {
            Value::Collection(members) => Some(members),
            _ => None,
        }
    }

    /// Field of a group, or member of a collection.
    pub fn child(&self, segment: &str) -> Option<&Value> {
        match self {
            Value::Group(fields) => fields.get(segment),
            Value::Collection(members) => members.get(segment),
            _ => None,
        }
    }

    pub(crate) fn child_mut(&mut self, segment: &str) -> Option<&mut Value> {
        match self {
            Value::Group(fields) => fields.get_mut(segment),
            Value::Collection(members) => members.get_mut(segment),
            _ => None,
        }
    }

    /// Field of a group.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.as_group().and_then(|fields| fields.get(name))
    }

    /// Scalar field of a group, e.g. for collection filter predicates.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    /// Replace a field of a group. No effect on other node kinds.
    pub fn set_field(&mut self, name: &str, value: Value) {
        if let Value::Group(fields) = self {
            fields.insert(name.to_string(), value);
        }
    }

    /// Convert to the raw YAML tree the validators consume.
    pub fn to_raw(&self) -> serde_yaml::Value {
        match self {
            Value::Null => serde_yaml::Value::Null,
            Value::Scalar(s) => serde_yaml::Value::String(s.clone()),
            Value::Array(items) => {
                serde_yaml::Value::Sequence(items.iter().map(Value::to_raw).collect())
            }
            Value::Group(fields) => raw_mapping(fields.iter()),
            Value::Collection(members) => raw_mapping(members.iter()),
        }
    }
}

fn raw_mapping<'a>(entries: impl Iterator<Item = (&'a String, &'a Value)>) -> serde_yaml::Value {
    serde_yaml::Value::Mapping(
        entries
            .map(|(k, v)| (serde_yaml::Value::String(k.clone()), v.to_raw()))
            .collect(),
    )
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Scalar(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Group(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (k, v) in fields {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::Collection(members) => {
                let mut map = serializer.serialize_map(Some(members.len()))?;
                for (k, v) in members.iter() {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

/// Members of a keyed collection, in insertion order.
///
/// Also carries the counter for auto-allocated integer keys. The counter is
/// not part of the document's value: two collections with the same members
/// compare equal.
#[derive(Debug, Clone, Default)]
pub struct CollectionValue {
    members: IndexMap<String, Value>,
    next_key: u64,
}

impl CollectionValue {
    /// The next auto-allocated integer key.
    pub fn next_key(&self) -> u64 {
        self.next_key.max(1)
    }

    /// Insert a member, moving the key counter past an integer key.
    pub fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        if let Some(k) = parse_int_key(&key) {
            self.next_key = self.next_key.max(k.saturating_add(1));
        }
        self.members.insert(key, value)
    }

    /// Remove a member, keeping the order of the others.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.members.shift_remove(key)
    }

    /// Remove every member. The key counter is kept.
    pub fn clear(&mut self) {
        self.members.clear();
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.members.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.members.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.members.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.members.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut Value)> {
        self.members.iter_mut()
    }
}

impl PartialEq for CollectionValue {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}
