//! core::store::view
//!
//! Path resolution and the read-only accessors shared by stores and element
//! views.
//!
//! Every accessor resolves its path through [`resolve`] (or
//! [`resolve_mut`] for writers), which walks schema and document in
//! lockstep: a group step indexes both by field name, a collection step
//! indexes the document by key and routes the schema to the shared element.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::core::document::{CollectionValue, Value};
use crate::core::schema::{is_truthy, Collection, PrimitiveKind, SchemaNode};
use crate::core::types::{DbEnum, DbPath, EnumMember};

use super::StoreError;

/// Resolve `path` below a schema/document pair.
pub(crate) fn resolve<'a>(
    mut schema: &'a Arc<SchemaNode>,
    mut value: &'a Value,
    path: &DbPath,
) -> Result<(&'a Arc<SchemaNode>, &'a Value), StoreError> {
    for segment in path.segments() {
        let next = step_schema(schema, value, segment, path)?;
        value = value
            .child(segment)
            .ok_or_else(|| StoreError::lookup(path, format!("'{segment}' not found")))?;
        schema = next;
    }
    Ok((schema, value))
}

/// Mutable twin of [`resolve`].
pub(crate) fn resolve_mut<'a>(
    mut schema: &'a Arc<SchemaNode>,
    mut value: &'a mut Value,
    path: &DbPath,
) -> Result<(&'a Arc<SchemaNode>, &'a mut Value), StoreError> {
    for segment in path.segments() {
        let next = step_schema(schema, value, segment, path)?;
        value = value
            .child_mut(segment)
            .ok_or_else(|| StoreError::lookup(path, format!("'{segment}' not found")))?;
        schema = next;
    }
    Ok((schema, value))
}

fn step_schema<'a>(
    schema: &'a Arc<SchemaNode>,
    value: &Value,
    segment: &str,
    path: &DbPath,
) -> Result<&'a Arc<SchemaNode>, StoreError> {
    let shape_matches = matches!(
        (schema.as_ref(), value),
        (SchemaNode::Group(_) | SchemaNode::Composite(_), Value::Group(_))
            | (SchemaNode::Collection(_), Value::Collection(_))
    );
    if !shape_matches {
        return Err(StoreError::lookup(
            path,
            format!("cannot step into '{segment}' of a {}", schema.kind_name()),
        ));
    }
    schema.step(segment).ok_or_else(|| {
        StoreError::lookup(
            path,
            format!("'{segment}' is not a field of this {}", schema.kind_name()),
        )
    })
}

/// Resolve `path` to a collection node and its members.
pub(crate) fn resolve_collection<'a>(
    schema: &'a Arc<SchemaNode>,
    value: &'a Value,
    path: &DbPath,
) -> Result<(&'a Collection, &'a CollectionValue), StoreError> {
    match resolve(schema, value, path)? {
        (node, Value::Collection(members)) => match node.as_ref() {
            SchemaNode::Collection(collection) => Ok((collection, members)),
            other => Err(StoreError::lookup(
                path,
                format!("expected a collection, found a {}", other.kind_name()),
            )),
        },
        (node, _) => Err(StoreError::lookup(
            path,
            format!("expected a collection, found a {}", node.kind_name()),
        )),
    }
}

/// Read-only access to a document through its schema.
///
/// Implemented by [`SimpleDb`](super::SimpleDb) and by the [`DocView`]s that
/// collection reads hand out. Paths are relative to the reader's root; the
/// empty path addresses the root itself.
pub trait DocumentRead {
    /// Schema node the reader is rooted at.
    fn schema_node(&self) -> &Arc<SchemaNode>;

    /// Document the reader is rooted at.
    fn data(&self) -> &Value;

    /// Borrow the reader as a view.
    fn view(&self) -> DocView<'_> {
        DocView {
            schema: self.schema_node(),
            value: self.data(),
        }
    }

    /// Canonical value of a primitive leaf, `None` if absent.
    fn get_value(&self, path: &str) -> Result<Option<&str>, StoreError> {
        let path = DbPath::new(path)?;
        match resolve(self.schema_node(), self.data(), &path)? {
            (node, Value::Scalar(s)) if node.is_primitive() => Ok(Some(s)),
            (node, Value::Null) if node.is_primitive() => Ok(None),
            (node, _) => Err(StoreError::lookup(
                &path,
                format!("expected a value, found a {}", node.kind_name()),
            )),
        }
    }

    /// Several primitive fields of one group, in the order requested.
    fn get_values(&self, path: &str, fields: &[&str]) -> Result<Vec<Option<&str>>, StoreError> {
        let base = DbPath::new(path)?;
        fields
            .iter()
            .map(|field| self.get_value(base.child(field)?.as_str()))
            .collect()
    }

    fn get_float(&self, path: &str) -> Result<Option<f64>, StoreError> {
        self.get_value(path)?
            .map(|v| {
                v.parse::<f64>()
                    .map_err(|_| StoreError::lookup_str(path, format!("'{v}' is not a number")))
            })
            .transpose()
    }

    fn get_int(&self, path: &str) -> Result<Option<i64>, StoreError> {
        let Some(text) = self.get_value(path)? else {
            return Ok(None);
        };
        if let Ok(n) = text.parse::<i64>() {
            return Ok(Some(n));
        }
        match self.get_float(path)? {
            // i64::MAX rounds up to 2^63 as a float, so the upper bound is exclusive.
            Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => Ok(Some(f as i64)),
            Some(f) if f.fract() == 0.0 => Err(StoreError::lookup_str(path, format!("'{text}' is out of range"))),
            _ => Err(StoreError::lookup_str(path, format!("'{text}' is not an integer"))),
        }
    }

    fn get_bool(&self, path: &str) -> Result<bool, StoreError> {
        Ok(is_truthy(self.get_value(path)?))
    }

    /// Components of a vector composite.
    fn get_vector(&self, path: &str) -> Result<[f64; 3], StoreError> {
        let base = DbPath::new(path)?;
        let (node, _) = resolve(self.schema_node(), self.data(), &base)?;
        if !matches!(node.as_ref(), SchemaNode::Composite(_)) {
            return Err(StoreError::lookup(
                &base,
                format!("expected a vector, found a {}", node.kind_name()),
            ));
        }
        let mut xyz = [0.0; 3];
        for (slot, axis) in xyz.iter_mut().zip(["x", "y", "z"]) {
            let component = base.child(axis)?;
            *slot = self
                .get_float(component.as_str())?
                .ok_or_else(|| StoreError::lookup(&component, "no value"))?;
        }
        Ok(xyz)
    }

    /// Items of an array; an absent optional array has none.
    fn get_array(&self, path: &str) -> Result<Vec<Option<&str>>, StoreError> {
        let path = DbPath::new(path)?;
        match resolve(self.schema_node(), self.data(), &path)? {
            (node, value) if matches!(node.as_ref(), SchemaNode::Array(_)) => Ok(value
                .as_array()
                .unwrap_or_default()
                .iter()
                .map(Value::as_str)
                .collect()),
            (node, _) => Err(StoreError::lookup(
                &path,
                format!("expected an array, found a {}", node.kind_name()),
            )),
        }
    }

    /// Member of the enum declared at `path`.
    fn get_enum_member(&self, path: &str) -> Result<&EnumMember, StoreError> {
        let path = DbPath::new(path)?;
        let (node, value) = resolve(self.schema_node(), self.data(), &path)?;
        let def = match node.as_ref() {
            SchemaNode::Primitive(p) => match p.kind() {
                PrimitiveKind::Enum(def) => def,
                _ => return Err(StoreError::lookup(&path, "not an enum")),
            },
            other => {
                return Err(StoreError::lookup(
                    &path,
                    format!("expected an enum, found a {}", other.kind_name()),
                ))
            }
        };
        value
            .as_str()
            .and_then(|v| def.find(v))
            .ok_or_else(|| StoreError::lookup(&path, "no enum value"))
    }

    /// Typed enum value at `path`.
    fn get_enum<E: DbEnum>(&self, path: &str) -> Result<E, StoreError> {
        let member = self.get_enum_member(path)?;
        E::parse(&member.value).ok_or_else(|| {
            StoreError::lookup_str(path, format!("'{}' is not a {}", member.value, E::TYPE_NAME))
        })
    }

    /// Sub-view rooted at `path`.
    fn get_view(&self, path: &str) -> Result<DocView<'_>, StoreError> {
        let path = DbPath::new(path)?;
        let (schema, value) = resolve(self.schema_node(), self.data(), &path)?;
        Ok(DocView { schema, value })
    }

    /// Every member of the collection at `path`.
    fn get_elements(&self, path: &str) -> Result<IndexMap<String, DocView<'_>>, StoreError> {
        self.get_elements_by(path, |_, _| true)
    }

    /// Members of the collection at `path` accepted by `filter`.
    fn get_elements_by<F>(
        &self,
        path: &str,
        filter: F,
    ) -> Result<IndexMap<String, DocView<'_>>, StoreError>
    where
        F: Fn(&str, &Value) -> bool,
    {
        let path = DbPath::new(path)?;
        let (collection, members) = resolve_collection(self.schema_node(), self.data(), &path)?;
        Ok(members
            .iter()
            .filter(|(key, member)| filter(key, member))
            .map(|(key, member)| {
                (
                    key.clone(),
                    DocView {
                        schema: collection.element(),
                        value: member,
                    },
                )
            })
            .collect())
    }

    /// One member of the collection at `path`.
    fn get_element(&self, path: &str, key: &str) -> Result<DocView<'_>, StoreError> {
        let path = DbPath::new(path)?;
        let (collection, members) = resolve_collection(self.schema_node(), self.data(), &path)?;
        let value = members
            .get(key)
            .ok_or_else(|| StoreError::lookup(&path, format!("no member '{key}'")))?;
        Ok(DocView {
            schema: collection.element(),
            value,
        })
    }

    fn get_keys(&self, path: &str) -> Result<Vec<String>, StoreError> {
        self.get_keys_by(path, |_, _| true)
    }

    fn get_keys_by<F>(&self, path: &str, filter: F) -> Result<Vec<String>, StoreError>
    where
        F: Fn(&str, &Value) -> bool,
    {
        let path = DbPath::new(path)?;
        let (_, members) = resolve_collection(self.schema_node(), self.data(), &path)?;
        Ok(members
            .iter()
            .filter(|(key, member)| filter(key, member))
            .map(|(key, _)| key.clone())
            .collect())
    }

    fn element_count(&self, path: &str) -> Result<usize, StoreError> {
        let path = DbPath::new(path)?;
        let (_, members) = resolve_collection(self.schema_node(), self.data(), &path)?;
        Ok(members.len())
    }

    fn element_count_by<F>(&self, path: &str, filter: F) -> Result<usize, StoreError>
    where
        F: Fn(&str, &Value) -> bool,
    {
        Ok(self.get_keys_by(path, filter)?.len())
    }

    fn has_element(&self, path: &str, key: &str) -> Result<bool, StoreError> {
        let path = DbPath::new(path)?;
        let (_, members) = resolve_collection(self.schema_node(), self.data(), &path)?;
        Ok(members.contains_key(key))
    }

    /// The single member accepted by `filter`.
    ///
    /// Returns `None` when no member matches and also when several do;
    /// callers treat `None` as "not uniquely found".
    fn find_element<F>(&self, path: &str, filter: F) -> Result<Option<(String, DocView<'_>)>, StoreError>
    where
        F: Fn(&str, &Value) -> bool,
    {
        let mut found = self.get_elements_by(path, filter)?;
        if found.len() != 1 {
            return Ok(None);
        }
        Ok(found.pop())
    }

    /// First numeric suffix that makes `base + suffix` unused in `field`.
    ///
    /// With no `start`, the unsuffixed `base` is tried first (returning `""`)
    /// and suffixes count up from 1; with a `start`, counting begins there.
    fn get_unique_seq(
        &self,
        path: &str,
        field: &str,
        base: &str,
        start: Option<u32>,
    ) -> Result<String, StoreError> {
        let path = DbPath::new(path)?;
        let (_, members) = resolve_collection(self.schema_node(), self.data(), &path)?;
        let taken = |candidate: &str| {
            members
                .iter()
                .any(|(_, member)| member.text(field) == Some(candidate))
        };

        let mut seq = start;
        loop {
            let candidate = match seq {
                None => base.to_string(),
                Some(n) => format!("{base}{n}"),
            };
            if !taken(&candidate) {
                return Ok(seq.map(|n| n.to_string()).unwrap_or_default());
            }
            seq = match seq {
                None => Some(1),
                Some(n) => Some(n.checked_add(1).ok_or_else(|| {
                    StoreError::lookup(&path, format!("no free suffix for '{base}'"))
                })?),
            };
        }
    }

    /// `base` followed by its [`get_unique_seq`](Self::get_unique_seq) suffix.
    fn get_unique_value(&self, path: &str, field: &str, base: &str) -> Result<String, StoreError> {
        Ok(format!("{base}{}", self.get_unique_seq(path, field, base, None)?))
    }
}

/// Read accessor bound to one sub-document and its schema node.
///
/// Handed out by collection reads; borrows the store it came from.
#[derive(Debug, Clone, Copy)]
pub struct DocView<'a> {
    schema: &'a Arc<SchemaNode>,
    value: &'a Value,
}

impl<'a> DocView<'a> {
    /// The raw sub-document.
    pub fn raw(&self) -> &'a Value {
        self.value
    }
}

impl DocumentRead for DocView<'_> {
    fn schema_node(&self) -> &Arc<SchemaNode> {
        self.schema
    }

    fn data(&self) -> &Value {
        self.value
    }
}
