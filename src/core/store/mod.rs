//! core::store
//!
//! Schema-bound document store.
//!
//! # Architecture
//!
//! A [`SimpleDb`] holds one document together with the schema node it is
//! rooted at. Reads go through the [`DocumentRead`] accessors; writes go
//! through typed setters that validate against the node at the target path
//! and only touch the document when the canonical value changes.
//!
//! The store loaded from disk is read-only. All edits happen in a
//! [checkout](SimpleDb::checkout): a deep copy of some sub-document that is
//! editable, remembers where it came from, and is spliced back with
//! [`commit`](SimpleDb::commit). Dropping a checkout discards its edits.
//!
//! # Example
//!
//! ```
//! use casedb::core::schema::{Collection, Group, Primitive, Schema};
//! use casedb::core::store::{DocumentRead, SimpleDb};
//!
//! let region = Group::new().field("type", Primitive::text().with_default("fluid"));
//! let schema = Schema::new(Group::new().field("region", Collection::int_keyed(region))).unwrap();
//! let mut db = SimpleDb::new(&schema);
//!
//! let mut edit = db.checkout("").unwrap();
//! let key = edit.add_new_element("region", None).unwrap();
//! edit.set_value(&format!("region/{key}/type"), "solid", None).unwrap();
//! db.commit(edit).unwrap();
//!
//! assert_eq!(db.get_value("region/1/type").unwrap(), Some("solid"));
//! ```

mod transaction;
mod view;

pub use view::{DocView, DocumentRead};

use std::sync::Arc;

use serde_yaml::Value as Raw;
use thiserror::Error;

use crate::core::document::{CollectionValue, Value};
use crate::core::schema::validate::validate_node;
use crate::core::schema::{Collection, ErrorType, Schema, SchemaNode, ValidationError};
use crate::core::types::{DbEnum, DbPath, TypeError};

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Path does not resolve, or resolves to the wrong kind of node.
    #[error("path '{path}' does not resolve: {reason}")]
    Lookup {
        /// The path as given
        path: String,
        /// What went wrong at which step
        reason: String,
    },

    /// Collection key is duplicated or missing.
    #[error("key '{key}' {reason} in '{path}'")]
    Key {
        /// Path of the collection
        path: String,
        /// The offending key
        key: String,
        /// "already exists" or "not found"
        reason: String,
    },

    /// Write attempted on a store that was not checked out.
    #[error("store is not editable; check out a copy first")]
    NotEditable,

    /// A value was rejected by its validator.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// YAML could not be parsed or emitted.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl StoreError {
    pub(crate) fn lookup(path: &DbPath, reason: impl Into<String>) -> Self {
        StoreError::Lookup {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn lookup_str(path: &str, reason: impl Into<String>) -> Self {
        StoreError::Lookup {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn key(path: impl ToString, key: &str, reason: &str) -> Self {
        StoreError::Key {
            path: path.to_string(),
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<TypeError> for StoreError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidPath { path, reason } => StoreError::Lookup { path, reason },
        }
    }
}

/// A document bound to its schema.
#[derive(Debug, Clone)]
pub struct SimpleDb {
    schema: Arc<SchemaNode>,
    content: Value,
    editable: bool,
    modified: bool,
    base: DbPath,
}

impl SimpleDb {
    /// Read-only store holding the schema's default document.
    pub fn new(schema: &Schema) -> Self {
        Self {
            schema: Arc::clone(schema.root()),
            content: schema.generate_data(),
            editable: false,
            modified: false,
            base: DbPath::root(),
        }
    }

    /// Read-only store loaded from YAML text.
    pub fn from_yaml(schema: &Schema, text: &str, fill_with_default: bool) -> Result<Self, StoreError> {
        let mut db = Self::new(schema);
        db.load_yaml(text, fill_with_default)?;
        Ok(db)
    }

    /// Replace the document with validated YAML text.
    ///
    /// With `fill_with_default`, missing fields take their schema defaults.
    /// On failure the current document is kept.
    pub fn load_yaml(&mut self, text: &str, fill_with_default: bool) -> Result<(), StoreError> {
        let raw: Raw = serde_yaml::from_str(text)?;
        self.content = validate_node(&self.schema, Some(&raw), None, "", fill_with_default)?;
        Ok(())
    }

    /// Block-style YAML of the document, in insertion order.
    pub fn to_yaml(&self) -> Result<String, StoreError> {
        Ok(serde_yaml::to_string(&self.content)?)
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    /// Where this store was checked out from. Root for a loaded store.
    pub fn base_path(&self) -> &DbPath {
        &self.base
    }

    fn ensure_editable(&self) -> Result<(), StoreError> {
        if self.editable {
            Ok(())
        } else {
            Err(StoreError::NotEditable)
        }
    }

    /// Absolute path for error reports.
    fn error_path(&self, path: &DbPath) -> String {
        format!("/{}", self.base.join(path).as_str())
    }

    /// Validate and write a primitive.
    ///
    /// Returns whether the stored canonical value changed.
    pub fn set_value(&mut self, path: &str, value: &str, name: Option<&str>) -> Result<bool, StoreError> {
        self.write_primitive(path, Some(value), name)
    }

    /// Write a text that must not be blank, even where the field is optional.
    pub fn set_text(&mut self, path: &str, text: &str, name: Option<&str>) -> Result<bool, StoreError> {
        if text.trim().is_empty() {
            let path = DbPath::new(path)?;
            return Err(ValidationError::new(ErrorType::EmptyError, "Empty value is not allowed", name)
                .with_path(self.error_path(&path))
                .into());
        }
        self.write_primitive(path, Some(text), name)
    }

    /// Write an enum member by its canonical value.
    pub fn set_enum<E: DbEnum>(&mut self, path: &str, value: E) -> Result<bool, StoreError> {
        self.write_primitive(path, Some(value.value()), None)
    }

    /// Clear an optional primitive. Required ones fail validation.
    pub fn clear_value(&mut self, path: &str) -> Result<bool, StoreError> {
        self.write_primitive(path, None, None)
    }

    fn write_primitive(
        &mut self,
        path: &str,
        raw: Option<&str>,
        name: Option<&str>,
    ) -> Result<bool, StoreError> {
        self.ensure_editable()?;
        let path = DbPath::new(path)?;
        let error_path = self.error_path(&path);
        let (node, slot) = view::resolve_mut(&self.schema, &mut self.content, &path)?;
        let SchemaNode::Primitive(primitive) = node.as_ref() else {
            return Err(StoreError::lookup(
                &path,
                format!("expected a value, found a {}", node.kind_name()),
            ));
        };

        let value = primitive
            .validate(raw, name)
            .map(Value::from_scalar)
            .map_err(|e| e.with_path(error_path))?;
        if *slot == value {
            return Ok(false);
        }
        *slot = value;
        self.modified = true;
        Ok(true)
    }

    /// Replace every item of an array.
    pub fn set_array(&mut self, path: &str, items: &[&str], name: Option<&str>) -> Result<bool, StoreError> {
        self.ensure_editable()?;
        let path = DbPath::new(path)?;
        let error_path = self.error_path(&path);
        let (node, slot) = view::resolve_mut(&self.schema, &mut self.content, &path)?;
        let SchemaNode::Array(array) = node.as_ref() else {
            return Err(StoreError::lookup(
                &path,
                format!("expected an array, found a {}", node.kind_name()),
            ));
        };

        let items: Vec<Option<&str>> = items.iter().copied().map(Some).collect();
        let value = array
            .validate_items(&items, name)
            .map_err(|e| e.with_path(error_path))?;
        if *slot == value {
            return Ok(false);
        }
        *slot = value;
        self.modified = true;
        Ok(true)
    }

    /// Replace the three components of a vector. Nothing is written unless
    /// all three validate.
    pub fn set_vector(&mut self, path: &str, xyz: [&str; 3], name: Option<&str>) -> Result<bool, StoreError> {
        self.ensure_editable()?;
        let path = DbPath::new(path)?;
        let error_path = self.error_path(&path);
        let (node, slot) = view::resolve_mut(&self.schema, &mut self.content, &path)?;
        if !matches!(node.as_ref(), SchemaNode::Composite(_)) {
            return Err(StoreError::lookup(
                &path,
                format!("expected a vector, found a {}", node.kind_name()),
            ));
        }

        let raw: serde_yaml::Mapping = ["x", "y", "z"]
            .into_iter()
            .zip(xyz)
            .map(|(axis, component)| (Raw::from(axis), Raw::from(component)))
            .collect();
        let value = validate_node(node, Some(&Raw::Mapping(raw)), name, &error_path, false)?;
        if *slot == value {
            return Ok(false);
        }
        *slot = value;
        self.modified = true;
        Ok(true)
    }

    /// Editable store holding a default member of the collection at `path`.
    ///
    /// Fill it in and hand it to [`add_element`](Self::add_element).
    pub fn new_element(&self, path: &str) -> Result<SimpleDb, StoreError> {
        let path = DbPath::new(path)?;
        let (collection, _) = view::resolve_collection(&self.schema, &self.content, &path)?;
        Ok(SimpleDb {
            schema: Arc::clone(collection.element()),
            content: collection.new_element(),
            editable: true,
            modified: false,
            base: self.base.join(&path),
        })
    }

    /// Insert a member built with [`new_element`](Self::new_element).
    ///
    /// Returns the issued key.
    pub fn add_element(
        &mut self,
        path: &str,
        element: SimpleDb,
        key: Option<&str>,
    ) -> Result<String, StoreError> {
        self.add_value(path, element.content, key)
    }

    /// Insert a member made of element defaults.
    pub fn add_new_element(&mut self, path: &str, key: Option<&str>) -> Result<String, StoreError> {
        let element = self.new_element(path)?;
        self.add_value(path, element.content, key)
    }

    /// Insert a raw member document.
    ///
    /// The key is allocated (or checked, when requested) by the collection
    /// and the member is validated against the element schema before
    /// admission.
    ///
    /// A requested key is accepted whenever it is free, even if a removed
    /// member once held it. Requested keys mirror ids issued by another
    /// collection (a zone's `sourceTerms/materials/<mid>`), so re-adding one
    /// after its entry was dropped is expected. Only allocated keys come
    /// from the never-reused counter.
    pub fn add_value(&mut self, path: &str, value: Value, key: Option<&str>) -> Result<String, StoreError> {
        self.ensure_editable()?;
        let path = DbPath::new(path)?;
        let error_path = self.error_path(&path);
        let (collection, members) = collection_mut(&self.schema, &mut self.content, &path)?;

        let key = collection
            .key(key, members)
            .map_err(|e| e.with_path(error_path.clone()))?;
        if members.contains_key(&key) {
            return Err(StoreError::key(&path, &key, "already exists"));
        }
        let member = collection.validate_element(&value, &format!("{error_path}/{key}"))?;
        members.insert(key.clone(), member);
        self.modified = true;
        Ok(key)
    }

    pub fn remove_element(&mut self, path: &str, key: &str) -> Result<(), StoreError> {
        self.remove_elements(path, &[key])
    }

    /// Remove several members. Fails without removing anything if one of
    /// the keys is absent.
    pub fn remove_elements(&mut self, path: &str, keys: &[&str]) -> Result<(), StoreError> {
        self.ensure_editable()?;
        let path = DbPath::new(path)?;
        let (_, members) = collection_mut(&self.schema, &mut self.content, &path)?;
        if let Some(missing) = keys.iter().find(|key| !members.contains_key(key)) {
            return Err(StoreError::key(&path, missing, "not found"));
        }
        for key in keys {
            members.remove(key);
        }
        if !keys.is_empty() {
            self.modified = true;
        }
        Ok(())
    }

    /// Remove every member accepted by `filter`, returning their keys.
    pub fn remove_elements_by<F>(&mut self, path: &str, filter: F) -> Result<Vec<String>, StoreError>
    where
        F: Fn(&str, &Value) -> bool,
    {
        self.ensure_editable()?;
        let path = DbPath::new(path)?;
        let (_, members) = collection_mut(&self.schema, &mut self.content, &path)?;
        let doomed: Vec<String> = members
            .iter()
            .filter(|(key, member)| filter(key, member))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &doomed {
            members.remove(key);
        }
        if !doomed.is_empty() {
            self.modified = true;
        }
        Ok(doomed)
    }

    /// Empty the collection. Issued keys stay retired.
    pub fn remove_all_elements(&mut self, path: &str) -> Result<(), StoreError> {
        self.ensure_editable()?;
        let path = DbPath::new(path)?;
        let (_, members) = collection_mut(&self.schema, &mut self.content, &path)?;
        if !members.is_empty() {
            members.clear();
            self.modified = true;
        }
        Ok(())
    }

    /// Set one primitive field on every member accepted by `filter`.
    ///
    /// Returns the keys of the members that matched.
    pub fn update_elements<F>(
        &mut self,
        path: &str,
        field: &str,
        value: &str,
        filter: F,
    ) -> Result<Vec<String>, StoreError>
    where
        F: Fn(&str, &Value) -> bool,
    {
        self.ensure_editable()?;
        let path = DbPath::new(path)?;
        let error_path = self.error_path(&path);
        let (collection, members) = collection_mut(&self.schema, &mut self.content, &path)?;
        let primitive = match collection.element().step(field).map(|node| node.as_ref()) {
            Some(SchemaNode::Primitive(p)) => p,
            _ => {
                return Err(StoreError::lookup(
                    &path,
                    format!("'{field}' is not a value field of the members"),
                ))
            }
        };
        let canonical = primitive
            .validate(Some(value), None)
            .map(Value::from_scalar)
            .map_err(|e| e.with_path(format!("{error_path}/*/{field}")))?;

        let mut matched = Vec::new();
        let mut changed = false;
        for (key, member) in members.iter_mut() {
            if !filter(key, member) {
                continue;
            }
            matched.push(key.clone());
            if member.field(field) != Some(&canonical) {
                member.set_field(field, canonical.clone());
                changed = true;
            }
        }
        if changed {
            self.modified = true;
        }
        Ok(matched)
    }
}

impl DocumentRead for SimpleDb {
    fn schema_node(&self) -> &Arc<SchemaNode> {
        &self.schema
    }

    fn data(&self) -> &Value {
        &self.content
    }
}

/// Resolve `path` to a collection node and its members for writing.
fn collection_mut<'a>(
    schema: &'a Arc<SchemaNode>,
    content: &'a mut Value,
    path: &DbPath,
) -> Result<(&'a Collection, &'a mut CollectionValue), StoreError> {
    match view::resolve_mut(schema, content, path)? {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{Group, Primitive, SimpleArray, VectorComposite};

    crate::db_enum! {
        enum Phase("Phase") {
            Gas = "gas",
            Liquid = "liquid",
            Solid = "solid",
        }
    }

    fn schema() -> Schema {
        let material = Group::new()
            .field("name", Primitive::text())
            .field("phase", Primitive::enumeration::<Phase>())
            .field("density", Primitive::float().low_limit(0.0, false).with_default("1.2"))
            .field("note", Primitive::text().optional());
        let region = Group::new().field("material", Primitive::int().with_default("1"));
        Schema::new(
            Group::new()
                .field("title", Primitive::text().with_default("case"))
                .field("steps", Primitive::int().with_default("10"))
                .field("gravity", VectorComposite::new().with_default(0.0, 0.0, -9.81))
                .field("origin", SimpleArray::new(Primitive::float(), 2))
                .field("materials", Collection::int_keyed(material))
                .field("region", Collection::text_keyed(region)),
        )
        .unwrap()
    }

    fn editable() -> SimpleDb {
        SimpleDb::new(&schema()).checkout("").unwrap()
    }

    fn add_material(db: &mut SimpleDb, name: &str) -> String {
        let mut element = db.new_element("materials").unwrap();
        element.set_value("name", name, None).unwrap();
        db.add_element("materials", element, None).unwrap()
    }

    mod values {
        use super::*;

        #[test]
        fn set_reports_change() {
            let mut db = editable();
            assert!(db.set_value("steps", "20", None).unwrap());
            assert!(!db.set_value("steps", " 20 ", None).unwrap());
            assert_eq!(db.get_int("steps").unwrap(), Some(20));
            assert!(db.is_modified());
        }

        #[test]
        fn unchanged_value_leaves_store_clean() {
            let mut db = editable();
            assert!(!db.set_value("steps", "10", None).unwrap());
            assert!(!db.is_modified());
        }

        #[test]
        fn root_store_is_read_only() {
            let mut db = SimpleDb::new(&schema());
            let err = db.set_value("steps", "20", None).unwrap_err();
            assert!(matches!(err, StoreError::NotEditable));
            assert_eq!(db.get_value("steps").unwrap(), Some("10"));
        }

        #[test]
        fn invalid_value_not_written() {
            let mut db = editable();
            let err = db.set_value("steps", "ten", Some("Steps")).unwrap_err();
            match err {
                StoreError::Validation(e) => {
                    assert_eq!(e.kind(), ErrorType::TypeError);
                    assert_eq!(e.path(), Some("/steps"));
                }
                other => panic!("unexpected error: {other:?}"),
            }
            assert_eq!(db.get_value("steps").unwrap(), Some("10"));
            assert!(!db.is_modified());
        }

        #[test]
        fn set_text_rejects_blank() {
            let mut db = editable();
            let err = db.set_text("title", "  ", Some("Title")).unwrap_err();
            assert!(matches!(err, StoreError::Validation(ref e) if e.kind() == ErrorType::EmptyError));
        }

        #[test]
        fn reading_a_group_as_value_is_lookup_error() {
            let db = editable();
            assert!(matches!(db.get_value("gravity"), Err(StoreError::Lookup { .. })));
            assert!(matches!(db.get_value("nowhere"), Err(StoreError::Lookup { .. })));
        }

        #[test]
        fn vector_is_all_or_nothing() {
            let mut db = editable();
            assert!(db.set_vector("gravity", ["0", "-9.81", "0"], None).unwrap());
            assert_eq!(db.get_vector("gravity").unwrap(), [0.0, -9.81, 0.0]);

            let err = db.set_vector("gravity", ["1", "x", "2"], None).unwrap_err();
            assert!(matches!(err, StoreError::Validation(ref e) if e.path() == Some("/gravity/y")));
            assert_eq!(db.get_vector("gravity").unwrap(), [0.0, -9.81, 0.0]);
        }

        #[test]
        fn int_reads_are_range_checked() {
            let mut db = editable();
            let key = add_material(&mut db, "lead");
            let path = format!("materials/{key}/density");
            db.set_value(&path, "11340", None).unwrap();
            assert_eq!(db.get_int(&path).unwrap(), Some(11340));

            db.set_value(&path, "1e30", None).unwrap();
            let err = db.get_int(&path).unwrap_err();
            assert!(matches!(err, StoreError::Lookup { ref reason, .. } if reason.ends_with("is out of range")));

            db.set_value(&path, "0.5", None).unwrap();
            assert!(matches!(db.get_int(&path), Err(StoreError::Lookup { .. })));
        }

        #[test]
        fn array_size_enforced() {
            let mut db = editable();
            assert!(db.set_array("origin", &["1", "2"], None).unwrap());
            assert_eq!(db.get_array("origin").unwrap(), vec![Some("1"), Some("2")]);
            let err = db.set_array("origin", &["1"], None).unwrap_err();
            assert!(matches!(err, StoreError::Validation(ref e) if e.kind() == ErrorType::SizeError));
        }

        #[test]
        fn enums_read_typed() {
            let mut db = editable();
            let key = add_material(&mut db, "water");
            let path = format!("materials/{key}/phase");
            assert_eq!(db.get_enum::<Phase>(&path).unwrap(), Phase::Gas);
            db.set_enum(&path, Phase::Liquid).unwrap();
            assert_eq!(db.get_enum_member(&path).unwrap().name, "Liquid");
        }

        #[test]
        fn optional_values_clear() {
            let mut db = editable();
            let key = add_material(&mut db, "air");
            let note = format!("materials/{key}/note");
            db.set_value(&note, "dry", None).unwrap();
            assert!(db.clear_value(&note).unwrap());
            assert_eq!(db.get_value(&note).unwrap(), None);
            assert!(db.clear_value(&format!("materials/{key}/name")).is_err());
        }
    }

    mod collections {
        use super::*;

        #[test]
        fn keys_start_at_one_and_never_repeat() {
            let mut db = editable();
            assert_eq!(add_material(&mut db, "a"), "1");
            assert_eq!(add_material(&mut db, "b"), "2");
            db.remove_element("materials", "2").unwrap();
            assert_eq!(add_material(&mut db, "c"), "3");
        }

        #[test]
        fn duplicate_key_rejected() {
            let mut db = editable();
            db.add_new_element("region", Some("fluid")).unwrap();
            let err = db.add_new_element("region", Some("fluid")).unwrap_err();
            assert!(matches!(err, StoreError::Key { ref reason, .. } if reason == "already exists"));
        }

        #[test]
        fn invalid_member_rejected() {
            let mut db = editable();
            let element = db.new_element("materials").unwrap();
            let err = db.add_element("materials", element, None).unwrap_err();
            assert!(matches!(err, StoreError::Validation(ref e) if e.path() == Some("/materials/1/name")));
            assert_eq!(db.element_count("materials").unwrap(), 0);
        }

        #[test]
        fn remove_missing_key_fails_atomically() {
            let mut db = editable();
            add_material(&mut db, "a");
            let err = db.remove_elements("materials", &["1", "9"]).unwrap_err();
            assert!(matches!(err, StoreError::Key { .. }));
            assert_eq!(db.element_count("materials").unwrap(), 1);
        }

        #[test]
        fn filters_select_members() {
            let mut db = editable();
            for name in ["air", "water", "steel"] {
                add_material(&mut db, name);
            }
            let has_a = |_: &str, m: &Value| m.text("name").is_some_and(|n| n.contains('a'));
            assert_eq!(db.get_keys_by("materials", has_a).unwrap(), vec!["1", "2"]);
            assert_eq!(db.element_count_by("materials", has_a).unwrap(), 2);
            assert!(db.find_element("materials", has_a).unwrap().is_none());

            let (key, view) = db
                .find_element("materials", |_, m| m.text("name") == Some("steel"))
                .unwrap()
                .unwrap();
            assert_eq!(key, "3");
            assert_eq!(view.get_float("density").unwrap(), Some(1.2));

            let removed = db.remove_elements_by("materials", has_a).unwrap();
            assert_eq!(removed, vec!["1", "2"]);
            assert_eq!(db.get_keys("materials").unwrap(), vec!["3"]);
        }

        #[test]
        fn update_elements_sets_field() {
            let mut db = editable();
            for name in ["air", "water"] {
                add_material(&mut db, name);
            }
            let matched = db
                .update_elements("materials", "density", "998", |_, m| m.text("name") == Some("water"))
                .unwrap();
            assert_eq!(matched, vec!["2"]);
            assert_eq!(db.get_value("materials/2/density").unwrap(), Some("998"));
            assert_eq!(db.get_value("materials/1/density").unwrap(), Some("1.2"));
            assert!(db.update_elements("materials", "density", "-1", |_, _| true).is_err());
        }

        #[test]
        fn unique_names() {
            let mut db = editable();
            assert_eq!(db.get_unique_seq("materials", "name", "air", None).unwrap(), "");
            add_material(&mut db, "air");
            assert_eq!(db.get_unique_value("materials", "name", "air").unwrap(), "air1");
            add_material(&mut db, "air1");
            assert_eq!(db.get_unique_seq("materials", "name", "air", None).unwrap(), "2");
            assert_eq!(db.get_unique_seq("materials", "name", "air", Some(1)).unwrap(), "2");
            assert_eq!(db.get_unique_seq("materials", "name", "air", Some(5)).unwrap(), "5");
        }

        #[test]
        fn unique_seq_stops_at_the_last_suffix() {
            let mut db = editable();
            add_material(&mut db, &format!("air{}", u32::MAX));
            let err = db
                .get_unique_seq("materials", "name", "air", Some(u32::MAX))
                .unwrap_err();
            assert!(matches!(err, StoreError::Lookup { .. }));
        }

        #[test]
        fn requested_key_may_return() {
            let mut db = editable();
            add_material(&mut db, "a");
            let mut element = db.new_element("materials").unwrap();
            element.set_value("name", "b", None).unwrap();
            assert_eq!(db.add_element("materials", element, Some("7")).unwrap(), "7");
            db.remove_element("materials", "7").unwrap();

            let mut element = db.new_element("materials").unwrap();
            element.set_value("name", "b", None).unwrap();
            assert_eq!(db.add_element("materials", element, Some("7")).unwrap(), "7");
            assert_eq!(add_material(&mut db, "c"), "8");
        }

        #[test]
        fn remove_all_keeps_counter() {
            let mut db = editable();
            add_material(&mut db, "a");
            add_material(&mut db, "b");
            db.remove_all_elements("materials").unwrap();
            assert!(db.get_elements("materials").unwrap().is_empty());
            assert_eq!(add_material(&mut db, "c"), "3");
        }

        #[test]
        fn element_views_read_members() {
            let mut db = editable();
            add_material(&mut db, "air");
            let elements = db.get_elements("materials").unwrap();
            let air = &elements["1"];
            assert_eq!(air.get_value("name").unwrap(), Some("air"));
            assert_eq!(
                air.get_values("", &["name", "note"]).unwrap(),
                vec![Some("air"), None]
            );
            assert!(db.has_element("materials", "1").unwrap());
            assert!(!db.has_element("materials", "2").unwrap());
        }
    }

    mod yaml {
        use super::*;

        #[test]
        fn round_trip() {
            let mut db = editable();
            add_material(&mut db, "air");
            db.add_new_element("region", Some("fluid")).unwrap();
            let text = db.to_yaml().unwrap();

            let loaded = SimpleDb::from_yaml(&schema(), &text, false).unwrap();
            assert_eq!(loaded.data(), db.data());
            assert!(!loaded.is_editable());
        }

        #[test]
        fn fill_with_default_loads_partial_document() {
            let err = SimpleDb::from_yaml(&schema(), "title: demo\n", false).unwrap_err();
            assert!(matches!(err, StoreError::Validation(_)));

            let db = SimpleDb::from_yaml(&schema(), "title: demo\n", true).unwrap();
            assert_eq!(db.get_value("title").unwrap(), Some("demo"));
            assert_eq!(db.get_value("steps").unwrap(), Some("10"));
        }

        #[test]
        fn malformed_yaml_is_yaml_error() {
            let err = SimpleDb::from_yaml(&schema(), "title: [unclosed", true).unwrap_err();
            assert!(matches!(err, StoreError::Yaml(_)));
        }
    }
}
