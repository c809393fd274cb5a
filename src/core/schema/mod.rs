//! core::schema
//!
//! Declarative schema tree describing the shape of a valid document.
//!
//! # Node Kinds
//!
//! A [`SchemaNode`] is a closed union:
//! - [`Primitive`] - text, float, int, bool or enum leaf with constraints
//! - [`SimpleArray`] - fixed- or variable-length list of one primitive
//! - [`VectorComposite`] - fixed `{x, y, z}` group of floats
//! - [`Collection`] - keyed rows sharing one element [`Group`]
//! - [`Group`] - named fields, each another node
//!
//! Nodes are immutable once built and shared through [`Arc`] by every
//! document and checkout they shape.
//!
//! # Example
//!
//! ```
//! use casedb::core::schema::{Collection, Group, Primitive, Schema};
//!
//! let region = Group::new()
//!     .field("name", Primitive::text())
//!     .field("density", Primitive::float().low_limit(0.0, false).with_default("1"));
//!
//! let schema = Schema::new(Group::new().field("region", Collection::int_keyed(region))).unwrap();
//! let doc = schema.generate_data();
//! assert!(doc.field("region").is_some());
//! ```

mod collection;
mod composite;
mod primitive;
pub(crate) mod validate;

pub use collection::{Collection, KeyKind};
pub(crate) use collection::parse_int_key;
pub use composite::{SimpleArray, VectorComposite};
pub use primitive::{Bound, Primitive, PrimitiveKind};
pub(crate) use primitive::is_truthy;

use std::sync::Arc;

use indexmap::IndexMap;
use thiserror::Error;

use crate::core::document::Value;

/// Kind of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Required value missing or blank
    EmptyError,
    /// Value is not a member of the enum
    EnumError,
    /// Value cannot be parsed as the expected type
    TypeError,
    /// Number outside the declared bounds
    RangeError,
    /// Array length differs from the declared size
    SizeError,
}

/// A value rejected by a validator.
///
/// Carries the failure kind, a human-readable message, the display name of
/// the field (when the caller supplied one) and the resolved path.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{}", self.to_message())]
pub struct ValidationError {
    kind: ErrorType,
    message: String,
    name: Option<String>,
    path: Option<String>,
}

impl ValidationError {
    /// Create a new validation error.
    pub fn new(kind: ErrorType, message: impl Into<String>, name: Option<&str>) -> Self {
        Self {
            kind,
            message: message.into(),
            name: name.map(str::to_string),
            path: None,
        }
    }

    /// Attach the resolved path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// The failure kind.
    pub fn kind(&self) -> ErrorType {
        self.kind
    }

    /// The message without name or path.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Display name supplied by the caller, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Path of the failing field, if known.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Render `"{name-or-path} - {message}"` for presentation to a user.
    pub fn to_message(&self) -> String {
        let label = self
            .name
            .as_deref()
            .or(self.path.as_deref())
            .unwrap_or_default();
        format!("{} - {}", label, self.message)
    }
}

/// A schema node.
#[derive(Debug, Clone)]
pub enum SchemaNode {
    Primitive(Primitive),
    Array(SimpleArray),
    Composite(VectorComposite),
    Collection(Collection),
    Group(Group),
}

impl SchemaNode {
    /// Check whether the node is a leaf that stores a single scalar.
    pub fn is_primitive(&self) -> bool {
        matches!(self, SchemaNode::Primitive(_))
    }

    /// Short name of the node kind for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            SchemaNode::Primitive(_) => "primitive",
            SchemaNode::Array(_) => "array",
            SchemaNode::Composite(_) => "vector",
            SchemaNode::Collection(_) => "collection",
            SchemaNode::Group(_) => "group",
        }
    }

    /// Child node named `segment`, routing collections to their element.
    pub(crate) fn step(&self, segment: &str) -> Option<&Arc<SchemaNode>> {
        match self {
            SchemaNode::Group(group) => group.get(segment),
            SchemaNode::Composite(vector) => vector.group().get(segment),
            SchemaNode::Collection(collection) => Some(collection.element()),
            SchemaNode::Primitive(_) | SchemaNode::Array(_) => None,
        }
    }
}

impl From<Primitive> for SchemaNode {
    fn from(p: Primitive) -> Self {
        SchemaNode::Primitive(p)
    }
}

impl From<SimpleArray> for SchemaNode {
    fn from(a: SimpleArray) -> Self {
        SchemaNode::Array(a)
    }
}

impl From<VectorComposite> for SchemaNode {
    fn from(v: VectorComposite) -> Self {
        SchemaNode::Composite(v)
    }
}

impl From<Collection> for SchemaNode {
    fn from(c: Collection) -> Self {
        SchemaNode::Collection(c)
    }
}

impl From<Group> for SchemaNode {
    fn from(g: Group) -> Self {
        SchemaNode::Group(g)
    }
}

/// Named fields, each shaped by its own node. Field order is preserved.
#[derive(Debug, Clone, Default)]
pub struct Group {
    fields: IndexMap<String, Arc<SchemaNode>>,
}

impl Group {
    /// Create an empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field.
    pub fn field(mut self, name: impl Into<String>, node: impl Into<SchemaNode>) -> Self {
        self.fields.insert(name.into(), Arc::new(node.into()));
        self
    }

    /// Look a field up by name.
    pub fn get(&self, name: &str) -> Option<&Arc<SchemaNode>> {
        self.fields.get(name)
    }

    /// Iterate over fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Arc<SchemaNode>)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// A complete schema: the shared root node of every document it shapes.
#[derive(Debug, Clone)]
pub struct Schema {
    root: Arc<SchemaNode>,
}

impl Schema {
    /// Build a schema rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` raised by an explicitly set
    /// default that its own validator rejects.
    pub fn new(root: Group) -> Result<Self, ValidationError> {
        let root = Arc::new(SchemaNode::Group(root));
        validate::check_defaults(&root, "")?;
        Ok(Self { root })
    }

    /// The shared root node.
    pub fn root(&self) -> &Arc<SchemaNode> {
        &self.root
    }

    /// Build the default document.
    ///
    /// Required primitives get their default, optional ones the absent
    /// sentinel, and collections start empty.
    pub fn generate_data(&self) -> Value {
        validate::generate(&self.root)
    }

    /// Validate a raw document.
    ///
    /// With `fill_with_default`, missing fields are replaced by schema
    /// defaults instead of failing.
    pub fn validate_data(
        &self,
        raw: &serde_yaml::Value,
        fill_with_default: bool,
    ) -> Result<Value, ValidationError> {
        validate::validate_node(&self.root, Some(raw), None, "", fill_with_default)
    }
}
