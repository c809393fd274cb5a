//! core::schema::composite
//!
//! Fixed-shape nodes built from primitives: `{x, y, z}` vectors and
//! homogeneous arrays.

use crate::core::document::Value;

use super::{ErrorType, Group, Primitive, ValidationError};

/// A fixed `{x, y, z}` group of floats.
#[derive(Debug, Clone)]
pub struct VectorComposite {
    group: Group,
}

impl VectorComposite {
    /// Vector with every component defaulting to `0`.
    pub fn new() -> Self {
        Self::build(Primitive::float(), Primitive::float(), Primitive::float())
    }

    /// Seed each component's default independently.
    pub fn with_default(self, x: f64, y: f64, z: f64) -> Self {
        Self::build(
            Primitive::float().with_default(x.to_string()),
            Primitive::float().with_default(y.to_string()),
            Primitive::float().with_default(z.to_string()),
        )
    }

    fn build(x: Primitive, y: Primitive, z: Primitive) -> Self {
        Self {
            group: Group::new().field("x", x).field("y", y).field("z", z),
        }
    }

    /// The three-field group backing the vector.
    pub fn group(&self) -> &Group {
        &self.group
    }
}

impl Default for VectorComposite {
    fn default() -> Self {
        Self::new()
    }
}

/// An ordered list of one primitive type.
///
/// A `size` of zero accepts any length; otherwise the length is fixed.
#[derive(Debug, Clone)]
pub struct SimpleArray {
    element: Primitive,
    size: usize,
    required: bool,
}

impl SimpleArray {
    pub fn new(element: Primitive, size: usize) -> Self {
        Self {
            element,
            size,
            required: true,
        }
    }

    /// Allow the whole array to be absent.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn element(&self) -> &Primitive {
        &self.element
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// `size` copies of the element default.
    pub fn default_value(&self) -> Value {
        Value::Array(vec![
            Value::Scalar(self.element.default_value());
            self.size
        ])
    }

    /// Validate every item, failing with `SizeError` on a length mismatch.
    pub fn validate_items(
        &self,
        items: &[Option<&str>],
        name: Option<&str>,
    ) -> Result<Value, ValidationError> {
        if self.size != 0 && items.len() != self.size {
            return Err(ValidationError::new(
                ErrorType::SizeError,
                format!("Length must be {}", self.size),
                name,
            ));
        }

        let label = name.unwrap_or("");
        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let item_name = format!("{label}[{i}]");
                self.element
                    .validate(*item, Some(&item_name))
                    .map(Value::from_scalar)
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }
}
