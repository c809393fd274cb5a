//! core::types
//!
//! Strong types for core store concepts.
//!
//! # Types
//!
//! - [`DbPath`] - Validated slash-delimited document path
//! - [`DbEnum`] - Closed enum stored by its canonical value
//! - [`EnumDef`] - Runtime description of a [`DbEnum`] held by the schema
//!
//! # Validation
//!
//! These types enforce validity at construction time. A path with an empty
//! segment cannot be represented, so every accessor walks well-formed paths.
//!
//! # Examples
//!
//! ```
//! use casedb::core::types::DbPath;
//!
//! let path = DbPath::new("region/r0/cellZones/1").unwrap();
//! assert_eq!(path.segments().count(), 4);
//!
//! let base = DbPath::new("region/r0").unwrap();
//! assert!(base.is_prefix_of(&path));
//! assert_eq!(path.relative_to(&base).unwrap().as_str(), "cellZones/1");
//!
//! assert!(DbPath::new("region//r0").is_err());
//! ```

use std::fmt;

use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },
}

/// A validated document path.
///
/// Paths are `/`-separated field names and collection keys. Leading and
/// trailing separators are ignored; the empty path addresses the root of
/// whatever store it is resolved against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DbPath(String);

impl DbPath {
    /// Create a new validated path.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidPath` if the path contains an empty segment
    /// or a control character.
    pub fn new(path: impl AsRef<str>) -> Result<Self, TypeError> {
        let trimmed = path.as_ref().trim_matches('/');
        Self::validate(trimmed)?;
        Ok(Self(trimmed.to_string()))
    }

    /// The root path.
    pub fn root() -> Self {
        Self(String::new())
    }

    fn validate(path: &str) -> Result<(), TypeError> {
        if path.is_empty() {
            return Ok(());
        }

        if path.split('/').any(str::is_empty) {
            return Err(TypeError::InvalidPath {
                path: path.to_string(),
                reason: "path cannot contain an empty segment".into(),
            });
        }

        if path.chars().any(|c| c.is_control()) {
            return Err(TypeError::InvalidPath {
                path: path.to_string(),
                reason: "path cannot contain control characters".into(),
            });
        }

        Ok(())
    }

    /// Get the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if this is the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the path segments. The root path has none.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Append `other` below this path.
    pub fn join(&self, other: &DbPath) -> DbPath {
        match (self.is_root(), other.is_root()) {
            (true, _) => other.clone(),
            (_, true) => self.clone(),
            _ => DbPath(format!("{}/{}", self.0, other.0)),
        }
    }

    /// Append a single segment (a field name or a collection key).
    pub fn child(&self, segment: &str) -> Result<DbPath, TypeError> {
        Ok(self.join(&DbPath::new(segment)?))
    }

    /// Check if this path equals `other` or is one of its ancestors.
    ///
    /// The comparison is segment-wise: `region/r1` is not a prefix of
    /// `region/r10`.
    pub fn is_prefix_of(&self, other: &DbPath) -> bool {
        let mut theirs = other.segments();
        self.segments().all(|ours| theirs.next() == Some(ours))
    }

    /// Express `self` relative to an ancestor `base`.
    ///
    /// Returns `None` if `base` is not a prefix of `self`.
    pub fn relative_to(&self, base: &DbPath) -> Option<DbPath> {
        if !base.is_prefix_of(self) {
            return None;
        }
        let skip = base.segments().count();
        let rest: Vec<&str> = self.segments().skip(skip).collect();
        Some(DbPath(rest.join("/")))
    }

    /// Split into the parent path and the final segment.
    ///
    /// Returns `None` for the root path.
    pub fn parent_and_leaf(&self) -> Option<(DbPath, &str)> {
        if self.is_root() {
            return None;
        }
        match self.0.rsplit_once('/') {
            Some((parent, leaf)) => Some((DbPath(parent.to_string()), leaf)),
            None => Some((DbPath::root(), self.0.as_str())),
        }
    }
}

impl fmt::Display for DbPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "/")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl TryFrom<&str> for DbPath {
    type Error = TypeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl AsRef<str> for DbPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A closed enum whose members are stored by their canonical value.
///
/// Implement it with [`db_enum!`](crate::db_enum) rather than by hand.
pub trait DbEnum: Copy + PartialEq + fmt::Debug + 'static {
    /// Name used in error messages.
    const TYPE_NAME: &'static str;

    /// All members in declaration order. The first is the default.
    fn members() -> &'static [Self];

    /// Symbolic name of the member.
    fn name(self) -> &'static str;

    /// Canonical stored value of the member.
    fn value(self) -> &'static str;

    /// Look a member up by canonical value or symbolic name.
    fn parse(text: &str) -> Option<Self> {
        Self::members()
            .iter()
            .copied()
            .find(|m| m.value() == text)
            .or_else(|| Self::members().iter().copied().find(|m| m.name() == text))
    }
}

/// Declare a [`DbEnum`].
///
/// ```
/// casedb::db_enum! {
///     /// Material phase.
///     pub enum Phase("Phase") {
///         Gas = "gas",
///         Liquid = "liquid",
///         Solid = "solid",
///     }
/// }
///
/// use casedb::core::types::DbEnum;
/// assert_eq!(Phase::parse("Liquid"), Some(Phase::Liquid));
/// assert_eq!(Phase::Solid.value(), "solid");
/// ```
#[macro_export]
macro_rules! db_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident($type_name:literal) {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $crate::core::types::DbEnum for $name {
            const TYPE_NAME: &'static str = $type_name;

            fn members() -> &'static [Self] {
                &[$($name::$variant),+]
            }

            fn name(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }

            fn value(self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::core::types::DbEnum::value(*self))
            }
        }
    };
}

/// One member of an [`EnumDef`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    /// Symbolic name (e.g. `Liquid`)
    pub name: String,
    /// Canonical stored value (e.g. `liquid`)
    pub value: String,
}

/// Runtime description of an enum, held by the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    type_name: String,
    members: Vec<EnumMember>,
}

impl EnumDef {
    /// Describe a [`DbEnum`].
    pub fn of<E: DbEnum>() -> Self {
        Self {
            type_name: E::TYPE_NAME.to_string(),
            members: E::members()
                .iter()
                .map(|m| EnumMember {
                    name: m.name().to_string(),
                    value: m.value().to_string(),
                })
                .collect(),
        }
    }

    /// Name used in error messages.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Members in declaration order.
    pub fn members(&self) -> &[EnumMember] {
        &self.members
    }

    /// Find a member by canonical value or symbolic name.
    pub fn find(&self, text: &str) -> Option<&EnumMember> {
        self.members
            .iter()
            .find(|m| m.value == text)
            .or_else(|| self.members.iter().find(|m| m.name == text))
    }

    /// Canonical values joined for error messages.
    pub fn allowed(&self) -> String {
        self.members
            .iter()
            .map(|m| m.value.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::db_enum! {
        enum Color("Color") {
            Red = "red",
            DarkBlue = "darkBlue",
        }
    }

    mod db_path {
        use super::*;

        #[test]
        fn trims_separators() {
            let path = DbPath::new("/region/r0/").unwrap();
            assert_eq!(path.as_str(), "region/r0");
        }

        #[test]
        fn empty_is_root() {
            let path = DbPath::new("").unwrap();
            assert!(path.is_root());
            assert_eq!(path.segments().count(), 0);
            assert_eq!(path.to_string(), "/");
        }

        #[test]
        fn rejects_empty_segment() {
            assert!(matches!(
                DbPath::new("a//b"),
                Err(TypeError::InvalidPath { .. })
            ));
        }

        #[test]
        fn prefix_is_segment_wise() {
            let r1 = DbPath::new("region/r1").unwrap();
            let r10 = DbPath::new("region/r10/name").unwrap();
            assert!(!r1.is_prefix_of(&r10));
            assert!(DbPath::root().is_prefix_of(&r10));
            assert!(r10.is_prefix_of(&r10));
        }

        #[test]
        fn relative_to_ancestor() {
            let base = DbPath::new("a/b").unwrap();
            let full = DbPath::new("a/b/c/d").unwrap();
            assert_eq!(full.relative_to(&base).unwrap().as_str(), "c/d");
            assert!(full.relative_to(&full).unwrap().is_root());
            assert!(base.relative_to(&full).is_none());
        }

        #[test]
        fn join_with_root() {
            let a = DbPath::new("a").unwrap();
            assert_eq!(DbPath::root().join(&a), a);
            assert_eq!(a.join(&DbPath::root()), a);
            assert_eq!(a.child("b").unwrap().as_str(), "a/b");
        }

        #[test]
        fn parent_and_leaf() {
            let path = DbPath::new("a/b/c").unwrap();
            let (parent, leaf) = path.parent_and_leaf().unwrap();
            assert_eq!(parent.as_str(), "a/b");
            assert_eq!(leaf, "c");

            let single = DbPath::new("a").unwrap();
            let (parent, leaf) = single.parent_and_leaf().unwrap();
            assert!(parent.is_root());
            assert_eq!(leaf, "a");

            assert!(DbPath::root().parent_and_leaf().is_none());
        }
    }

    mod db_enum {
        use super::*;

        #[test]
        fn parse_by_value_or_name() {
            assert_eq!(Color::parse("darkBlue"), Some(Color::DarkBlue));
            assert_eq!(Color::parse("DarkBlue"), Some(Color::DarkBlue));
            assert_eq!(Color::parse("green"), None);
        }

        #[test]
        fn enum_def_describes_members() {
            let def = EnumDef::of::<Color>();
            assert_eq!(def.type_name(), "Color");
            assert_eq!(def.members().len(), 2);
            assert_eq!(def.find("Red").unwrap().value, "red");
            assert_eq!(def.allowed(), "red, darkBlue");
        }
    }
}
