//! core::store::transaction
//!
//! Checkout and commit.
//!
//! A checkout deep-copies the sub-document at a path together with the
//! schema node it is rooted at. Commit splices it back at the relative path
//! and consumes it, so a committed checkout cannot be reused. Commits
//! compose: a checkout of a checkout commits into its parent, which then
//! commits into the store above it.

use std::sync::Arc;

use tracing::debug;

use crate::core::schema::SchemaNode;
use crate::core::types::DbPath;

use super::{view, SimpleDb, StoreError};

impl SimpleDb {
    /// Editable deep copy of the sub-document at `path`.
    ///
    /// The empty path checks out the whole store. The source store is left
    /// untouched; edits reach it only through [`commit`](Self::commit).
    ///
    /// # Errors
    ///
    /// `StoreError::Lookup` if the path does not resolve or addresses a
    /// primitive or array rather than a document.
    pub fn checkout(&self, path: &str) -> Result<SimpleDb, StoreError> {
        let relative = DbPath::new(path)?;
        let (schema, value) = view::resolve(&self.schema, &self.content, &relative)?;
        if matches!(schema.as_ref(), SchemaNode::Primitive(_) | SchemaNode::Array(_)) {
            return Err(StoreError::lookup(
                &relative,
                format!("cannot check out a {}", schema.kind_name()),
            ));
        }

        let base = self.base.join(&relative);
        debug!(base = %base, "checkout");
        Ok(SimpleDb {
            schema: Arc::clone(schema),
            content: value.clone(),
            editable: true,
            modified: false,
            base,
        })
    }

    /// Splice a checkout back into this store.
    ///
    /// Returns `Ok(false)` without touching anything when the checkout holds
    /// no edits. On success this store is marked modified.
    ///
    /// # Errors
    ///
    /// `StoreError::Lookup` if the checkout was not taken from this store or
    /// one of its descendants (its base path is not below this store's
    /// base), or if its schema does not match the node at that path.
    pub fn commit(&mut self, checkout: SimpleDb) -> Result<bool, StoreError> {
        let relative = checkout.base.relative_to(&self.base).ok_or_else(|| {
            StoreError::lookup(
                &checkout.base,
                format!("checkout is not below this store's base '{}'", self.base),
            )
        })?;

        if !checkout.modified || !checkout.editable {
            debug!(base = %checkout.base, "commit skipped, nothing to merge");
            return Ok(false);
        }

        let (schema, slot) = view::resolve_mut(&self.schema, &mut self.content, &relative)?;
        if !Arc::ptr_eq(schema, &checkout.schema) {
            return Err(StoreError::lookup(
                &relative,
                "checkout was taken against a different schema",
            ));
        }
        *slot = checkout.content;
        self.modified = true;
        debug!(base = %checkout.base, into = %self.base, "commit");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{Collection, Group, Primitive, Schema};
    use crate::core::store::DocumentRead;

    fn schema() -> Schema {
        let zone = Group::new().field("porosity", Primitive::float().with_default("0.5"));
        let region = Group::new()
            .field("type", Primitive::text().with_default("fluid"))
            .field("cellZones", Collection::int_keyed(zone));
        Schema::new(
            Group::new()
                .field("steps", Primitive::int().with_default("1"))
                .field("region", Collection::int_keyed(region)),
        )
        .unwrap()
    }

    fn seeded() -> SimpleDb {
        let mut db = SimpleDb::new(&schema());
        let mut edit = db.checkout("").unwrap();
        edit.add_new_element("region", None).unwrap();
        edit.add_new_element("region/1/cellZones", None).unwrap();
        assert!(db.commit(edit).unwrap());
        db
    }

    #[test]
    fn checkout_is_isolated() {
        let db = seeded();
        let before = db.data().clone();

        let mut edit = db.checkout("region/1").unwrap();
        edit.set_value("type", "solid", None).unwrap();
        assert_eq!(db.get_value("region/1/type").unwrap(), Some("fluid"));

        drop(edit);
        assert_eq!(db.data(), &before);
    }

    #[test]
    fn commit_splices_at_relative_path() {
        let mut db = seeded();
        let mut edit = db.checkout("region/1").unwrap();
        assert_eq!(edit.base_path().as_str(), "region/1");
        edit.set_value("type", "solid", None).unwrap();

        assert!(db.commit(edit).unwrap());
        assert_eq!(db.get_value("region/1/type").unwrap(), Some("solid"));
        assert!(db.is_modified());
    }

    #[test]
    fn clean_checkout_commit_is_noop() {
        let mut db = seeded();
        let before = db.data().clone();
        let edit = db.checkout("region/1").unwrap();
        assert!(!db.commit(edit).unwrap());
        assert_eq!(db.data(), &before);

        let mut untouched = SimpleDb::new(&schema());
        let edit = untouched.checkout("").unwrap();
        assert!(!untouched.commit(edit).unwrap());
        assert!(!untouched.is_modified());
    }

    #[test]
    fn nested_checkouts_compose() {
        let mut db = seeded();
        let mut region = db.checkout("region/1").unwrap();
        let mut zone = region.checkout("cellZones/1").unwrap();
        assert_eq!(zone.base_path().as_str(), "region/1/cellZones/1");

        zone.set_value("porosity", "0.3", None).unwrap();
        assert!(region.commit(zone).unwrap());
        assert_eq!(db.get_value("region/1/cellZones/1/porosity").unwrap(), Some("0.5"));

        assert!(db.commit(region).unwrap());
        assert_eq!(db.get_value("region/1/cellZones/1/porosity").unwrap(), Some("0.3"));
    }

    #[test]
    fn deep_checkout_commits_into_root() {
        let mut db = seeded();
        let mut zone = db.checkout("region/1/cellZones/1").unwrap();
        zone.set_value("porosity", "0.9", None).unwrap();
        assert!(db.commit(zone).unwrap());
        assert_eq!(db.get_value("region/1/cellZones/1/porosity").unwrap(), Some("0.9"));
    }

    #[test]
    fn commit_requires_base_below_target() {
        let db = seeded();
        let mut outside = db.checkout("region/1").unwrap();
        outside.set_value("type", "solid", None).unwrap();

        let mut deeper = db.checkout("region/1/cellZones").unwrap();
        assert!(matches!(deeper.commit(outside), Err(StoreError::Lookup { .. })));
    }

    #[test]
    fn sibling_prefix_is_not_an_ancestor() {
        let mut db = seeded();
        let mut edit = db.checkout("").unwrap();
        edit.add_new_element("region", Some("10")).unwrap();
        db.commit(edit).unwrap();

        let mut ten = db.checkout("region/10").unwrap();
        ten.set_value("type", "solid", None).unwrap();
        let mut one = db.checkout("region/1").unwrap();
        assert!(matches!(one.commit(ten), Err(StoreError::Lookup { .. })));
    }

    #[test]
    fn cannot_check_out_a_leaf() {
        let db = seeded();
        assert!(matches!(db.checkout("steps"), Err(StoreError::Lookup { .. })));
        assert!(matches!(db.checkout("region/7"), Err(StoreError::Lookup { .. })));
    }
}
