//! Relationship metadata.
//!
//! A relationship declaration describes how records of one schema join to
//! records of another: cardinality, the key pair, the property name the
//! related data is attached under, and an optional per-record map function.
//! Key names left unset are resolved at join time through the naming
//! conventions, never at declaration time, so declarations can be built
//! before the related schema's conventions are known.

use crate::naming::{schema_to_id, schema_to_title};
use crate::record::Record;

/// The cardinality and direction of a relationship between two schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// The owner holds the foreign key; one related record (`brand.category`).
    BelongsTo,
    /// The owner holds the join value; many related records.
    BelongsToMany,
    /// The related schema holds the foreign key; one related record.
    HasOne,
    /// The related schema holds the foreign key; many related records
    /// (`category.brands`).
    HasMany,
}

impl RelationKind {
    /// Whether this relationship attaches a list (true) or a single record.
    pub const fn is_many(self) -> bool {
        matches!(self, RelationKind::BelongsToMany | RelationKind::HasMany)
    }
}

/// Map function applied to each related record before attachment.
pub type RecordMapFn = fn(Record) -> Record;

/// A declared relationship between an owner schema and a child schema.
#[derive(Debug, Clone)]
pub struct RelationDef {
    /// Kind of relationship.
    pub kind: RelationKind,

    /// Schema of the base result set being joined from.
    pub owner_schema: String,

    /// Schema of the related records being joined in.
    pub child_schema: String,

    /// Owner-side join key; conventional default resolved at join time.
    pub owner_key: Option<String>,

    /// Child-side join key; conventional default resolved at join time.
    pub child_key: Option<String>,

    /// Property name the related data is attached under.
    pub attach_as: Option<String>,

    /// Optional map applied to each related record before attachment.
    pub map: Option<RecordMapFn>,
}

impl RelationDef {
    /// Create a new relationship declaration with conventional keys.
    pub fn new(
        kind: RelationKind,
        owner_schema: impl Into<String>,
        child_schema: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            owner_schema: owner_schema.into(),
            child_schema: child_schema.into(),
            owner_key: None,
            child_key: None,
            attach_as: None,
            map: None,
        }
    }

    /// Declare a belongs-to relationship (`brands` -> `categories`).
    pub fn belongs_to(owner: impl Into<String>, child: impl Into<String>) -> Self {
        Self::new(RelationKind::BelongsTo, owner, child)
    }

    /// Declare a belongs-to-many relationship.
    pub fn belongs_to_many(owner: impl Into<String>, child: impl Into<String>) -> Self {
        Self::new(RelationKind::BelongsToMany, owner, child)
    }

    /// Declare a has-one relationship.
    pub fn has_one(owner: impl Into<String>, child: impl Into<String>) -> Self {
        Self::new(RelationKind::HasOne, owner, child)
    }

    /// Declare a has-many relationship (`categories` -> `brands`).
    pub fn has_many(owner: impl Into<String>, child: impl Into<String>) -> Self {
        Self::new(RelationKind::HasMany, owner, child)
    }

    /// Override the owner-side join key.
    #[must_use]
    pub fn owner_key(mut self, key: impl Into<String>) -> Self {
        self.owner_key = Some(key.into());
        self
    }

    /// Override the child-side join key.
    #[must_use]
    pub fn child_key(mut self, key: impl Into<String>) -> Self {
        self.child_key = Some(key.into());
        self
    }

    /// Override the property name the related data is attached under.
    #[must_use]
    pub fn attach_as(mut self, name: impl Into<String>) -> Self {
        self.attach_as = Some(name.into());
        self
    }

    /// Map each related record through `f` before attachment.
    #[must_use]
    pub fn map(mut self, f: RecordMapFn) -> Self {
        self.map = Some(f);
        self
    }

    /// The owner-side key to join on, applying conventions when unset.
    ///
    /// For `has_*` the owner holds the primary key (`id`); for `belongs_*`
    /// the owner holds the child schema's conventional foreign key.
    pub fn resolved_owner_key(&self) -> String {
        if let Some(key) = &self.owner_key {
            return key.clone();
        }
        match self.kind {
            RelationKind::HasOne | RelationKind::HasMany => "id".to_string(),
            RelationKind::BelongsTo | RelationKind::BelongsToMany => {
                schema_to_id(&self.child_schema)
            }
        }
    }

    /// The child-side key to join on, applying conventions when unset.
    pub fn resolved_child_key(&self) -> String {
        if let Some(key) = &self.child_key {
            return key.clone();
        }
        match self.kind {
            RelationKind::HasOne | RelationKind::HasMany => schema_to_id(&self.owner_schema),
            RelationKind::BelongsTo | RelationKind::BelongsToMany => "id".to_string(),
        }
    }

    /// The property name the related data is attached under.
    ///
    /// One-valued relationships default to the child schema's singular form,
    /// many-valued ones to the plural schema name.
    pub fn resolved_attach_name(&self) -> String {
        if let Some(name) = &self.attach_as {
            return name.clone();
        }
        if self.kind.is_many() {
            self.child_schema.clone()
        } else {
            schema_to_title(&self.child_schema)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_many_conventional_keys() {
        let def = RelationDef::has_many("categories", "brands");
        assert_eq!(def.resolved_owner_key(), "id");
        assert_eq!(def.resolved_child_key(), "category_id");
        assert_eq!(def.resolved_attach_name(), "brands");
    }

    #[test]
    fn test_belongs_to_conventional_keys() {
        let def = RelationDef::belongs_to("brands", "categories");
        assert_eq!(def.resolved_owner_key(), "category_id");
        assert_eq!(def.resolved_child_key(), "id");
        assert_eq!(def.resolved_attach_name(), "category");
    }

    #[test]
    fn test_overrides_win_over_conventions() {
        let def = RelationDef::has_one("categories", "brands")
            .owner_key("uid")
            .child_key("cat_uid")
            .attach_as("flagship");
        assert_eq!(def.resolved_owner_key(), "uid");
        assert_eq!(def.resolved_child_key(), "cat_uid");
        assert_eq!(def.resolved_attach_name(), "flagship");
    }

    #[test]
    fn test_one_valued_attach_name_is_singular() {
        let def = RelationDef::has_one("categories", "brands");
        assert_eq!(def.resolved_attach_name(), "brand");
    }

    #[test]
    fn test_is_many() {
        assert!(RelationKind::HasMany.is_many());
        assert!(RelationKind::BelongsToMany.is_many());
        assert!(!RelationKind::HasOne.is_many());
        assert!(!RelationKind::BelongsTo.is_many());
    }
}
