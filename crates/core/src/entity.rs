//! Entity trait: identity, table mapping and declared constraints.

use core::cmp::Ordering;
use core::fmt::{Debug, Display};
use core::hash::Hash;

use uuid::Uuid;

/// A value that must be unique across a table, tagged with the name of the
/// constraint that guards it.
///
/// Constraint names match the Postgres schema so every backend reports the
/// same name on violation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniqueKey {
    pub constraint: &'static str,
    pub value: String,
}

impl UniqueKey {
    pub fn new(constraint: &'static str, value: impl Into<String>) -> Self {
        Self {
            constraint,
            value: value.into(),
        }
    }

    /// Build a composite key from several column values.
    pub fn composite(constraint: &'static str, parts: &[&dyn Display]) -> Self {
        let value = parts
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join("|");
        Self { constraint, value }
    }
}

/// A persisted record.
pub trait Entity: Clone + Debug + Send + Sync + 'static {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + Ord + Hash + Debug + Display + Send + Sync + Into<Uuid> + 'static;

    /// Backing table name.
    const TABLE: &'static str;

    /// Foreign-key columns that [`Entity::reference`] answers for.
    const FOREIGN_KEYS: &'static [&'static str] = &[];

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;

    /// Values this row claims under the table's unique constraints.
    ///
    /// A key that does not apply (e.g. a nullable column that is unset) is
    /// simply omitted.
    fn unique_keys(&self) -> Vec<UniqueKey> {
        Vec::new()
    }

    /// Value of a foreign-key column, if this row has that column set.
    fn reference(&self, _column: &str) -> Option<Uuid> {
        None
    }

    /// Default ordering for listings. By id unless the model declares one.
    fn default_order(&self, other: &Self) -> Ordering {
        self.id().cmp(&other.id())
    }
}
