//! Record storage abstractions.
//!
//! One repository per table. Backends enforce the unique keys declared by
//! [`Entity::unique_keys`] and report violations with the constraint name.

use thiserror::Error;
use uuid::Uuid;

use sampleshop_core::Entity;

pub mod in_memory;
pub mod postgres;
mod rows;

pub use in_memory::InMemoryRepository;
pub use postgres::{PgRecord, PostgresRepository};

/// Storage error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("uniqueness violation on {table}: {constraint}")]
    UniquenessViolation {
        table: &'static str,
        constraint: String,
    },

    /// A foreign key rejected the write, e.g. deleting a row still in use.
    #[error("foreign key violation on {table}: {constraint}")]
    ForeignKeyViolation {
        table: &'static str,
        constraint: String,
    },

    /// Filtering by a column the table does not have.
    #[error("unknown column {column} on {table}")]
    UnknownColumn {
        table: &'static str,
        column: &'static str,
    },

    #[error("storage error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_uniqueness_violation(&self) -> bool {
        matches!(self, Self::UniquenessViolation { .. })
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self, Self::ForeignKeyViolation { .. })
    }
}

/// Table-level storage for one entity type.
#[async_trait::async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// Insert the record, or replace the row with the same id.
    async fn save(&self, record: E) -> Result<E, StoreError>;

    async fn get(&self, id: E::Id) -> Result<Option<E>, StoreError>;

    /// All rows in the entity's default order.
    async fn list(&self) -> Result<Vec<E>, StoreError>;

    /// Rows whose foreign-key `column` equals `value`, in default order.
    async fn filter_by(&self, column: &'static str, value: Uuid) -> Result<Vec<E>, StoreError>;

    /// Returns whether a row was removed. Rows in other tables that point at
    /// it are the caller's concern.
    async fn delete(&self, id: E::Id) -> Result<bool, StoreError>;
}

/// Reject filters on columns the entity does not declare as foreign keys.
pub(crate) fn check_column<E: Entity>(column: &'static str) -> Result<(), StoreError> {
    if E::FOREIGN_KEYS.contains(&column) {
        Ok(())
    } else {
        Err(StoreError::UnknownColumn {
            table: E::TABLE,
            column,
        })
    }
}
