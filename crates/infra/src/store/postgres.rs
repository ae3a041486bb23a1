//! Postgres-backed tables.
//!
//! Each entity describes its own column list, binding and row decoding via
//! [`PgRecord`]; the repository builds the statements from that.
//!
//! ## Error Mapping
//!
//! | SQLx error | SQLSTATE | StoreError |
//! |------------|----------|------------|
//! | Database (unique violation) | `23505` | `UniquenessViolation` (constraint name from the server) |
//! | Database (other) | any | `Backend` |
//! | Anything else | n/a | `Backend` |

use std::marker::PhantomData;
use std::sync::Arc;

use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{PgPool, Postgres};
use tracing::instrument;
use uuid::Uuid;

use sampleshop_core::Entity;

use super::{Repository, StoreError, check_column};

/// A query with its positional arguments still being bound.
pub type PgQuery<'q> = sqlx::query::Query<'q, Postgres, PgArguments>;

/// Column mapping of an entity onto its table.
pub trait PgRecord: Entity {
    /// Column names, primary key first. Bind order must match.
    const COLUMNS: &'static [&'static str];

    /// `ORDER BY` clause used for listings.
    const ORDER_BY: &'static str = "id";

    /// Bind every column value, in [`PgRecord::COLUMNS`] order.
    fn bind_values<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q>;

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error>;
}

/// Postgres table for one entity type.
#[derive(Debug)]
pub struct PostgresRepository<E> {
    pool: Arc<PgPool>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for PostgresRepository<E> {
    fn clone(&self) -> Self {
        Self {
            pool: Arc::clone(&self.pool),
            _entity: PhantomData,
        }
    }
}

impl<E: PgRecord> PostgresRepository<E> {
    pub fn new(pool: PgPool) -> Self {
        Self::shared(Arc::new(pool))
    }

    pub fn shared(pool: Arc<PgPool>) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    fn column_list() -> String {
        E::COLUMNS.join(", ")
    }

    fn upsert_sql() -> String {
        let placeholders = (1..=E::COLUMNS.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let updates = E::COLUMNS
            .iter()
            .skip(1)
            .map(|c| format!("{c} = EXCLUDED.{c}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {table} ({cols}) VALUES ({placeholders}) \
             ON CONFLICT (id) DO UPDATE SET {updates} RETURNING {cols}",
            table = E::TABLE,
            cols = Self::column_list(),
        )
    }

    fn decode_all(rows: Vec<PgRow>) -> Result<Vec<E>, StoreError> {
        rows.iter()
            .map(|row| E::from_row(row).map_err(|e| map_sqlx_error(E::TABLE, "decode", e)))
            .collect()
    }
}

#[async_trait::async_trait]
impl<E: PgRecord> Repository<E> for PostgresRepository<E> {
    #[instrument(skip(self, record), fields(table = E::TABLE, id = %record.id()), err)]
    async fn save(&self, record: E) -> Result<E, StoreError> {
        let sql = Self::upsert_sql();
        let row = record
            .bind_values(sqlx::query(&sql))
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(E::TABLE, "save", e))?;
        E::from_row(&row).map_err(|e| map_sqlx_error(E::TABLE, "decode", e))
    }

    #[instrument(skip(self), fields(table = E::TABLE), err)]
    async fn get(&self, id: E::Id) -> Result<Option<E>, StoreError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1",
            Self::column_list(),
            E::TABLE
        );
        let row = sqlx::query(&sql)
            .bind(Into::<Uuid>::into(id))
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(E::TABLE, "get", e))?;
        row.map(|r| E::from_row(&r).map_err(|e| map_sqlx_error(E::TABLE, "decode", e)))
            .transpose()
    }

    #[instrument(skip(self), fields(table = E::TABLE), err)]
    async fn list(&self) -> Result<Vec<E>, StoreError> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY {}",
            Self::column_list(),
            E::TABLE,
            E::ORDER_BY
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(E::TABLE, "list", e))?;
        Self::decode_all(rows)
    }

    #[instrument(skip(self), fields(table = E::TABLE), err)]
    async fn filter_by(&self, column: &'static str, value: Uuid) -> Result<Vec<E>, StoreError> {
        // Only declared columns ever reach the SQL text.
        check_column::<E>(column)?;
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = $1 ORDER BY {}",
            Self::column_list(),
            E::TABLE,
            column,
            E::ORDER_BY
        );
        let rows = sqlx::query(&sql)
            .bind(value)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(E::TABLE, "filter_by", e))?;
        Self::decode_all(rows)
    }

    #[instrument(skip(self), fields(table = E::TABLE), err)]
    async fn delete(&self, id: E::Id) -> Result<bool, StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", E::TABLE);
        let result = sqlx::query(&sql)
            .bind(Into::<Uuid>::into(id))
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(E::TABLE, "delete", e))?;
        Ok(result.rows_affected() > 0)
    }
}

fn map_sqlx_error(table: &'static str, operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            match db_err.code().as_deref() {
                Some("23505") => return StoreError::UniquenessViolation { table, constraint },
                Some("23503") => return StoreError::ForeignKeyViolation { table, constraint },
                _ => {}
            }
            StoreError::Backend(format!(
                "database error in {table}.{operation}: {}",
                db_err.message()
            ))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {table}.{operation}"))
        }
        other => StoreError::Backend(format!("sqlx error in {table}.{operation}: {other}")),
    }
}
