//! Infrastructure layer: storage backends, schema, configuration and the
//! validating write path.

pub mod config;
pub mod fixture;
pub mod schema;
pub mod shop;
pub mod store;


pub use config::{ConfigError, ShopConfig};
pub use fixture::{Fixture, FixtureSummary};
pub use shop::{Records, Shop, ShopError};
pub use store::{InMemoryRepository, PgRecord, PostgresRepository, Repository, StoreError};
