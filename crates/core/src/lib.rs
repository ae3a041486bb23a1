//! `sampleshop-core`: shared building blocks for the shop domain crates.
//!
//! This crate contains **pure domain** primitives (no storage or IO concerns).

pub mod entity;
pub mod error;
pub mod id;

pub use entity::{Entity, UniqueKey};
pub use error::{DomainError, DomainResult};
pub use id::UserId;

// Re-exported so `uuid_id!` expands without callers naming `uuid` themselves.
#[doc(hidden)]
pub use uuid as __uuid;
