//! Catalog domain module.
//!
//! Categories, products, specifications and the keyword / filter-tag
//! taxonomy. Everything here is deterministic domain logic (no IO, no
//! storage); write-time checks that need other rows take them as arguments.

pub mod category;
pub mod filter_tag;
pub mod keyword;
pub mod product;
pub mod specification;

pub use category::{ProductCategory, ProductCategoryId};
pub use filter_tag::{FilterTag, FilterTagId, FilterTagKind};
pub use keyword::{Keyword, KeywordId, KeywordKind, ProductKeyword, ProductKeywordId};
pub use product::{BaseProduct, Product, ProductId};
pub use specification::{ProductSpecification, ProductSpecificationId};

use sampleshop_core::{DomainError, DomainResult};

/// Shared check for required name-like columns.
pub(crate) fn require_non_empty(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(())
}
