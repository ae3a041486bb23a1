use serde::{Deserialize, Serialize};

use sampleshop_core::{DomainResult, Entity, uuid_id};

uuid_id!(
    /// Product category identifier.
    ProductCategoryId,
    "ProductCategoryId"
);

/// A product category (e.g. "toner", "sunscreen").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCategory {
    #[serde(default)]
    pub id: ProductCategoryId,
    pub name: String,
}

impl ProductCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ProductCategoryId::new(),
            name: name.into(),
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        crate::require_non_empty("category name", &self.name)
    }

    /// Case-insensitive substring match on the name, used by admin autocomplete.
    pub fn matches_search(&self, term: &str) -> bool {
        self.name.to_lowercase().contains(&term.trim().to_lowercase())
    }
}

impl core::fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.name)
    }
}

impl Entity for ProductCategory {
    type Id = ProductCategoryId;
    const TABLE: &'static str = "product_categories";

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_is_rejected() {
        let category = ProductCategory::new("   ");
        assert!(category.validate().unwrap_err().is_validation());
    }

    #[test]
    fn search_ignores_case() {
        let category = ProductCategory::new("Sun Cream");
        assert!(category.matches_search("sun"));
        assert!(category.matches_search("CREAM"));
        assert!(!category.matches_search("toner"));
    }

    #[test]
    fn display_is_the_name() {
        assert_eq!(ProductCategory::new("Toner").to_string(), "Toner");
    }
}
