use core::cmp::Ordering;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sampleshop_core::{DomainResult, Entity, uuid_id};

use crate::product::{Product, ProductId};

uuid_id!(ProductSpecificationId, "ProductSpecificationId");

/// One named line of a product's spec sheet (volume, ingredients, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSpecification {
    #[serde(default)]
    pub id: ProductSpecificationId,
    pub product: ProductId,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub sort_order: u32,
}

impl ProductSpecification {
    pub fn new(
        product: ProductId,
        name: impl Into<String>,
        description: impl Into<String>,
        sort_order: u32,
    ) -> Self {
        Self {
            id: ProductSpecificationId::new(),
            product,
            name: name.into(),
            description: description.into(),
            sort_order,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        crate::require_non_empty("specification name", &self.name)
    }

    /// `"<product name>: <name>"`.
    pub fn display_with(&self, product: &Product) -> String {
        format!("{}: {}", product.name(), self.name)
    }
}

impl Entity for ProductSpecification {
    type Id = ProductSpecificationId;
    const TABLE: &'static str = "product_specifications";
    const FOREIGN_KEYS: &'static [&'static str] = &["product_id"];

    fn id(&self) -> Self::Id {
        self.id
    }

    fn reference(&self, column: &str) -> Option<Uuid> {
        (column == "product_id").then(|| self.product.into())
    }

    fn default_order(&self, other: &Self) -> Ordering {
        self.sort_order
            .cmp(&other.sort_order)
            .then_with(|| self.id.cmp(&other.id))
    }
}
