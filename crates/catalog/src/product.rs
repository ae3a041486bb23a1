use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sampleshop_core::{DomainError, DomainResult, Entity, UniqueKey, uuid_id};

use crate::category::{ProductCategory, ProductCategoryId};
use crate::filter_tag::{FilterTag, FilterTagId};

uuid_id!(
    /// Product identifier.
    ProductId,
    "ProductId"
);

fn default_capacity_unit() -> String {
    "ml".to_string()
}

fn default_true() -> bool {
    true
}

/// Fields every sellable item carries, independent of the skincare catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseProduct {
    pub name: String,
    /// Regenerated on every save; never stable across saves.
    #[serde(default)]
    pub slug: String,
    /// Price in won.
    #[serde(default)]
    pub unit_price: i64,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub date_added: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
}

impl BaseProduct {
    pub fn new(name: impl Into<String>, unit_price: i64) -> Self {
        Self {
            name: name.into(),
            slug: String::new(),
            unit_price,
            active: true,
            date_added: None,
            last_modified: None,
        }
    }
}

/// A skincare product: the base sellable item plus catalog attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub id: ProductId,
    #[serde(flatten)]
    pub base: BaseProduct,
    pub category: ProductCategoryId,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default = "default_capacity_unit")]
    pub capacity_unit: String,
    /// Default number of days one unit lasts.
    #[serde(default)]
    pub days_to_consume: Option<u32>,
    #[serde(default)]
    pub review_counts: u32,
    /// Must reference a brand-type filter tag.
    #[serde(default)]
    pub brand: Option<FilterTagId>,
    #[serde(default)]
    pub is_sold_out: bool,
}

impl Product {
    pub fn new(category: ProductCategoryId, name: impl Into<String>, unit_price: i64) -> Self {
        Self {
            id: ProductId::new(),
            base: BaseProduct::new(name, unit_price),
            category,
            description: String::new(),
            capacity: None,
            capacity_unit: default_capacity_unit(),
            days_to_consume: None,
            review_counts: 0,
            brand: None,
            is_sold_out: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.base.name
    }

    pub fn slug(&self) -> &str {
        &self.base.slug
    }

    pub fn with_capacity(mut self, capacity: u32, unit: impl Into<String>) -> Self {
        self.capacity = Some(capacity);
        self.capacity_unit = unit.into();
        self
    }

    /// Replace the slug with a fresh random UUID.
    pub fn regenerate_slug(&mut self) {
        self.base.slug = Uuid::new_v4().to_string();
    }

    /// Stamp save timestamps: `date_added` once, `last_modified` every time.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.base.date_added.get_or_insert(now);
        self.base.last_modified = Some(now);
    }

    pub fn validate(&self) -> DomainResult<()> {
        crate::require_non_empty("product name", &self.base.name)?;
        if self.base.unit_price < 0 {
            return Err(DomainError::validation("unit price cannot be negative"));
        }
        Ok(())
    }

    /// Check the brand reference against the resolved tag row.
    ///
    /// `brand` must be the row `self.brand` points at (or `None` when unset).
    pub fn validate_brand(&self, brand: Option<&FilterTag>) -> DomainResult<()> {
        match (self.brand, brand) {
            (None, _) => Ok(()),
            (Some(id), None) => Err(DomainError::not_found("filter tag", id)),
            (Some(id), Some(tag)) if tag.id != id => Err(DomainError::validation(
                "brand tag does not match the product's brand reference",
            )),
            (Some(_), Some(tag)) if !tag.is_brand() => Err(DomainError::validation(format!(
                "filter tag '{}' is not a brand",
                tag.name
            ))),
            _ => Ok(()),
        }
    }

    /// `"<capacity> <unit>"`, or `None` when no capacity is recorded.
    pub fn capacity_display(&self) -> Option<String> {
        self.capacity
            .map(|capacity| format!("{} {}", capacity, self.capacity_unit))
    }

    /// Price per capacity unit, truncated to whole won: `"<price> 원/<unit>"`.
    ///
    /// `None` when capacity is unset or zero.
    pub fn price_per_unit(&self) -> Option<String> {
        let capacity = i64::from(self.capacity.filter(|c| *c > 0)?);
        Some(format!(
            "{} 원/{}",
            self.base.unit_price / capacity,
            self.capacity_unit
        ))
    }

    /// `"<category>: <name>"`.
    pub fn display_with(&self, category: &ProductCategory) -> String {
        format!("{}: {}", category, self.base.name)
    }
}

impl Entity for Product {
    type Id = ProductId;
    const TABLE: &'static str = "products";
    const FOREIGN_KEYS: &'static [&'static str] = &["category_id", "brand_id"];

    fn id(&self) -> Self::Id {
        self.id
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        if self.base.slug.is_empty() {
            return Vec::new();
        }
        vec![UniqueKey::new("products_slug_key", self.base.slug.clone())]
    }

    fn reference(&self, column: &str) -> Option<Uuid> {
        match column {
            "category_id" => Some(self.category.into()),
            "brand_id" => self.brand.map(Into::into),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter_tag::FilterTagKind;

    fn sample_product() -> Product {
        Product::new(ProductCategoryId::new(), "Green Tea Toner", 10_000)
    }

    #[test]
    fn price_per_unit_truncates() {
        let product = sample_product().with_capacity(50, "ml");
        assert_eq!(product.price_per_unit().as_deref(), Some("200 원/ml"));

        let product = Product::new(ProductCategoryId::new(), "Serum", 10_001).with_capacity(3, "g");
        assert_eq!(product.price_per_unit().as_deref(), Some("3333 원/g"));
    }

    #[test]
    fn price_per_unit_needs_capacity() {
        assert_eq!(sample_product().price_per_unit(), None);
        assert_eq!(sample_product().with_capacity(0, "ml").price_per_unit(), None);
    }

    #[test]
    fn capacity_display_formats_amount_and_unit() {
        let product = sample_product().with_capacity(150, "ml");
        assert_eq!(product.capacity_display().as_deref(), Some("150 ml"));
        assert_eq!(sample_product().capacity_display(), None);
    }

    #[test]
    fn regenerate_slug_always_changes_it() {
        let mut product = sample_product();
        product.regenerate_slug();
        let first = product.slug().to_string();
        product.regenerate_slug();
        assert_ne!(first, product.slug());
        assert!(Uuid::parse_str(product.slug()).is_ok());
    }

    #[test]
    fn touch_keeps_date_added() {
        let mut product = sample_product();
        let first = Utc::now();
        product.touch(first);
        let later = first + chrono::Duration::seconds(5);
        product.touch(later);
        assert_eq!(product.base.date_added, Some(first));
        assert_eq!(product.base.last_modified, Some(later));
    }

    #[test]
    fn brand_must_be_brand_type() {
        let concern = FilterTag::new("Acne", FilterTagKind::SkinConcern);
        let brand = FilterTag::new("Acme", FilterTagKind::Brand);

        let mut product = sample_product();
        assert!(product.validate_brand(None).is_ok());

        product.brand = Some(concern.id);
        assert!(product.validate_brand(Some(&concern)).unwrap_err().is_validation());

        product.brand = Some(brand.id);
        assert!(product.validate_brand(Some(&brand)).is_ok());
        assert!(matches!(
            product.validate_brand(None),
            Err(DomainError::NotFound { .. })
        ));
    }

    #[test]
    fn display_with_category() {
        let category = ProductCategory::new("Toner");
        let product = Product::new(category.id, "Green Tea Toner", 1);
        assert_eq!(product.display_with(&category), "Toner: Green Tea Toner");
    }

    #[test]
    fn fixture_defaults_apply() {
        let category = ProductCategoryId::new();
        let json = format!(r#"{{"name":"Balm","category":"{category}"}}"#);
        let product: Product = serde_json::from_str(&json).unwrap();
        assert_eq!(product.capacity_unit, "ml");
        assert!(product.base.active);
        assert!(product.slug().is_empty());
        assert!(product.unique_keys().is_empty());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: price per unit is the truncated quotient.
            #[test]
            fn price_per_unit_is_integer_quotient(
                price in 0i64..10_000_000,
                capacity in 1u32..5_000,
            ) {
                let mut product = sample_product().with_capacity(capacity, "ml");
                product.base.unit_price = price;
                let expected = format!("{} 원/ml", price / i64::from(capacity));
                prop_assert_eq!(product.price_per_unit(), Some(expected));
            }
        }
    }
}
