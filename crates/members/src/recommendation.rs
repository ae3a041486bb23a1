use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sampleshop_catalog::{Product, ProductCategory, ProductCategoryId, ProductId};
use sampleshop_core::{DomainError, DomainResult, Entity, UniqueKey, UserId, uuid_id};

uuid_id!(RecommendationId, "RecommendationId");

/// Placeholder rendered wherever a schedule value is unavailable.
const UNAVAILABLE: &str = "-";

/// When a recommended product was bought and when the user should be
/// reminded to restock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumptionSchedule {
    pub purchase_date: NaiveDate,
    pub days_to_use: u32,
    pub days_remaining: u32,
    pub date_to_alert: NaiveDate,
    pub remaining_days_to_alert: u32,
}

/// A per-user, per-date product suggestion for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default)]
    pub id: RecommendationId,
    pub user: UserId,
    pub category: ProductCategoryId,
    /// Unset while the recommendation is still pending.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub products: Vec<ProductId>,
    #[serde(default)]
    pub is_alerted: bool,
    #[serde(default)]
    pub is_recommended: bool,
}

impl Recommendation {
    pub fn new(user: UserId, category: ProductCategoryId, date: Option<NaiveDate>) -> Self {
        Self {
            id: RecommendationId::new(),
            user,
            category,
            date,
            comment: String::new(),
            products: Vec::new(),
            is_alerted: false,
            is_recommended: false,
        }
    }

    pub fn add_product(&mut self, product: ProductId) {
        if !self.products.contains(&product) {
            self.products.push(product);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.date.is_none()
    }

    /// Restock schedule derived from purchase history.
    ///
    /// No rule for this exists yet, so it always reports `NotImplemented`.
    pub fn schedule(&self) -> DomainResult<ConsumptionSchedule> {
        Err(DomainError::NotImplemented("recommendation consumption schedule"))
    }

    pub fn alert_date_display(&self) -> String {
        self.schedule()
            .map(|s| s.date_to_alert.to_string())
            .unwrap_or_else(|_| UNAVAILABLE.to_string())
    }

    pub fn remaining_days_display(&self) -> String {
        self.schedule()
            .map(|s| s.days_remaining.to_string())
            .unwrap_or_else(|_| UNAVAILABLE.to_string())
    }

    /// Names of the recommended products, one per line, in link order.
    pub fn products_display(&self, products: &[Product]) -> String {
        self.products
            .iter()
            .filter_map(|id| products.iter().find(|p| p.id == *id))
            .map(|p| p.name())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn display_with(&self, category: &ProductCategory) -> String {
        match self.date {
            Some(date) => format!(
                "{} {} recommendation (recommended {})",
                self.user, category.name, date
            ),
            None => format!("{} {} recommendation (pending)", self.user, category.name),
        }
    }
}

impl Entity for Recommendation {
    type Id = RecommendationId;
    const TABLE: &'static str = "recommendations";
    const FOREIGN_KEYS: &'static [&'static str] = &["user_id", "category_id"];

    fn id(&self) -> Self::Id {
        self.id
    }

    // NULL dates never collide, matching the SQL unique constraint.
    fn unique_keys(&self) -> Vec<UniqueKey> {
        match self.date {
            Some(date) => vec![UniqueKey::composite(
                "recommendations_user_id_date_key",
                &[&self.user, &date],
            )],
            None => Vec::new(),
        }
    }

    fn reference(&self, column: &str) -> Option<Uuid> {
        match column {
            "user_id" => Some(self.user.into()),
            "category_id" => Some(self.category.into()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
    }

    #[test]
    fn schedule_is_explicitly_unimplemented() {
        let rec = Recommendation::new(UserId::new(), ProductCategoryId::new(), Some(day()));
        assert!(matches!(rec.schedule(), Err(DomainError::NotImplemented(_))));
        assert_eq!(rec.alert_date_display(), "-");
        assert_eq!(rec.remaining_days_display(), "-");
    }

    #[test]
    fn undated_recommendations_claim_no_unique_key() {
        let user = UserId::new();
        let pending = Recommendation::new(user, ProductCategoryId::new(), None);
        assert!(pending.unique_keys().is_empty());
        assert!(pending.is_pending());

        let a = Recommendation::new(user, ProductCategoryId::new(), Some(day()));
        let b = Recommendation::new(user, ProductCategoryId::new(), Some(day()));
        assert_eq!(a.unique_keys(), b.unique_keys());
    }

    #[test]
    fn display_reflects_pending_state() {
        let category = ProductCategory::new("Toner");
        let mut rec = Recommendation::new(UserId::new(), category.id, None);
        assert!(rec.display_with(&category).ends_with("Toner recommendation (pending)"));
        rec.date = Some(day());
        assert!(
            rec.display_with(&category)
                .ends_with("Toner recommendation (recommended 2024-05-20)")
        );
    }

    #[test]
    fn products_display_lists_names() {
        let category = ProductCategory::new("Toner");
        let a = Product::new(category.id, "Green Tea Toner", 1);
        let b = Product::new(category.id, "Rose Toner", 1);
        let mut rec = Recommendation::new(UserId::new(), category.id, None);
        rec.add_product(b.id);
        rec.add_product(a.id);
        assert_eq!(rec.products_display(&[a, b]), "Rose Toner\nGreen Tea Toner");
    }

    #[test]
    fn fixture_defaults_to_pending() {
        let json = format!(
            r#"{{"user":"{}","category":"{}"}}"#,
            UserId::new(),
            ProductCategoryId::new()
        );
        let rec: Recommendation = serde_json::from_str(&json).unwrap();
        assert!(rec.is_pending());
        assert!(!rec.is_recommended);
    }
}
