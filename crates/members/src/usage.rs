use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sampleshop_catalog::{ProductCategory, ProductCategoryId};
use sampleshop_core::{Entity, UniqueKey, UserId, uuid_id};

uuid_id!(UserProductUsageId, "UserProductUsageId");

/// How much of a product category a user goes through per day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProductUsage {
    #[serde(default)]
    pub id: UserProductUsageId,
    pub user: UserId,
    pub category: ProductCategoryId,
    pub daily_amount_used: u32,
    #[serde(default)]
    pub unit: String,
}

impl UserProductUsage {
    pub fn new(
        user: UserId,
        category: ProductCategoryId,
        daily_amount_used: u32,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            id: UserProductUsageId::new(),
            user,
            category,
            daily_amount_used,
            unit: unit.into(),
        }
    }

    pub fn display_with(&self, category: &ProductCategory) -> String {
        format!(
            "{} daily {} usage: {} {}",
            self.user, category.name, self.daily_amount_used, self.unit
        )
    }
}

impl Entity for UserProductUsage {
    type Id = UserProductUsageId;
    const TABLE: &'static str = "user_product_usages";
    const FOREIGN_KEYS: &'static [&'static str] = &["user_id", "category_id"];

    fn id(&self) -> Self::Id {
        self.id
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::composite(
            "user_product_usages_user_id_category_id_key",
            &[&self.user, &self.category],
        )]
    }

    fn reference(&self, column: &str) -> Option<Uuid> {
        match column {
            "user_id" => Some(self.user.into()),
            "category_id" => Some(self.category.into()),
            _ => None,
        }
    }
}
