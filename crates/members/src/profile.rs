use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sampleshop_catalog::ProductId;
use sampleshop_core::{Entity, UniqueKey, UserId, uuid_id};

use crate::recommendation::Recommendation;

uuid_id!(ProfileId, "ProfileId");

/// Stored as a boolean column (`true` = male).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    pub fn as_bool(self) -> bool {
        self == Gender::Male
    }

    pub fn from_bool(male: bool) -> Self {
        if male { Gender::Male } else { Gender::Female }
    }
}

/// Shop-side preferences of a user. At most one per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub id: ProfileId,
    pub user: UserId,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub contact: String,
    pub birthday: NaiveDate,
    #[serde(default)]
    pub favorite_products: Vec<ProductId>,
}

impl Profile {
    pub fn new(user: UserId, gender: Gender, birthday: NaiveDate) -> Self {
        Self {
            id: ProfileId::new(),
            user,
            gender,
            contact: String::new(),
            birthday,
            favorite_products: Vec::new(),
        }
    }

    pub fn add_favorite(&mut self, product: ProductId) {
        if !self.favorite_products.contains(&product) {
            self.favorite_products.push(product);
        }
    }

    /// The user's dated recommendations, ordered by category.
    ///
    /// Undated (pending) recommendations are not part of a report.
    pub fn reports(&self, recommendations: &[Recommendation]) -> Vec<Recommendation> {
        let mut reports: Vec<_> = recommendations
            .iter()
            .filter(|r| r.user == self.user && r.date.is_some())
            .cloned()
            .collect();
        reports.sort_by(|a, b| a.category.cmp(&b.category).then(a.date.cmp(&b.date)));
        reports
    }
}

impl core::fmt::Display for Profile {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "profile of {}", self.user)
    }
}

impl Entity for Profile {
    type Id = ProfileId;
    const TABLE: &'static str = "profiles";
    const FOREIGN_KEYS: &'static [&'static str] = &["user_id"];

    fn id(&self) -> Self::Id {
        self.id
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new("profiles_user_id_key", self.user.to_string())]
    }

    fn reference(&self, column: &str) -> Option<Uuid> {
        (column == "user_id").then(|| self.user.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sampleshop_catalog::ProductCategoryId;

    fn birthday() -> NaiveDate {
        NaiveDate::from_ymd_opt(1990, 4, 1).unwrap()
    }

    #[test]
    fn gender_maps_to_the_boolean_column() {
        assert!(Gender::Male.as_bool());
        assert_eq!(Gender::from_bool(false), Gender::Female);
        assert_eq!(Gender::default(), Gender::Male);
    }

    #[test]
    fn one_profile_per_user_key() {
        let user = UserId::new();
        let a = Profile::new(user, Gender::Female, birthday());
        let b = Profile::new(user, Gender::Male, birthday());
        assert_eq!(a.unique_keys(), b.unique_keys());
    }

    #[test]
    fn favorites_are_deduplicated() {
        let mut profile = Profile::new(UserId::new(), Gender::Male, birthday());
        let product = ProductId::new();
        profile.add_favorite(product);
        profile.add_favorite(product);
        assert_eq!(profile.favorite_products, vec![product]);
    }

    #[test]
    fn reports_keep_dated_recommendations_of_the_user() {
        let user = UserId::new();
        let profile = Profile::new(user, Gender::Female, birthday());
        let (lotion, toner) = {
            let a = ProductCategoryId::new();
            let b = ProductCategoryId::new();
            if a < b { (a, b) } else { (b, a) }
        };
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        let recommendations = vec![
            Recommendation::new(user, toner, Some(day)),
            Recommendation::new(user, lotion, None),
            Recommendation::new(user, lotion, Some(day.succ_opt().unwrap())),
            Recommendation::new(UserId::new(), lotion, Some(day)),
        ];

        let reports = profile.reports(&recommendations);
        let categories: Vec<_> = reports.iter().map(|r| r.category).collect();
        assert_eq!(categories, vec![lotion, toner]);
    }
}
