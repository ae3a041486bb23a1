//! JSON fixtures, loaded through the validating write path.
//!
//! Sections are loaded in dependency order, so a fixture may list rows in
//! any section order as long as every reference resolves.

use serde::{Deserialize, Serialize};
use tracing::info;

use sampleshop_catalog::{
    FilterTag, Keyword, Product, ProductCategory, ProductKeyword, ProductSpecification,
};
use sampleshop_members::{Profile, Recommendation, UserProductUsage};
use sampleshop_survey::{Survey, SurveyQuestion, SurveyQuestionItem, SurveyResult};

use crate::shop::{Shop, ShopError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fixture {
    pub categories: Vec<ProductCategory>,
    pub filter_tags: Vec<FilterTag>,
    pub keywords: Vec<Keyword>,
    pub products: Vec<Product>,
    pub specifications: Vec<ProductSpecification>,
    pub product_keywords: Vec<ProductKeyword>,
    pub surveys: Vec<Survey>,
    pub questions: Vec<SurveyQuestion>,
    pub question_items: Vec<SurveyQuestionItem>,
    pub results: Vec<SurveyResult>,
    pub profiles: Vec<Profile>,
    pub usages: Vec<UserProductUsage>,
    pub recommendations: Vec<Recommendation>,
}

/// Row counts per loaded section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FixtureSummary {
    pub catalog: usize,
    pub survey: usize,
    pub members: usize,
}

impl FixtureSummary {
    pub fn total(&self) -> usize {
        self.catalog + self.survey + self.members
    }
}

impl Fixture {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Save every row through `shop`. Stops at the first rejected row; rows
    /// saved before it stay saved.
    pub async fn load_into(self, shop: &Shop) -> Result<FixtureSummary, ShopError> {
        let mut summary = FixtureSummary::default();

        for row in self.categories {
            shop.save_category(row).await?;
            summary.catalog += 1;
        }
        for row in self.filter_tags {
            shop.save_filter_tag(row).await?;
            summary.catalog += 1;
        }
        for row in self.keywords {
            shop.save_keyword(row).await?;
            summary.catalog += 1;
        }
        for row in self.products {
            shop.save_product(row).await?;
            summary.catalog += 1;
        }
        for row in self.specifications {
            shop.save_specification(row).await?;
            summary.catalog += 1;
        }
        for row in self.product_keywords {
            shop.save_product_keyword(row).await?;
            summary.catalog += 1;
        }

        for row in self.surveys {
            shop.save_survey(row).await?;
            summary.survey += 1;
        }
        for row in self.questions {
            shop.save_question(row).await?;
            summary.survey += 1;
        }
        for row in self.question_items {
            shop.save_question_item(row).await?;
            summary.survey += 1;
        }
        for row in self.results {
            shop.save_result(row).await?;
            summary.survey += 1;
        }

        for row in self.profiles {
            shop.save_profile(row).await?;
            summary.members += 1;
        }
        for row in self.usages {
            shop.save_usage(row).await?;
            summary.members += 1;
        }
        for row in self.recommendations {
            shop.save_recommendation(row).await?;
            summary.members += 1;
        }

        info!(
            catalog = summary.catalog,
            survey = summary.survey,
            members = summary.members,
            "fixture loaded"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATEGORY: &str = "0190a5a0-0000-7000-8000-000000000001";
    const BRAND: &str = "0190a5a0-0000-7000-8000-000000000002";
    const PRODUCT: &str = "0190a5a0-0000-7000-8000-000000000003";
    const QUESTION: &str = "0190a5a0-0000-7000-8000-000000000004";

    fn fixture_json() -> String {
        format!(
            r#"{{
                "products": [{{
                    "id": "{PRODUCT}", "name": "Rose Toner", "unit_price": 12000,
                    "category": "{CATEGORY}", "capacity": 200, "brand": "{BRAND}"
                }}],
                "categories": [{{ "id": "{CATEGORY}", "name": "Toner" }}],
                "filter_tags": [{{ "id": "{BRAND}", "name": "Acme", "type": "brand" }}],
                "questions": [{{ "id": "{QUESTION}", "content": "Skin type?", "type": "single_choice" }}],
                "question_items": [{{ "question": "{QUESTION}", "content": "Dry" }}]
            }}"#
        )
    }

    #[tokio::test]
    async fn loads_sections_in_dependency_order() {
        let shop = Shop::in_memory();
        let fixture = Fixture::from_json(&fixture_json()).unwrap();
        let summary = fixture.load_into(&shop).await.unwrap();

        assert_eq!(summary.catalog, 3);
        assert_eq!(summary.survey, 2);
        assert_eq!(summary.total(), 5);

        let product = shop.products().require(PRODUCT.parse().unwrap()).await.unwrap();
        assert!(!product.slug().is_empty());
        assert_eq!(product.capacity_unit, "ml");
    }

    #[tokio::test]
    async fn rejected_row_stops_loading() {
        let shop = Shop::in_memory();
        let json = format!(
            r#"{{
                "questions": [{{ "id": "{QUESTION}", "content": "Describe", "type": "free_text" }}],
                "question_items": [{{ "question": "{QUESTION}", "content": "Dry" }}]
            }}"#
        );
        let err = Fixture::from_json(&json)
            .unwrap()
            .load_into(&shop)
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(shop.question_items().list().await.unwrap().is_empty());
    }

    #[test]
    fn empty_object_is_an_empty_fixture() {
        assert_eq!(Fixture::from_json("{}").unwrap(), Fixture::default());
    }
}
