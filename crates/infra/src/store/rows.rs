//! Column mappings for every persisted entity.
//!
//! `u32` domain fields live in BIGINT columns and are range-checked on the
//! way back out. Kind enums are stored as their snake_case names.

use core::str::FromStr;

use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use sampleshop_catalog::{
    BaseProduct, FilterTag, Keyword, Product, ProductCategory, ProductKeyword,
    ProductSpecification,
};
use sampleshop_members::{Gender, Profile, Recommendation, UserProductUsage};
use sampleshop_survey::{QuestionType, Survey, SurveyQuestion, SurveyQuestionItem, SurveyResult};

use super::postgres::{PgQuery, PgRecord};

fn decode_error(
    column: &str,
    source: impl std::error::Error + Send + Sync + 'static,
) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(source),
    }
}

fn get_u32(row: &PgRow, column: &str) -> Result<u32, sqlx::Error> {
    let value: i64 = row.try_get(column)?;
    u32::try_from(value).map_err(|e| decode_error(column, e))
}

fn get_opt_u32(row: &PgRow, column: &str) -> Result<Option<u32>, sqlx::Error> {
    let value: Option<i64> = row.try_get(column)?;
    value
        .map(|v| u32::try_from(v).map_err(|e| decode_error(column, e)))
        .transpose()
}

fn get_id<T: From<Uuid>>(row: &PgRow, column: &str) -> Result<T, sqlx::Error> {
    Ok(T::from(row.try_get::<Uuid, _>(column)?))
}

fn get_opt_id<T: From<Uuid>>(row: &PgRow, column: &str) -> Result<Option<T>, sqlx::Error> {
    Ok(row.try_get::<Option<Uuid>, _>(column)?.map(T::from))
}

fn get_ids<T: From<Uuid>>(row: &PgRow, column: &str) -> Result<Vec<T>, sqlx::Error> {
    Ok(row
        .try_get::<Vec<Uuid>, _>(column)?
        .into_iter()
        .map(T::from)
        .collect())
}

fn get_parsed<T>(row: &PgRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e| decode_error(column, e))
}

fn uuids<T: Copy + Into<Uuid>>(ids: &[T]) -> Vec<Uuid> {
    ids.iter().map(|id| (*id).into()).collect()
}

impl PgRecord for ProductCategory {
    const COLUMNS: &'static [&'static str] = &["id", "name"];

    fn bind_values<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query.bind(Uuid::from(self.id)).bind(self.name.clone())
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: get_id(row, "id")?,
            name: row.try_get("name")?,
        })
    }
}

impl PgRecord for Product {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "slug",
        "unit_price",
        "active",
        "date_added",
        "last_modified",
        "category_id",
        "description",
        "capacity",
        "capacity_unit",
        "days_to_consume",
        "review_counts",
        "brand_id",
        "is_sold_out",
    ];

    fn bind_values<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(Uuid::from(self.id))
            .bind(self.base.name.clone())
            .bind(self.base.slug.clone())
            .bind(self.base.unit_price)
            .bind(self.base.active)
            .bind(self.base.date_added)
            .bind(self.base.last_modified)
            .bind(Uuid::from(self.category))
            .bind(self.description.clone())
            .bind(self.capacity.map(i64::from))
            .bind(self.capacity_unit.clone())
            .bind(self.days_to_consume.map(i64::from))
            .bind(i64::from(self.review_counts))
            .bind(self.brand.map(Uuid::from))
            .bind(self.is_sold_out)
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: get_id(row, "id")?,
            base: BaseProduct {
                name: row.try_get("name")?,
                slug: row.try_get("slug")?,
                unit_price: row.try_get("unit_price")?,
                active: row.try_get("active")?,
                date_added: row.try_get("date_added")?,
                last_modified: row.try_get("last_modified")?,
            },
            category: get_id(row, "category_id")?,
            description: row.try_get("description")?,
            capacity: get_opt_u32(row, "capacity")?,
            capacity_unit: row.try_get("capacity_unit")?,
            days_to_consume: get_opt_u32(row, "days_to_consume")?,
            review_counts: get_u32(row, "review_counts")?,
            brand: get_opt_id(row, "brand_id")?,
            is_sold_out: row.try_get("is_sold_out")?,
        })
    }
}

impl PgRecord for ProductSpecification {
    const COLUMNS: &'static [&'static str] =
        &["id", "product_id", "name", "description", "sort_order"];
    const ORDER_BY: &'static str = "sort_order, id";

    fn bind_values<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(Uuid::from(self.id))
            .bind(Uuid::from(self.product))
            .bind(self.name.clone())
            .bind(self.description.clone())
            .bind(i64::from(self.sort_order))
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: get_id(row, "id")?,
            product: get_id(row, "product_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            sort_order: get_u32(row, "sort_order")?,
        })
    }
}

impl PgRecord for FilterTag {
    const COLUMNS: &'static [&'static str] = &["id", "name", "type"];

    fn bind_values<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(Uuid::from(self.id))
            .bind(self.name.clone())
            .bind(self.kind.as_str())
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: get_id(row, "id")?,
            name: row.try_get("name")?,
            kind: get_parsed(row, "type")?,
        })
    }
}

impl PgRecord for Keyword {
    const COLUMNS: &'static [&'static str] = &["id", "name", "type", "filter_tag_ids"];

    fn bind_values<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(Uuid::from(self.id))
            .bind(self.name.clone())
            .bind(self.kind.as_str())
            .bind(uuids(&self.filter_tags))
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: get_id(row, "id")?,
            name: row.try_get("name")?,
            kind: get_parsed(row, "type")?,
            filter_tags: get_ids(row, "filter_tag_ids")?,
        })
    }
}

impl PgRecord for ProductKeyword {
    const COLUMNS: &'static [&'static str] = &["id", "product_id", "keyword_id", "count"];

    fn bind_values<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(Uuid::from(self.id))
            .bind(Uuid::from(self.product))
            .bind(Uuid::from(self.keyword))
            .bind(self.count)
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: get_id(row, "id")?,
            product: get_id(row, "product_id")?,
            keyword: get_id(row, "keyword_id")?,
            count: row.try_get("count")?,
        })
    }
}

impl PgRecord for Survey {
    const COLUMNS: &'static [&'static str] = &["id", "name", "sort_order"];
    const ORDER_BY: &'static str = "sort_order, id";

    fn bind_values<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(Uuid::from(self.id))
            .bind(self.name.clone())
            .bind(i64::from(self.sort_order))
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: get_id(row, "id")?,
            name: row.try_get("name")?,
            sort_order: get_u32(row, "sort_order")?,
        })
    }
}

impl PgRecord for SurveyQuestion {
    const COLUMNS: &'static [&'static str] = &["id", "survey_id", "content", "type", "sort_order"];
    const ORDER_BY: &'static str = "sort_order, id";

    fn bind_values<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(Uuid::from(self.id))
            .bind(self.survey.map(Uuid::from))
            .bind(self.content.clone())
            .bind(self.question_type.code())
            .bind(i64::from(self.sort_order))
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let code: i16 = row.try_get("type")?;
        Ok(Self {
            id: get_id(row, "id")?,
            survey: get_opt_id(row, "survey_id")?,
            content: row.try_get("content")?,
            question_type: QuestionType::from_code(code).map_err(|e| decode_error("type", e))?,
            sort_order: get_u32(row, "sort_order")?,
        })
    }
}

impl PgRecord for SurveyQuestionItem {
    const COLUMNS: &'static [&'static str] =
        &["id", "question_id", "content", "sort_order", "filter_tag_ids"];
    const ORDER_BY: &'static str = "sort_order, id";

    fn bind_values<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(Uuid::from(self.id))
            .bind(Uuid::from(self.question))
            .bind(self.content.clone())
            .bind(i64::from(self.sort_order))
            .bind(uuids(&self.filter_tags))
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: get_id(row, "id")?,
            question: get_id(row, "question_id")?,
            content: row.try_get("content")?,
            sort_order: get_u32(row, "sort_order")?,
            filter_tags: get_ids(row, "filter_tag_ids")?,
        })
    }
}

impl PgRecord for SurveyResult {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "user_id",
        "question_id",
        "chosen_answer_id",
        "written_answer",
    ];

    fn bind_values<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(Uuid::from(self.id))
            .bind(Uuid::from(self.user))
            .bind(Uuid::from(self.question))
            .bind(self.chosen_answer.map(Uuid::from))
            .bind(self.written_answer.clone())
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: get_id(row, "id")?,
            user: get_id(row, "user_id")?,
            question: get_id(row, "question_id")?,
            chosen_answer: get_opt_id(row, "chosen_answer_id")?,
            written_answer: row.try_get("written_answer")?,
        })
    }
}

impl PgRecord for Profile {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "user_id",
        "gender",
        "contact",
        "birthday",
        "favorite_product_ids",
    ];

    fn bind_values<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(Uuid::from(self.id))
            .bind(Uuid::from(self.user))
            .bind(self.gender.as_bool())
            .bind(self.contact.clone())
            .bind(self.birthday)
            .bind(uuids(&self.favorite_products))
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: get_id(row, "id")?,
            user: get_id(row, "user_id")?,
            gender: Gender::from_bool(row.try_get("gender")?),
            contact: row.try_get("contact")?,
            birthday: row.try_get("birthday")?,
            favorite_products: get_ids(row, "favorite_product_ids")?,
        })
    }
}

impl PgRecord for UserProductUsage {
    const COLUMNS: &'static [&'static str] =
        &["id", "user_id", "category_id", "daily_amount_used", "unit"];

    fn bind_values<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(Uuid::from(self.id))
            .bind(Uuid::from(self.user))
            .bind(Uuid::from(self.category))
            .bind(i64::from(self.daily_amount_used))
            .bind(self.unit.clone())
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: get_id(row, "id")?,
            user: get_id(row, "user_id")?,
            category: get_id(row, "category_id")?,
            daily_amount_used: get_u32(row, "daily_amount_used")?,
            unit: row.try_get("unit")?,
        })
    }
}

impl PgRecord for Recommendation {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "user_id",
        "category_id",
        "date",
        "comment",
        "product_ids",
        "is_alerted",
        "is_recommended",
    ];

    fn bind_values<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(Uuid::from(self.id))
            .bind(Uuid::from(self.user))
            .bind(Uuid::from(self.category))
            .bind(self.date)
            .bind(self.comment.clone())
            .bind(uuids(&self.products))
            .bind(self.is_alerted)
            .bind(self.is_recommended)
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: get_id(row, "id")?,
            user: get_id(row, "user_id")?,
            category: get_id(row, "category_id")?,
            date: row.try_get("date")?,
            comment: row.try_get("comment")?,
            products: get_ids(row, "product_ids")?,
            is_alerted: row.try_get("is_alerted")?,
            is_recommended: row.try_get("is_recommended")?,
        })
    }
}
