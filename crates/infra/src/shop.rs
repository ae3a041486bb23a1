//! Validating write path over the shop tables.
//!
//! Every write goes through a `save_*` method that runs the record's hook
//! before persisting:
//!
//! ```text
//! record
//!   ↓
//! 1. Pure validation (domain crate)
//!   ↓
//! 2. Load referenced rows; missing ones fail with NotFound
//!   ↓
//! 3. Cross-row rules (brand tag type, question item set, ...)
//!   ↓
//! 4. Save-time mutation (product slug and timestamps)
//!   ↓
//! 5. Persist; the backend enforces unique keys
//! ```
//!
//! Reads go through [`Records`], which has no save or delete method, so
//! nothing can skip the hooks. Deletes go through `delete_*` methods that
//! apply the reference actions of the schema on every backend: rows that
//! block a delete are reported as a foreign key violation, dependent rows
//! are removed or unlinked, and deleted ids are dropped from id sets.

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use sampleshop_catalog::{
    FilterTag, FilterTagId, Keyword, KeywordId, Product, ProductCategory, ProductCategoryId,
    ProductId, ProductKeyword, ProductKeywordId, ProductSpecification, ProductSpecificationId,
};
use sampleshop_core::{DomainError, Entity, UserId};
use sampleshop_members::{
    Profile, ProfileId, Recommendation, RecommendationId, UserProductUsage, UserProductUsageId,
};
use sampleshop_survey::{
    Survey, SurveyId, SurveyQuestion, SurveyQuestionId, SurveyQuestionItem, SurveyQuestionItemId,
    SurveyResult, SurveyResultId,
};

use crate::config::ShopConfig;
use crate::schema;
use crate::store::{InMemoryRepository, PgRecord, PostgresRepository, Repository, StoreError};

#[derive(Debug, Error)]
pub enum ShopError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ShopError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Domain(e) if e.is_validation())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Domain(DomainError::NotFound { .. }))
    }

    pub fn is_uniqueness_violation(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_uniqueness_violation())
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_foreign_key_violation())
    }
}

/// Read-only view of one table.
pub struct Records<'a, E: Entity> {
    repo: &'a dyn Repository<E>,
}

impl<'a, E: Entity> Records<'a, E> {
    pub async fn get(&self, id: E::Id) -> Result<Option<E>, ShopError> {
        Ok(self.repo.get(id).await?)
    }

    /// Like [`Records::get`], but a missing row is a `NotFound` error.
    pub async fn require(&self, id: E::Id) -> Result<E, ShopError> {
        self.repo
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(E::TABLE, id).into())
    }

    pub async fn require_all(&self, ids: &[E::Id]) -> Result<Vec<E>, ShopError> {
        let mut rows = Vec::with_capacity(ids.len());
        for id in ids {
            rows.push(self.require(*id).await?);
        }
        Ok(rows)
    }

    /// The rows that exist among `ids`, in `ids` order.
    pub async fn existing(&self, ids: &[E::Id]) -> Result<Vec<E>, ShopError> {
        let mut rows = Vec::with_capacity(ids.len());
        for id in ids {
            rows.extend(self.repo.get(*id).await?);
        }
        Ok(rows)
    }

    pub async fn list(&self) -> Result<Vec<E>, ShopError> {
        Ok(self.repo.list().await?)
    }

    pub async fn filter_by(
        &self,
        column: &'static str,
        value: impl Into<Uuid>,
    ) -> Result<Vec<E>, ShopError> {
        Ok(self.repo.filter_by(column, value.into()).await?)
    }
}

/// The shop's tables plus the hooks that guard them.
#[derive(Clone)]
pub struct Shop {
    pool: Option<Arc<PgPool>>,
    categories: Arc<dyn Repository<ProductCategory>>,
    products: Arc<dyn Repository<Product>>,
    specifications: Arc<dyn Repository<ProductSpecification>>,
    filter_tags: Arc<dyn Repository<FilterTag>>,
    keywords: Arc<dyn Repository<Keyword>>,
    product_keywords: Arc<dyn Repository<ProductKeyword>>,
    surveys: Arc<dyn Repository<Survey>>,
    questions: Arc<dyn Repository<SurveyQuestion>>,
    question_items: Arc<dyn Repository<SurveyQuestionItem>>,
    results: Arc<dyn Repository<SurveyResult>>,
    profiles: Arc<dyn Repository<Profile>>,
    usages: Arc<dyn Repository<UserProductUsage>>,
    recommendations: Arc<dyn Repository<Recommendation>>,
}

fn memory<E: Entity>() -> Arc<dyn Repository<E>> {
    Arc::new(InMemoryRepository::<E>::new())
}

/// Fails with the first constraint that still has referencing rows.
fn refuse_if_referenced(table: &'static str, references: &[(&str, usize)]) -> Result<(), ShopError> {
    if let Some((constraint, rows)) = references.iter().find(|(_, rows)| *rows > 0) {
        warn!(table, constraint, rows, "delete blocked by referencing rows");
        return Err(StoreError::ForeignKeyViolation {
            table,
            constraint: constraint.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Drops `id` from an id-set column of every row that holds it.
async fn strip_id<E: Entity, I: PartialEq>(
    repo: &dyn Repository<E>,
    id: I,
    ids: impl Fn(&mut E) -> &mut Vec<I>,
) -> Result<usize, ShopError> {
    let mut stripped = 0;
    for mut row in repo.list().await? {
        let set = ids(&mut row);
        let before = set.len();
        set.retain(|other| *other != id);
        if set.len() != before {
            repo.save(row).await?;
            stripped += 1;
        }
    }
    Ok(stripped)
}

fn pg<E: PgRecord>(pool: &Arc<PgPool>) -> Arc<dyn Repository<E>> {
    Arc::new(PostgresRepository::<E>::shared(Arc::clone(pool)))
}

impl Shop {
    pub fn in_memory() -> Self {
        Self {
            pool: None,
            categories: memory(),
            products: memory(),
            specifications: memory(),
            filter_tags: memory(),
            keywords: memory(),
            product_keywords: memory(),
            surveys: memory(),
            questions: memory(),
            question_items: memory(),
            results: memory(),
            profiles: memory(),
            usages: memory(),
            recommendations: memory(),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        let pool = Arc::new(pool);
        Self {
            categories: pg(&pool),
            products: pg(&pool),
            specifications: pg(&pool),
            filter_tags: pg(&pool),
            keywords: pg(&pool),
            product_keywords: pg(&pool),
            surveys: pg(&pool),
            questions: pg(&pool),
            question_items: pg(&pool),
            results: pg(&pool),
            profiles: pg(&pool),
            usages: pg(&pool),
            recommendations: pg(&pool),
            pool: Some(pool),
        }
    }

    /// Pick the backend from configuration.
    pub async fn connect(config: &ShopConfig) -> Result<Self, ShopError> {
        let Some(url) = config.database_url.as_deref() else {
            info!("no database configured; using in-memory tables");
            return Ok(Self::in_memory());
        };
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(url)
            .await?;
        info!(max_connections = config.max_connections, "connected to postgres");
        Ok(Self::postgres(pool))
    }

    /// Create missing tables. A no-op for in-memory tables.
    pub async fn migrate(&self) -> Result<(), ShopError> {
        match &self.pool {
            Some(pool) => Ok(schema::apply(pool).await?),
            None => Ok(()),
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.pool.is_some()
    }

    pub fn categories(&self) -> Records<'_, ProductCategory> {
        Records { repo: &*self.categories }
    }

    pub fn products(&self) -> Records<'_, Product> {
        Records { repo: &*self.products }
    }

    pub fn specifications(&self) -> Records<'_, ProductSpecification> {
        Records { repo: &*self.specifications }
    }

    pub fn filter_tags(&self) -> Records<'_, FilterTag> {
        Records { repo: &*self.filter_tags }
    }

    pub fn keywords(&self) -> Records<'_, Keyword> {
        Records { repo: &*self.keywords }
    }

    pub fn product_keywords(&self) -> Records<'_, ProductKeyword> {
        Records { repo: &*self.product_keywords }
    }

    pub fn surveys(&self) -> Records<'_, Survey> {
        Records { repo: &*self.surveys }
    }

    pub fn questions(&self) -> Records<'_, SurveyQuestion> {
        Records { repo: &*self.questions }
    }

    pub fn question_items(&self) -> Records<'_, SurveyQuestionItem> {
        Records { repo: &*self.question_items }
    }

    pub fn results(&self) -> Records<'_, SurveyResult> {
        Records { repo: &*self.results }
    }

    pub fn profiles(&self) -> Records<'_, Profile> {
        Records { repo: &*self.profiles }
    }

    pub fn usages(&self) -> Records<'_, UserProductUsage> {
        Records { repo: &*self.usages }
    }

    pub fn recommendations(&self) -> Records<'_, Recommendation> {
        Records { repo: &*self.recommendations }
    }

    // ---- catalog ----

    #[instrument(skip(self, category), fields(id = %category.id), err)]
    pub async fn save_category(&self, category: ProductCategory) -> Result<ProductCategory, ShopError> {
        category.validate()?;
        Ok(self.categories.save(category).await?)
    }

    /// Saves a product. The slug is replaced on every save.
    #[instrument(skip(self, product), fields(id = %product.id), err)]
    pub async fn save_product(&self, mut product: Product) -> Result<Product, ShopError> {
        product.validate()?;
        self.categories().require(product.category).await?;
        if let Some(brand_id) = product.brand {
            let brand = self.filter_tags.get(brand_id).await?;
            if let Err(e) = product.validate_brand(brand.as_ref()) {
                warn!(brand = %brand_id, error = %e, "product brand rejected");
                return Err(e.into());
            }
        }

        product.regenerate_slug();
        product.touch(Utc::now());
        let saved = self.products.save(product).await?;
        debug!(slug = saved.slug(), "product saved");
        Ok(saved)
    }

    #[instrument(skip(self, spec), fields(id = %spec.id), err)]
    pub async fn save_specification(
        &self,
        spec: ProductSpecification,
    ) -> Result<ProductSpecification, ShopError> {
        spec.validate()?;
        self.products().require(spec.product).await?;
        Ok(self.specifications.save(spec).await?)
    }

    #[instrument(skip(self, tag), fields(id = %tag.id), err)]
    pub async fn save_filter_tag(&self, tag: FilterTag) -> Result<FilterTag, ShopError> {
        tag.validate()?;
        let was_brand = self
            .filter_tags
            .get(tag.id)
            .await?
            .is_some_and(|stored| stored.is_brand());
        if was_brand && !tag.is_brand() {
            let branded = self.products().filter_by("brand_id", tag.id).await?;
            if let Err(e) = tag.validate_kind_change(branded.len()) {
                warn!(kind = %tag.kind, products = branded.len(), error = %e, "brand retype rejected");
                return Err(e.into());
            }
        }
        Ok(self.filter_tags.save(tag).await?)
    }

    #[instrument(skip(self, keyword), fields(id = %keyword.id), err)]
    pub async fn save_keyword(&self, keyword: Keyword) -> Result<Keyword, ShopError> {
        keyword.validate()?;
        self.filter_tags().require_all(&keyword.filter_tags).await?;
        Ok(self.keywords.save(keyword).await?)
    }

    #[instrument(skip(self, link), fields(id = %link.id), err)]
    pub async fn save_product_keyword(
        &self,
        link: ProductKeyword,
    ) -> Result<ProductKeyword, ShopError> {
        self.products().require(link.product).await?;
        self.keywords().require(link.keyword).await?;
        Ok(self.product_keywords.save(link).await?)
    }

    // ---- survey ----

    #[instrument(skip(self, survey), fields(id = %survey.id), err)]
    pub async fn save_survey(&self, survey: Survey) -> Result<Survey, ShopError> {
        survey.validate()?;
        Ok(self.surveys.save(survey).await?)
    }

    /// Saves a question. Turning a question that owns items into free-text
    /// is rejected.
    #[instrument(skip(self, question), fields(id = %question.id), err)]
    pub async fn save_question(&self, question: SurveyQuestion) -> Result<SurveyQuestion, ShopError> {
        if let Some(survey) = question.survey {
            self.surveys().require(survey).await?;
        }
        let items = self.question_items().filter_by("question_id", question.id).await?;
        if let Err(e) = question.validate(&items) {
            warn!(items = items.len(), error = %e, "question rejected");
            return Err(e.into());
        }
        Ok(self.questions.save(question).await?)
    }

    #[instrument(skip(self, item), fields(id = %item.id, question = %item.question), err)]
    pub async fn save_question_item(
        &self,
        item: SurveyQuestionItem,
    ) -> Result<SurveyQuestionItem, ShopError> {
        let question = self.questions().require(item.question).await?;
        if let Err(e) = item.validate(&question) {
            warn!(question_type = ?question.question_type, error = %e, "question item rejected");
            return Err(e.into());
        }
        self.filter_tags().require_all(&item.filter_tags).await?;
        Ok(self.question_items.save(item).await?)
    }

    #[instrument(skip(self, result), fields(id = %result.id, question = %result.question), err)]
    pub async fn save_result(&self, result: SurveyResult) -> Result<SurveyResult, ShopError> {
        self.questions().require(result.question).await?;
        let items = self.question_items().filter_by("question_id", result.question).await?;
        if let Err(e) = result.validate(&items) {
            warn!(error = %e, "survey result rejected");
            return Err(e.into());
        }
        Ok(self.results.save(result).await?)
    }

    // ---- members ----

    #[instrument(skip(self, profile), fields(id = %profile.id, user = %profile.user), err)]
    pub async fn save_profile(&self, profile: Profile) -> Result<Profile, ShopError> {
        self.products().require_all(&profile.favorite_products).await?;
        Ok(self.profiles.save(profile).await?)
    }

    #[instrument(skip(self, usage), fields(id = %usage.id, user = %usage.user), err)]
    pub async fn save_usage(&self, usage: UserProductUsage) -> Result<UserProductUsage, ShopError> {
        self.categories().require(usage.category).await?;
        Ok(self.usages.save(usage).await?)
    }

    #[instrument(skip(self, rec), fields(id = %rec.id, user = %rec.user), err)]
    pub async fn save_recommendation(
        &self,
        rec: Recommendation,
    ) -> Result<Recommendation, ShopError> {
        self.categories().require(rec.category).await?;
        self.products().require_all(&rec.products).await?;
        Ok(self.recommendations.save(rec).await?)
    }

    // ---- deletes ----

    /// Blocked while products, usages or recommendations use the category.
    #[instrument(skip(self), err)]
    pub async fn delete_category(&self, id: ProductCategoryId) -> Result<bool, ShopError> {
        let references = [
            (
                "products_category_id_fkey",
                self.products().filter_by("category_id", id).await?.len(),
            ),
            (
                "user_product_usages_category_id_fkey",
                self.usages().filter_by("category_id", id).await?.len(),
            ),
            (
                "recommendations_category_id_fkey",
                self.recommendations().filter_by("category_id", id).await?.len(),
            ),
        ];
        refuse_if_referenced(ProductCategory::TABLE, &references)?;
        Ok(self.categories.delete(id).await?)
    }

    /// Removes the product's specifications and keyword links, and drops it
    /// from favorites and recommendations.
    #[instrument(skip(self), err)]
    pub async fn delete_product(&self, id: ProductId) -> Result<bool, ShopError> {
        for spec in self.specifications().filter_by("product_id", id).await? {
            self.specifications.delete(spec.id).await?;
        }
        for link in self.product_keywords().filter_by("product_id", id).await? {
            self.product_keywords.delete(link.id).await?;
        }
        let favorites = strip_id(&*self.profiles, id, |p| &mut p.favorite_products).await?;
        let recommended = strip_id(&*self.recommendations, id, |r| &mut r.products).await?;
        debug!(favorites, recommended, "product unlinked");
        Ok(self.products.delete(id).await?)
    }

    #[instrument(skip(self), err)]
    pub async fn delete_specification(&self, id: ProductSpecificationId) -> Result<bool, ShopError> {
        Ok(self.specifications.delete(id).await?)
    }

    /// Blocked while products use the tag as their brand. Keywords and
    /// question items lose the tag.
    #[instrument(skip(self), err)]
    pub async fn delete_filter_tag(&self, id: FilterTagId) -> Result<bool, ShopError> {
        let branded = self.products().filter_by("brand_id", id).await?.len();
        refuse_if_referenced(FilterTag::TABLE, &[("products_brand_id_fkey", branded)])?;
        let keywords = strip_id(&*self.keywords, id, |k| &mut k.filter_tags).await?;
        let items = strip_id(&*self.question_items, id, |i| &mut i.filter_tags).await?;
        debug!(keywords, items, "filter tag unlinked");
        Ok(self.filter_tags.delete(id).await?)
    }

    #[instrument(skip(self), err)]
    pub async fn delete_keyword(&self, id: KeywordId) -> Result<bool, ShopError> {
        for link in self.product_keywords().filter_by("keyword_id", id).await? {
            self.product_keywords.delete(link.id).await?;
        }
        Ok(self.keywords.delete(id).await?)
    }

    #[instrument(skip(self), err)]
    pub async fn delete_product_keyword(&self, id: ProductKeywordId) -> Result<bool, ShopError> {
        Ok(self.product_keywords.delete(id).await?)
    }

    /// The survey's questions stay, detached from it.
    #[instrument(skip(self), err)]
    pub async fn delete_survey(&self, id: SurveyId) -> Result<bool, ShopError> {
        for mut question in self.questions().filter_by("survey_id", id).await? {
            question.survey = None;
            self.questions.save(question).await?;
        }
        Ok(self.surveys.delete(id).await?)
    }

    /// Removes the question with its items and results.
    #[instrument(skip(self), err)]
    pub async fn delete_question(&self, id: SurveyQuestionId) -> Result<bool, ShopError> {
        for result in self.results().filter_by("question_id", id).await? {
            self.results.delete(result.id).await?;
        }
        for item in self.question_items().filter_by("question_id", id).await? {
            self.question_items.delete(item.id).await?;
        }
        Ok(self.questions.delete(id).await?)
    }

    /// Results that chose the item keep their row with no chosen answer.
    #[instrument(skip(self), err)]
    pub async fn delete_question_item(&self, id: SurveyQuestionItemId) -> Result<bool, ShopError> {
        for mut result in self.results().filter_by("chosen_answer_id", id).await? {
            result.chosen_answer = None;
            self.results.save(result).await?;
        }
        Ok(self.question_items.delete(id).await?)
    }

    #[instrument(skip(self), err)]
    pub async fn delete_result(&self, id: SurveyResultId) -> Result<bool, ShopError> {
        Ok(self.results.delete(id).await?)
    }

    #[instrument(skip(self), err)]
    pub async fn delete_profile(&self, id: ProfileId) -> Result<bool, ShopError> {
        Ok(self.profiles.delete(id).await?)
    }

    #[instrument(skip(self), err)]
    pub async fn delete_usage(&self, id: UserProductUsageId) -> Result<bool, ShopError> {
        Ok(self.usages.delete(id).await?)
    }

    #[instrument(skip(self), err)]
    pub async fn delete_recommendation(&self, id: RecommendationId) -> Result<bool, ShopError> {
        Ok(self.recommendations.delete(id).await?)
    }

    // ---- derived reads ----

    /// `#name` lines of the keyword's linked filter tags.
    pub async fn keyword_filter_tags_display(&self, id: KeywordId) -> Result<String, ShopError> {
        let keyword = self.keywords().require(id).await?;
        let tags = self.filter_tags().existing(&keyword.filter_tags).await?;
        Ok(keyword.filter_tags_display(&tags))
    }

    /// Case-insensitive substring search over category names.
    pub async fn search_categories(&self, term: &str) -> Result<Vec<ProductCategory>, ShopError> {
        let categories = self.categories().list().await?;
        Ok(categories
            .into_iter()
            .filter(|c| c.matches_search(term))
            .collect())
    }

    /// Dated recommendations of the user owning a profile.
    pub async fn profile_reports(&self, user: UserId) -> Result<Vec<Recommendation>, ShopError> {
        let profile = self
            .profiles()
            .filter_by("user_id", user)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::not_found(Profile::TABLE, user))?;
        let recommendations = self.recommendations().filter_by("user_id", user).await?;
        Ok(profile.reports(&recommendations))
    }

    pub async fn recommendation_products_display(
        &self,
        id: RecommendationId,
    ) -> Result<String, ShopError> {
        let rec = self.recommendations().require(id).await?;
        let products = self.products().existing(&rec.products).await?;
        Ok(rec.products_display(&products))
    }
}
