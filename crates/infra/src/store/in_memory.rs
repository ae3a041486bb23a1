use std::collections::BTreeMap;
use std::sync::RwLock;

use uuid::Uuid;

use sampleshop_core::Entity;

use super::{Repository, StoreError, check_column};

/// In-memory table for tests/dev.
///
/// Unique keys are checked against every other row on save, so the
/// constraint behaviour matches the Postgres schema.
#[derive(Debug)]
pub struct InMemoryRepository<E: Entity> {
    rows: RwLock<BTreeMap<E::Id, E>>,
}

impl<E: Entity> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
        }
    }

    fn sorted(mut rows: Vec<E>) -> Vec<E> {
        rows.sort_by(|a, b| a.default_order(b));
        rows
    }
}

impl<E: Entity> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("in-memory table lock poisoned".to_string())
}

#[async_trait::async_trait]
impl<E: Entity> Repository<E> for InMemoryRepository<E> {
    async fn save(&self, record: E) -> Result<E, StoreError> {
        let mut rows = self.rows.write().map_err(|_| poisoned())?;

        let id = record.id();
        for key in record.unique_keys() {
            let taken = rows
                .values()
                .filter(|other| other.id() != id)
                .any(|other| other.unique_keys().contains(&key));
            if taken {
                return Err(StoreError::UniquenessViolation {
                    table: E::TABLE,
                    constraint: key.constraint.to_string(),
                });
            }
        }

        rows.insert(id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: E::Id) -> Result<Option<E>, StoreError> {
        let rows = self.rows.read().map_err(|_| poisoned())?;
        Ok(rows.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<E>, StoreError> {
        let rows = self.rows.read().map_err(|_| poisoned())?;
        Ok(Self::sorted(rows.values().cloned().collect()))
    }

    async fn filter_by(&self, column: &'static str, value: Uuid) -> Result<Vec<E>, StoreError> {
        check_column::<E>(column)?;
        let rows = self.rows.read().map_err(|_| poisoned())?;
        let matching = rows
            .values()
            .filter(|row| row.reference(column) == Some(value))
            .cloned()
            .collect();
        Ok(Self::sorted(matching))
    }

    async fn delete(&self, id: E::Id) -> Result<bool, StoreError> {
        let mut rows = self.rows.write().map_err(|_| poisoned())?;
        Ok(rows.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sampleshop_catalog::{
        FilterTag, FilterTagKind, Product, ProductCategory, ProductSpecification,
    };

    #[tokio::test]
    async fn save_replaces_row_with_same_id() {
        let repo = InMemoryRepository::<ProductCategory>::new();
        let mut category = ProductCategory::new("Toner");
        repo.save(category.clone()).await.unwrap();

        category.name = "Skin Toner".to_string();
        repo.save(category.clone()).await.unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all, vec![category]);
    }

    #[tokio::test]
    async fn duplicate_unique_key_reports_constraint() {
        let repo = InMemoryRepository::<FilterTag>::new();
        let first = FilterTag::new("Dry", FilterTagKind::SkinType);
        repo.save(first.clone()).await.unwrap();

        let err = repo
            .save(FilterTag::new("Dry", FilterTagKind::Function))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::UniquenessViolation {
                table: "filter_tags",
                constraint: "filter_tags_name_key".to_string(),
            }
        );

        // Re-saving the owner of the key is an update, not a collision.
        assert!(repo.save(first).await.is_ok());
    }

    #[tokio::test]
    async fn filter_by_uses_declared_foreign_keys() {
        let repo = InMemoryRepository::<ProductSpecification>::new();
        let category = ProductCategory::new("Toner");
        let product = Product::new(category.id, "Rose Toner", 12_000);
        let other = Product::new(category.id, "Green Toner", 9_000);

        let late = ProductSpecification::new(product.id, "Volume", "200ml", 2);
        let early = ProductSpecification::new(product.id, "Origin", "Korea", 1);
        for spec in [
            late.clone(),
            early.clone(),
            ProductSpecification::new(other.id, "Volume", "150ml", 1),
        ] {
            repo.save(spec).await.unwrap();
        }

        let specs = repo.filter_by("product_id", product.id.into()).await.unwrap();
        assert_eq!(specs, vec![early, late]);

        let err = repo.filter_by("category_id", product.id.into()).await.unwrap_err();
        assert!(matches!(err, StoreError::UnknownColumn { .. }));
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_went_away() {
        let repo = InMemoryRepository::<ProductCategory>::new();
        let category = repo.save(ProductCategory::new("Cream")).await.unwrap();
        assert!(repo.delete(category.id).await.unwrap());
        assert!(!repo.delete(category.id).await.unwrap());
        assert_eq!(repo.get(category.id).await.unwrap(), None);
    }
}
