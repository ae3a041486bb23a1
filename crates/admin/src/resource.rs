//! Product export.
//!
//! Two columns: the category's name (not its id) and the product name.

use std::collections::HashMap;
use std::io::Write;

use serde::Serialize;
use tracing::info;

use sampleshop_catalog::ProductCategoryId;
use sampleshop_core::DomainError;
use sampleshop_infra::Shop;

use crate::error::AdminError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductExportRow {
    #[serde(rename = "category__name")]
    pub category_name: String,
    pub name: String,
}

pub struct ProductResource;

impl ProductResource {
    pub const HEADERS: [&'static str; 2] = ["category__name", "name"];

    /// One row per product, in product id order.
    pub async fn rows(shop: &Shop) -> Result<Vec<ProductExportRow>, AdminError> {
        let categories: HashMap<ProductCategoryId, String> = shop
            .categories()
            .list()
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        shop.products()
            .list()
            .await?
            .into_iter()
            .map(|product| {
                let category_name = categories
                    .get(&product.category)
                    .cloned()
                    .ok_or_else(|| DomainError::not_found("product_categories", product.category))?;
                Ok(ProductExportRow {
                    category_name,
                    name: product.base.name,
                })
            })
            .collect()
    }

    /// Write the export as CSV with a header row. Returns the row count.
    pub async fn export<W: Write>(shop: &Shop, out: W) -> Result<usize, AdminError> {
        let rows = Self::rows(shop).await?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);

        writer.write_record(Self::HEADERS)?;
        for row in &rows {
            writer.serialize(row)?;
        }
        writer.flush()?;

        info!(rows = rows.len(), "products exported");
        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sampleshop_catalog::{Product, ProductCategory};

    #[tokio::test]
    async fn export_substitutes_category_names() {
        let shop = Shop::in_memory();
        let toner = shop.save_category(ProductCategory::new("Toner")).await.unwrap();
        let lotion = shop.save_category(ProductCategory::new("Lotion")).await.unwrap();
        shop.save_product(Product::new(toner.id, "Rose Toner", 12_000))
            .await
            .unwrap();
        shop.save_product(Product::new(lotion.id, "Aloe, Lotion", 9_000))
            .await
            .unwrap();

        let mut out = Vec::new();
        let count = ProductResource::export(&shop, &mut out).await.unwrap();
        assert_eq!(count, 2);

        let text = String::from_utf8(out).unwrap();
        let mut lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.remove(0), "category__name,name");
        lines.sort();
        assert_eq!(lines, vec!["Lotion,\"Aloe, Lotion\"", "Toner,Rose Toner"]);
    }

    #[tokio::test]
    async fn empty_catalog_exports_only_the_header() {
        let shop = Shop::in_memory();
        let mut out = Vec::new();
        assert_eq!(ProductResource::export(&shop, &mut out).await.unwrap(), 0);
        assert_eq!(String::from_utf8(out).unwrap(), "category__name,name\n");
    }

    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn write_failure_is_an_io_error() {
        let shop = Shop::in_memory();
        let err = ProductResource::export(&shop, Closed).await.unwrap_err();
        assert!(matches!(err, AdminError::Io(e) if e.kind() == std::io::ErrorKind::BrokenPipe));
    }

    #[tokio::test]
    async fn rows_follow_product_order() {
        let shop = Shop::in_memory();
        let toner = shop.save_category(ProductCategory::new("Toner")).await.unwrap();
        let mut ids = Vec::new();
        for name in ["B", "A", "C"] {
            let product = shop
                .save_product(Product::new(toner.id, name, 1_000))
                .await
                .unwrap();
            ids.push((product.id, name));
        }
        ids.sort();
        let expected: Vec<_> = ids.iter().map(|(_, name)| name.to_string()).collect();

        let rows = ProductResource::rows(&shop).await.unwrap();
        let names: Vec<_> = rows.into_iter().map(|r| r.name).collect();
        assert_eq!(names, expected);
    }
}
