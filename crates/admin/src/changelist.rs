//! Changelist views and in-place edits.

use std::collections::HashMap;

use tracing::{info, instrument};
use uuid::Uuid;

use sampleshop_catalog::{FilterTagKind, Product, ProductCategoryId, ProductId};
use sampleshop_core::{DomainError, Entity};
use sampleshop_infra::Shop;

use crate::error::AdminError;
use crate::registry::{DISPLAY_COLUMN, Model, ModelAdmin, site};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelistRow {
    pub id: Uuid,
    pub cells: Vec<String>,
}

/// A rendered list of one model's rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Changelist {
    pub model: Model,
    pub columns: Vec<&'static str>,
    pub rows: Vec<ChangelistRow>,
}

impl Changelist {
    /// Tab-separated text with a header line.
    pub fn to_table(&self) -> String {
        let mut out = self.columns.join("\t");
        for row in &self.rows {
            out.push('\n');
            // Multi-line cells (tag lists) are flattened onto one line.
            let cells: Vec<_> = row.cells.iter().map(|c| c.replace('\n', " ")).collect();
            out.push_str(&cells.join("\t"));
        }
        out
    }
}

fn admin_for(model: Model) -> Result<&'static ModelAdmin, AdminError> {
    site().get(model).ok_or(AdminError::NotRegistered(model.name()))
}

fn not_displayable(model: Model, column: &str) -> AdminError {
    DomainError::validation(format!("{} has no column {column}", model.name())).into()
}

/// Build one row from a column renderer.
fn row(
    admin: &ModelAdmin,
    id: impl Into<Uuid>,
    mut cell: impl FnMut(&'static str) -> Option<String>,
) -> Result<ChangelistRow, AdminError> {
    let cells = admin
        .list_display
        .iter()
        .copied()
        .map(|column| cell(column).ok_or_else(|| not_displayable(admin.model, column)))
        .collect::<Result<_, _>>()?;
    Ok(ChangelistRow {
        id: id.into(),
        cells,
    })
}

fn sort_products(products: &mut [Product], ordering: &[&str]) {
    if ordering.first() == Some(&"name") {
        products.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.id.cmp(&b.id)));
    }
}

/// Render the changelist of `model` with its registered layout.
#[instrument(skip(shop), fields(model = model.name()), err)]
pub async fn changelist(shop: &Shop, model: Model) -> Result<Changelist, AdminError> {
    let admin = admin_for(model)?;
    let mut rows = Vec::new();

    match model {
        Model::ProductCategory => {
            for category in shop.categories().list().await? {
                rows.push(row(admin, category.id, |column| match column {
                    DISPLAY_COLUMN => Some(category.to_string()),
                    _ => None,
                })?);
            }
        }
        Model::Product => {
            let categories: HashMap<ProductCategoryId, String> = shop
                .categories()
                .list()
                .await?
                .into_iter()
                .map(|c| (c.id, c.name))
                .collect();
            let mut products = shop.products().list().await?;
            sort_products(&mut products, admin.ordering);
            for product in products {
                let category = categories
                    .get(&product.category)
                    .cloned()
                    .ok_or_else(|| DomainError::not_found("product_categories", product.category))?;
                rows.push(row(admin, product.id, |column| match column {
                    "id" => Some(product.id.to_string()),
                    "name" => Some(product.name().to_string()),
                    "category" => Some(category.clone()),
                    "description" => Some(product.description.clone()),
                    _ => None,
                })?);
            }
        }
        Model::ProductKeyword => {
            for link in shop.product_keywords().list().await? {
                rows.push(row(admin, link.id, |column| match column {
                    DISPLAY_COLUMN => Some(link.to_string()),
                    _ => None,
                })?);
            }
        }
        Model::ProductSpecification => {
            let products: HashMap<ProductId, Product> = shop
                .products()
                .list()
                .await?
                .into_iter()
                .map(|p| (p.id, p))
                .collect();
            for spec in shop.specifications().list().await? {
                let product = products
                    .get(&spec.product)
                    .ok_or_else(|| DomainError::not_found(Product::TABLE, spec.product))?;
                rows.push(row(admin, spec.id, |column| match column {
                    DISPLAY_COLUMN => Some(spec.display_with(product)),
                    _ => None,
                })?);
            }
        }
        Model::Keyword => {
            let tags = shop.filter_tags().list().await?;
            for keyword in shop.keywords().list().await? {
                rows.push(row(admin, keyword.id, |column| match column {
                    "id" => Some(keyword.id.to_string()),
                    "name" => Some(keyword.name.clone()),
                    "type" => Some(keyword.kind.to_string()),
                    "get_filter_tags" => Some(keyword.filter_tags_display(&tags)),
                    _ => None,
                })?);
            }
        }
        Model::FilterTag => {
            for tag in shop.filter_tags().list().await? {
                rows.push(row(admin, tag.id, |column| match column {
                    "id" => Some(tag.id.to_string()),
                    "name" => Some(tag.name.clone()),
                    "type" => Some(tag.kind.to_string()),
                    _ => None,
                })?);
            }
        }
    }

    Ok(Changelist {
        model,
        columns: admin.list_display.to_vec(),
        rows,
    })
}

/// Change one editable column of one row and save it through the shop's
/// hooks.
#[instrument(skip(shop, value), fields(model = model.name()), err)]
pub async fn edit_in_place(
    shop: &Shop,
    model: Model,
    id: Uuid,
    field: &str,
    value: &str,
) -> Result<(), AdminError> {
    let admin = admin_for(model)?;
    if !admin.is_editable(field) {
        return Err(DomainError::validation(format!(
            "{field} is not editable on {}",
            model.name()
        ))
        .into());
    }

    match (model, field) {
        (Model::Product, "category") => {
            let mut product = shop.products().require(id.into()).await?;
            product.category = value.parse()?;
            shop.save_product(product).await?;
        }
        (Model::Product, "description") => {
            let mut product = shop.products().require(id.into()).await?;
            product.description = value.to_string();
            shop.save_product(product).await?;
        }
        (Model::Keyword, "name") => {
            let mut keyword = shop.keywords().require(id.into()).await?;
            keyword.name = value.to_string();
            shop.save_keyword(keyword).await?;
        }
        (Model::FilterTag, "name") => {
            let mut tag = shop.filter_tags().require(id.into()).await?;
            tag.name = value.to_string();
            shop.save_filter_tag(tag).await?;
        }
        (Model::FilterTag, "type") => {
            let mut tag = shop.filter_tags().require(id.into()).await?;
            tag.kind = value.parse::<FilterTagKind>()?;
            shop.save_filter_tag(tag).await?;
        }
        _ => return Err(not_displayable(model, field)),
    }

    info!(%id, field, "edited in place");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sampleshop_catalog::{FilterTag, Keyword, KeywordKind, ProductCategory};

    async fn seeded() -> (Shop, ProductCategory, ProductCategory) {
        let shop = Shop::in_memory();
        let toner = shop.save_category(ProductCategory::new("Toner")).await.unwrap();
        let lotion = shop.save_category(ProductCategory::new("Lotion")).await.unwrap();
        for (category, name) in [(&toner, "Rose Toner"), (&lotion, "Aloe Lotion"), (&toner, "Mint Toner")] {
            shop.save_product(Product::new(category.id, name, 10_000))
                .await
                .unwrap();
        }
        (shop, toner, lotion)
    }

    #[tokio::test]
    async fn products_are_listed_by_name_with_category_names() {
        let (shop, _, _) = seeded().await;
        let list = changelist(&shop, Model::Product).await.unwrap();

        assert_eq!(list.columns, vec!["id", "name", "category", "description"]);
        let names: Vec<_> = list.rows.iter().map(|r| r.cells[1].as_str()).collect();
        assert_eq!(names, vec!["Aloe Lotion", "Mint Toner", "Rose Toner"]);
        assert_eq!(list.rows[0].cells[2], "Lotion");
    }

    #[tokio::test]
    async fn keywords_show_their_filter_tags() {
        let shop = Shop::in_memory();
        let dry = shop
            .save_filter_tag(FilterTag::new("Dry", FilterTagKind::SkinType))
            .await
            .unwrap();
        let mut keyword = Keyword::new("moist", KeywordKind::Feeling);
        keyword.add_filter_tag(dry.id);
        shop.save_keyword(keyword).await.unwrap();

        let list = changelist(&shop, Model::Keyword).await.unwrap();
        assert_eq!(list.rows.len(), 1);
        assert_eq!(list.rows[0].cells[2..], ["feeling".to_string(), "#Dry".to_string()]);
        assert!(list.to_table().starts_with("id\tname\ttype\tget_filter_tags\n"));
    }

    #[tokio::test]
    async fn plain_models_render_display_strings() {
        let (shop, toner, _) = seeded().await;
        let list = changelist(&shop, Model::ProductCategory).await.unwrap();
        assert_eq!(list.columns, vec![DISPLAY_COLUMN]);
        assert!(list.rows.iter().any(|r| r.id == Uuid::from(toner.id) && r.cells == ["Toner"]));
    }

    #[tokio::test]
    async fn editing_a_product_category_resaves_the_product() {
        let (shop, toner, lotion) = seeded().await;
        let product = shop
            .products()
            .filter_by("category_id", toner.id)
            .await
            .unwrap()
            .remove(0);

        edit_in_place(&shop, Model::Product, product.id.into(), "category", &lotion.id.to_string())
            .await
            .unwrap();

        let edited = shop.products().require(product.id).await.unwrap();
        assert_eq!(edited.category, lotion.id);
        assert_ne!(edited.slug(), product.slug());
    }

    #[tokio::test]
    async fn non_editable_field_is_rejected() {
        let (shop, toner, _) = seeded().await;
        let product = shop
            .products()
            .filter_by("category_id", toner.id)
            .await
            .unwrap()
            .remove(0);

        let err = edit_in_place(&shop, Model::Product, product.id.into(), "name", "Renamed")
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let err = edit_in_place(&shop, Model::ProductCategory, toner.id.into(), "name", "X")
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn filter_tag_type_accepts_stored_names() {
        let shop = Shop::in_memory();
        let tag = shop
            .save_filter_tag(FilterTag::new("Acme", FilterTagKind::Function))
            .await
            .unwrap();
        edit_in_place(&shop, Model::FilterTag, tag.id.into(), "type", "brand")
            .await
            .unwrap();
        let tag = shop.filter_tags().require(tag.id).await.unwrap();
        assert!(tag.is_brand());

        let err = edit_in_place(&shop, Model::FilterTag, tag.id.into(), "type", "nonsense")
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn brand_in_use_cannot_be_retyped_in_place() {
        let shop = Shop::in_memory();
        let category = shop.save_category(ProductCategory::new("Toner")).await.unwrap();
        let acme = shop
            .save_filter_tag(FilterTag::new("Acme", FilterTagKind::Brand))
            .await
            .unwrap();
        let mut product = Product::new(category.id, "Rose Toner", 12_000);
        product.brand = Some(acme.id);
        shop.save_product(product).await.unwrap();

        let err = edit_in_place(&shop, Model::FilterTag, acme.id.into(), "type", "skin_concern")
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(shop.filter_tags().require(acme.id).await.unwrap().is_brand());
    }
}
