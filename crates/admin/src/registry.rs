//! Which models the back office manages and how their lists look.
//!
//! The registry is built once at first use and never changes afterwards.

use clap::ValueEnum;
use once_cell::sync::Lazy;

/// A model exposed in the back office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Model {
    ProductCategory,
    Product,
    ProductKeyword,
    ProductSpecification,
    Keyword,
    FilterTag,
}

impl Model {
    pub fn name(self) -> &'static str {
        match self {
            Model::ProductCategory => "product_category",
            Model::Product => "product",
            Model::ProductKeyword => "product_keyword",
            Model::ProductSpecification => "product_specification",
            Model::Keyword => "keyword",
            Model::FilterTag => "filter_tag",
        }
    }
}

/// Single column showing the row's display string.
pub const DISPLAY_COLUMN: &str = "display";

/// List configuration for one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelAdmin {
    pub model: Model,
    pub list_display: &'static [&'static str],
    pub list_editable: &'static [&'static str],
    /// Empty means the model's own default order.
    pub ordering: &'static [&'static str],
}

impl ModelAdmin {
    /// Display-string column, no editing, default order.
    pub const fn plain(model: Model) -> Self {
        Self {
            model,
            list_display: &[DISPLAY_COLUMN],
            list_editable: &[],
            ordering: &[],
        }
    }

    pub fn is_editable(&self, field: &str) -> bool {
        self.list_editable.contains(&field)
    }
}

#[derive(Debug)]
pub struct AdminSite {
    entries: Vec<ModelAdmin>,
}

impl AdminSite {
    pub fn get(&self, model: Model) -> Option<&ModelAdmin> {
        self.entries.iter().find(|entry| entry.model == model)
    }

    /// Registered models, in registration order.
    pub fn models(&self) -> impl Iterator<Item = &ModelAdmin> {
        self.entries.iter()
    }
}

static SITE: Lazy<AdminSite> = Lazy::new(|| AdminSite {
    entries: vec![
        ModelAdmin::plain(Model::ProductCategory),
        ModelAdmin {
            model: Model::Product,
            list_display: &["id", "name", "category", "description"],
            list_editable: &["category", "description"],
            ordering: &["name"],
        },
        ModelAdmin::plain(Model::ProductKeyword),
        ModelAdmin::plain(Model::ProductSpecification),
        ModelAdmin {
            model: Model::Keyword,
            list_display: &["id", "name", "type", "get_filter_tags"],
            list_editable: &["name"],
            ordering: &["id"],
        },
        ModelAdmin {
            model: Model::FilterTag,
            list_display: &["id", "name", "type"],
            list_editable: &["name", "type"],
            ordering: &["id"],
        },
    ],
});

/// The process-wide registry.
pub fn site() -> &'static AdminSite {
    &SITE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_model_is_registered_once() {
        for model in Model::value_variants() {
            let count = site().models().filter(|m| m.model == *model).count();
            assert_eq!(count, 1, "{}", model.name());
        }
    }

    #[test]
    fn product_admin_matches_back_office_layout() {
        let product = site().get(Model::Product).unwrap();
        assert_eq!(product.list_display, ["id", "name", "category", "description"]);
        assert!(product.is_editable("description"));
        assert!(!product.is_editable("name"));
        assert_eq!(product.ordering, ["name"]);
    }

    #[test]
    fn unconfigured_models_show_display_string() {
        let spec = site().get(Model::ProductSpecification).unwrap();
        assert_eq!(spec.list_display, [DISPLAY_COLUMN]);
        assert!(spec.list_editable.is_empty());
    }

    #[test]
    fn cli_names_are_kebab_case() {
        let parsed = Model::from_str("filter-tag", false).unwrap();
        assert_eq!(parsed, Model::FilterTag);
    }
}
