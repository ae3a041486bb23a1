use core::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sampleshop_core::{DomainError, DomainResult, Entity, UniqueKey, uuid_id};

use crate::filter_tag::{FilterTag, FilterTagId};
use crate::product::ProductId;

uuid_id!(
    /// Keyword identifier.
    KeywordId,
    "KeywordId"
);

uuid_id!(
    /// Identifier of a product/keyword link row.
    ProductKeywordId,
    "ProductKeywordId"
);

/// What a keyword describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordKind {
    Feeling,
    Feature,
    Effect,
    SkinType,
}

impl KeywordKind {
    pub const ALL: [KeywordKind; 4] = [
        KeywordKind::Feeling,
        KeywordKind::Feature,
        KeywordKind::Effect,
        KeywordKind::SkinType,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            KeywordKind::Feeling => "feeling",
            KeywordKind::Feature => "feature",
            KeywordKind::Effect => "effect",
            KeywordKind::SkinType => "skin_type",
        }
    }

    fn legacy_label(self) -> &'static str {
        match self {
            KeywordKind::Feeling => "느낌",
            KeywordKind::Feature => "특징",
            KeywordKind::Effect => "효과",
            KeywordKind::SkinType => "피부타입",
        }
    }
}

impl core::fmt::Display for KeywordKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeywordKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        KeywordKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s || k.legacy_label() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown keyword type: {s}")))
    }
}

/// A descriptive tag attached to products, cross-linked to filter tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    #[serde(default)]
    pub id: KeywordId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: KeywordKind,
    #[serde(default)]
    pub filter_tags: Vec<FilterTagId>,
}

impl Keyword {
    pub fn new(name: impl Into<String>, kind: KeywordKind) -> Self {
        Self {
            id: KeywordId::new(),
            name: name.into(),
            kind,
            filter_tags: Vec::new(),
        }
    }

    /// Link a filter tag. Linking the same tag twice is a no-op.
    pub fn add_filter_tag(&mut self, tag: FilterTagId) {
        if !self.filter_tags.contains(&tag) {
            self.filter_tags.push(tag);
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        crate::require_non_empty("keyword name", &self.name)
    }

    /// Linked tag names as `#name` lines, for list displays.
    ///
    /// `tags` are the resolved rows; they are emitted in the keyword's own
    /// link order and rows that are not linked are ignored.
    pub fn filter_tags_display(&self, tags: &[FilterTag]) -> String {
        self.filter_tags
            .iter()
            .filter_map(|id| tags.iter().find(|t| t.id == *id))
            .map(|t| format!("#{}", t.name))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl core::fmt::Display for Keyword {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.kind, self.name)
    }
}

impl Entity for Keyword {
    type Id = KeywordId;
    const TABLE: &'static str = "keywords";

    fn id(&self) -> Self::Id {
        self.id
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new("keywords_name_key", self.name.clone())]
    }
}

/// Join row between a product and a keyword, carrying how often the keyword
/// was seen for that product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductKeyword {
    #[serde(default)]
    pub id: ProductKeywordId,
    pub product: ProductId,
    pub keyword: KeywordId,
    #[serde(default)]
    pub count: i32,
}

impl ProductKeyword {
    pub fn new(product: ProductId, keyword: KeywordId, count: i32) -> Self {
        Self {
            id: ProductKeywordId::new(),
            product,
            keyword,
            count,
        }
    }
}

impl core::fmt::Display for ProductKeyword {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "product keyword {}", self.id)
    }
}

impl Entity for ProductKeyword {
    type Id = ProductKeywordId;
    const TABLE: &'static str = "product_keywords";
    const FOREIGN_KEYS: &'static [&'static str] = &["product_id", "keyword_id"];

    fn id(&self) -> Self::Id {
        self.id
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::composite(
            "product_keywords_product_id_keyword_id_key",
            &[&self.product, &self.keyword],
        )]
    }

    fn reference(&self, column: &str) -> Option<Uuid> {
        match column {
            "product_id" => Some(self.product.into()),
            "keyword_id" => Some(self.keyword.into()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter_tag::FilterTagKind;

    #[test]
    fn filter_tags_display_joins_hash_prefixed_names() {
        let dry = FilterTag::new("Dry", FilterTagKind::SkinType);
        let calm = FilterTag::new("Calming", FilterTagKind::Function);
        let unrelated = FilterTag::new("Acme", FilterTagKind::Brand);

        let mut keyword = Keyword::new("moist", KeywordKind::Feeling);
        keyword.add_filter_tag(calm.id);
        keyword.add_filter_tag(dry.id);
        keyword.add_filter_tag(dry.id);

        let display = keyword.filter_tags_display(&[dry, calm, unrelated]);
        assert_eq!(display, "#Calming\n#Dry");
    }

    #[test]
    fn filter_tags_display_is_empty_without_links() {
        let keyword = Keyword::new("fresh", KeywordKind::Feeling);
        assert_eq!(keyword.filter_tags_display(&[]), "");
    }

    #[test]
    fn product_keyword_pair_is_the_unique_key() {
        let product = ProductId::new();
        let keyword = KeywordId::new();
        let a = ProductKeyword::new(product, keyword, 3);
        let b = ProductKeyword::new(product, keyword, 0);
        assert_ne!(a.id, b.id);
        assert_eq!(a.unique_keys(), b.unique_keys());
        assert_eq!(a.reference("keyword_id"), Some(keyword.into()));
    }

    #[test]
    fn keyword_kind_accepts_legacy_labels() {
        assert_eq!("효과".parse::<KeywordKind>().unwrap(), KeywordKind::Effect);
        assert_eq!(Keyword::new("x", KeywordKind::Effect).to_string(), "effect: x");
    }
}
