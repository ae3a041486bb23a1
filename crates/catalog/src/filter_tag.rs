use core::str::FromStr;

use serde::{Deserialize, Serialize};

use sampleshop_core::{DomainError, DomainResult, Entity, UniqueKey, uuid_id};

uuid_id!(
    /// Filter tag identifier.
    FilterTagId,
    "FilterTagId"
);

/// Facet a filter tag belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterTagKind {
    SkinType,
    SkinConcern,
    Preference,
    Function,
    Brand,
}

impl FilterTagKind {
    pub const ALL: [FilterTagKind; 5] = [
        FilterTagKind::SkinType,
        FilterTagKind::SkinConcern,
        FilterTagKind::Preference,
        FilterTagKind::Function,
        FilterTagKind::Brand,
    ];

    /// Stored column value.
    pub fn as_str(self) -> &'static str {
        match self {
            FilterTagKind::SkinType => "skin_type",
            FilterTagKind::SkinConcern => "skin_concern",
            FilterTagKind::Preference => "preference",
            FilterTagKind::Function => "function",
            FilterTagKind::Brand => "brand",
        }
    }

    // Rows imported from the legacy shop carry the Korean labels.
    fn legacy_label(self) -> &'static str {
        match self {
            FilterTagKind::SkinType => "피부타입",
            FilterTagKind::SkinConcern => "피부고민",
            FilterTagKind::Preference => "취향",
            FilterTagKind::Function => "기능성",
            FilterTagKind::Brand => "브랜드",
        }
    }
}

impl core::fmt::Display for FilterTagKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterTagKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        FilterTagKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s || k.legacy_label() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown filter tag type: {s}")))
    }
}

/// A typed label used for faceted filtering (skin type, concern, brand, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterTag {
    #[serde(default)]
    pub id: FilterTagId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FilterTagKind,
}

impl FilterTag {
    pub fn new(name: impl Into<String>, kind: FilterTagKind) -> Self {
        Self {
            id: FilterTagId::new(),
            name: name.into(),
            kind,
        }
    }

    pub fn is_brand(&self) -> bool {
        self.kind == FilterTagKind::Brand
    }

    pub fn validate(&self) -> DomainResult<()> {
        crate::require_non_empty("filter tag name", &self.name)
    }

    /// A tag stays a brand while `branded_products` products use it as one.
    pub fn validate_kind_change(&self, branded_products: usize) -> DomainResult<()> {
        if !self.is_brand() && branded_products > 0 {
            return Err(DomainError::validation(format!(
                "filter tag '{}' is the brand of {branded_products} products",
                self.name
            )));
        }
        Ok(())
    }
}

impl core::fmt::Display for FilterTag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.kind, self.name)
    }
}

impl Entity for FilterTag {
    type Id = FilterTagId;
    const TABLE: &'static str = "filter_tags";

    fn id(&self) -> Self::Id {
        self.id
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new("filter_tags_name_key", self.name.clone())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_stored_and_legacy_values() {
        assert_eq!("brand".parse::<FilterTagKind>().unwrap(), FilterTagKind::Brand);
        assert_eq!("브랜드".parse::<FilterTagKind>().unwrap(), FilterTagKind::Brand);
        assert_eq!(
            "피부고민".parse::<FilterTagKind>().unwrap(),
            FilterTagKind::SkinConcern
        );
        assert!("colour".parse::<FilterTagKind>().unwrap_err().is_validation());
    }

    #[test]
    fn display_includes_kind() {
        let tag = FilterTag::new("Dry", FilterTagKind::SkinType);
        assert_eq!(tag.to_string(), "skin_type: Dry");
    }

    #[test]
    fn name_is_the_unique_key() {
        let tag = FilterTag::new("Acme", FilterTagKind::Brand);
        let keys = tag.unique_keys();
        assert_eq!(keys, vec![UniqueKey::new("filter_tags_name_key", "Acme")]);
        assert!(tag.is_brand());
    }

    #[test]
    fn used_brand_cannot_change_kind() {
        let mut tag = FilterTag::new("Acme", FilterTagKind::Brand);
        tag.validate_kind_change(2).unwrap();

        tag.kind = FilterTagKind::SkinConcern;
        assert!(tag.validate_kind_change(2).unwrap_err().is_validation());
        tag.validate_kind_change(0).unwrap();
    }

    #[test]
    fn serde_uses_type_field() {
        let tag: FilterTag =
            serde_json::from_str(r#"{"name":"Oily","type":"skin_type"}"#).unwrap();
        assert_eq!(tag.kind, FilterTagKind::SkinType);
    }
}
