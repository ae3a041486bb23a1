use core::cmp::Ordering;

use serde::{Deserialize, Serialize};

use sampleshop_core::{DomainResult, DomainError, Entity, uuid_id};

uuid_id!(SurveyId, "SurveyId");

/// A named questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Survey {
    #[serde(default)]
    pub id: SurveyId,
    pub name: String,
    #[serde(default)]
    pub sort_order: u32,
}

impl Survey {
    pub fn new(name: impl Into<String>, sort_order: u32) -> Self {
        Self {
            id: SurveyId::new(),
            name: name.into(),
            sort_order,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("survey name cannot be empty"));
        }
        Ok(())
    }
}

impl core::fmt::Display for Survey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.name)
    }
}

impl Entity for Survey {
    type Id = SurveyId;
    const TABLE: &'static str = "surveys";

    fn id(&self) -> Self::Id {
        self.id
    }

    fn default_order(&self, other: &Self) -> Ordering {
        self.sort_order
            .cmp(&other.sort_order)
            .then_with(|| self.id.cmp(&other.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn survey(n: u128, sort_order: u32) -> Survey {
        Survey {
            id: SurveyId::from(Uuid::from_u128(n)),
            name: format!("Survey {n}"),
            sort_order,
        }
    }

    #[test]
    fn blank_name_is_rejected() {
        assert!(Survey::new("  ", 0).validate().unwrap_err().is_validation());
        Survey::new("Skin check", 0).validate().unwrap();
    }

    #[test]
    fn sort_order_comes_before_id() {
        let mut surveys = vec![survey(1, 2), survey(2, 1), survey(3, 1)];
        surveys.sort_by(|a, b| a.default_order(b));
        let ids: Vec<_> = surveys.iter().map(|s| s.id).collect();
        assert_eq!(
            ids,
            [2u128, 3, 1].map(|n| SurveyId::from(Uuid::from_u128(n))).to_vec()
        );
    }
}
