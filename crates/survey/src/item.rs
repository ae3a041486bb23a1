use core::cmp::Ordering;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sampleshop_catalog::FilterTagId;
use sampleshop_core::{DomainError, DomainResult, Entity, uuid_id};

use crate::question::{SurveyQuestion, SurveyQuestionId};

uuid_id!(SurveyQuestionItemId, "SurveyQuestionItemId");

/// One selectable choice of a single- or multi-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyQuestionItem {
    #[serde(default)]
    pub id: SurveyQuestionItemId,
    pub question: SurveyQuestionId,
    pub content: String,
    #[serde(default)]
    pub sort_order: u32,
    /// Filter tags a user picking this choice is interested in.
    #[serde(default)]
    pub filter_tags: Vec<FilterTagId>,
}

impl SurveyQuestionItem {
    pub fn new(question: SurveyQuestionId, content: impl Into<String>, sort_order: u32) -> Self {
        Self {
            id: SurveyQuestionItemId::new(),
            question,
            content: content.into(),
            sort_order,
            filter_tags: Vec::new(),
        }
    }

    pub fn add_filter_tag(&mut self, tag: FilterTagId) {
        if !self.filter_tags.contains(&tag) {
            self.filter_tags.push(tag);
        }
    }

    /// Validate against the owning question row.
    pub fn validate(&self, question: &SurveyQuestion) -> DomainResult<()> {
        if question.id != self.question {
            return Err(DomainError::validation(
                "item validated against a different question",
            ));
        }
        if !question.question_type.takes_items() {
            return Err(DomainError::validation(crate::FREE_TEXT_HAS_NO_ITEMS));
        }
        Ok(())
    }
}

impl core::fmt::Display for SurveyQuestionItem {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.content)
    }
}

impl Entity for SurveyQuestionItem {
    type Id = SurveyQuestionItemId;
    const TABLE: &'static str = "survey_question_items";
    const FOREIGN_KEYS: &'static [&'static str] = &["question_id"];

    fn id(&self) -> Self::Id {
        self.id
    }

    fn reference(&self, column: &str) -> Option<Uuid> {
        (column == "question_id").then(|| self.question.into())
    }

    fn default_order(&self, other: &Self) -> Ordering {
        self.sort_order
            .cmp(&other.sort_order)
            .then_with(|| self.id.cmp(&other.id))
    }
}
