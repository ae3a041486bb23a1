use core::cmp::Ordering;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sampleshop_core::{DomainError, DomainResult, Entity, uuid_id};

use crate::item::SurveyQuestionItem;
use crate::survey::SurveyId;

uuid_id!(SurveyQuestionId, "SurveyQuestionId");

/// How a question is answered. Stored as its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SingleChoice,
    MultiChoice,
    FreeText,
}

impl QuestionType {
    pub fn code(self) -> i16 {
        match self {
            QuestionType::SingleChoice => 1,
            QuestionType::MultiChoice => 2,
            QuestionType::FreeText => 3,
        }
    }

    pub fn from_code(code: i16) -> DomainResult<Self> {
        match code {
            1 => Ok(QuestionType::SingleChoice),
            2 => Ok(QuestionType::MultiChoice),
            3 => Ok(QuestionType::FreeText),
            other => Err(DomainError::validation(format!(
                "unknown question type code: {other}"
            ))),
        }
    }

    pub fn takes_items(self) -> bool {
        self != QuestionType::FreeText
    }
}

/// A question, optionally attached to a survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyQuestion {
    #[serde(default)]
    pub id: SurveyQuestionId,
    #[serde(default)]
    pub survey: Option<SurveyId>,
    pub content: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default)]
    pub sort_order: u32,
}

impl SurveyQuestion {
    pub fn new(
        survey: Option<SurveyId>,
        content: impl Into<String>,
        question_type: QuestionType,
        sort_order: u32,
    ) -> Self {
        Self {
            id: SurveyQuestionId::new(),
            survey,
            content: content.into(),
            question_type,
            sort_order,
        }
    }

    /// Validate the question against the items it currently owns.
    ///
    /// A question cannot become free-text while it still has items.
    pub fn validate(&self, items: &[SurveyQuestionItem]) -> DomainResult<()> {
        if self.content.trim().is_empty() {
            return Err(DomainError::validation("question content cannot be empty"));
        }
        let owns_items = items.iter().any(|item| item.question == self.id);
        if !self.question_type.takes_items() && owns_items {
            return Err(DomainError::validation(crate::FREE_TEXT_HAS_NO_ITEMS));
        }
        Ok(())
    }
}

impl core::fmt::Display for SurveyQuestion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}. {}", self.sort_order, self.content)
    }
}

impl Entity for SurveyQuestion {
    type Id = SurveyQuestionId;
    const TABLE: &'static str = "survey_questions";
    const FOREIGN_KEYS: &'static [&'static str] = &["survey_id"];

    fn id(&self) -> Self::Id {
        self.id
    }

    fn reference(&self, column: &str) -> Option<Uuid> {
        match column {
            "survey_id" => self.survey.map(Into::into),
            _ => None,
        }
    }

    fn default_order(&self, other: &Self) -> Ordering {
        self.sort_order
            .cmp(&other.sort_order)
            .then_with(|| self.id.cmp(&other.id))
    }
}
