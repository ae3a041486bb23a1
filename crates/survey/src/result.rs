use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sampleshop_core::{DomainError, DomainResult, Entity, UserId, uuid_id};

use crate::item::{SurveyQuestionItem, SurveyQuestionItemId};
use crate::question::SurveyQuestionId;

uuid_id!(SurveyResultId, "SurveyResultId");

/// A user's answer to one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyResult {
    #[serde(default)]
    pub id: SurveyResultId,
    pub user: UserId,
    pub question: SurveyQuestionId,
    #[serde(default)]
    pub chosen_answer: Option<SurveyQuestionItemId>,
    #[serde(default)]
    pub written_answer: String,
}

impl SurveyResult {
    pub fn chosen(user: UserId, question: SurveyQuestionId, answer: SurveyQuestionItemId) -> Self {
        Self {
            id: SurveyResultId::new(),
            user,
            question,
            chosen_answer: Some(answer),
            written_answer: String::new(),
        }
    }

    pub fn written(user: UserId, question: SurveyQuestionId, answer: impl Into<String>) -> Self {
        Self {
            id: SurveyResultId::new(),
            user,
            question,
            chosen_answer: None,
            written_answer: answer.into(),
        }
    }

    /// Validate against the item set of the referenced question.
    ///
    /// `question_items` must be the items of `self.question`; membership is
    /// checked by id.
    pub fn validate(&self, question_items: &[SurveyQuestionItem]) -> DomainResult<()> {
        let Some(answer) = self.chosen_answer else {
            return Ok(());
        };
        let is_choice = question_items
            .iter()
            .any(|item| item.id == answer && item.question == self.question);
        if !is_choice {
            return Err(DomainError::validation(crate::ANSWER_NOT_A_CHOICE));
        }
        Ok(())
    }
}

impl Entity for SurveyResult {
    type Id = SurveyResultId;
    const TABLE: &'static str = "survey_results";
    const FOREIGN_KEYS: &'static [&'static str] = &["user_id", "question_id", "chosen_answer_id"];

    fn id(&self) -> Self::Id {
        self.id
    }

    fn reference(&self, column: &str) -> Option<Uuid> {
        match column {
            "user_id" => Some(self.user.into()),
            "question_id" => Some(self.question.into()),
            "chosen_answer_id" => self.chosen_answer.map(Into::into),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::{QuestionType, SurveyQuestion};

    fn question_with_items() -> (SurveyQuestion, Vec<SurveyQuestionItem>) {
        let question = SurveyQuestion::new(None, "Skin type?", QuestionType::SingleChoice, 1);
        let items = vec![
            SurveyQuestionItem::new(question.id, "A", 0),
            SurveyQuestionItem::new(question.id, "B", 1),
        ];
        (question, items)
    }

    #[test]
    fn answer_from_the_item_set_is_accepted() {
        let (question, items) = question_with_items();
        let result = SurveyResult::chosen(UserId::new(), question.id, items[1].id);
        assert!(result.validate(&items).is_ok());
    }

    #[test]
    fn answer_outside_the_item_set_is_rejected() {
        let (question, items) = question_with_items();
        let other = SurveyQuestion::new(None, "Concern?", QuestionType::SingleChoice, 2);
        let c = SurveyQuestionItem::new(other.id, "C", 0);

        let result = SurveyResult::chosen(UserId::new(), question.id, c.id);
        let err = result.validate(&items).unwrap_err();
        assert_eq!(err, DomainError::validation(crate::ANSWER_NOT_A_CHOICE));

        // Passing the foreign item along does not make it a choice of this question.
        let mut with_foreign = items.clone();
        with_foreign.push(c);
        assert!(result.validate(&with_foreign).is_err());
    }

    #[test]
    fn written_answers_skip_the_choice_check() {
        let (question, _) = question_with_items();
        let result = SurveyResult::written(UserId::new(), question.id, "oily in summer");
        assert!(result.validate(&[]).is_ok());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: a chosen answer validates iff it is one of the question's items.
            #[test]
            fn chosen_answer_valid_iff_member(item_count in 0usize..6, pick in 0usize..8) {
                let question = SurveyQuestion::new(None, "Q", QuestionType::MultiChoice, 0);
                let items: Vec<_> = (0..item_count)
                    .map(|i| SurveyQuestionItem::new(question.id, format!("item {i}"), i as u32))
                    .collect();
                let answer = items
                    .get(pick)
                    .map(|item| item.id)
                    .unwrap_or_else(SurveyQuestionItemId::new);

                let result = SurveyResult::chosen(UserId::new(), question.id, answer);
                prop_assert_eq!(result.validate(&items).is_ok(), pick < item_count);
            }
        }
    }
}
