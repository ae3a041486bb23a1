//! Survey domain module.
//!
//! A minimal questionnaire model: surveys own ordered questions, choice
//! questions own items, and users record results. The two write-time rules
//! live here as pure functions over already-loaded rows:
//!
//! - free-text questions never have items;
//! - a chosen answer must be one of its question's items.

pub mod item;
pub mod question;
pub mod result;
pub mod survey;

pub use item::{SurveyQuestionItem, SurveyQuestionItemId};
pub use question::{QuestionType, SurveyQuestion, SurveyQuestionId};
pub use result::{SurveyResult, SurveyResultId};
pub use survey::{Survey, SurveyId};

/// Message carried by the validation error for items on free-text questions.
pub const FREE_TEXT_HAS_NO_ITEMS: &str = "free-text questions cannot have items";

/// Message carried by the validation error for answers outside the choice set.
pub const ANSWER_NOT_A_CHOICE: &str = "chosen answer not among valid choices";
