use serde::{Deserialize, Serialize};

use super::{new_id, Entity};
use crate::constants::NO_EXPLANATION;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Question {
    pub id: String,
    pub quiz_id: String,
    pub order_index: i32,
    pub statement: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Set once, after the question's options exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_option_id: Option<String>,
}

impl Question {
    pub fn new(quiz_id: &str, order_index: i32, statement: String, explanation: Option<String>) -> Self {
        Self {
            id: new_id(),
            quiz_id: quiz_id.to_string(),
            order_index,
            statement,
            explanation,
            correct_option_id: None,
        }
    }

    pub fn explanation_or_default(&self) -> &str {
        self.explanation
            .as_deref()
            .map(str::trim)
            .filter(|explanation| !explanation.is_empty())
            .unwrap_or(NO_EXPLANATION)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct QuestionPatch {
    pub correct_option_id: String,
}

impl Entity for Question {
    type Patch = QuestionPatch;
    type SortKey = i32;

    const COLLECTION: &'static str = "questions";
    const PARENT_FIELD: &'static str = "quiz_id";
    const SORT_FIELD: &'static str = "order_index";

    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> &str {
        &self.quiz_id
    }

    fn sort_key(&self) -> i32 {
        self.order_index
    }

    fn apply(&mut self, patch: QuestionPatch) {
        self.correct_option_id = Some(patch.correct_option_id);
    }
}
