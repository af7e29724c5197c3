use serde::{Deserialize, Serialize};

use super::{new_id, Entity, Immutable};

/// One of the four answer choices of a question.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuizOption {
    pub id: String,
    pub question_id: String,
    pub order_index: i32,
    pub text: String,
}

impl QuizOption {
    pub fn new(question_id: &str, order_index: i32, text: String) -> Self {
        Self {
            id: new_id(),
            question_id: question_id.to_string(),
            order_index,
            text,
        }
    }
}

impl Entity for QuizOption {
    type Patch = Immutable;
    type SortKey = i32;

    const COLLECTION: &'static str = "options";
    const PARENT_FIELD: &'static str = "question_id";
    const SORT_FIELD: &'static str = "order_index";

    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> &str {
        &self.question_id
    }

    fn sort_key(&self) -> i32 {
        self.order_index
    }

    fn apply(&mut self, patch: Immutable) {
        match patch {}
    }
}
