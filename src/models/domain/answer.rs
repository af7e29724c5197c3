use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{new_id, Entity, Immutable};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Answer {
    pub id: String,
    pub attempt_id: String,
    pub question_id: String,
    pub option_id: String,
    pub is_correct: bool,
    pub answered_at: DateTime<Utc>,
}

impl Answer {
    pub fn new(attempt_id: &str, question_id: &str, option_id: &str, is_correct: bool) -> Self {
        Self {
            id: new_id(),
            attempt_id: attempt_id.to_string(),
            question_id: question_id.to_string(),
            option_id: option_id.to_string(),
            is_correct,
            answered_at: Utc::now(),
        }
    }
}

impl Entity for Answer {
    type Patch = Immutable;
    type SortKey = String;

    const COLLECTION: &'static str = "answers";
    const PARENT_FIELD: &'static str = "attempt_id";
    const SORT_FIELD: &'static str = "id";

    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> &str {
        &self.attempt_id
    }

    fn sort_key(&self) -> String {
        self.id.clone()
    }

    fn apply(&mut self, patch: Immutable) {
        match patch {}
    }
}
