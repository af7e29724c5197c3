use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{new_id, Entity, Immutable};

/// Review text written after a finalize. Append-only; the newest one is current.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Summary {
    pub id: String,
    pub quiz_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Summary {
    pub fn new(quiz_id: &str, text: String) -> Self {
        Self {
            id: new_id(),
            quiz_id: quiz_id.to_string(),
            text,
            created_at: Utc::now(),
        }
    }
}

impl Entity for Summary {
    type Patch = Immutable;
    type SortKey = String;

    const COLLECTION: &'static str = "summaries";
    const PARENT_FIELD: &'static str = "quiz_id";
    const SORT_FIELD: &'static str = "id";

    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> &str {
        &self.quiz_id
    }

    fn sort_key(&self) -> String {
        self.id.clone()
    }

    fn apply(&mut self, patch: Immutable) {
        match patch {}
    }
}
