use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{new_id, Entity, QuizMode};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Attempt {
    pub id: String,
    pub quiz_id: String,
    pub user_id: String,
    pub attempt_number: i32,
    /// Snapshot of the quiz mode when the attempt was taken.
    pub mode: Option<QuizMode>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl Attempt {
    pub fn start(quiz_id: &str, user_id: &str, attempt_number: i32, mode: Option<QuizMode>) -> Self {
        Self {
            id: new_id(),
            quiz_id: quiz_id.to_string(),
            user_id: user_id.to_string(),
            attempt_number,
            mode,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct AttemptPatch {
    pub finished_at: DateTime<Utc>,
}

impl Entity for Attempt {
    type Patch = AttemptPatch;
    type SortKey = String;

    const COLLECTION: &'static str = "attempts";
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

    fn apply(&mut self, patch: AttemptPatch) {
        self.finished_at = Some(patch.finished_at);
    }
}
