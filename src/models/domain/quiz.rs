use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{new_id, Entity};

/// Strategy a follow-up quiz was generated with. The first quiz of a content has none.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizMode {
    Reinforcement,
    Progression,
}

impl QuizMode {
    pub fn from_progression_flag(progression: bool) -> Self {
        if progression {
            QuizMode::Progression
        } else {
            QuizMode::Reinforcement
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuizMode::Reinforcement => "reinforcement",
            QuizMode::Progression => "progression",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Quiz {
    pub id: String,
    pub content_id: String,
    pub order_index: i32,
    pub mode: Option<QuizMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Quiz {
    pub fn new(content_id: &str, order_index: i32, mode: Option<QuizMode>) -> Self {
        Self {
            id: new_id(),
            content_id: content_id.to_string(),
            order_index,
            mode,
            feedback: None,
            created_at: Utc::now(),
        }
    }
}

/// Feedback is the only field of a quiz that changes after creation.
#[derive(Clone, Debug, Serialize)]
pub struct QuizPatch {
    pub feedback: String,
}

impl Entity for Quiz {
    type Patch = QuizPatch;
    type SortKey = i32;

    const COLLECTION: &'static str = "quizzes";
    const PARENT_FIELD: &'static str = "content_id";
    const SORT_FIELD: &'static str = "order_index";

    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> &str {
        &self.content_id
    }

    fn sort_key(&self) -> i32 {
        self.order_index
    }

    fn apply(&mut self, patch: QuizPatch) {
        self.feedback = Some(patch.feedback);
    }
}
