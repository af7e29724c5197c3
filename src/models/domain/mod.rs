pub mod answer;
pub mod attempt;
pub mod content;
pub mod question;
pub mod quiz;
pub mod quiz_option;
pub mod summary;

pub use answer::Answer;
pub use attempt::{Attempt, AttemptPatch};
pub use content::Content;
pub use question::{Question, QuestionPatch};
pub use quiz::{Quiz, QuizMode, QuizPatch};
pub use quiz_option::QuizOption;
pub use summary::Summary;

use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

/// A persisted record the generic repositories know how to store.
///
/// Every entity belongs to exactly one parent (content to its owner, quiz to
/// its content, and so on) and is listed under that parent in `sort_key` order.
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + Unpin + 'static {
    /// Partial update accepted by `Repository::update`.
    type Patch: Serialize + Send + Sync + 'static;
    type SortKey: Ord;

    const COLLECTION: &'static str;
    const PARENT_FIELD: &'static str;
    const SORT_FIELD: &'static str;

    fn id(&self) -> &str;
    fn parent_id(&self) -> &str;
    fn sort_key(&self) -> Self::SortKey;
    fn apply(&mut self, patch: Self::Patch);
}

/// Patch type for records that are never updated after creation.
#[derive(Debug, Clone, Copy, Serialize)]
pub enum Immutable {}

/// Caller-generated, time-ordered identifier.
pub fn new_id() -> String {
    Uuid::now_v7().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_time_ordered() {
        let first = new_id();
        let second = new_id();

        assert_ne!(first, second);
        assert!(first < second);
        assert_eq!(first.len(), 36);
    }
}
