use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{Attempt, Entity},
};

use super::{AttemptRepository, Repository};

/// In-process gateway used by `STORAGE_BACKEND=memory` and by the test suites.
pub struct InMemoryRepository<T: Entity> {
    items: RwLock<HashMap<String, T>>,
}

impl<T: Entity> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

impl<T: Entity> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn duplicate_key(collection: &str, id: &str) -> AppError {
    AppError::DatabaseError(format!("duplicate id '{}' in {}", id, collection))
}

#[async_trait]
impl<T: Entity> Repository<T> for InMemoryRepository<T> {
    async fn create(&self, entity: T) -> AppResult<T> {
        let mut items = self.items.write().await;
        if items.contains_key(entity.id()) {
            return Err(duplicate_key(T::COLLECTION, entity.id()));
        }
        items.insert(entity.id().to_string(), entity.clone());
        Ok(entity)
    }

    async fn create_many(&self, entities: Vec<T>) -> AppResult<Vec<T>> {
        let mut items = self.items.write().await;
        if let Some(existing) = entities.iter().find(|e| items.contains_key(e.id())) {
            return Err(duplicate_key(T::COLLECTION, existing.id()));
        }
        for entity in &entities {
            items.insert(entity.id().to_string(), entity.clone());
        }
        Ok(entities)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<T>> {
        let items = self.items.read().await;
        Ok(items.get(id).cloned())
    }

    async fn find_by_parent(&self, parent_id: &str) -> AppResult<Vec<T>> {
        let items = self.items.read().await;
        let mut children: Vec<T> = items
            .values()
            .filter(|item| item.parent_id() == parent_id)
            .cloned()
            .collect();
        children.sort_by_key(|item| item.sort_key());
        Ok(children)
    }

    async fn update(&self, id: &str, patch: T::Patch) -> AppResult<Option<T>> {
        let mut items = self.items.write().await;
        match items.get_mut(id) {
            Some(item) => {
                item.apply(patch);
                Ok(Some(item.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let mut items = self.items.write().await;
        Ok(items.remove(id).is_some())
    }

    async fn delete_by_parent(&self, parent_id: &str) -> AppResult<u64> {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|_, item| item.parent_id() != parent_id);
        Ok((before - items.len()) as u64)
    }
}

#[async_trait]
impl AttemptRepository for InMemoryRepository<Attempt> {
    async fn find_by_quiz_and_user(&self, quiz_id: &str, user_id: &str) -> AppResult<Vec<Attempt>> {
        let items = self.items.read().await;
        let mut attempts: Vec<Attempt> = items
            .values()
            .filter(|a| a.quiz_id == quiz_id && a.user_id == user_id)
            .cloned()
            .collect();
        attempts.sort_by_key(|a| a.attempt_number);
        Ok(attempts)
    }

    async fn count_user_attempts(&self, quiz_id: &str, user_id: &str) -> AppResult<u64> {
        let items = self.items.read().await;
        Ok(items
            .values()
            .filter(|a| a.quiz_id == quiz_id && a.user_id == user_id)
            .count() as u64)
    }

    async fn find_last_finished(&self, quiz_id: &str, user_id: &str) -> AppResult<Option<Attempt>> {
        let items = self.items.read().await;
        Ok(items
            .values()
            .filter(|a| a.quiz_id == quiz_id && a.user_id == user_id && a.is_finished())
            .max_by_key(|a| a.attempt_number)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::{Question, QuestionPatch, Quiz, QuizOption};

    #[tokio::test]
    async fn find_by_parent_orders_by_sort_field() {
        let repo = InMemoryRepository::<Quiz>::new();
        repo.create(Quiz::new("content-1", 3, None)).await.unwrap();
        repo.create(Quiz::new("content-1", 1, None)).await.unwrap();
        repo.create(Quiz::new("content-2", 2, None)).await.unwrap();

        let quizzes = repo.find_by_parent("content-1").await.unwrap();

        assert_eq!(quizzes.len(), 2);
        assert_eq!(quizzes[0].order_index, 1);
        assert_eq!(quizzes[1].order_index, 3);
    }

    #[tokio::test]
    async fn create_rejects_duplicate_id() {
        let repo = InMemoryRepository::<QuizOption>::new();
        let option = QuizOption::new("q-1", 1, "A".into());

        repo.create(option.clone()).await.unwrap();
        let err = repo.create(option).await.unwrap_err();

        assert!(matches!(err, AppError::DatabaseError(_)));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn update_applies_patch_and_reports_missing() {
        let repo = InMemoryRepository::<Question>::new();
        let question = repo
            .create(Question::new("quiz-1", 1, "What?".into(), None))
            .await
            .unwrap();

        let updated = repo
            .update(
                &question.id,
                QuestionPatch {
                    correct_option_id: "opt-1".into(),
                },
            )
            .await
            .unwrap()
            .unwrap();
        let missing = repo
            .update(
                "nope",
                QuestionPatch {
                    correct_option_id: "opt-1".into(),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.correct_option_id.as_deref(), Some("opt-1"));
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn delete_by_parent_counts_removed() {
        let repo = InMemoryRepository::<QuizOption>::new();
        let options: Vec<_> = (1..=4)
            .map(|i| QuizOption::new("q-1", i, format!("option {}", i)))
            .collect();
        repo.create_many(options).await.unwrap();
        repo.create(QuizOption::new("q-2", 1, "other".into()))
            .await
            .unwrap();

        assert_eq!(repo.delete_by_parent("q-1").await.unwrap(), 4);
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn last_finished_ignores_open_attempts() {
        let repo = InMemoryRepository::<Attempt>::new();
        let mut first = Attempt::start("quiz-1", "user-1", 1, None);
        first.finished_at = Some(chrono::Utc::now());
        repo.create(first).await.unwrap();
        repo.create(Attempt::start("quiz-1", "user-1", 2, None))
            .await
            .unwrap();

        let last = repo
            .find_last_finished("quiz-1", "user-1")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(last.attempt_number, 1);
        assert_eq!(repo.count_user_attempts("quiz-1", "user-1").await.unwrap(), 2);
    }
}
