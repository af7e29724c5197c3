pub mod memory_repository;
pub mod mongo_repository;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    db::Database,
    errors::AppResult,
    models::domain::{Answer, Attempt, Content, Entity, Question, Quiz, QuizOption, Summary},
};

pub use memory_repository::InMemoryRepository;
pub use mongo_repository::MongoRepository;

/// Persistence gateway for one entity kind. No business logic lives here.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    async fn create(&self, entity: T) -> AppResult<T>;
    async fn create_many(&self, entities: Vec<T>) -> AppResult<Vec<T>>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<T>>;
    /// Children of `parent_id`, ascending by the entity's sort field.
    async fn find_by_parent(&self, parent_id: &str) -> AppResult<Vec<T>>;
    async fn update(&self, id: &str, patch: T::Patch) -> AppResult<Option<T>>;
    async fn delete(&self, id: &str) -> AppResult<bool>;
    async fn delete_by_parent(&self, parent_id: &str) -> AppResult<u64>;
}

#[async_trait]
pub trait AttemptRepository: Repository<Attempt> {
    async fn find_by_quiz_and_user(&self, quiz_id: &str, user_id: &str) -> AppResult<Vec<Attempt>>;
    async fn count_user_attempts(&self, quiz_id: &str, user_id: &str) -> AppResult<u64>;
    /// Highest-numbered finished attempt of `user_id` on `quiz_id`.
    async fn find_last_finished(&self, quiz_id: &str, user_id: &str) -> AppResult<Option<Attempt>>;
}

#[derive(Clone)]
pub struct Repositories {
    pub contents: Arc<dyn Repository<Content>>,
    pub quizzes: Arc<dyn Repository<Quiz>>,
    pub questions: Arc<dyn Repository<Question>>,
    pub options: Arc<dyn Repository<QuizOption>>,
    pub attempts: Arc<dyn AttemptRepository>,
    pub answers: Arc<dyn Repository<Answer>>,
    pub summaries: Arc<dyn Repository<Summary>>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            contents: Arc::new(InMemoryRepository::<Content>::new()),
            quizzes: Arc::new(InMemoryRepository::<Quiz>::new()),
            questions: Arc::new(InMemoryRepository::<Question>::new()),
            options: Arc::new(InMemoryRepository::<QuizOption>::new()),
            attempts: Arc::new(InMemoryRepository::<Attempt>::new()),
            answers: Arc::new(InMemoryRepository::<Answer>::new()),
            summaries: Arc::new(InMemoryRepository::<Summary>::new()),
        }
    }

    pub async fn mongo(db: &Database) -> AppResult<Self> {
        let contents = MongoRepository::<Content>::new(db);
        let quizzes = MongoRepository::<Quiz>::new(db);
        let questions = MongoRepository::<Question>::new(db);
        let options = MongoRepository::<QuizOption>::new(db);
        let attempts = MongoRepository::<Attempt>::new(db);
        let answers = MongoRepository::<Answer>::new(db);
        let summaries = MongoRepository::<Summary>::new(db);

        contents.ensure_indexes().await?;
        quizzes.ensure_indexes().await?;
        questions.ensure_indexes().await?;
        options.ensure_indexes().await?;
        attempts.ensure_indexes().await?;
        attempts.ensure_attempt_number_index().await?;
        answers.ensure_indexes().await?;
        summaries.ensure_indexes().await?;

        Ok(Self {
            contents: Arc::new(contents),
            quizzes: Arc::new(quizzes),
            questions: Arc::new(questions),
            options: Arc::new(options),
            attempts: Arc::new(attempts),
            answers: Arc::new(answers),
            summaries: Arc::new(summaries),
        })
    }
}
