use std::sync::Arc;

use crate::{
    config::{Config, StorageBackend},
    db::Database,
    errors::AppResult,
    repositories::Repositories,
    services::{
        content_service::ContentService,
        follow_up_service::FollowUpService,
        model_service::{LanguageModel, OpenAiLanguageModel},
        quiz_attempt_service::QuizAttemptService,
        quiz_build_service::QuizBuildService,
        quiz_generation_service::QuizGenerationService,
        quiz_service::QuizService,
        summary_service::SummaryService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub content_service: Arc<ContentService>,
    pub follow_up_service: Arc<FollowUpService>,
    pub quiz_service: Arc<QuizService>,
    pub quiz_attempt_service: Arc<QuizAttemptService>,
    pub summary_service: Arc<SummaryService>,
    pub database: Option<Database>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let (repositories, database) = match config.storage_backend {
            StorageBackend::Mongo => {
                let db = Database::connect(&config).await?;
                (Repositories::mongo(&db).await?, Some(db))
            }
            StorageBackend::Memory => {
                log::warn!("Using in-memory storage; data is lost on restart");
                (Repositories::in_memory(), None)
            }
        };

        let model: Arc<dyn LanguageModel> = Arc::new(OpenAiLanguageModel::from_config(&config));

        Ok(Self::from_parts(config, repositories, model, database))
    }

    /// Wires every service from already-built collaborators.
    pub fn from_parts(
        config: Config,
        repos: Repositories,
        model: Arc<dyn LanguageModel>,
        database: Option<Database>,
    ) -> Self {
        let generator = Arc::new(QuizGenerationService::new(model));
        let builder = Arc::new(QuizBuildService::new(
            repos.questions.clone(),
            repos.options.clone(),
        ));

        let summary_service = Arc::new(SummaryService::new(
            generator.clone(),
            repos.summaries.clone(),
            repos.quizzes.clone(),
            repos.contents.clone(),
        ));

        let quiz_service = Arc::new(QuizService::new(
            repos.contents.clone(),
            repos.quizzes.clone(),
            repos.questions.clone(),
            repos.options.clone(),
            repos.attempts.clone(),
            repos.answers.clone(),
            summary_service.clone(),
        ));

        let content_service = Arc::new(ContentService::new(
            repos.contents.clone(),
            repos.quizzes.clone(),
            repos.attempts.clone(),
            repos.answers.clone(),
            repos.summaries.clone(),
            generator.clone(),
            builder.clone(),
            quiz_service.clone(),
        ));

        let follow_up_service = Arc::new(FollowUpService::new(
            repos.contents.clone(),
            repos.quizzes.clone(),
            repos.questions.clone(),
            repos.options.clone(),
            repos.attempts.clone(),
            repos.answers.clone(),
            generator,
            builder,
        ));

        let quiz_attempt_service = Arc::new(QuizAttemptService::new(
            repos.contents,
            repos.quizzes,
            repos.questions,
            repos.options,
            repos.attempts,
            repos.answers,
            repos.summaries,
            summary_service.clone(),
        ));

        Self {
            content_service,
            follow_up_service,
            quiz_service,
            quiz_attempt_service,
            summary_service,
            database,
            config: Arc::new(config),
        }
    }

    /// Storage readiness; the in-memory backend is always ready.
    pub async fn readiness(&self) -> AppResult<()> {
        match &self.database {
            Some(db) => db.health_check().await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::model_service::MockLanguageModel;

    #[test]
    fn test_app_state_is_cloneable() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[tokio::test]
    async fn in_memory_state_is_ready() {
        let state = AppState::from_parts(
            Config::test_config(),
            Repositories::in_memory(),
            Arc::new(MockLanguageModel::new()),
            None,
        );

        assert!(state.readiness().await.is_ok());
    }
}
