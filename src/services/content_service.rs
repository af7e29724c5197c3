use std::sync::Arc;

use futures::future::try_join_all;

use crate::{
    auth::load_owned_content,
    constants::MAX_RAW_INPUT_CHARS,
    errors::{AppError, AppResult},
    models::{
        domain::{Answer, Attempt, Content, Quiz, Summary},
        dto::response::{ContentDetail, ContentListItem, QuizCreatedResponse},
    },
    repositories::{AttemptRepository, Repository},
    services::{
        quiz_build_service::QuizBuildService,
        quiz_generation_service::{QuizGenerationRequest, QuizGenerationService},
        quiz_service::QuizService,
    },
};

pub struct ContentService {
    contents: Arc<dyn Repository<Content>>,
    quizzes: Arc<dyn Repository<Quiz>>,
    attempts: Arc<dyn AttemptRepository>,
    answers: Arc<dyn Repository<Answer>>,
    summaries: Arc<dyn Repository<Summary>>,
    generator: Arc<QuizGenerationService>,
    builder: Arc<QuizBuildService>,
    quiz_service: Arc<QuizService>,
}

impl ContentService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        contents: Arc<dyn Repository<Content>>,
        quizzes: Arc<dyn Repository<Quiz>>,
        attempts: Arc<dyn AttemptRepository>,
        answers: Arc<dyn Repository<Answer>>,
        summaries: Arc<dyn Repository<Summary>>,
        generator: Arc<QuizGenerationService>,
        builder: Arc<QuizBuildService>,
        quiz_service: Arc<QuizService>,
    ) -> Self {
        Self {
            contents,
            quizzes,
            attempts,
            answers,
            summaries,
            generator,
            builder,
            quiz_service,
        }
    }

    /// Generates title, description and a first quiz for new study material.
    /// Nothing is written until generation has succeeded.
    pub async fn create_content(
        &self,
        raw_text: &str,
        owner_id: &str,
    ) -> AppResult<QuizCreatedResponse> {
        log::info!("Creating content for user '{}'", owner_id);

        self.try_create_content(raw_text, owner_id)
            .await
            .map_err(|err| {
                log::error!("Content creation for user '{}' failed: {}", owner_id, err);
                err.with_context("failed to create content")
            })
    }

    async fn try_create_content(
        &self,
        raw_text: &str,
        owner_id: &str,
    ) -> AppResult<QuizCreatedResponse> {
        let raw_input = raw_text.trim();
        if raw_input.is_empty() {
            return Err(AppError::ValidationError(
                "raw_text must not be empty".to_string(),
            ));
        }
        let length = raw_input.chars().count();
        if length > MAX_RAW_INPUT_CHARS {
            return Err(AppError::ValidationError(format!(
                "raw_text must be at most {} characters, got {}",
                MAX_RAW_INPUT_CHARS, length
            )));
        }

        let generated_meta = self.generator.generate_title_description(raw_input).await?;
        let generated = self
            .generator
            .generate_question_set(QuizGenerationRequest::Fresh {
                title: &generated_meta.title,
                description: &generated_meta.description,
                content: raw_input,
            })
            .await?;

        let description = Some(generated_meta.description).filter(|d| !d.is_empty());
        let content = self
            .contents
            .create(Content::new(
                raw_input.to_string(),
                Some(generated_meta.title),
                description,
                owner_id,
            ))
            .await?;

        let quiz = match self.quizzes.create(Quiz::new(&content.id, 1, None)).await {
            Ok(quiz) => quiz,
            Err(err) => {
                self.discard(&content, None).await;
                return Err(err);
            }
        };

        let questions_created = match self.builder.build_quiz(&quiz.id, &generated.questions).await {
            Ok(created) => created,
            Err(err) => {
                self.discard(&content, Some(&quiz)).await;
                return Err(err);
            }
        };

        log::info!(
            "Created content '{}' with first quiz '{}' ({} questions)",
            content.id,
            quiz.id,
            questions_created
        );

        Ok(QuizCreatedResponse {
            content,
            quiz,
            questions_created,
        })
    }

    pub async fn get_content_detail(&self, content_id: &str, user_id: &str) -> AppResult<ContentDetail> {
        let content = load_owned_content(self.contents.as_ref(), content_id, user_id).await?;
        let quizzes = self.quizzes.find_by_parent(&content.id).await?;

        let mut details = Vec::with_capacity(quizzes.len());
        for quiz in quizzes {
            details.push(self.quiz_service.quiz_detail(quiz, user_id).await?);
        }

        Ok(ContentDetail {
            content,
            quizzes: details,
        })
    }

    /// The caller's contents, newest first, with quiz and question totals.
    pub async fn list_contents(&self, user_id: &str) -> AppResult<Vec<ContentListItem>> {
        let mut contents = self.contents.find_by_parent(user_id).await?;
        contents.reverse();

        let mut items = Vec::with_capacity(contents.len());
        for content in contents {
            let quizzes = self.quizzes.find_by_parent(&content.id).await?;
            let counts = try_join_all(
                quizzes
                    .iter()
                    .map(|quiz| self.quiz_service.count_questions(&quiz.id)),
            )
            .await?;

            items.push(ContentListItem {
                total_quizzes: quizzes.len(),
                total_questions: counts.iter().sum(),
                content,
            });
        }

        Ok(items)
    }

    /// Hard delete of a content and everything under it.
    pub async fn delete_content(&self, content_id: &str, user_id: &str) -> AppResult<()> {
        let content = load_owned_content(self.contents.as_ref(), content_id, user_id).await?;

        let quizzes = self.quizzes.find_by_parent(&content.id).await?;
        for quiz in &quizzes {
            self.delete_quiz_tree(quiz).await?;
        }
        self.quizzes.delete_by_parent(&content.id).await?;
        self.contents.delete(&content.id).await?;

        log::info!(
            "Deleted content '{}' with {} quizzes",
            content.id,
            quizzes.len()
        );
        Ok(())
    }

    async fn delete_quiz_tree(&self, quiz: &Quiz) -> AppResult<()> {
        let attempts: Vec<Attempt> = self.attempts.find_by_parent(&quiz.id).await?;
        for attempt in &attempts {
            self.answers.delete_by_parent(&attempt.id).await?;
        }
        self.attempts.delete_by_parent(&quiz.id).await?;
        self.summaries.delete_by_parent(&quiz.id).await?;
        self.builder.clear_quiz(&quiz.id).await
    }

    async fn discard(&self, content: &Content, quiz: Option<&Quiz>) {
        log::warn!("Discarding content '{}' after failed write", content.id);
        if let Some(quiz) = quiz {
            if let Err(err) = self.builder.clear_quiz(&quiz.id).await {
                log::error!("Could not clear quiz '{}': {}", quiz.id, err);
            }
            if let Err(err) = self.quizzes.delete(&quiz.id).await {
                log::error!("Could not delete quiz '{}': {}", quiz.id, err);
            }
        }
        if let Err(err) = self.contents.delete(&content.id).await {
            log::error!("Could not delete content '{}': {}", content.id, err);
        }
    }
}
