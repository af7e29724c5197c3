use std::sync::Arc;

use crate::{
    auth::load_owned_content,
    errors::{AppError, AppResult},
    models::{
        domain::{Answer, Attempt, Content, Question, Quiz, QuizMode, QuizOption},
        dto::response::QuizCreatedResponse,
        generated::GeneratedQuestionSet,
    },
    repositories::{AttemptRepository, Repository},
    services::{
        quiz_build_service::QuizBuildService,
        quiz_generation_service::{
            PriorQuestion, QuizGenerationRequest, QuizGenerationService, WrongAnswerContext,
        },
    },
};

/// Picks the follow-up strategy for a content, gathers its context and builds the new quiz.
pub struct FollowUpService {
    contents: Arc<dyn Repository<Content>>,
    quizzes: Arc<dyn Repository<Quiz>>,
    questions: Arc<dyn Repository<Question>>,
    options: Arc<dyn Repository<QuizOption>>,
    attempts: Arc<dyn AttemptRepository>,
    answers: Arc<dyn Repository<Answer>>,
    generator: Arc<QuizGenerationService>,
    builder: Arc<QuizBuildService>,
}

impl FollowUpService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        contents: Arc<dyn Repository<Content>>,
        quizzes: Arc<dyn Repository<Quiz>>,
        questions: Arc<dyn Repository<Question>>,
        options: Arc<dyn Repository<QuizOption>>,
        attempts: Arc<dyn AttemptRepository>,
        answers: Arc<dyn Repository<Answer>>,
        generator: Arc<QuizGenerationService>,
        builder: Arc<QuizBuildService>,
    ) -> Self {
        Self {
            contents,
            quizzes,
            questions,
            options,
            attempts,
            answers,
            generator,
            builder,
        }
    }

    pub async fn generate_follow_up(
        &self,
        content_id: &str,
        user_id: &str,
        progression: bool,
    ) -> AppResult<QuizCreatedResponse> {
        let mode = QuizMode::from_progression_flag(progression);
        log::info!(
            "Generating {} follow-up quiz for content '{}'",
            mode.as_str(),
            content_id
        );

        self.try_generate_follow_up(content_id, user_id, mode)
            .await
            .map_err(|err| {
                log::error!("Follow-up for content '{}' failed: {}", content_id, err);
                err.with_context("failed to generate follow-up quiz")
            })
    }

    async fn try_generate_follow_up(
        &self,
        content_id: &str,
        user_id: &str,
        mode: QuizMode,
    ) -> AppResult<QuizCreatedResponse> {
        let content = load_owned_content(self.contents.as_ref(), content_id, user_id).await?;

        let existing = self.quizzes.find_by_parent(&content.id).await?;
        let order_index = existing
            .iter()
            .map(|quiz| quiz.order_index)
            .max()
            .ok_or_else(|| AppError::PolicyError("no prior quiz to follow up on".to_string()))?
            + 1;

        let generated = match mode {
            QuizMode::Progression => {
                let wrong_answers = self.progression_context(&existing, user_id).await?;
                self.generator
                    .generate_question_set(QuizGenerationRequest::Progression {
                        title: content.title_or_default(),
                        content: &content.raw_input,
                        wrong_answers: &wrong_answers,
                    })
                    .await?
            }
            QuizMode::Reinforcement => {
                let prior_questions = self.reinforcement_context(&existing).await?;
                self.generator
                    .generate_question_set(QuizGenerationRequest::Reinforcement {
                        title: content.title_or_default(),
                        content: &content.raw_input,
                        prior_questions: &prior_questions,
                    })
                    .await?
            }
        };

        let quiz = self
            .quizzes
            .create(Quiz::new(&content.id, order_index, Some(mode)))
            .await?;
        let questions_created = self.build_or_discard(&quiz, &generated).await?;

        log::info!(
            "Created {} quiz #{} for content '{}' with {} questions",
            mode.as_str(),
            order_index,
            content.id,
            questions_created
        );

        Ok(QuizCreatedResponse {
            content,
            quiz,
            questions_created,
        })
    }

    /// Wrong answers of the caller's most recent attempt on any quiz of the content.
    async fn progression_context(
        &self,
        quizzes: &[Quiz],
        user_id: &str,
    ) -> AppResult<Vec<WrongAnswerContext>> {
        let mut latest: Option<Attempt> = None;
        for quiz in quizzes {
            for attempt in self.attempts.find_by_quiz_and_user(&quiz.id, user_id).await? {
                let newer = latest.as_ref().map_or(true, |current| {
                    (attempt.started_at, &attempt.id) > (current.started_at, &current.id)
                });
                if newer {
                    latest = Some(attempt);
                }
            }
        }

        let attempt = latest.ok_or_else(|| {
            AppError::PolicyError("no prior attempt to base progression on".to_string())
        })?;

        let wrong: Vec<Answer> = self
            .answers
            .find_by_parent(&attempt.id)
            .await?
            .into_iter()
            .filter(|answer| !answer.is_correct)
            .collect();
        if wrong.is_empty() {
            return Err(AppError::PolicyError(
                "all answers correct, nothing to progress on".to_string(),
            ));
        }

        let mut context = Vec::with_capacity(wrong.len());
        for answer in &wrong {
            let Some(question) = self.questions.find_by_id(&answer.question_id).await? else {
                log::warn!("Skipping answer '{}': question is gone", answer.id);
                continue;
            };
            let correct = match question.correct_option_id.as_deref() {
                Some(option_id) => self.options.find_by_id(option_id).await?,
                None => None,
            };
            let Some(correct) = correct else {
                log::warn!(
                    "Skipping answer '{}': question '{}' has no correct option",
                    answer.id,
                    question.id
                );
                continue;
            };

            context.push(WrongAnswerContext {
                explanation: question.explanation_or_default().to_string(),
                statement: question.statement,
                correct_text: correct.text,
            });
        }

        log::info!(
            "Progression based on attempt '{}' with {} wrong answers",
            attempt.id,
            context.len()
        );
        Ok(context)
    }

    /// Every question asked so far on the content, with its option texts.
    async fn reinforcement_context(&self, quizzes: &[Quiz]) -> AppResult<Vec<PriorQuestion>> {
        let mut prior = Vec::new();
        for quiz in quizzes {
            for question in self.questions.find_by_parent(&quiz.id).await? {
                let options = self
                    .options
                    .find_by_parent(&question.id)
                    .await?
                    .into_iter()
                    .map(|option| option.text)
                    .collect();
                prior.push(PriorQuestion {
                    statement: question.statement,
                    options,
                });
            }
        }

        // Grows with every round; there is no cap on how many prior questions are sent.
        log::info!(
            "Reinforcement context holds {} prior questions from {} quizzes",
            prior.len(),
            quizzes.len()
        );
        Ok(prior)
    }

    async fn build_or_discard(
        &self,
        quiz: &Quiz,
        generated: &GeneratedQuestionSet,
    ) -> AppResult<usize> {
        match self.builder.build_quiz(&quiz.id, &generated.questions).await {
            Ok(created) => Ok(created),
            Err(err) => {
                log::warn!("Discarding quiz '{}' after failed build: {}", quiz.id, err);
                if let Err(cleanup) = self.builder.clear_quiz(&quiz.id).await {
                    log::error!("Could not clear quiz '{}': {}", quiz.id, cleanup);
                }
                if let Err(cleanup) = self.quizzes.delete(&quiz.id).await {
                    log::error!("Could not delete quiz '{}': {}", quiz.id, cleanup);
                }
                Err(err)
            }
        }
    }
}
