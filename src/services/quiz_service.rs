use std::{collections::HashMap, sync::Arc};

use futures::future::try_join_all;

use crate::{
    auth::{load_owned_content, load_owned_quiz},
    errors::{AppError, AppResult},
    models::{
        domain::{Answer, Attempt, Content, Question, Quiz, QuizOption},
        dto::response::{
            AnswerHistoryItem, FinalizedInfo, OptionView, QuestionView, QuizDetail, QuizForTaking,
            QuizListItem,
        },
    },
    repositories::{AttemptRepository, Repository},
    services::summary_service::SummaryService,
};

/// Read side of quizzes: what a learner sees before and after taking one.
pub struct QuizService {
    contents: Arc<dyn Repository<Content>>,
    quizzes: Arc<dyn Repository<Quiz>>,
    questions: Arc<dyn Repository<Question>>,
    options: Arc<dyn Repository<QuizOption>>,
    attempts: Arc<dyn AttemptRepository>,
    answers: Arc<dyn Repository<Answer>>,
    summary_service: Arc<SummaryService>,
}

impl QuizService {
    pub fn new(
        contents: Arc<dyn Repository<Content>>,
        quizzes: Arc<dyn Repository<Quiz>>,
        questions: Arc<dyn Repository<Question>>,
        options: Arc<dyn Repository<QuizOption>>,
        attempts: Arc<dyn AttemptRepository>,
        answers: Arc<dyn Repository<Answer>>,
        summary_service: Arc<SummaryService>,
    ) -> Self {
        Self {
            contents,
            quizzes,
            questions,
            options,
            attempts,
            answers,
            summary_service,
        }
    }

    pub async fn get_quiz_for_taking(&self, quiz_id: &str, user_id: &str) -> AppResult<QuizForTaking> {
        let (quiz, content) =
            load_owned_quiz(self.quizzes.as_ref(), self.contents.as_ref(), quiz_id, user_id)
                .await?;
        self.assemble_for_taking(quiz, &content, user_id).await
    }

    /// The first quiz (lowest order) of a content, ready to be taken.
    pub async fn get_quiz_by_content(
        &self,
        content_id: &str,
        user_id: &str,
    ) -> AppResult<QuizForTaking> {
        let content = load_owned_content(self.contents.as_ref(), content_id, user_id).await?;
        let quiz = self
            .quizzes
            .find_by_parent(&content.id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                AppError::NotFound(format!("Content '{}' has no quiz yet", content.id))
            })?;

        self.assemble_for_taking(quiz, &content, user_id).await
    }

    /// Every quiz of every content the caller owns, newest first.
    pub async fn list_quizzes(&self, user_id: &str) -> AppResult<Vec<QuizListItem>> {
        let contents = self.contents.find_by_parent(user_id).await?;

        let mut items = Vec::new();
        for content in &contents {
            let quizzes = self.quizzes.find_by_parent(&content.id).await?;
            let counts = try_join_all(quizzes.iter().map(|quiz| self.count_questions(&quiz.id))).await?;

            items.extend(quizzes.into_iter().zip(counts).map(|(quiz, total_questions)| {
                QuizListItem {
                    id: quiz.id,
                    content_id: quiz.content_id,
                    content_title: content.title.clone(),
                    content_description: content.description.clone(),
                    order_index: quiz.order_index,
                    mode: quiz.mode,
                    created_at: quiz.created_at,
                    total_questions,
                }
            }));
        }

        items.sort_by(|a, b| (b.created_at, &b.id).cmp(&(a.created_at, &a.id)));
        Ok(items)
    }

    pub async fn quiz_detail(&self, quiz: Quiz, user_id: &str) -> AppResult<QuizDetail> {
        let questions = self.question_views(&quiz.id).await?;
        let summary = self.summary_service.latest_text(&quiz.id).await?;
        let last = self.attempts.find_last_finished(&quiz.id, user_id).await?;

        Ok(QuizDetail {
            quiz,
            questions,
            summary,
            finalized: FinalizedInfo::from(last.as_ref()),
        })
    }

    pub async fn count_questions(&self, quiz_id: &str) -> AppResult<usize> {
        Ok(self.questions.find_by_parent(quiz_id).await?.len())
    }

    /// Ordered questions with ordered options, each flagged correct or not.
    pub async fn question_views(&self, quiz_id: &str) -> AppResult<Vec<QuestionView>> {
        let questions = self.questions.find_by_parent(quiz_id).await?;

        let mut views = Vec::with_capacity(questions.len());
        for question in questions {
            let options = self
                .options
                .find_by_parent(&question.id)
                .await?
                .into_iter()
                .map(|option| OptionView {
                    is_correct: question.correct_option_id.as_deref() == Some(option.id.as_str()),
                    id: option.id,
                    order_index: option.order_index,
                    text: option.text,
                })
                .collect();

            views.push(QuestionView {
                id: question.id,
                order_index: question.order_index,
                statement: question.statement,
                explanation: question.explanation,
                options,
            });
        }

        Ok(views)
    }

    async fn assemble_for_taking(
        &self,
        quiz: Quiz,
        content: &Content,
        user_id: &str,
    ) -> AppResult<QuizForTaking> {
        let questions = self.question_views(&quiz.id).await?;
        let last = self.attempts.find_last_finished(&quiz.id, user_id).await?;
        let history = match &last {
            Some(attempt) => self.history(attempt, &questions).await?,
            None => Vec::new(),
        };
        let summary = self.summary_service.latest_text(&quiz.id).await?;

        Ok(QuizForTaking {
            id: quiz.id,
            content_id: quiz.content_id,
            content_title: content.title.clone(),
            order_index: quiz.order_index,
            mode: quiz.mode,
            created_at: quiz.created_at,
            questions,
            finalized: FinalizedInfo::from(last.as_ref()),
            history,
            summary,
        })
    }

    async fn history(
        &self,
        attempt: &Attempt,
        questions: &[QuestionView],
    ) -> AppResult<Vec<AnswerHistoryItem>> {
        let options: HashMap<&str, &OptionView> = questions
            .iter()
            .flat_map(|q| q.options.iter())
            .map(|o| (o.id.as_str(), o))
            .collect();
        let correct_by_question: HashMap<&str, &OptionView> = questions
            .iter()
            .filter_map(|q| {
                q.options
                    .iter()
                    .find(|o| o.is_correct)
                    .map(|o| (q.id.as_str(), o))
            })
            .collect();

        let answers = self.answers.find_by_parent(&attempt.id).await?;
        Ok(answers
            .into_iter()
            .map(|answer| {
                let correct = correct_by_question.get(answer.question_id.as_str());
                AnswerHistoryItem {
                    chosen_text: options
                        .get(answer.option_id.as_str())
                        .map(|o| o.text.clone()),
                    correct_option_id: correct.map(|o| o.id.clone()),
                    correct_text: correct.map(|o| o.text.clone()),
                    question_id: answer.question_id,
                    chosen_option_id: answer.option_id,
                    is_correct: answer.is_correct,
                }
            })
            .collect())
    }
}
