use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use chrono::Utc;

use crate::{
    auth::load_owned_quiz,
    constants::NO_EXPLANATION,
    errors::{AppError, AppResult},
    models::{
        domain::{Answer, Attempt, AttemptPatch, Content, Question, Quiz, QuizOption, Summary},
        dto::{request::AnswerInput, response::DetailedAnswer, response::ResultSummary},
    },
    repositories::{AttemptRepository, Repository},
    services::{
        attempt_lock::AttemptLocks,
        summary_service::{MissedQuestion, SummaryService},
    },
};

/// Scores submitted answers and records the attempt, its answers and a review summary.
pub struct QuizAttemptService {
    contents: Arc<dyn Repository<Content>>,
    quizzes: Arc<dyn Repository<Quiz>>,
    questions: Arc<dyn Repository<Question>>,
    options: Arc<dyn Repository<QuizOption>>,
    attempts: Arc<dyn AttemptRepository>,
    answers: Arc<dyn Repository<Answer>>,
    summaries: Arc<dyn Repository<Summary>>,
    summary_service: Arc<SummaryService>,
    locks: AttemptLocks,
}

struct ScoredAnswer {
    question_id: String,
    option_id: String,
    is_correct: bool,
}

impl QuizAttemptService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        contents: Arc<dyn Repository<Content>>,
        quizzes: Arc<dyn Repository<Quiz>>,
        questions: Arc<dyn Repository<Question>>,
        options: Arc<dyn Repository<QuizOption>>,
        attempts: Arc<dyn AttemptRepository>,
        answers: Arc<dyn Repository<Answer>>,
        summaries: Arc<dyn Repository<Summary>>,
        summary_service: Arc<SummaryService>,
    ) -> Self {
        Self {
            contents,
            quizzes,
            questions,
            options,
            attempts,
            answers,
            summaries,
            summary_service,
            locks: AttemptLocks::new(),
        }
    }

    pub async fn finalize(
        &self,
        quiz_id: &str,
        user_id: &str,
        answers: &[AnswerInput],
    ) -> AppResult<ResultSummary> {
        log::info!("Finalizing quiz '{}' for user '{}'", quiz_id, user_id);

        self.try_finalize(quiz_id, user_id, answers)
            .await
            .map_err(|err| {
                log::error!("Finalize of quiz '{}' failed: {}", quiz_id, err);
                err.with_context("failed to finalize quiz")
            })
    }

    async fn try_finalize(
        &self,
        quiz_id: &str,
        user_id: &str,
        submitted: &[AnswerInput],
    ) -> AppResult<ResultSummary> {
        let (quiz, content) =
            load_owned_quiz(self.quizzes.as_ref(), self.contents.as_ref(), quiz_id, user_id)
                .await?;

        let questions = self.questions.find_by_parent(&quiz.id).await?;
        if questions.is_empty() {
            return Err(AppError::PolicyError(format!(
                "quiz '{}' has no questions",
                quiz.id
            )));
        }
        if submitted.len() != questions.len() {
            return Err(AppError::ValidationError(format!(
                "expected {} answers, got {}",
                questions.len(),
                submitted.len()
            )));
        }

        let (scored, detailed) = self.score(&questions, submitted).await?;
        let total_questions = questions.len();
        let correct_answers = scored.iter().filter(|a| a.is_correct).count();
        let wrong_answers = total_questions - correct_answers;

        let _guard = self.locks.acquire(&quiz.id, user_id).await;
        let attempt_number = self.attempts.count_user_attempts(&quiz.id, user_id).await? as i32 + 1;
        log::info!(
            "Quiz '{}' attempt #{} scored {}/{}",
            quiz.id,
            attempt_number,
            correct_answers,
            total_questions
        );

        let missed: Vec<MissedQuestion> = detailed
            .iter()
            .filter(|d| !d.is_correct)
            .map(|d| MissedQuestion {
                statement: d.statement.clone(),
                chosen_text: d.chosen_text.clone(),
                correct_text: d.correct_text.clone(),
                explanation: d
                    .explanation
                    .clone()
                    .unwrap_or_else(|| NO_EXPLANATION.to_string()),
            })
            .collect();
        let summary_text = self
            .summary_service
            .generate_summary(content.title_or_default(), &missed, total_questions)
            .await?;

        let attempt = Attempt::start(&quiz.id, user_id, attempt_number, quiz.mode);
        let attempt_id = attempt.id.clone();
        self.persist(attempt, scored, &summary_text).await?;

        Ok(ResultSummary {
            attempt_id,
            quiz_id: quiz.id,
            attempt_number,
            total_questions,
            correct_answers,
            wrong_answers,
            percentage: percentage(correct_answers, total_questions),
            detailed_answers: detailed,
            summary_text,
        })
    }

    /// Checks and scores every answer in submission order without writing anything.
    async fn score(
        &self,
        questions: &[Question],
        submitted: &[AnswerInput],
    ) -> AppResult<(Vec<ScoredAnswer>, Vec<DetailedAnswer>)> {
        let by_id: HashMap<&str, &Question> =
            questions.iter().map(|q| (q.id.as_str(), q)).collect();
        let mut seen = HashSet::new();
        let mut scored = Vec::with_capacity(submitted.len());
        let mut detailed = Vec::with_capacity(submitted.len());

        for answer in submitted {
            let question = by_id.get(answer.question_id.as_str()).ok_or_else(|| {
                AppError::ValidationError(format!(
                    "question '{}' does not belong to this quiz",
                    answer.question_id
                ))
            })?;
            if !seen.insert(question.id.as_str()) {
                return Err(AppError::ValidationError(format!(
                    "question '{}' was answered more than once",
                    question.id
                )));
            }

            let options = self.options.find_by_parent(&question.id).await?;
            let chosen = options
                .iter()
                .find(|o| o.id == answer.option_id)
                .ok_or_else(|| {
                    AppError::ValidationError(format!(
                        "option '{}' does not belong to question '{}'",
                        answer.option_id, question.id
                    ))
                })?;

            let correct = question
                .correct_option_id
                .as_deref()
                .and_then(|id| options.iter().find(|o| o.id == id))
                .ok_or_else(|| {
                    AppError::InternalError(format!(
                        "question '{}' has no resolvable correct option",
                        question.id
                    ))
                })?;

            let is_correct = chosen.id == correct.id;
            scored.push(ScoredAnswer {
                question_id: question.id.clone(),
                option_id: chosen.id.clone(),
                is_correct,
            });
            detailed.push(DetailedAnswer {
                question_id: question.id.clone(),
                statement: question.statement.clone(),
                chosen_option_id: chosen.id.clone(),
                chosen_text: chosen.text.clone(),
                correct_option_id: correct.id.clone(),
                correct_text: correct.text.clone(),
                is_correct,
                explanation: question.explanation.clone(),
            });
        }

        Ok((scored, detailed))
    }

    /// Writes attempt, answers, finish time and summary. If any write fails the
    /// attempt and its answers are removed again so no half-recorded attempt remains.
    async fn persist(
        &self,
        attempt: Attempt,
        scored: Vec<ScoredAnswer>,
        summary_text: &str,
    ) -> AppResult<()> {
        let attempt = self.attempts.create(attempt).await?;

        let result: AppResult<()> = async {
            let answers: Vec<Answer> = scored
                .iter()
                .map(|a| Answer::new(&attempt.id, &a.question_id, &a.option_id, a.is_correct))
                .collect();
            self.answers.create_many(answers).await?;

            self.attempts
                .update(
                    &attempt.id,
                    AttemptPatch {
                        finished_at: Utc::now(),
                    },
                )
                .await?
                .ok_or_else(|| {
                    AppError::InternalError(format!("attempt '{}' vanished", attempt.id))
                })?;

            self.summaries
                .create(Summary::new(&attempt.quiz_id, summary_text.to_string()))
                .await?;
            Ok(())
        }
        .await;

        if let Err(err) = &result {
            log::warn!(
                "Rolling back attempt '{}' after failed write: {}",
                attempt.id,
                err
            );
            if let Err(cleanup) = self.answers.delete_by_parent(&attempt.id).await {
                log::error!("Could not remove answers of attempt '{}': {}", attempt.id, cleanup);
            }
            if let Err(cleanup) = self.attempts.delete(&attempt.id).await {
                log::error!("Could not remove attempt '{}': {}", attempt.id, cleanup);
            }
        }

        result
    }
}

/// `round(correct / total * 100)`; zero when there is nothing to score.
pub fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((correct as f64 / total as f64) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_rounds_to_nearest() {
        assert_eq!(percentage(7, 7), 100);
        assert_eq!(percentage(4, 7), 57);
        assert_eq!(percentage(5, 7), 71);
        assert_eq!(percentage(0, 7), 0);
        assert_eq!(percentage(0, 0), 0);
    }
}
