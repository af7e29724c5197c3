use std::sync::Arc;

use crate::{
    constants::{OPTIONS_PER_QUESTION, QUESTIONS_PER_QUIZ},
    errors::{AppError, AppResult},
    models::{
        domain::{Question, QuestionPatch, QuizOption},
        generated::GeneratedQuestion,
    },
    repositories::Repository,
};

/// Turns a generated question set into persisted question and option rows.
pub struct QuizBuildService {
    questions: Arc<dyn Repository<Question>>,
    options: Arc<dyn Repository<QuizOption>>,
}

impl QuizBuildService {
    pub fn new(
        questions: Arc<dyn Repository<Question>>,
        options: Arc<dyn Repository<QuizOption>>,
    ) -> Self {
        Self { questions, options }
    }

    /// Persists every question in array order, then its four options in one batch,
    /// then points the question at the option marked correct.
    ///
    /// A question with no option marked correct keeps `correct_option_id = None`;
    /// scoring reports such a question as an invariant violation. The first
    /// persistence error aborts the build and is returned as-is.
    pub async fn build_quiz(
        &self,
        quiz_id: &str,
        generated: &[GeneratedQuestion],
    ) -> AppResult<usize> {
        if generated.len() != QUESTIONS_PER_QUIZ {
            return Err(AppError::GenerationFailure(format!(
                "expected {} questions to build, got {}",
                QUESTIONS_PER_QUIZ,
                generated.len()
            )));
        }
        if let Some(position) = generated
            .iter()
            .position(|q| q.options.len() != OPTIONS_PER_QUESTION)
        {
            return Err(AppError::GenerationFailure(format!(
                "question {}: expected {} options, got {}",
                position + 1,
                OPTIONS_PER_QUESTION,
                generated[position].options.len()
            )));
        }

        let mut questions_created = 0;

        for (index, item) in generated.iter().enumerate() {
            let explanation = Some(item.explanation.trim().to_string()).filter(|e| !e.is_empty());
            let question = self
                .questions
                .create(Question::new(
                    quiz_id,
                    index as i32 + 1,
                    item.statement.trim().to_string(),
                    explanation,
                ))
                .await?;

            let options: Vec<QuizOption> = item
                .options
                .iter()
                .enumerate()
                .map(|(position, option)| {
                    QuizOption::new(&question.id, position as i32 + 1, option.text.trim().to_string())
                })
                .collect();
            let options = self.options.create_many(options).await?;

            match item.correct_position() {
                Some(position) => {
                    let patch = QuestionPatch {
                        correct_option_id: options[position].id.clone(),
                    };
                    self.questions.update(&question.id, patch).await?.ok_or_else(|| {
                        AppError::InternalError(format!(
                            "question '{}' vanished while being built",
                            question.id
                        ))
                    })?;
                }
                None => log::warn!(
                    "Question {} of quiz '{}' has no option marked correct",
                    index + 1,
                    quiz_id
                ),
            }

            questions_created += 1;
        }

        log::info!("Built quiz '{}' with {} questions", quiz_id, questions_created);
        Ok(questions_created)
    }

    /// Deletes every question and option under `quiz_id`.
    pub async fn clear_quiz(&self, quiz_id: &str) -> AppResult<()> {
        for question in self.questions.find_by_parent(quiz_id).await? {
            self.options.delete_by_parent(&question.id).await?;
        }
        self.questions.delete_by_parent(quiz_id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryRepository;
    use crate::test_utils::valid_question_set;

    fn build_service() -> (
        QuizBuildService,
        Arc<InMemoryRepository<Question>>,
        Arc<InMemoryRepository<QuizOption>>,
    ) {
        let questions = Arc::new(InMemoryRepository::<Question>::new());
        let options = Arc::new(InMemoryRepository::<QuizOption>::new());
        let service = QuizBuildService::new(questions.clone(), options.clone());
        (service, questions, options)
    }

    #[tokio::test]
    async fn builds_seven_questions_with_four_options_each() {
        let (service, questions, options) = build_service();
        let set = valid_question_set();

        let created = service.build_quiz("quiz-1", &set.questions).await.unwrap();

        assert_eq!(created, 7);
        let stored = questions.find_by_parent("quiz-1").await.unwrap();
        assert_eq!(stored.len(), 7);
        for (index, question) in stored.iter().enumerate() {
            assert_eq!(question.order_index, index as i32 + 1);
            let question_options = options.find_by_parent(&question.id).await.unwrap();
            assert_eq!(question_options.len(), 4);

            let correct: Vec<_> = question_options
                .iter()
                .filter(|o| Some(&o.id) == question.correct_option_id.as_ref())
                .collect();
            assert_eq!(correct.len(), 1);
            let expected_position = set.questions[index].correct_position().unwrap();
            assert_eq!(correct[0].order_index, expected_position as i32 + 1);
        }
    }

    #[tokio::test]
    async fn zero_correct_leaves_correct_option_unset() {
        let (service, questions, _) = build_service();
        let mut set = valid_question_set();
        for option in &mut set.questions[0].options {
            option.correct = false;
        }

        let created = service.build_quiz("quiz-1", &set.questions).await.unwrap();

        assert_eq!(created, 7);
        let stored = questions.find_by_parent("quiz-1").await.unwrap();
        assert!(stored[0].correct_option_id.is_none());
        assert!(stored[1..].iter().all(|q| q.correct_option_id.is_some()));
    }

    #[tokio::test]
    async fn rejects_wrong_question_count_before_writing() {
        let (service, questions, _) = build_service();
        let set = valid_question_set();

        let err = service
            .build_quiz("quiz-1", &set.questions[..6])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::GenerationFailure(_)));
        assert!(questions.is_empty().await);
    }

    #[tokio::test]
    async fn clear_quiz_removes_questions_and_options() {
        let (service, questions, options) = build_service();
        service
            .build_quiz("quiz-1", &valid_question_set().questions)
            .await
            .unwrap();

        service.clear_quiz("quiz-1").await.unwrap();

        assert!(questions.is_empty().await);
        assert!(options.is_empty().await);
    }
}
