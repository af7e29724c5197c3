use std::sync::Arc;

use serde::Serialize;

use crate::{
    auth::load_owned_quiz,
    constants::prompts,
    errors::AppResult,
    models::domain::{Content, Quiz, Summary},
    repositories::Repository,
    services::quiz_generation_service::QuizGenerationService,
};

/// One missed question as shown to the learner and to the summary prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissedQuestion {
    pub statement: String,
    pub chosen_text: String,
    pub correct_text: String,
    pub explanation: String,
}

pub struct SummaryService {
    generator: Arc<QuizGenerationService>,
    summaries: Arc<dyn Repository<Summary>>,
    quizzes: Arc<dyn Repository<Quiz>>,
    contents: Arc<dyn Repository<Content>>,
}

impl SummaryService {
    pub fn new(
        generator: Arc<QuizGenerationService>,
        summaries: Arc<dyn Repository<Summary>>,
        quizzes: Arc<dyn Repository<Quiz>>,
        contents: Arc<dyn Repository<Content>>,
    ) -> Self {
        Self {
            generator,
            summaries,
            quizzes,
            contents,
        }
    }

    /// Review text for a finished attempt. A perfect score gets the fixed
    /// congratulations message without calling the model.
    pub async fn generate_summary(
        &self,
        content_title: &str,
        missed: &[MissedQuestion],
        total_questions: usize,
    ) -> AppResult<String> {
        if missed.is_empty() {
            return Ok(prompts::CONGRATULATIONS_MESSAGE.to_string());
        }

        log::info!(
            "Generating review summary for '{}' ({} missed)",
            content_title,
            missed.len()
        );

        let user = prompts::SUMMARY_USER_PROMPT
            .replace("{title}", content_title)
            .replace("{wrong_count}", &missed.len().to_string())
            .replace("{total}", &total_questions.to_string())
            .replace("{mistakes}", &render_mistakes(missed));

        self.generator
            .generate_text(prompts::SUMMARY_SYSTEM_PROMPT, user)
            .await
    }

    /// Most recent summary of the quiz, if any was written yet.
    pub async fn get_summary(&self, quiz_id: &str, user_id: &str) -> AppResult<Option<String>> {
        load_owned_quiz(self.quizzes.as_ref(), self.contents.as_ref(), quiz_id, user_id).await?;
        self.latest_text(quiz_id).await
    }

    pub async fn latest_text(&self, quiz_id: &str) -> AppResult<Option<String>> {
        let summaries = self.summaries.find_by_parent(quiz_id).await?;
        Ok(summaries.into_iter().last().map(|summary| summary.text))
    }
}

fn render_mistakes(missed: &[MissedQuestion]) -> String {
    missed
        .iter()
        .enumerate()
        .map(|(index, item)| {
            format!(
                "Mistake {}:\nQuestion: {}\nYour answer: {}\nCorrect answer: {}\nExplanation: {}",
                index + 1,
                item.statement,
                item.chosen_text,
                item.correct_text,
                item.explanation
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
