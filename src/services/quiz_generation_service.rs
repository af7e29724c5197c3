use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    constants::{prompts, MAX_DESCRIPTION_CHARS, MAX_TITLE_CHARS},
    errors::{AppError, AppResult},
    models::generated::{GeneratedQuestionSet, TitleDescription},
    services::model_service::{CompletionRequest, LanguageModel},
};

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"```[A-Za-z]*[ \t]*\r?\n?").expect("CODE_FENCE is a valid regex pattern")
});

/// Removes markdown code fences the model sometimes wraps around JSON.
pub fn strip_code_fences(raw: &str) -> String {
    CODE_FENCE.replace_all(raw, "").trim().to_string()
}

/// A question already asked on a content, used to steer reinforcement away from repeats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorQuestion {
    pub statement: String,
    pub options: Vec<String>,
}

/// A question the learner missed, with what they should have answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrongAnswerContext {
    pub statement: String,
    pub correct_text: String,
    pub explanation: String,
}

pub enum QuizGenerationRequest<'a> {
    Fresh {
        title: &'a str,
        description: &'a str,
        content: &'a str,
    },
    Reinforcement {
        title: &'a str,
        content: &'a str,
        prior_questions: &'a [PriorQuestion],
    },
    Progression {
        title: &'a str,
        content: &'a str,
        wrong_answers: &'a [WrongAnswerContext],
    },
}

impl QuizGenerationRequest<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            QuizGenerationRequest::Fresh { .. } => "fresh",
            QuizGenerationRequest::Reinforcement { .. } => "reinforcement",
            QuizGenerationRequest::Progression { .. } => "progression",
        }
    }

    fn user_prompt(&self) -> String {
        let rules = prompts::QUIZ_RULES.replace("{schema}", &GeneratedQuestionSet::json_schema());

        let body = match self {
            QuizGenerationRequest::Fresh {
                title,
                description,
                content,
            } => prompts::FRESH_QUIZ_PROMPT
                .replace("{title}", title)
                .replace("{description}", description)
                .replace("{content}", content),
            QuizGenerationRequest::Reinforcement {
                title,
                content,
                prior_questions,
            } => prompts::REINFORCEMENT_QUIZ_PROMPT
                .replace("{title}", title)
                .replace("{content}", content)
                .replace("{prior_questions}", &render_prior_questions(prior_questions)),
            QuizGenerationRequest::Progression {
                title,
                content,
                wrong_answers,
            } => prompts::PROGRESSION_QUIZ_PROMPT
                .replace("{title}", title)
                .replace("{content}", content)
                .replace("{wrong_answers}", &render_wrong_answers(wrong_answers)),
        };

        body.replace("{rules}", &rules)
    }
}

fn render_prior_questions(questions: &[PriorQuestion]) -> String {
    questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            format!(
                "{}. {}\n   Options: {}",
                index + 1,
                question.statement,
                question.options.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_wrong_answers(answers: &[WrongAnswerContext]) -> String {
    answers
        .iter()
        .enumerate()
        .map(|(index, answer)| {
            format!(
                "{}. Original question: {}\n   Correct answer: {}\n   Explanation: {}",
                index + 1,
                answer.statement,
                answer.correct_text,
                answer.explanation
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate_chars(value: &str, max: usize) -> String {
    value.trim().chars().take(max).collect::<String>().trim_end().to_string()
}

/// Builds prompts for the language model and validates what comes back.
pub struct QuizGenerationService {
    model: Arc<dyn LanguageModel>,
}

impl QuizGenerationService {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    pub async fn generate_title_description(&self, raw_input: &str) -> AppResult<TitleDescription> {
        let request = CompletionRequest::json(
            prompts::TITLE_SYSTEM_PROMPT,
            prompts::TITLE_USER_PROMPT.replace("{content}", raw_input),
            0.7,
            500,
        );

        let raw = self.model.complete(request).await?;
        let parsed: TitleDescription = serde_json::from_str(&strip_code_fences(&raw))?;

        let title = truncate_chars(&parsed.title, MAX_TITLE_CHARS);
        if title.is_empty() {
            return Err(AppError::GenerationFailure(
                "model returned an empty title".to_string(),
            ));
        }

        Ok(TitleDescription {
            title,
            description: truncate_chars(&parsed.description, MAX_DESCRIPTION_CHARS),
        })
    }

    pub async fn generate_question_set(
        &self,
        request: QuizGenerationRequest<'_>,
    ) -> AppResult<GeneratedQuestionSet> {
        let kind = request.kind();
        let completion =
            CompletionRequest::json(prompts::QUIZ_SYSTEM_PROMPT, request.user_prompt(), 0.8, 3000);

        let raw = self.model.complete(completion).await?;

        GeneratedQuestionSet::decode(&strip_code_fences(&raw)).map_err(|violation| {
            log::warn!("Rejected {} question set: {}", kind, violation);
            AppError::GenerationFailure(format!("invalid {} question set: {}", kind, violation))
        })
    }

    /// Free-form prose; the only check is that something came back.
    pub async fn generate_text(&self, system: &str, user: String) -> AppResult<String> {
        let text = self
            .model
            .complete(CompletionRequest::text(system, user, 0.7, 1000))
            .await?;

        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::GenerationFailure(
                "model returned empty text".to_string(),
            ));
        }

        Ok(text.to_string())
    }
}
