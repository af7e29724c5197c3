use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::{Attempt, Content, Quiz, QuizMode};

/// Result of creating a content or generating a follow-up quiz for it.
#[derive(Debug, Clone, Serialize)]
pub struct QuizCreatedResponse {
    pub content: Content,
    pub quiz: Quiz,
    pub questions_created: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionView {
    pub id: String,
    pub order_index: i32,
    pub text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub id: String,
    pub order_index: i32,
    pub statement: String,
    pub explanation: Option<String>,
    pub options: Vec<OptionView>,
}

/// How the caller answered one question in their last finished attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerHistoryItem {
    pub question_id: String,
    pub chosen_option_id: String,
    pub chosen_text: Option<String>,
    pub correct_option_id: Option<String>,
    pub correct_text: Option<String>,
    pub is_correct: bool,
}

/// The caller's last finished attempt on a quiz, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FinalizedInfo {
    pub finalized: bool,
    pub finalized_at: Option<DateTime<Utc>>,
    pub finalized_attempt_number: Option<i32>,
}

impl From<Option<&Attempt>> for FinalizedInfo {
    fn from(attempt: Option<&Attempt>) -> Self {
        match attempt {
            Some(attempt) => FinalizedInfo {
                finalized: true,
                finalized_at: attempt.finished_at,
                finalized_attempt_number: Some(attempt.attempt_number),
            },
            None => FinalizedInfo::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizForTaking {
    pub id: String,
    pub content_id: String,
    pub content_title: Option<String>,
    pub order_index: i32,
    pub mode: Option<QuizMode>,
    pub created_at: DateTime<Utc>,
    pub questions: Vec<QuestionView>,
    #[serde(flatten)]
    pub finalized: FinalizedInfo,
    pub history: Vec<AnswerHistoryItem>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizDetail {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub questions: Vec<QuestionView>,
    pub summary: Option<String>,
    #[serde(flatten)]
    pub finalized: FinalizedInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentDetail {
    #[serde(flatten)]
    pub content: Content,
    pub quizzes: Vec<QuizDetail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentListItem {
    #[serde(flatten)]
    pub content: Content,
    pub total_quizzes: usize,
    pub total_questions: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizListItem {
    pub id: String,
    pub content_id: String,
    pub content_title: Option<String>,
    pub content_description: Option<String>,
    pub order_index: i32,
    pub mode: Option<QuizMode>,
    pub created_at: DateTime<Utc>,
    pub total_questions: usize,
}

/// Per-question outcome of a finalized attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailedAnswer {
    pub question_id: String,
    pub statement: String,
    pub chosen_option_id: String,
    pub chosen_text: String,
    pub correct_option_id: String,
    pub correct_text: String,
    pub is_correct: bool,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultSummary {
    pub attempt_id: String,
    pub quiz_id: String,
    pub attempt_number: i32,
    pub total_questions: usize,
    pub correct_answers: usize,
    pub wrong_answers: usize,
    /// Rounded to the nearest whole percent.
    pub percentage: u32,
    pub detailed_answers: Vec<DetailedAnswer>,
    pub summary_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryResponse {
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteContentResponse {
    pub message: String,
}
