//! Shapes the language model is asked to produce, and the strict decoder that
//! checks them before anything is persisted.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{OPTIONS_PER_QUESTION, QUESTIONS_PER_QUIZ};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct GeneratedOption {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub correct: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct GeneratedQuestion {
    #[serde(default)]
    pub statement: String,
    #[serde(default)]
    pub options: Vec<GeneratedOption>,
    #[serde(default)]
    pub explanation: String,
}

impl GeneratedQuestion {
    pub fn correct_position(&self) -> Option<usize> {
        self.options.iter().position(|option| option.correct)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct GeneratedQuestionSet {
    #[serde(default)]
    pub questions: Vec<GeneratedQuestion>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct TitleDescription {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Why a generated question set was rejected. Question numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("response is not a valid question set: {0}")]
    Malformed(String),

    #[error("expected {expected} questions, got {actual}")]
    QuestionCount { expected: usize, actual: usize },

    #[error("question {question}: statement is missing")]
    EmptyStatement { question: usize },

    #[error("question {question}: expected {expected} options, got {actual}")]
    OptionCount {
        question: usize,
        expected: usize,
        actual: usize,
    },

    #[error("question {question}: option {option} has no text")]
    EmptyOption { question: usize, option: usize },

    #[error("question {question}: expected exactly one correct option, got {actual}")]
    CorrectCount { question: usize, actual: usize },
}

impl GeneratedQuestionSet {
    /// Parses and validates raw model output. The whole batch is rejected on the
    /// first violation.
    pub fn decode(raw: &str) -> Result<Self, SchemaViolation> {
        let set: GeneratedQuestionSet =
            serde_json::from_str(raw).map_err(|e| SchemaViolation::Malformed(e.to_string()))?;
        set.validate()?;
        Ok(set)
    }

    pub fn validate(&self) -> Result<(), SchemaViolation> {
        if self.questions.len() != QUESTIONS_PER_QUIZ {
            return Err(SchemaViolation::QuestionCount {
                expected: QUESTIONS_PER_QUIZ,
                actual: self.questions.len(),
            });
        }

        for (index, question) in self.questions.iter().enumerate() {
            let number = index + 1;

            if question.statement.trim().is_empty() {
                return Err(SchemaViolation::EmptyStatement { question: number });
            }

            if question.options.len() != OPTIONS_PER_QUESTION {
                return Err(SchemaViolation::OptionCount {
                    question: number,
                    expected: OPTIONS_PER_QUESTION,
                    actual: question.options.len(),
                });
            }

            if let Some(position) = question
                .options
                .iter()
                .position(|option| option.text.trim().is_empty())
            {
                return Err(SchemaViolation::EmptyOption {
                    question: number,
                    option: position + 1,
                });
            }

            let correct = question.options.iter().filter(|option| option.correct).count();
            if correct != 1 {
                return Err(SchemaViolation::CorrectCount {
                    question: number,
                    actual: correct,
                });
            }
        }

        Ok(())
    }

    pub fn json_schema() -> String {
        let schema = schemars::schema_for!(GeneratedQuestionSet);
        serde_json::to_string_pretty(&schema).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{valid_question_set, valid_question_set_json};

    #[test]
    fn decodes_valid_set() {
        let decoded = GeneratedQuestionSet::decode(&valid_question_set_json()).unwrap();

        assert_eq!(decoded.questions.len(), QUESTIONS_PER_QUIZ);
        assert!(decoded
            .questions
            .iter()
            .all(|q| q.options.len() == OPTIONS_PER_QUESTION));
    }

    #[test]
    fn rejects_missing_questions_field() {
        let err = GeneratedQuestionSet::decode(r#"{"items": []}"#).unwrap_err();
        assert_eq!(
            err,
            SchemaViolation::QuestionCount {
                expected: 7,
                actual: 0
            }
        );
    }

    #[test]
    fn rejects_non_json() {
        let err = GeneratedQuestionSet::decode("here is your quiz!").unwrap_err();
        assert!(matches!(err, SchemaViolation::Malformed(_)));
    }

    #[test]
    fn names_question_with_wrong_option_count() {
        let mut set = valid_question_set();
        set.questions[2].options.pop();

        let err = set.validate().unwrap_err();

        assert_eq!(
            err,
            SchemaViolation::OptionCount {
                question: 3,
                expected: 4,
                actual: 3
            }
        );
        assert_eq!(err.to_string(), "question 3: expected 4 options, got 3");
    }

    #[test]
    fn rejects_two_correct_options() {
        let mut set = valid_question_set();
        set.questions[0].options[3].correct = true;

        assert_eq!(
            set.validate().unwrap_err(),
            SchemaViolation::CorrectCount {
                question: 1,
                actual: 2
            }
        );
    }

    #[test]
    fn rejects_zero_correct_options() {
        let mut set = valid_question_set();
        for option in &mut set.questions[6].options {
            option.correct = false;
        }

        assert_eq!(
            set.validate().unwrap_err(),
            SchemaViolation::CorrectCount {
                question: 7,
                actual: 0
            }
        );
    }

    #[test]
    fn rejects_blank_statement() {
        let mut set = valid_question_set();
        set.questions[4].statement = "   ".into();

        assert_eq!(
            set.validate().unwrap_err(),
            SchemaViolation::EmptyStatement { question: 5 }
        );
    }

    #[test]
    fn schema_mentions_decoder_fields() {
        let schema = GeneratedQuestionSet::json_schema();

        assert!(schema.contains("questions"));
        assert!(schema.contains("statement"));
        assert!(schema.contains("correct"));
    }
}
