use std::sync::Arc;

use crate::{
    app_state::AppState,
    config::Config,
    models::generated::{GeneratedOption, GeneratedQuestion, GeneratedQuestionSet},
    repositories::Repositories,
    services::model_service::{CompletionRequest, MockLanguageModel},
};

/// A question set that passes the decoder. The correct option of question `n`
/// (0-based) sits at position `n % 4`.
pub fn valid_question_set() -> GeneratedQuestionSet {
    let questions = (0..7)
        .map(|q| GeneratedQuestion {
            statement: format!("Question {} about photosynthesis?", q + 1),
            options: (0..4)
                .map(|o| GeneratedOption {
                    text: format!("Option {} of question {}", o + 1, q + 1),
                    correct: o == q % 4,
                })
                .collect(),
            explanation: format!("Explanation for question {}", q + 1),
        })
        .collect();

    GeneratedQuestionSet { questions }
}

pub fn valid_question_set_json() -> String {
    serde_json::to_string(&valid_question_set()).unwrap()
}

/// A model that answers title, question-set and summary prompts with valid output.
pub fn generating_model() -> MockLanguageModel {
    let mut mock = MockLanguageModel::new();
    mock.expect_complete()
        .returning(|request: CompletionRequest| match (request.json, request.max_tokens) {
            (true, 500) => Ok(r#"{"title": "Photosynthesis", "description": "How plants turn light into energy"}"#.to_string()),
            (true, _) => Ok(valid_question_set_json()),
            (false, _) => Ok("Review the light reactions.".to_string()),
        });
    mock
}

pub fn test_state(model: MockLanguageModel) -> AppState {
    AppState::from_parts(
        Config::test_config(),
        Repositories::in_memory(),
        Arc::new(model),
        None,
    )
}

#[cfg(test)]
pub mod test_helpers {
    use actix_web::http::StatusCode;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_set_has_one_correct_option_per_question() {
        let set = valid_question_set();

        assert_eq!(set.questions.len(), 7);
        for (index, question) in set.questions.iter().enumerate() {
            assert_eq!(question.options.len(), 4);
            assert_eq!(question.correct_position(), Some(index % 4));
        }
    }

    #[test]
    fn fixture_json_decodes() {
        assert!(GeneratedQuestionSet::decode(&valid_question_set_json()).is_ok());
    }
}
