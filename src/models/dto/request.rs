use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CreateContentRequest {
    #[validate(length(min = 1, max = 10000))]
    pub raw_text: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FollowUpRequest {
    /// `true` targets the latest mistakes, `false` reinforces without repeats.
    /// Required: a missing flag is a bad request, not a silent reinforcement.
    pub progression: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Validate)]
pub struct AnswerInput {
    #[validate(length(min = 1))]
    pub question_id: String,

    #[validate(length(min = 1))]
    pub option_id: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct FinalizeQuizRequest {
    #[validate(nested)]
    pub answers: Vec<AnswerInput>,
}
