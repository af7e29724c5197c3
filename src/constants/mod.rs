pub mod prompts;

/// Every generated quiz carries exactly this many questions.
pub const QUESTIONS_PER_QUIZ: usize = 7;

/// Every question carries exactly this many options.
pub const OPTIONS_PER_QUESTION: usize = 4;

pub const MAX_RAW_INPUT_CHARS: usize = 10_000;
pub const MAX_TITLE_CHARS: usize = 100;
pub const MAX_DESCRIPTION_CHARS: usize = 300;

/// Stands in for a missing explanation in summary and progression prompts.
pub const NO_EXPLANATION: &str = "No explanation available";
