pub mod attempt_lock;
pub mod content_service;
pub mod follow_up_service;
pub mod model_service;
pub mod quiz_attempt_service;
pub mod quiz_build_service;
pub mod quiz_generation_service;
pub mod quiz_service;
pub mod summary_service;
