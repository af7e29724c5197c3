pub mod content_handler;
pub mod health_handler;
pub mod quiz_handler;

use actix_web::web;

pub use content_handler::{
    create_content, delete_content, generate_follow_up, get_content, get_content_quiz,
    list_contents,
};
pub use health_handler::{health_check, health_check_ready};
pub use quiz_handler::{finalize_quiz, get_quiz, get_quiz_summary, list_quizzes};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(health_check_ready)
        .service(create_content)
        .service(list_contents)
        .service(get_content)
        .service(delete_content)
        .service(generate_follow_up)
        .service(get_content_quiz)
        .service(list_quizzes)
        .service(get_quiz)
        .service(finalize_quiz)
        .service(get_quiz_summary);
}
