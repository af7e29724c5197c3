use crate::{
    errors::{AppError, AppResult},
    models::domain::{Content, Quiz},
    repositories::Repository,
};

pub fn require_owner(content: &Content, user_id: &str) -> AppResult<()> {
    if !content.is_owned_by(user_id) {
        return Err(AppError::Forbidden(
            "You can only access your own contents".to_string(),
        ));
    }
    Ok(())
}

pub async fn load_owned_content(
    contents: &dyn Repository<Content>,
    content_id: &str,
    user_id: &str,
) -> AppResult<Content> {
    let content = contents
        .find_by_id(content_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Content '{}' not found", content_id)))?;

    require_owner(&content, user_id)?;
    Ok(content)
}

/// Loads a quiz and its parent content, checking the content belongs to `user_id`.
pub async fn load_owned_quiz(
    quizzes: &dyn Repository<Quiz>,
    contents: &dyn Repository<Content>,
    quiz_id: &str,
    user_id: &str,
) -> AppResult<(Quiz, Content)> {
    let quiz = quizzes
        .find_by_id(quiz_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Quiz '{}' not found", quiz_id)))?;

    let content = contents
        .find_by_id(&quiz.content_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Content of quiz '{}' not found", quiz_id))
        })?;

    require_owner(&content, user_id)?;
    Ok((quiz, content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryRepository;

    #[test]
    fn owner_passes_and_stranger_is_forbidden() {
        let content = Content::new("text".into(), None, None, "john");

        assert!(require_owner(&content, "john").is_ok());
        assert!(matches!(
            require_owner(&content, "jane"),
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn missing_quiz_is_not_found_before_ownership() {
        let quizzes = InMemoryRepository::<Quiz>::new();
        let contents = InMemoryRepository::<Content>::new();

        let err = load_owned_quiz(&quizzes, &contents, "missing", "john")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn quiz_of_other_owner_is_forbidden() {
        let quizzes = InMemoryRepository::<Quiz>::new();
        let contents = InMemoryRepository::<Content>::new();
        let content = contents
            .create(Content::new("text".into(), None, None, "john"))
            .await
            .unwrap();
        let quiz = quizzes.create(Quiz::new(&content.id, 1, None)).await.unwrap();

        let err = load_owned_quiz(&quizzes, &contents, &quiz.id, "jane")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
