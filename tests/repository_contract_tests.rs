use std::sync::Arc;

use chrono::Utc;

use study_quiz_server::{
    errors::AppError,
    models::domain::{Answer, Attempt, AttemptPatch, Content, Quiz, QuizPatch, Summary},
    repositories::{AttemptRepository, InMemoryRepository, Repositories, Repository},
};

/// Behaviour every `Repository<Quiz>` must show, independent of the backend.
async fn quiz_repository_contract(repo: &dyn Repository<Quiz>) {
    let third = repo.create(Quiz::new("content-1", 3, None)).await.unwrap();
    let first = repo.create(Quiz::new("content-1", 1, None)).await.unwrap();
    repo.create(Quiz::new("content-2", 2, None)).await.unwrap();

    let found = repo.find_by_id(&first.id).await.unwrap();
    assert_eq!(found.as_ref(), Some(&first));
    assert!(repo.find_by_id("missing").await.unwrap().is_none());

    let children = repo.find_by_parent("content-1").await.unwrap();
    let orders: Vec<_> = children.iter().map(|q| q.order_index).collect();
    assert_eq!(orders, vec![1, 3]);

    let patched = repo
        .update(
            &third.id,
            QuizPatch {
                feedback: "too easy".into(),
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(patched.feedback.as_deref(), Some("too easy"));
    assert_eq!(patched.order_index, 3);

    assert!(repo.delete(&first.id).await.unwrap());
    assert!(!repo.delete(&first.id).await.unwrap());
    assert_eq!(repo.delete_by_parent("content-1").await.unwrap(), 1);
    assert!(repo.find_by_parent("content-1").await.unwrap().is_empty());
    assert_eq!(repo.find_by_parent("content-2").await.unwrap().len(), 1);
}

async fn attempt_repository_contract(repo: &dyn AttemptRepository) {
    assert_eq!(repo.count_user_attempts("quiz-1", "alice").await.unwrap(), 0);
    assert!(repo
        .find_last_finished("quiz-1", "alice")
        .await
        .unwrap()
        .is_none());

    let mut created = Vec::new();
    for number in [2, 1, 3] {
        created.push(
            repo.create(Attempt::start("quiz-1", "alice", number, None))
                .await
                .unwrap(),
        );
    }
    repo.create(Attempt::start("quiz-1", "bob", 1, None))
        .await
        .unwrap();

    let numbers: Vec<_> = repo
        .find_by_quiz_and_user("quiz-1", "alice")
        .await
        .unwrap()
        .iter()
        .map(|a| a.attempt_number)
        .collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert_eq!(repo.count_user_attempts("quiz-1", "alice").await.unwrap(), 3);

    // attempts 2 and 1 are finished, 3 is still open
    for attempt in &created[..2] {
        repo.update(
            &attempt.id,
            AttemptPatch {
                finished_at: Utc::now(),
            },
        )
        .await
        .unwrap();
    }

    let last = repo
        .find_last_finished("quiz-1", "alice")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(last.attempt_number, 2);
    assert!(last.is_finished());
    assert!(repo.find_last_finished("quiz-1", "bob").await.unwrap().is_none());
}

#[tokio::test]
async fn in_memory_quiz_repository_honours_contract() {
    quiz_repository_contract(&InMemoryRepository::<Quiz>::new()).await;
}

#[tokio::test]
async fn in_memory_attempt_repository_honours_contract() {
    attempt_repository_contract(&InMemoryRepository::<Attempt>::new()).await;
}

#[tokio::test]
async fn repositories_bundle_shares_state_between_clones() {
    let repos = Repositories::in_memory();
    let clone = repos.clone();

    let content = repos
        .contents
        .create(Content::new("text".into(), None, None, "alice"))
        .await
        .unwrap();

    assert!(clone.contents.find_by_id(&content.id).await.unwrap().is_some());
    assert_eq!(clone.contents.find_by_parent("alice").await.unwrap().len(), 1);
}

#[tokio::test]
async fn contents_are_listed_per_owner_and_never_rewritten() {
    let repo = InMemoryRepository::<Content>::new();
    let content = repo
        .create(Content::new(
            "text".into(),
            Some("Title".into()),
            Some("Kept".into()),
            "alice",
        ))
        .await
        .unwrap();
    repo.create(Content::new("other".into(), None, None, "bob"))
        .await
        .unwrap();

    let owned = repo.find_by_parent("alice").await.unwrap();
    assert_eq!(owned, vec![content.clone()]);

    let stored = repo.find_by_id(&content.id).await.unwrap().unwrap();
    assert_eq!(stored.owner_id, "alice");
    assert_eq!(stored.description.as_deref(), Some("Kept"));
}

#[tokio::test]
async fn batch_insert_is_all_or_nothing() {
    let repo = InMemoryRepository::<Answer>::new();
    let existing = repo
        .create(Answer::new("attempt-1", "q-1", "o-1", true))
        .await
        .unwrap();

    let err = repo
        .create_many(vec![
            Answer::new("attempt-1", "q-2", "o-2", false),
            existing.clone(),
        ])
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::DatabaseError(_)));
    assert_eq!(repo.find_by_parent("attempt-1").await.unwrap().len(), 1);
    assert!(repo.create_many(Vec::new()).await.unwrap().is_empty());
}

#[tokio::test]
async fn summaries_are_returned_oldest_first() {
    let repo: Arc<dyn Repository<Summary>> = Arc::new(InMemoryRepository::<Summary>::new());
    for text in ["first", "second", "third"] {
        repo.create(Summary::new("quiz-1", text.into())).await.unwrap();
    }

    let texts: Vec<_> = repo
        .find_by_parent("quiz-1")
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.text)
        .collect();

    assert_eq!(texts, vec!["first", "second", "third"]);
}
