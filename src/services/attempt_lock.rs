use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};

type Key = (String, String);

/// Serialises finalize calls per (quiz, user) so attempt numbers are assigned
/// one at a time within this process.
#[derive(Default)]
pub struct AttemptLocks {
    locks: Mutex<HashMap<Key, Arc<Mutex<()>>>>,
}

pub struct AttemptLockGuard {
    _guard: OwnedMutexGuard<()>,
}

impl AttemptLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, quiz_id: &str, user_id: &str) -> AttemptLockGuard {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Drop entries nobody is holding or waiting on.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks
                .entry((quiz_id.to_string(), user_id.to_string()))
                .or_default()
                .clone()
        };

        AttemptLockGuard {
            _guard: lock.lock_owned().await,
        }
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.locks.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_key_waits_for_release() {
        let locks = Arc::new(AttemptLocks::new());
        let guard = locks.acquire("quiz-1", "user-1").await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire("quiz-1", "user-1").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn different_keys_do_not_block() {
        let locks = AttemptLocks::new();
        let _first = locks.acquire("quiz-1", "user-1").await;

        tokio::time::timeout(Duration::from_millis(100), locks.acquire("quiz-1", "user-2"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn released_keys_are_forgotten() {
        let locks = AttemptLocks::new();
        drop(locks.acquire("quiz-1", "user-1").await);
        drop(locks.acquire("quiz-2", "user-1").await);

        assert_eq!(locks.tracked().await, 1);
    }
}
