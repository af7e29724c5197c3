use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::{FindOneAndUpdateOptions, FindOneOptions, FindOptions, IndexOptions, ReturnDocument},
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::AppResult,
    models::domain::{Attempt, Entity},
};

use super::{AttemptRepository, Repository};

pub struct MongoRepository<T: Entity> {
    collection: Collection<T>,
}

impl<T: Entity> MongoRepository<T> {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<T>(),
        }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for {} collection", T::COLLECTION);

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let mut parent_keys = Document::new();
        parent_keys.insert(T::PARENT_FIELD, 1);
        parent_keys.insert(T::SORT_FIELD, 1);
        let parent_index = IndexModel::builder()
            .keys(parent_keys)
            .options(
                IndexOptions::builder()
                    .name(format!("{}_{}", T::PARENT_FIELD, T::SORT_FIELD))
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(parent_index).await?;

        log::info!("Successfully created indexes for {} collection", T::COLLECTION);
        Ok(())
    }

    fn by_parent(parent_id: &str) -> Document {
        let mut filter = Document::new();
        filter.insert(T::PARENT_FIELD, parent_id);
        filter
    }

    fn ascending() -> Document {
        let mut sort = Document::new();
        sort.insert(T::SORT_FIELD, 1);
        sort
    }
}

impl MongoRepository<Attempt> {
    /// Cross-process backstop for attempt numbering: a duplicate number fails the insert.
    pub async fn ensure_attempt_number_index(&self) -> AppResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "quiz_id": 1, "user_id": 1, "attempt_number": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("quiz_user_attempt_number_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(index).await?;
        Ok(())
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for MongoRepository<T> {
    async fn create(&self, entity: T) -> AppResult<T> {
        self.collection.insert_one(&entity).await?;
        Ok(entity)
    }

    async fn create_many(&self, entities: Vec<T>) -> AppResult<Vec<T>> {
        if entities.is_empty() {
            return Ok(entities);
        }
        self.collection.insert_many(&entities).await?;
        Ok(entities)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<T>> {
        let entity = self.collection.find_one(doc! { "id": id }).await?;
        Ok(entity)
    }

    async fn find_by_parent(&self, parent_id: &str) -> AppResult<Vec<T>> {
        let find_options = FindOptions::builder().sort(Self::ascending()).build();

        let cursor = self
            .collection
            .find(Self::by_parent(parent_id))
            .with_options(find_options)
            .await?;
        let items: Vec<T> = cursor.try_collect().await?;

        Ok(items)
    }

    async fn update(&self, id: &str, patch: T::Patch) -> AppResult<Option<T>> {
        let set = mongodb::bson::to_document(&patch)?;
        if set.is_empty() {
            return self.find_by_id(id).await;
        }

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .collection
            .find_one_and_update(doc! { "id": id }, doc! { "$set": set })
            .with_options(options)
            .await?;

        Ok(updated)
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn delete_by_parent(&self, parent_id: &str) -> AppResult<u64> {
        let result = self
            .collection
            .delete_many(Self::by_parent(parent_id))
            .await?;
        Ok(result.deleted_count)
    }
}

#[async_trait]
impl AttemptRepository for MongoRepository<Attempt> {
    async fn find_by_quiz_and_user(&self, quiz_id: &str, user_id: &str) -> AppResult<Vec<Attempt>> {
        let find_options = FindOptions::builder()
            .sort(doc! { "attempt_number": 1 })
            .build();

        let cursor = self
            .collection
            .find(doc! { "quiz_id": quiz_id, "user_id": user_id })
            .with_options(find_options)
            .await?;

        Ok(cursor.try_collect().await?)
    }

    async fn count_user_attempts(&self, quiz_id: &str, user_id: &str) -> AppResult<u64> {
        let count = self
            .collection
            .count_documents(doc! { "quiz_id": quiz_id, "user_id": user_id })
            .await?;
        Ok(count)
    }

    async fn find_last_finished(&self, quiz_id: &str, user_id: &str) -> AppResult<Option<Attempt>> {
        let options = FindOneOptions::builder()
            .sort(doc! { "attempt_number": -1 })
            .build();

        let attempt = self
            .collection
            .find_one(doc! {
                "quiz_id": quiz_id,
                "user_id": user_id,
                "finished_at": { "$exists": true },
            })
            .with_options(options)
            .await?;

        Ok(attempt)
    }
}
