use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{new_id, Entity, Immutable};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Content {
    pub id: String,
    pub raw_input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}

impl Content {
    pub fn new(
        raw_input: String,
        title: Option<String>,
        description: Option<String>,
        owner_id: &str,
    ) -> Self {
        Self {
            id: new_id(),
            raw_input,
            title,
            description,
            owner_id: owner_id.to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }

    pub fn title_or_default(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled content")
    }
}

impl Entity for Content {
    type Patch = Immutable;
    type SortKey = String;

    const COLLECTION: &'static str = "contents";
    const PARENT_FIELD: &'static str = "owner_id";
    const SORT_FIELD: &'static str = "id";

    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> &str {
        &self.owner_id
    }

    fn sort_key(&self) -> String {
        self.id.clone()
    }

    fn apply(&mut self, patch: Immutable) {
        match patch {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ownership_is_fixed_at_creation() {
        let content = Content::new("text".into(), None, None, "user-1");

        assert!(content.is_owned_by("user-1"));
        assert!(!content.is_owned_by("user-2"));
        assert_eq!(content.parent_id(), "user-1");
    }

    #[test]
    fn missing_title_falls_back() {
        let untitled = Content::new("text".into(), None, None, "user-1");
        let titled = Content::new("text".into(), Some("Photosynthesis".into()), None, "user-1");

        assert_eq!(untitled.title_or_default(), "Untitled content");
        assert_eq!(titled.title_or_default(), "Photosynthesis");
    }
}
