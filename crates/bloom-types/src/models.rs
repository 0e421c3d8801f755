use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account as seen by the rest of the system. The credential never leaves
/// the auth handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A curated support resource (article, clinic listing, hotline, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumPost {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// What a comment hangs off. Exactly one of the two, always.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CommentParent {
    Resource(Uuid),
    ForumPost(Uuid),
}

impl CommentParent {
    pub fn id(&self) -> Uuid {
        match self {
            Self::Resource(id) | Self::ForumPost(id) => *id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author_username: String,
    pub content: String,
    pub parent: CommentParent,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_serializes_as_tagged_object() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(CommentParent::ForumPost(id)).unwrap();
        assert_eq!(json["kind"], "forum_post");
        assert_eq!(json["id"], id.to_string());

        let back: CommentParent = serde_json::from_value(json).unwrap();
        assert_eq!(back, CommentParent::ForumPost(id));
        assert_eq!(back.id(), id);
    }
}
