use std::sync::Arc;

use bloom_db::{Database, is_constraint_violation};
use bloom_types::models::{Comment, CommentParent, ForumPost, Resource};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::convert;
use crate::error::{ContentError, EntityKind};
use crate::validate;

/// Build a comment parent from two optional references. Exactly one must be
/// given.
pub fn resolve_parent(
    resource_id: Option<Uuid>,
    forum_post_id: Option<Uuid>,
) -> Result<CommentParent, ContentError> {
    match (resource_id, forum_post_id) {
        (Some(id), None) => Ok(CommentParent::Resource(id)),
        (None, Some(id)) => Ok(CommentParent::ForumPost(id)),
        (None, None) => Err(ContentError::InvalidComment("no parent given")),
        (Some(_), Some(_)) => Err(ContentError::InvalidComment(
            "both a resource and a forum post given as parent",
        )),
    }
}

/// Write side: validated creation and cascading removal.
#[derive(Clone)]
pub struct Submissions {
    db: Arc<Database>,
}

impl Submissions {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn submit_resource(&self, title: &str, description: &str) -> Result<Resource, ContentError> {
        let fields = validate::resource_fields(title, description)?;
        let id = Uuid::new_v4();

        self.db
            .insert_resource(&id.to_string(), &fields.title, &fields.body, Utc::now())?;
        info!("Resource {} submitted", id);

        let row = inserted(self.db.get_resource(&id.to_string())?, EntityKind::Resource, id)?;
        Ok(convert::resource(row)?)
    }

    pub fn submit_forum_post(&self, title: &str, content: &str) -> Result<ForumPost, ContentError> {
        let fields = validate::forum_post_fields(title, content)?;
        let id = Uuid::new_v4();

        self.db
            .insert_forum_post(&id.to_string(), &fields.title, &fields.body, Utc::now())?;
        info!("Forum post {} submitted", id);

        let row = inserted(self.db.get_forum_post(&id.to_string())?, EntityKind::ForumPost, id)?;
        Ok(convert::forum_post(row)?)
    }

    /// `author` must already be authenticated by the caller; it still has to
    /// resolve to a stored user.
    pub fn submit_comment(
        &self,
        author: Uuid,
        content: &str,
        parent: CommentParent,
    ) -> Result<Comment, ContentError> {
        let content = validate::comment_content(content)
            .map_err(|_| ContentError::InvalidComment("content is empty"))?;

        if self.db.get_user_by_id(&author.to_string())?.is_none() {
            return Err(ContentError::InvalidComment("author does not exist"));
        }
        if !self.parent_exists(parent)? {
            return Err(ContentError::InvalidComment("parent does not exist"));
        }

        let id = Uuid::new_v4();
        self.db
            .insert_comment(&id.to_string(), &author.to_string(), &content, &parent, Utc::now())
            .map_err(|e| {
                // Parent or author deleted between the checks and the insert
                if is_constraint_violation(&e) {
                    warn!("Comment {} lost its parent or author mid-submit", id);
                    ContentError::InvalidComment("parent does not exist")
                } else {
                    ContentError::Store(e)
                }
            })?;
        info!("Comment {} on {:?} by {}", id, parent, author);

        let row = self
            .db
            .get_comment(&id.to_string())?
            .ok_or_else(|| ContentError::Store(anyhow::anyhow!("comment {id} vanished after insert")))?;
        Ok(convert::comment(row)?)
    }

    /// Removes the resource and every comment attached to it.
    pub fn delete_resource(&self, id: Uuid) -> Result<(), ContentError> {
        if !self.db.delete_resource(&id.to_string())? {
            return Err(ContentError::not_found(EntityKind::Resource, id));
        }
        info!("Resource {} deleted", id);
        Ok(())
    }

    /// Removes the forum post and every comment attached to it.
    pub fn delete_forum_post(&self, id: Uuid) -> Result<(), ContentError> {
        if !self.db.delete_forum_post(&id.to_string())? {
            return Err(ContentError::not_found(EntityKind::ForumPost, id));
        }
        info!("Forum post {} deleted", id);
        Ok(())
    }

    fn parent_exists(&self, parent: CommentParent) -> Result<bool, ContentError> {
        let id = parent.id().to_string();
        Ok(match parent {
            CommentParent::Resource(_) => self.db.get_resource(&id)?.is_some(),
            CommentParent::ForumPost(_) => self.db.get_forum_post(&id)?.is_some(),
        })
    }
}

fn inserted<T>(row: Option<T>, kind: EntityKind, id: Uuid) -> Result<T, ContentError> {
    row.ok_or_else(|| ContentError::Store(anyhow::anyhow!("{kind} {id} vanished after insert")))
}
