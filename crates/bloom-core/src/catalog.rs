use std::sync::Arc;

use bloom_db::Database;
use bloom_types::models::{Comment, CommentParent, ForumPost, Resource};
use tracing::debug;
use uuid::Uuid;

use crate::convert;
use crate::error::{ContentError, EntityKind};

/// Matches for one search query, split by entity type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHits {
    pub resources: Vec<Resource>,
    pub forum_posts: Vec<ForumPost>,
}

/// Read side: listings, lookups by id, comment threads and search.
#[derive(Clone)]
pub struct Catalog {
    db: Arc<Database>,
}

impl Catalog {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Newest first.
    pub fn list_resources(&self) -> Result<Vec<Resource>, ContentError> {
        let rows = self.db.list_resources()?;
        Ok(rows.into_iter().map(convert::resource).collect::<anyhow::Result<_>>()?)
    }

    /// Newest first.
    pub fn list_forum_posts(&self) -> Result<Vec<ForumPost>, ContentError> {
        let rows = self.db.list_forum_posts()?;
        Ok(rows.into_iter().map(convert::forum_post).collect::<anyhow::Result<_>>()?)
    }

    pub fn get_resource(&self, id: Uuid) -> Result<Resource, ContentError> {
        let row = self
            .db
            .get_resource(&id.to_string())?
            .ok_or_else(|| ContentError::not_found(EntityKind::Resource, id))?;
        Ok(convert::resource(row)?)
    }

    pub fn get_forum_post(&self, id: Uuid) -> Result<ForumPost, ContentError> {
        let row = self
            .db
            .get_forum_post(&id.to_string())?
            .ok_or_else(|| ContentError::not_found(EntityKind::ForumPost, id))?;
        Ok(convert::forum_post(row)?)
    }

    /// Comments on `parent`, oldest first. A parent that does not exist (or
    /// no longer exists) is `NotFound`, not an empty thread.
    pub fn list_comments_for(&self, parent: CommentParent) -> Result<Vec<Comment>, ContentError> {
        self.ensure_parent(parent)?;
        let rows = self.db.get_comments_for(&parent)?;
        Ok(rows.into_iter().map(convert::comment).collect::<anyhow::Result<_>>()?)
    }

    /// Case-insensitive substring search. Resources match on title or
    /// description, forum posts on title or content. An empty query matches
    /// everything.
    pub fn search(&self, query: &str) -> Result<SearchHits, ContentError> {
        let resources = self
            .db
            .search_resources(query)?
            .into_iter()
            .map(convert::resource)
            .collect::<anyhow::Result<Vec<_>>>()?;
        let forum_posts = self
            .db
            .search_forum_posts(query)?
            .into_iter()
            .map(convert::forum_post)
            .collect::<anyhow::Result<Vec<_>>>()?;

        debug!(
            "Search {:?}: {} resources, {} forum posts",
            query,
            resources.len(),
            forum_posts.len()
        );
        Ok(SearchHits {
            resources,
            forum_posts,
        })
    }

    fn ensure_parent(&self, parent: CommentParent) -> Result<(), ContentError> {
        let (exists, kind) = match parent {
            CommentParent::Resource(id) => (
                self.db.get_resource(&id.to_string())?.is_some(),
                EntityKind::Resource,
            ),
            CommentParent::ForumPost(id) => (
                self.db.get_forum_post(&id.to_string())?.is_some(),
                EntityKind::ForumPost,
            ),
        };
        if exists {
            Ok(())
        } else {
            Err(ContentError::not_found(kind, parent.id()))
        }
    }
}
