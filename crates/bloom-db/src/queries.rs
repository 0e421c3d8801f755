use crate::Database;
use crate::models::{CommentRow, ForumPostRow, ResourceRow, UserRow};
use anyhow::Result;
use bloom_types::models::CommentParent;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, Row};
use tracing::debug;

/// Timestamps are stored as RFC 3339 with microseconds so that text order
/// matches chronological order.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        id: &str,
        username: &str,
        email: &str,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, email, password, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                (id, username, email, password_hash, format_timestamp(created_at)),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    /// Removes the user and, through the foreign key, all of their comments.
    pub fn delete_user(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM users WHERE id = ?1", [id])? > 0))
    }

    // -- Resources --

    pub fn insert_resource(
        &self,
        id: &str,
        title: &str,
        description: &str,
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO resources (id, title, description, created_at) VALUES (?1, ?2, ?3, ?4)",
                (id, title, description, format_timestamp(created_at)),
            )?;
            Ok(())
        })
    }

    pub fn get_resource(&self, id: &str) -> Result<Option<ResourceRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, title, description, created_at FROM resources WHERE id = ?1",
                [id],
                resource_from_row,
            )
            .optional()
        })
    }

    pub fn list_resources(&self) -> Result<Vec<ResourceRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, description, created_at FROM resources
                 ORDER BY created_at DESC, rowid DESC",
            )?;
            let rows = stmt
                .query_map([], resource_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Case-insensitive substring match on title or description.
    pub fn search_resources(&self, query: &str) -> Result<Vec<ResourceRow>> {
        let needle = query.to_lowercase();
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, description, created_at FROM resources
                 WHERE instr(fold(title), ?1) > 0 OR instr(fold(description), ?1) > 0
                 ORDER BY created_at DESC, rowid DESC",
            )?;
            let rows = stmt
                .query_map([&needle], resource_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn delete_resource(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM resources WHERE id = ?1", [id])?;
            debug!("Deleted resource {} ({} row)", id, removed);
            Ok(removed > 0)
        })
    }

    // -- Forum posts --

    pub fn insert_forum_post(
        &self,
        id: &str,
        title: &str,
        content: &str,
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO forum_posts (id, title, content, created_at) VALUES (?1, ?2, ?3, ?4)",
                (id, title, content, format_timestamp(created_at)),
            )?;
            Ok(())
        })
    }

    pub fn get_forum_post(&self, id: &str) -> Result<Option<ForumPostRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, title, content, created_at FROM forum_posts WHERE id = ?1",
                [id],
                forum_post_from_row,
            )
            .optional()
        })
    }

    pub fn list_forum_posts(&self) -> Result<Vec<ForumPostRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, content, created_at FROM forum_posts
                 ORDER BY created_at DESC, rowid DESC",
            )?;
            let rows = stmt
                .query_map([], forum_post_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Case-insensitive substring match on title or content.
    pub fn search_forum_posts(&self, query: &str) -> Result<Vec<ForumPostRow>> {
        let needle = query.to_lowercase();
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, content, created_at FROM forum_posts
                 WHERE instr(fold(title), ?1) > 0 OR instr(fold(content), ?1) > 0
                 ORDER BY created_at DESC, rowid DESC",
            )?;
            let rows = stmt
                .query_map([&needle], forum_post_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn delete_forum_post(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM forum_posts WHERE id = ?1", [id])?;
            debug!("Deleted forum post {} ({} row)", id, removed);
            Ok(removed > 0)
        })
    }

    // -- Comments --

    pub fn insert_comment(
        &self,
        id: &str,
        author_id: &str,
        content: &str,
        parent: &CommentParent,
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        let (resource_id, forum_post_id) = match parent {
            CommentParent::Resource(rid) => (Some(rid.to_string()), None),
            CommentParent::ForumPost(pid) => (None, Some(pid.to_string())),
        };

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO comments (id, author_id, content, resource_id, forum_post_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    id,
                    author_id,
                    content,
                    resource_id,
                    forum_post_id,
                    format_timestamp(created_at)
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_comment(&self, id: &str) -> Result<Option<CommentRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("{COMMENT_SELECT} WHERE c.id = ?1"),
                [id],
                comment_from_row,
            )
            .optional()
        })
    }

    /// Comments attached to `parent`, oldest first.
    pub fn get_comments_for(&self, parent: &CommentParent) -> Result<Vec<CommentRow>> {
        let column = match parent {
            CommentParent::Resource(_) => "resource_id",
            CommentParent::ForumPost(_) => "forum_post_id",
        };
        let parent_id = parent.id().to_string();

        self.with_conn(|conn| {
            // JOIN users to fetch author_username in a single query (eliminates N+1)
            let mut stmt = conn.prepare(&format!(
                "{COMMENT_SELECT} WHERE c.{column} = ?1 ORDER BY c.created_at ASC, c.rowid ASC"
            ))?;
            let rows = stmt
                .query_map([&parent_id], comment_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

const COMMENT_SELECT: &str =
    "SELECT c.id, c.author_id, u.username, c.content, c.resource_id, c.forum_post_id, c.created_at
     FROM comments c
     JOIN users u ON c.author_id = u.id";

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, username, email, password, created_at FROM users WHERE {column} = ?1"
    ))?;

    let row = stmt
        .query_row([value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                email: row.get(2)?,
                password: row.get(3)?,
                created_at: row.get(4)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn resource_from_row(row: &Row<'_>) -> rusqlite::Result<ResourceRow> {
    Ok(ResourceRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn forum_post_from_row(row: &Row<'_>) -> rusqlite::Result<ForumPostRow> {
    Ok(ForumPostRow {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        id: row.get(0)?,
        author_id: row.get(1)?,
        author_username: row.get(2)?,
        content: row.get(3)?,
        resource_id: row.get(4)?,
        forum_post_id: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
