use anyhow::{Context, Result, bail};
use bloom_db::models::{CommentRow, ForumPostRow, ResourceRow};
use bloom_types::models::{Comment, CommentParent, ForumPost, Resource};
use chrono::{DateTime, NaiveDateTime, Utc};
use uuid::Uuid;

pub fn resource(row: ResourceRow) -> Result<Resource> {
    Ok(Resource {
        id: parse_id(&row.id)?,
        created_at: parse_timestamp(&row.created_at)?,
        title: row.title,
        description: row.description,
    })
}

pub fn forum_post(row: ForumPostRow) -> Result<ForumPost> {
    Ok(ForumPost {
        id: parse_id(&row.id)?,
        created_at: parse_timestamp(&row.created_at)?,
        title: row.title,
        content: row.content,
    })
}

pub fn comment(row: CommentRow) -> Result<Comment> {
    let parent = match (row.resource_id.as_deref(), row.forum_post_id.as_deref()) {
        (Some(rid), None) => CommentParent::Resource(parse_id(rid)?),
        (None, Some(pid)) => CommentParent::ForumPost(parse_id(pid)?),
        _ => bail!("comment {} does not have exactly one parent", row.id),
    };

    Ok(Comment {
        id: parse_id(&row.id)?,
        author_id: parse_id(&row.author_id)?,
        created_at: parse_timestamp(&row.created_at)?,
        author_username: row.author_username,
        content: row.content,
        parent,
    })
}

fn parse_id(raw: &str) -> Result<Uuid> {
    raw.parse().with_context(|| format!("corrupt id '{raw}'"))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // Rows written by hand through sqlite3 use datetime('now'): no zone, no 'T'
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .with_context(|| format!("corrupt timestamp '{raw}'"))
}
