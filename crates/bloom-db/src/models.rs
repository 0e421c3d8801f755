/// Database row types — these map directly to SQLite rows.
/// Distinct from bloom-types models to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub created_at: String,
}

pub struct ResourceRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub created_at: String,
}

pub struct ForumPostRow {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: String,
}

pub struct CommentRow {
    pub id: String,
    pub author_id: String,
    pub author_username: String,
    pub content: String,
    pub resource_id: Option<String>,
    pub forum_post_id: Option<String>,
    pub created_at: String,
}
