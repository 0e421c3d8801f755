use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                username    TEXT NOT NULL UNIQUE,
                email       TEXT NOT NULL,
                password    TEXT NOT NULL,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE resources (
                id          TEXT PRIMARY KEY,
                title       TEXT NOT NULL CHECK (length(title) <= 200),
                description TEXT NOT NULL,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE forum_posts (
                id          TEXT PRIMARY KEY,
                title       TEXT NOT NULL CHECK (length(title) <= 200),
                content     TEXT NOT NULL,
                created_at  TEXT NOT NULL
            );

            -- Exactly one parent column is set
            CREATE TABLE comments (
                id              TEXT PRIMARY KEY,
                author_id       TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                content         TEXT NOT NULL,
                resource_id     TEXT REFERENCES resources(id) ON DELETE CASCADE,
                forum_post_id   TEXT REFERENCES forum_posts(id) ON DELETE CASCADE,
                created_at      TEXT NOT NULL,
                CHECK ((resource_id IS NULL) <> (forum_post_id IS NULL))
            );

            CREATE INDEX idx_comments_resource
                ON comments(resource_id, created_at);

            CREATE INDEX idx_comments_forum_post
                ON comments(forum_post_id, created_at);

            CREATE INDEX idx_comments_author
                ON comments(author_id);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
