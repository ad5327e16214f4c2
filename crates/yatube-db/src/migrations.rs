use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            BEGIN;

            CREATE TABLE users (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                username        TEXT NOT NULL UNIQUE,
                display_name    TEXT NOT NULL DEFAULT '',
                created_at      TEXT NOT NULL
            );

            CREATE TABLE post_groups (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                title           TEXT NOT NULL,
                slug            TEXT NOT NULL UNIQUE CHECK (slug <> ''),
                description     TEXT NOT NULL DEFAULT ''
            );

            CREATE TABLE posts (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                text            TEXT NOT NULL,
                created_at      TEXT NOT NULL,
                author_id       INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                group_id        INTEGER REFERENCES post_groups(id) ON DELETE SET NULL,
                image           TEXT
            );

            CREATE INDEX idx_posts_created ON posts(created_at DESC, id DESC);
            CREATE INDEX idx_posts_author ON posts(author_id, created_at);
            CREATE INDEX idx_posts_group ON posts(group_id, created_at);

            CREATE TABLE comments (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                post_id         INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
                author_id       INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                text            TEXT NOT NULL,
                created_at      TEXT NOT NULL
            );

            CREATE INDEX idx_comments_post ON comments(post_id, created_at);

            CREATE TABLE follows (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id         INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                author_id       INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at      TEXT NOT NULL,
                CONSTRAINT no_follow_author CHECK (user_id <> author_id),
                CONSTRAINT no_double_follow UNIQUE (user_id, author_id)
            );

            CREATE INDEX idx_follows_author ON follows(author_id);

            INSERT INTO schema_version (version) VALUES (1);

            COMMIT;
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
