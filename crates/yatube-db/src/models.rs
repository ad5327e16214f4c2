//! Database row types, mapped straight from SQLite rows. Kept apart from the
//! yatube-types models so the storage layout can change on its own.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Row;
use tracing::warn;

use yatube_types::models::{Author, AuthorRef, Comment, Follow, Group, GroupRef, Post};

/// Fixed-width UTC timestamp; lexical order is chronological order.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn now() -> String {
    timestamp(Utc::now())
}

fn parse_timestamp(raw: &str, owner: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}' on {}: {}", raw, owner, e);
            DateTime::default()
        })
}

pub struct AuthorRow {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    pub created_at: String,
}

impl AuthorRow {
    pub(crate) const COLUMNS: &'static str = "id, username, display_name, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            display_name: row.get(2)?,
            created_at: row.get(3)?,
        })
    }
}

impl From<AuthorRow> for Author {
    fn from(row: AuthorRow) -> Self {
        let created_at = parse_timestamp(&row.created_at, &format!("author {}", row.id));
        Self {
            id: row.id,
            username: row.username,
            display_name: row.display_name,
            created_at,
        }
    }
}

pub struct GroupRow {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl GroupRow {
    pub(crate) const COLUMNS: &'static str = "id, title, slug, description";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            slug: row.get(2)?,
            description: row.get(3)?,
        })
    }
}

impl From<GroupRow> for Group {
    fn from(row: GroupRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            slug: row.slug,
            description: row.description,
        }
    }
}

/// A post joined with its author and (optional) group.
pub struct PostRow {
    pub id: i64,
    pub text: String,
    pub created_at: String,
    pub author_id: i64,
    pub author_username: String,
    pub group_id: Option<i64>,
    pub group_slug: Option<String>,
    pub group_title: Option<String>,
    pub image: Option<String>,
}

impl PostRow {
    /// Select list matching [`PostRow::from_row`]; expects `posts p`,
    /// `users u` and a left-joined `post_groups g`.
    pub(crate) const SELECT: &'static str = "SELECT p.id, p.text, p.created_at, p.author_id, u.username,
                p.group_id, g.slug, g.title, p.image
         FROM posts p
         JOIN users u ON u.id = p.author_id
         LEFT JOIN post_groups g ON g.id = p.group_id";

    pub(crate) const ORDER: &'static str = "ORDER BY p.created_at DESC, p.id DESC";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            text: row.get(1)?,
            created_at: row.get(2)?,
            author_id: row.get(3)?,
            author_username: row.get(4)?,
            group_id: row.get(5)?,
            group_slug: row.get(6)?,
            group_title: row.get(7)?,
            image: row.get(8)?,
        })
    }
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        let group = match (row.group_id, row.group_slug, row.group_title) {
            (Some(id), Some(slug), Some(title)) => Some(GroupRef { id, slug, title }),
            _ => None,
        };
        Self {
            id: row.id,
            created_at: parse_timestamp(&row.created_at, &format!("post {}", row.id)),
            text: row.text,
            author: AuthorRef {
                id: row.author_id,
                username: row.author_username,
            },
            group,
            image: row.image,
        }
    }
}

pub struct CommentRow {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub author_username: String,
    pub text: String,
    pub created_at: String,
}

impl CommentRow {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            post_id: row.get(1)?,
            author_id: row.get(2)?,
            author_username: row.get(3)?,
            text: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            post_id: row.post_id,
            created_at: parse_timestamp(&row.created_at, &format!("comment {}", row.id)),
            author: AuthorRef {
                id: row.author_id,
                username: row.author_username,
            },
            text: row.text,
        }
    }
}

pub struct FollowRow {
    pub id: i64,
    pub user_id: i64,
    pub author_id: i64,
    pub created_at: String,
}

impl From<FollowRow> for Follow {
    fn from(row: FollowRow) -> Self {
        Self {
            id: row.id,
            follower_id: row.user_id,
            author_id: row.author_id,
            created_at: parse_timestamp(&row.created_at, &format!("follow {}", row.id)),
        }
    }
}
