use rusqlite::{Connection, OptionalExtension, params};
use tracing::{info, warn};

use yatube_types::models::{Author, Comment, Group, Post};

use crate::Database;
use crate::error::{Result, StoreError, Violation, violation};
use crate::models::{AuthorRow, CommentRow, GroupRow, PostRow, now};
use crate::slug::slugify;
use crate::validation;

/// Which posts a feed query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostScope {
    All,
    Group(i64),
    Author(i64),
}

impl PostScope {
    fn filter(self) -> (&'static str, Option<i64>) {
        match self {
            Self::All => ("", None),
            Self::Group(id) => ("WHERE p.group_id = ?1", Some(id)),
            Self::Author(id) => ("WHERE p.author_id = ?1", Some(id)),
        }
    }
}

impl Database {
    // -- Authors --

    pub fn create_author(&self, username: &str, display_name: &str) -> Result<Author> {
        validation::username(username)?;
        self.with_tx(|conn| {
            conn.execute(
                "INSERT INTO users (username, display_name, created_at) VALUES (?1, ?2, ?3)",
                (username, display_name, now()),
            )
            .map_err(|e| match violation(&e) {
                Some(Violation::Unique) => StoreError::DuplicateUsername(username.to_string()),
                _ => e.into(),
            })?;
            let id = conn.last_insert_rowid();
            query_author(conn, "id = ?1", id)?.ok_or(StoreError::NotFound("author"))
        })
    }

    pub fn get_author_by_username(&self, username: &str) -> Result<Option<Author>> {
        self.with_conn(|conn| query_author(conn, "username = ?1", username))
    }

    pub fn get_author_by_id(&self, id: i64) -> Result<Option<Author>> {
        self.with_conn(|conn| query_author(conn, "id = ?1", id))
    }

    /// Deletes the author together with their posts, comments and follow
    /// edges in either direction.
    pub fn delete_author(&self, id: i64) -> Result<bool> {
        let removed = self.with_conn(|conn| Ok(conn.execute("DELETE FROM users WHERE id = ?1", [id])?))?;
        if removed > 0 {
            info!("Deleted author {}", id);
        }
        Ok(removed > 0)
    }

    // -- Groups --

    /// Creates a group. A missing or empty `slug` is derived from the title.
    pub fn create_group(&self, title: &str, slug: Option<&str>, description: &str) -> Result<Group> {
        validation::title(title)?;
        let slug = match slug.map(str::trim).filter(|s| !s.is_empty()) {
            Some(given) => {
                validation::slug(given)?;
                given.to_string()
            }
            None => {
                let derived = slugify(title);
                if derived.is_empty() {
                    return Err(StoreError::validation(
                        "slug",
                        "cannot derive a slug from this title, provide one",
                        title,
                    ));
                }
                derived
            }
        };

        self.with_tx(|conn| {
            conn.execute(
                "INSERT INTO post_groups (title, slug, description) VALUES (?1, ?2, ?3)",
                (title, &slug, description),
            )
            .map_err(|e| match violation(&e) {
                Some(Violation::Unique) => StoreError::DuplicateSlug(slug.clone()),
                _ => e.into(),
            })?;
            let id = conn.last_insert_rowid();
            query_group(conn, "id = ?1", id)?.ok_or(StoreError::NotFound("group"))
        })
    }

    pub fn get_group_by_slug(&self, slug: &str) -> Result<Option<Group>> {
        self.with_conn(|conn| query_group(conn, "slug = ?1", slug))
    }

    pub fn get_group_by_id(&self, id: i64) -> Result<Option<Group>> {
        self.with_conn(|conn| query_group(conn, "id = ?1", id))
    }

    pub fn list_groups(&self) -> Result<Vec<Group>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM post_groups ORDER BY title, id", GroupRow::COLUMNS);
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], GroupRow::from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows.into_iter().map(Group::from).collect())
        })
    }

    /// Deletes the group; its posts stay, with no group.
    pub fn delete_group(&self, id: i64) -> Result<bool> {
        let removed =
            self.with_conn(|conn| Ok(conn.execute("DELETE FROM post_groups WHERE id = ?1", [id])?))?;
        Ok(removed > 0)
    }

    // -- Posts --

    pub fn create_post(
        &self,
        author_id: i64,
        text: &str,
        group_id: Option<i64>,
        image: Option<&str>,
    ) -> Result<Post> {
        validation::not_empty_text("text", text)?;
        self.with_tx(|conn| {
            ensure_group(conn, group_id)?;
            conn.execute(
                "INSERT INTO posts (text, created_at, author_id, group_id, image) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![text, now(), author_id, group_id, image],
            )
            .map_err(|e| match violation(&e) {
                Some(Violation::ForeignKey) => StoreError::NotFound("author"),
                _ => e.into(),
            })?;
            let id = conn.last_insert_rowid();
            query_post(conn, id)?.ok_or(StoreError::NotFound("post"))
        })
    }

    /// Rewrites the editable fields. Author and creation time never change.
    pub fn update_post(
        &self,
        id: i64,
        text: &str,
        group_id: Option<i64>,
        image: Option<&str>,
    ) -> Result<Post> {
        validation::not_empty_text("text", text)?;
        self.with_tx(|conn| {
            ensure_group(conn, group_id)?;
            let updated = conn.execute(
                "UPDATE posts SET text = ?1, group_id = ?2, image = ?3 WHERE id = ?4",
                params![text, group_id, image, id],
            )?;
            if updated == 0 {
                return Err(StoreError::NotFound("post"));
            }
            query_post(conn, id)?.ok_or(StoreError::NotFound("post"))
        })
    }

    pub fn get_post(&self, id: i64) -> Result<Option<Post>> {
        self.with_conn(|conn| query_post(conn, id))
    }

    pub fn delete_post(&self, id: i64) -> Result<bool> {
        let removed = self.with_conn(|conn| Ok(conn.execute("DELETE FROM posts WHERE id = ?1", [id])?))?;
        Ok(removed > 0)
    }

    pub fn delete_all_posts(&self) -> Result<usize> {
        let removed = self.with_conn(|conn| Ok(conn.execute("DELETE FROM posts", [])?))?;
        warn!("Deleted all {} posts", removed);
        Ok(removed)
    }

    pub fn count_posts(&self, scope: PostScope) -> Result<u64> {
        self.with_conn(|conn| count_scope(conn, scope))
    }

    /// Newest first. `limit = None` returns the whole scope.
    pub fn list_posts(&self, scope: PostScope, offset: u64, limit: Option<u64>) -> Result<Vec<Post>> {
        self.with_conn(|conn| list_scope(conn, scope, offset, limit))
    }

    // -- Comments --

    pub fn create_comment(&self, post_id: i64, author_id: i64, text: &str) -> Result<Comment> {
        validation::not_empty_text("text", text)?;
        self.with_tx(|conn| {
            let post_exists = conn
                .query_row("SELECT 1 FROM posts WHERE id = ?1", [post_id], |_| Ok(()))
                .optional()?
                .is_some();
            if !post_exists {
                return Err(StoreError::NotFound("post"));
            }
            conn.execute(
                "INSERT INTO comments (post_id, author_id, text, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![post_id, author_id, text, now()],
            )
            .map_err(|e| match violation(&e) {
                Some(Violation::ForeignKey) => StoreError::NotFound("author"),
                _ => e.into(),
            })?;
            let id = conn.last_insert_rowid();
            query_comments(conn, "c.id = ?1", id)?
                .pop()
                .ok_or(StoreError::NotFound("comment"))
        })
    }

    /// Comments on a post, newest first.
    pub fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>> {
        self.with_conn(|conn| query_comments(conn, "c.post_id = ?1", post_id))
    }
}

/// Connection-level form of [`Database::count_posts`], for callers that
/// need several reads under one lock.
pub fn count_scope(conn: &Connection, scope: PostScope) -> Result<u64> {
    let (filter, arg) = scope.filter();
    let sql = format!("SELECT COUNT(*) FROM posts p {filter}");
    let count: i64 = match arg {
        Some(id) => conn.query_row(&sql, [id], |r| r.get(0))?,
        None => conn.query_row(&sql, [], |r| r.get(0))?,
    };
    Ok(count.try_into().unwrap_or_default())
}

/// Connection-level form of [`Database::list_posts`].
pub fn list_scope(
    conn: &Connection,
    scope: PostScope,
    offset: u64,
    limit: Option<u64>,
) -> Result<Vec<Post>> {
    let (filter, arg) = scope.filter();
    // SQLite treats a negative LIMIT as "no limit"
    let limit = limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));
    let offset = i64::try_from(offset).unwrap_or(i64::MAX);
    let sql = format!(
        "{} {filter} {} LIMIT ?2 OFFSET ?3",
        PostRow::SELECT,
        PostRow::ORDER
    );
    let mut stmt = conn.prepare(&sql)?;
    // ?1 is bound even when the filter is empty so the numbering holds
    let rows = stmt
        .query_map(params![arg.unwrap_or_default(), limit, offset], PostRow::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows.into_iter().map(Post::from).collect())
}

fn ensure_group(conn: &Connection, group_id: Option<i64>) -> Result<()> {
    if let Some(id) = group_id {
        if query_group(conn, "id = ?1", id)?.is_none() {
            return Err(StoreError::NotFound("group"));
        }
    }
    Ok(())
}

fn query_author(conn: &Connection, predicate: &str, key: impl rusqlite::ToSql) -> Result<Option<Author>> {
    let sql = format!("SELECT {} FROM users WHERE {predicate}", AuthorRow::COLUMNS);
    let row = conn
        .query_row(&sql, [key], AuthorRow::from_row)
        .optional()?;
    Ok(row.map(Author::from))
}

fn query_group(conn: &Connection, predicate: &str, key: impl rusqlite::ToSql) -> Result<Option<Group>> {
    let sql = format!("SELECT {} FROM post_groups WHERE {predicate}", GroupRow::COLUMNS);
    let row = conn
        .query_row(&sql, [key], GroupRow::from_row)
        .optional()?;
    Ok(row.map(Group::from))
}

pub(crate) fn query_post(conn: &Connection, id: i64) -> Result<Option<Post>> {
    let sql = format!("{} WHERE p.id = ?1", PostRow::SELECT);
    let row = conn.query_row(&sql, [id], PostRow::from_row).optional()?;
    Ok(row.map(Post::from))
}

fn query_comments(conn: &Connection, predicate: &str, key: i64) -> Result<Vec<Comment>> {
    let sql = format!(
        "SELECT c.id, c.post_id, c.author_id, u.username, c.text, c.created_at
         FROM comments c
         JOIN users u ON u.id = c.author_id
         WHERE {predicate}
         ORDER BY c.created_at DESC, c.id DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([key], CommentRow::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows.into_iter().map(Comment::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn group_slug_derived_from_title() {
        let db = db();
        let group = db.create_group("Тестовая группа", None, "desc").unwrap();
        assert_eq!(group.slug, "testovaya-gruppa");
        assert_eq!(db.get_group_by_slug("testovaya-gruppa").unwrap(), Some(group));
    }

    #[test]
    fn explicit_slug_kept_and_blank_slug_derived() {
        let db = db();
        let a = db.create_group("Cats", Some("felines"), "").unwrap();
        assert_eq!(a.slug, "felines");
        let b = db.create_group("Dogs", Some("  "), "").unwrap();
        assert_eq!(b.slug, "dogs");
    }

    #[test]
    fn duplicate_slug_is_integrity_error() {
        let db = db();
        db.create_group("Тестовая группа", None, "").unwrap();
        let err = db.create_group("тестовая   группа!", None, "").unwrap_err();
        assert!(matches!(err, StoreError::DuplicateSlug(ref s) if s == "testovaya-gruppa"));
        assert!(err.is_integrity());
    }

    #[test]
    fn bad_slug_and_underivable_title_rejected() {
        let db = db();
        assert!(matches!(
            db.create_group("Title", Some("not a slug"), ""),
            Err(StoreError::Validation { field: "slug", .. })
        ));
        assert!(matches!(
            db.create_group("???", None, ""),
            Err(StoreError::Validation { field: "slug", .. })
        ));
        assert!(db.list_groups().unwrap().is_empty());
    }

    #[test]
    fn groups_listed_by_title() {
        let db = db();
        db.create_group("Zebra", None, "").unwrap();
        db.create_group("Apple", None, "").unwrap();
        let titles: Vec<_> = db.list_groups().unwrap().into_iter().map(|g| g.title).collect();
        assert_eq!(titles, ["Apple", "Zebra"]);
    }

    #[test]
    fn duplicate_username_rejected() {
        let db = db();
        db.create_author("leo", "Leo").unwrap();
        assert!(matches!(
            db.create_author("leo", "Other"),
            Err(StoreError::DuplicateUsername(_))
        ));
    }

    #[test]
    fn empty_post_fails_validation_before_insert() {
        let db = db();
        let author = db.create_author("leo", "").unwrap();
        let err = db.create_post(author.id, "", None, None).unwrap_err();
        assert!(matches!(err, StoreError::Validation { field: "text", .. }));
        assert!(!err.is_integrity());
        assert_eq!(db.count_posts(PostScope::All).unwrap(), 0);
    }

    #[test]
    fn post_with_unknown_group_or_author_not_found() {
        let db = db();
        let author = db.create_author("leo", "").unwrap();
        assert!(matches!(
            db.create_post(author.id, "text", Some(42), None),
            Err(StoreError::NotFound("group"))
        ));
        assert!(matches!(
            db.create_post(999, "text", None, None),
            Err(StoreError::NotFound("author"))
        ));
    }

    #[test]
    fn update_keeps_author_and_created_at() {
        let db = db();
        let author = db.create_author("leo", "").unwrap();
        let group = db.create_group("Group", None, "").unwrap();
        let post = db.create_post(author.id, "first", None, None).unwrap();

        let edited = db
            .update_post(post.id, "second", Some(group.id), Some("posts/a.gif"))
            .unwrap();
        assert_eq!(edited.text, "second");
        assert_eq!(edited.created_at, post.created_at);
        assert_eq!(edited.author, post.author);
        assert_eq!(edited.group.map(|g| g.slug), Some("group".to_string()));
        assert_eq!(edited.image.as_deref(), Some("posts/a.gif"));

        assert!(matches!(
            db.update_post(post.id, " ", None, None),
            Err(StoreError::Validation { .. })
        ));
        assert!(matches!(
            db.update_post(999, "text", None, None),
            Err(StoreError::NotFound("post"))
        ));
    }

    #[test]
    fn posts_listed_newest_first() {
        let db = db();
        let author = db.create_author("leo", "").unwrap();
        for i in 0..5 {
            db.create_post(author.id, &format!("post {i}"), None, None).unwrap();
        }
        let posts = db.list_posts(PostScope::All, 0, None).unwrap();
        assert_eq!(posts.len(), 5);
        assert_eq!(posts[0].text, "post 4");
        for pair in posts.windows(2) {
            assert!((pair[0].created_at, pair[0].id) > (pair[1].created_at, pair[1].id));
        }

        let window = db.list_posts(PostScope::All, 1, Some(2)).unwrap();
        let texts: Vec<_> = window.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, ["post 3", "post 2"]);
    }

    #[test]
    fn scopes_filter_by_group_and_author() {
        let db = db();
        let leo = db.create_author("leo", "").unwrap();
        let ann = db.create_author("ann", "").unwrap();
        let group = db.create_group("G", None, "").unwrap();
        db.create_post(leo.id, "in group", Some(group.id), None).unwrap();
        db.create_post(ann.id, "no group", None, None).unwrap();

        assert_eq!(db.count_posts(PostScope::Group(group.id)).unwrap(), 1);
        assert_eq!(db.count_posts(PostScope::Author(ann.id)).unwrap(), 1);
        let in_group = db.list_posts(PostScope::Group(group.id), 0, Some(10)).unwrap();
        assert_eq!(in_group[0].text, "in group");
    }

    #[test]
    fn deleting_group_detaches_posts() {
        let db = db();
        let author = db.create_author("leo", "").unwrap();
        let group = db.create_group("G", None, "").unwrap();
        let post = db.create_post(author.id, "text", Some(group.id), None).unwrap();

        assert!(db.delete_group(group.id).unwrap());
        assert_eq!(db.get_group_by_id(group.id).unwrap(), None);
        let kept = db.get_post(post.id).unwrap().unwrap();
        assert_eq!(kept.group, None);
    }

    #[test]
    fn deleting_post_removes_comments() {
        let db = db();
        let author = db.create_author("leo", "").unwrap();
        let post = db.create_post(author.id, "text", None, None).unwrap();
        db.create_comment(post.id, author.id, "nice").unwrap();

        assert!(db.delete_post(post.id).unwrap());
        assert!(db.list_comments(post.id).unwrap().is_empty());
        assert!(!db.delete_post(post.id).unwrap());
    }

    #[test]
    fn deleting_author_cascades() {
        let db = db();
        let leo = db.create_author("leo", "").unwrap();
        let ann = db.create_author("ann", "").unwrap();
        let leo_post = db.create_post(leo.id, "leo's", None, None).unwrap();
        let ann_post = db.create_post(ann.id, "ann's", None, None).unwrap();
        db.create_comment(ann_post.id, leo.id, "from leo").unwrap();
        db.create_comment(leo_post.id, ann.id, "from ann").unwrap();
        db.insert_follow(ann.id, leo.id).unwrap();
        db.insert_follow(leo.id, ann.id).unwrap();

        assert_eq!(db.get_author_by_id(leo.id).unwrap(), Some(leo.clone()));
        assert!(db.delete_author(leo.id).unwrap());
        assert_eq!(db.get_author_by_id(leo.id).unwrap(), None);

        assert_eq!(db.get_post(leo_post.id).unwrap(), None);
        assert!(db.list_comments(ann_post.id).unwrap().is_empty());
        assert!(!db.follow_exists(ann.id, leo.id).unwrap());
        assert_eq!(db.count_follows(ann.id).unwrap(), 0);
        assert_eq!(db.count_followers(ann.id).unwrap(), 0);
    }

    #[test]
    fn comments_newest_first_and_validated() {
        let db = db();
        let author = db.create_author("leo", "").unwrap();
        let post = db.create_post(author.id, "text", None, None).unwrap();
        db.create_comment(post.id, author.id, "one").unwrap();
        db.create_comment(post.id, author.id, "two").unwrap();

        let texts: Vec<_> = db
            .list_comments(post.id)
            .unwrap()
            .into_iter()
            .map(|c| c.text)
            .collect();
        assert_eq!(texts, ["two", "one"]);
        assert!(matches!(
            db.create_comment(post.id, author.id, ""),
            Err(StoreError::Validation { .. })
        ));
        assert!(matches!(
            db.create_comment(999, author.id, "hi"),
            Err(StoreError::NotFound("post"))
        ));
    }
}
