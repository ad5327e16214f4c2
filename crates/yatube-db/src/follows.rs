use rusqlite::{OptionalExtension, params};

use yatube_types::models::{Follow, Post};

use crate::Database;
use crate::error::{Result, StoreError, Violation, violation};
use crate::models::{FollowRow, PostRow, now};

impl Database {
    /// Inserts a follow edge. The `no_follow_author` CHECK and
    /// `no_double_follow` UNIQUE constraints decide; nothing is read first,
    /// so racing writers still end up with at most one edge.
    pub fn insert_follow(&self, user_id: i64, author_id: i64) -> Result<Follow> {
        self.with_tx(|conn| {
            let created_at = now();
            conn.execute(
                "INSERT INTO follows (user_id, author_id, created_at) VALUES (?1, ?2, ?3)",
                params![user_id, author_id, created_at],
            )
            .map_err(|e| match violation(&e) {
                Some(Violation::Check) => StoreError::SelfFollow,
                Some(Violation::Unique) => StoreError::DuplicateFollow,
                Some(Violation::ForeignKey) => StoreError::NotFound("author"),
                _ => e.into(),
            })?;
            Ok(Follow::from(FollowRow {
                id: conn.last_insert_rowid(),
                user_id,
                author_id,
                created_at,
            }))
        })
    }

    /// Removes the edge if present. Returns whether a row was deleted.
    pub fn delete_follow(&self, user_id: i64, author_id: i64) -> Result<bool> {
        let removed = self.with_conn(|conn| {
            Ok(conn.execute(
                "DELETE FROM follows WHERE user_id = ?1 AND author_id = ?2",
                [user_id, author_id],
            )?)
        })?;
        Ok(removed > 0)
    }

    pub fn follow_exists(&self, user_id: i64, author_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let found = conn
                .query_row(
                    "SELECT 1 FROM follows WHERE user_id = ?1 AND author_id = ?2",
                    [user_id, author_id],
                    |_| Ok(()),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    pub fn count_follows(&self, user_id: i64) -> Result<u64> {
        self.count_edges("user_id", user_id)
    }

    pub fn count_followers(&self, author_id: i64) -> Result<u64> {
        self.count_edges("author_id", author_id)
    }

    fn count_edges(&self, column: &'static str, id: i64) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM follows WHERE {column} = ?1"),
                [id],
                |r| r.get(0),
            )?;
            Ok(count.try_into().unwrap_or_default())
        })
    }

    /// Every post whose author `user_id` follows, newest first.
    pub fn list_followed_posts(&self, user_id: i64) -> Result<Vec<Post>> {
        self.with_conn(|conn| {
            let sql = format!(
                "{} WHERE p.author_id IN (SELECT author_id FROM follows WHERE user_id = ?1) {}",
                PostRow::SELECT,
                PostRow::ORDER
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], PostRow::from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows.into_iter().map(Post::from).collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(db: &Database) -> (i64, i64) {
        let user = db.create_author("user", "").unwrap();
        let author = db.create_author("author", "").unwrap();
        (user.id, author.id)
    }

    #[test]
    fn self_follow_rejected_by_constraint() {
        let db = Database::open_in_memory().unwrap();
        let (user, _) = pair(&db);
        assert!(matches!(db.insert_follow(user, user), Err(StoreError::SelfFollow)));
        assert!(!db.follow_exists(user, user).unwrap());
    }

    #[test]
    fn duplicate_follow_leaves_one_edge() {
        let db = Database::open_in_memory().unwrap();
        let (user, author) = pair(&db);
        let edge = db.insert_follow(user, author).unwrap();
        assert_eq!((edge.follower_id, edge.author_id), (user, author));

        assert!(matches!(
            db.insert_follow(user, author),
            Err(StoreError::DuplicateFollow)
        ));
        assert_eq!(db.count_follows(user).unwrap(), 1);
        assert_eq!(db.count_followers(author).unwrap(), 1);
    }

    #[test]
    fn raw_writes_cannot_bypass_constraints() {
        let db = Database::open_in_memory().unwrap();
        let (user, author) = pair(&db);
        db.insert_follow(user, author).unwrap();

        let raw = |u: i64, a: i64| {
            db.with_conn(|conn| {
                Ok(conn.execute(
                    "INSERT INTO follows (user_id, author_id, created_at) VALUES (?1, ?2, '')",
                    [u, a],
                )?)
            })
        };
        assert!(raw(user, user).is_err());
        assert!(raw(user, author).is_err());
    }

    #[test]
    fn follow_unknown_author_not_found() {
        let db = Database::open_in_memory().unwrap();
        let (user, _) = pair(&db);
        assert!(matches!(
            db.insert_follow(user, 999),
            Err(StoreError::NotFound("author"))
        ));
    }

    #[test]
    fn delete_missing_edge_is_noop() {
        let db = Database::open_in_memory().unwrap();
        let (user, author) = pair(&db);
        assert!(!db.delete_follow(user, author).unwrap());
        db.insert_follow(user, author).unwrap();
        assert!(db.delete_follow(user, author).unwrap());
        assert!(!db.follow_exists(user, author).unwrap());
    }

    #[test]
    fn followed_posts_only_from_followed_authors() {
        let db = Database::open_in_memory().unwrap();
        let (user, author) = pair(&db);
        let stranger = db.create_author("stranger", "").unwrap();
        db.create_post(author, "followed", None, None).unwrap();
        db.create_post(stranger.id, "not followed", None, None).unwrap();
        db.create_post(user, "own", None, None).unwrap();

        assert!(db.list_followed_posts(user).unwrap().is_empty());
        db.insert_follow(user, author).unwrap();
        let texts: Vec<_> = db
            .list_followed_posts(user)
            .unwrap()
            .into_iter()
            .map(|p| p.text)
            .collect();
        assert_eq!(texts, ["followed"]);
    }
}
