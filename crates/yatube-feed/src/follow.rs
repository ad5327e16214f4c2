use std::sync::Arc;

use tracing::{info, warn};

use yatube_db::{Database, Result};
use yatube_types::models::{Follow, Post};

/// Facade over the follow table. The storage constraints decide whether an
/// edge may exist; this type names the outcome and logs rejected attempts.
#[derive(Clone)]
pub struct FollowGraph {
    db: Arc<Database>,
}

impl FollowGraph {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Fails with `SelfFollow` or `DuplicateFollow`; callers usually treat
    /// both as "already in the desired state".
    pub fn follow(&self, follower: i64, target: i64) -> Result<Follow> {
        match self.db.insert_follow(follower, target) {
            Ok(edge) => {
                info!("Author {} now follows {}", follower, target);
                Ok(edge)
            }
            Err(e) => {
                warn!("Follow {} -> {} rejected: {}", follower, target, e);
                Err(e)
            }
        }
    }

    /// Removing an edge that isn't there is a no-op. Returns whether one was removed.
    pub fn unfollow(&self, follower: i64, target: i64) -> Result<bool> {
        let removed = self.db.delete_follow(follower, target)?;
        if removed {
            info!("Author {} unfollowed {}", follower, target);
        }
        Ok(removed)
    }

    pub fn is_following(&self, follower: i64, target: i64) -> Result<bool> {
        self.db.follow_exists(follower, target)
    }

    /// Posts by every author `follower` follows.
    pub fn followed_posts(&self, follower: i64) -> Result<Vec<Post>> {
        self.db.list_followed_posts(follower)
    }

    pub fn follower_count(&self, author: i64) -> Result<u64> {
        self.db.count_followers(author)
    }

    pub fn following_count(&self, follower: i64) -> Result<u64> {
        self.db.count_follows(follower)
    }
}
