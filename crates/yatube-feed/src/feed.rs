use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use yatube_db::{Database, PostScope, Result, StoreError, count_scope, list_scope};
use yatube_types::models::{Author, Group, Page, Post};

use crate::cache::FeedCache;
use crate::follow::FollowGraph;
use crate::paginator::Paginator;

/// Key under which the unpaginated home feed is cached.
pub const INDEX_CACHE_KEY: &str = "index_posts";

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, Copy)]
pub struct FeedSettings {
    pub page_size: u32,
    /// Lifetime of the cached home feed.
    pub cache_ttl: Duration,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GroupFeed {
    pub group: Group,
    pub page: Page<Post>,
}

#[derive(Debug, Clone)]
pub struct AuthorFeed {
    pub author: Author,
    /// All posts by the author, not just this page.
    pub count: u64,
    pub page: Page<Post>,
}

/// Builds the ordered, paginated post lists. Every scope is newest first.
#[derive(Clone)]
pub struct FeedAssembler {
    db: Arc<Database>,
    follows: FollowGraph,
    cache: Arc<dyn FeedCache>,
    settings: FeedSettings,
}

impl FeedAssembler {
    pub fn new(db: Arc<Database>, cache: Arc<dyn FeedCache>, settings: FeedSettings) -> Self {
        Self {
            follows: FollowGraph::new(db.clone()),
            db,
            cache,
            settings,
        }
    }

    /// The home feed. Served from the cache while the entry is alive, even
    /// if posts were created or deleted since it was filled.
    pub fn list_all(&self, page: u32) -> Result<Page<Post>> {
        let posts = match self.cache.get(INDEX_CACHE_KEY) {
            Some(posts) => {
                debug!("home feed served from cache");
                posts
            }
            None => {
                let posts = Arc::new(self.db.list_posts(PostScope::All, 0, None)?);
                debug!(count = posts.len(), "home feed cache filled");
                self.cache
                    .set(INDEX_CACHE_KEY, posts.clone(), self.settings.cache_ttl);
                posts
            }
        };
        Ok(Paginator::paginate(posts.as_slice(), self.settings.page_size, page))
    }

    pub fn list_by_group(&self, slug: &str, page: u32) -> Result<GroupFeed> {
        let group = self
            .db
            .get_group_by_slug(slug)?
            .ok_or(StoreError::NotFound("group"))?;
        let page = self.scoped_page(PostScope::Group(group.id), page)?;
        Ok(GroupFeed { group, page })
    }

    pub fn list_by_author(&self, username: &str, page: u32) -> Result<AuthorFeed> {
        let author = self
            .db
            .get_author_by_username(username)?
            .ok_or(StoreError::NotFound("author"))?;
        let page = self.scoped_page(PostScope::Author(author.id), page)?;
        Ok(AuthorFeed {
            count: page.total,
            author,
            page,
        })
    }

    /// Posts from everyone `follower` follows.
    pub fn list_following(&self, follower: i64, page: u32) -> Result<Page<Post>> {
        let posts = self.follows.followed_posts(follower)?;
        Ok(Paginator::paginate(&posts, self.settings.page_size, page))
    }

    pub fn flush_cache(&self) {
        self.cache.clear();
    }

    /// Count and window are read under one lock so the page metadata
    /// matches the items.
    fn scoped_page(&self, scope: PostScope, requested: u32) -> Result<Page<Post>> {
        let page_size = self.settings.page_size;
        self.db.with_conn(|conn| {
            let paginator = Paginator::new(count_scope(conn, scope)?, page_size);
            let number = paginator.clamp(requested);
            let (offset, limit) = paginator.window(number);
            let items = list_scope(conn, scope, offset, Some(limit))?;
            Ok(paginator.page(number, items))
        })
    }
}
