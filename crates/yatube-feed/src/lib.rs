//! Follow graph and feed assembly on top of the yatube entity store.

pub mod cache;
pub mod feed;
pub mod follow;
pub mod paginator;

pub use cache::{FeedCache, MemoryCache, NoCache};
pub use feed::{AuthorFeed, FeedAssembler, FeedSettings, GroupFeed};
pub use follow::FollowGraph;
pub use paginator::{Paginator, parse_page};
