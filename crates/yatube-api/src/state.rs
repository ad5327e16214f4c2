use std::sync::Arc;

use tracing::error;

use yatube_db::{Database, StoreError};
use yatube_feed::{FeedAssembler, FeedCache, FeedSettings, FollowGraph};

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub feed: FeedAssembler,
    pub follows: FollowGraph,
}

impl AppStateInner {
    pub fn new(db: Arc<Database>, cache: Arc<dyn FeedCache>, settings: FeedSettings) -> AppState {
        Arc::new(Self {
            feed: FeedAssembler::new(db.clone(), cache, settings),
            follows: FollowGraph::new(db.clone()),
            db,
        })
    }
}

/// Run a store call off the async runtime.
pub(crate) async fn blocking<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&AppStateInner) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })?
        .map_err(ApiError::from)
}
