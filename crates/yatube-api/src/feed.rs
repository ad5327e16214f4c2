use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use yatube_feed::parse_page;
use yatube_types::api::{GroupPostsResponse, ProfileResponse};
use yatube_types::models::{Author, Page, Post};

use crate::error::ApiError;
use crate::state::{AppState, blocking};

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// Kept as text: garbage means page 1, out of range means the last page.
    pub page: Option<String>,
}

impl PageQuery {
    fn number(&self) -> u32 {
        parse_page(self.page.as_deref())
    }
}

/// GET /
///
/// Every post, newest first, through the home feed cache.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<Post>>, ApiError> {
    let page = query.number();
    let page_obj = blocking(&state, move |s| s.feed.list_all(page)).await?;
    Ok(Json(page_obj))
}

/// GET /group/{slug}/
pub async fn group_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<GroupPostsResponse>, ApiError> {
    let page = query.number();
    let feed = blocking(&state, move |s| s.feed.list_by_group(&slug, page)).await?;
    Ok(Json(GroupPostsResponse {
        group: feed.group,
        page_obj: feed.page,
    }))
}

/// GET /profile/{username}/
///
/// The author's posts plus follow metadata.
pub async fn profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
    viewer: Option<Extension<Author>>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let page = query.number();
    let viewer = viewer.map(|Extension(author)| author.id);

    let response = blocking(&state, move |s| {
        let feed = s.feed.list_by_author(&username, page)?;
        let author_id = feed.author.id;
        let following = match viewer {
            Some(viewer) => s.follows.is_following(viewer, author_id)?,
            None => false,
        };
        Ok(ProfileResponse {
            following,
            count: feed.count,
            followers: s.follows.follower_count(author_id)?,
            follows: s.follows.following_count(author_id)?,
            author: feed.author,
            page_obj: feed.page,
        })
    })
    .await?;

    Ok(Json(response))
}

/// GET /follow/
///
/// Posts from the authors the caller follows.
pub async fn follow_index(
    State(state): State<AppState>,
    Extension(user): Extension<Author>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<Post>>, ApiError> {
    let page = query.number();
    let page_obj = blocking(&state, move |s| s.feed.list_following(user.id, page)).await?;
    Ok(Json(page_obj))
}
