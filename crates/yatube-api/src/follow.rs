use axum::{
    Extension, Json,
    extract::{Path, State},
};
use yatube_db::StoreError;
use yatube_types::api::FollowResponse;
use yatube_types::models::Author;

use crate::error::ApiError;
use crate::state::{AppState, blocking};

/// POST /profile/{username}/follow/
///
/// Following yourself or someone you already follow is not an error for the
/// caller: the attempt is logged and the current state is returned.
pub async fn profile_follow(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(user): Extension<Author>,
) -> Result<Json<FollowResponse>, ApiError> {
    let response = blocking(&state, move |s| {
        let target = s
            .db
            .get_author_by_username(&username)?
            .ok_or(StoreError::NotFound("author"))?;

        let following = match s.follows.follow(user.id, target.id) {
            Ok(_) => true,
            // already logged by the follow graph
            Err(StoreError::SelfFollow | StoreError::DuplicateFollow) => {
                s.follows.is_following(user.id, target.id)?
            }
            Err(e) => return Err(e),
        };

        Ok(FollowResponse {
            username: target.username,
            following,
        })
    })
    .await?;

    Ok(Json(response))
}

/// POST /profile/{username}/unfollow/
///
/// A no-op when not following.
pub async fn profile_unfollow(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(user): Extension<Author>,
) -> Result<Json<FollowResponse>, ApiError> {
    let response = blocking(&state, move |s| {
        let target = s
            .db
            .get_author_by_username(&username)?
            .ok_or(StoreError::NotFound("author"))?;
        s.follows.unfollow(user.id, target.id)?;
        Ok(FollowResponse {
            username: target.username,
            following: false,
        })
    })
    .await?;

    Ok(Json(response))
}
