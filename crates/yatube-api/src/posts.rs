use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, warn};

use yatube_db::StoreError;
use yatube_types::api::{CommentForm, PostDetailResponse, PostForm};
use yatube_types::models::{Author, Post};

use crate::error::ApiError;
use crate::state::{AppState, blocking};

/// POST /create/
pub async fn post_create(
    State(state): State<AppState>,
    Extension(user): Extension<Author>,
    Json(form): Json<PostForm>,
) -> Result<impl IntoResponse, ApiError> {
    let post = blocking(&state, move |s| {
        s.db.create_post(user.id, &form.text, form.group_id, form.image.as_deref())
    })
    .await?;

    info!("Post {} '{}' created by {}", post.id, post.preview(), post.author.username);
    Ok((StatusCode::CREATED, Json(post)))
}

/// GET /posts/{id}/
///
/// The post and its comments, newest first.
pub async fn post_detail(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<PostDetailResponse>, ApiError> {
    let post_id = parse_post_id(&raw_id)?;
    let detail = blocking(&state, move |s| {
        let post = s.db.get_post(post_id)?.ok_or(StoreError::NotFound("post"))?;
        let comments = s.db.list_comments(post_id)?;
        Ok(PostDetailResponse { post, comments })
    })
    .await?;

    Ok(Json(detail))
}

/// POST /posts/{id}/edit/
///
/// Only the author may edit.
pub async fn post_edit(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Extension(user): Extension<Author>,
    Json(form): Json<PostForm>,
) -> Result<Json<Post>, ApiError> {
    let post_id = parse_post_id(&raw_id)?;
    let current = blocking(&state, move |s| s.db.get_post(post_id))
        .await?
        .ok_or(StoreError::NotFound("post"))?;

    if current.author.id != user.id {
        warn!("{} tried to edit post {} by {}", user.username, post_id, current.author.username);
        return Err(ApiError::Forbidden("only the author can edit this post"));
    }

    let post = blocking(&state, move |s| {
        s.db.update_post(post_id, &form.text, form.group_id, form.image.as_deref())
    })
    .await?;

    Ok(Json(post))
}

/// POST /posts/{id}/comment/
pub async fn add_comment(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Extension(user): Extension<Author>,
    Json(form): Json<CommentForm>,
) -> Result<impl IntoResponse, ApiError> {
    let post_id = parse_post_id(&raw_id)?;
    let comment = blocking(&state, move |s| s.db.create_comment(post_id, user.id, &form.text)).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// A post id that isn't a number names no post.
fn parse_post_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::Store(StoreError::NotFound("post")))
}
