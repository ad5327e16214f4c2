//! Author registration and groups.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;

use yatube_types::api::{CreateGroupRequest, RegisterAuthorRequest};
use yatube_types::models::Group;

use crate::error::ApiError;
use crate::state::{AppState, blocking};

/// POST /authors/
///
/// Records an identity vouched for by the auth proxy.
pub async fn register_author(
    State(state): State<AppState>,
    Json(req): Json<RegisterAuthorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let author = blocking(&state, move |s| s.db.create_author(&req.username, &req.display_name)).await?;
    info!("Registered author {}", author.username);
    Ok((StatusCode::CREATED, Json(author)))
}

/// GET /groups/
///
/// Ordered by title.
pub async fn list_groups(State(state): State<AppState>) -> Result<Json<Vec<Group>>, ApiError> {
    let groups = blocking(&state, |s| s.db.list_groups()).await?;
    Ok(Json(groups))
}

/// POST /groups/
pub async fn create_group(
    State(state): State<AppState>,
    Json(req): Json<CreateGroupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let group = blocking(&state, move |s| {
        s.db.create_group(&req.title, req.slug.as_deref(), &req.description)
    })
    .await?;
    info!("Created group '{}' ({})", group.title, group.slug);
    Ok((StatusCode::CREATED, Json(group)))
}
