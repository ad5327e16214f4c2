use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use yatube_types::models::Author;

use crate::error::ApiError;
use crate::state::{AppState, blocking};

/// Username of the acting author, set by the authenticating proxy in front
/// of this service.
pub const USER_HEADER: &str = "x-yatube-user";

/// Resolve the identity header into an `Author` request extension. Requests
/// without the header pass through anonymously; an unknown name is rejected.
pub async fn resolve_user(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let username = req
        .headers()
        .get(USER_HEADER)
        .map(|v| v.to_str().map(str::to_owned))
        .transpose()
        .map_err(|_| ApiError::Unauthorized)?;

    if let Some(username) = username {
        let lookup = username.clone();
        let author = blocking(&state, move |s| s.db.get_author_by_username(&lookup))
            .await?
            .ok_or_else(|| {
                warn!("Unknown identity '{}'", username);
                ApiError::Unauthorized
            })?;
        req.extensions_mut().insert(author);
    }

    Ok(next.run(req).await)
}

/// Reject anonymous requests.
pub async fn require_user(req: Request, next: Next) -> Result<Response, ApiError> {
    if req.extensions().get::<Author>().is_none() {
        return Err(ApiError::Unauthorized);
    }
    Ok(next.run(req).await)
}
