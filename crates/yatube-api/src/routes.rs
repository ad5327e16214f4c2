use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::middleware::{require_user, resolve_user};
use crate::state::AppState;
use crate::{directory, feed, follow, posts};

/// All routes. Mutations and the personal feed need an identity; reads are
/// open, with the identity used when present.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(feed::index))
        .route("/group/{slug}/", get(feed::group_posts))
        .route("/profile/{username}/", get(feed::profile))
        .route("/posts/{post_id}/", get(posts::post_detail))
        .route(
            "/groups/",
            get(directory::list_groups).merge(
                post(directory::create_group).route_layer(middleware::from_fn(require_user)),
            ),
        )
        .route("/authors/", post(directory::register_author))
        .route("/health", get(health));

    let protected_routes = Router::new()
        .route("/follow/", get(feed::follow_index))
        .route("/profile/{username}/follow/", post(follow::profile_follow))
        .route("/profile/{username}/unfollow/", post(follow::profile_unfollow))
        .route("/create/", post(posts::post_create))
        .route("/posts/{post_id}/edit/", post(posts::post_edit))
        .route("/posts/{post_id}/comment/", post(posts::add_comment))
        .route_layer(middleware::from_fn(require_user));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn_with_state(state.clone(), resolve_user))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
