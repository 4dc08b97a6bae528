mod follow;
mod page;

use axum::{Router, routing::{get, post}};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{username}/", get(page::profile))
        .route("/{username}/follow/", post(follow::profile_follow))
        .route("/{username}/unfollow/", post(follow::profile_unfollow))
}
