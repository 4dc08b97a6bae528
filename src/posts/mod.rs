mod comment;
mod edit;
mod form;
mod index;
mod new;
mod post;

use axum::{Router, routing::get};
use serde::Deserialize;

use crate::{AppError, AppResult, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index::index))
        .route("/follow/", get(index::follow_index))
        .route("/group/{slug}/", get(index::group_posts))
        .route("/new/", get(new::new_post_page).post(new::new_post))
        .route("/{username}/{post_id}/", get(post::post_view))
        .route("/{username}/{post_id}/edit/", get(edit::edit_post_page).post(edit::edit_post))
        .route("/{username}/{post_id}/comment/", get(comment::comment_page).post(comment::add_comment))
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageQuery {
    pub(crate) page: Option<String>,
}

/// Post ids in paths that don't parse are missing posts, not bad requests.
pub(crate) fn parse_post_id(raw: &str, path: &str) -> AppResult<i64> {
    raw.parse().map_err(|_| AppError::not_found(path))
}
