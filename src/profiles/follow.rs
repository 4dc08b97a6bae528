use axum::{
    debug_handler,
    extract::{OriginalUri, Path, State},
    response::Redirect,
};

use crate::{AppError, AppResult, Store, session::CurrentUser};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn profile_follow(
    State(store): State<Store>,
    CurrentUser(user): CurrentUser,
    OriginalUri(uri): OriginalUri,
    Path(username): Path<String>,
) -> AppResult<Redirect> {
    let Some(author) = store.user_by_username(&username).await? else {
        return Err(AppError::not_found(uri.path()));
    };

    // following yourself is a no-op
    if author.id != user.id && store.follow(user.id, author.id).await? {
        tracing::info!(user = %user.username, author = %author.username, "followed");
    }

    Ok(Redirect::to("/follow/"))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn profile_unfollow(
    State(store): State<Store>,
    CurrentUser(user): CurrentUser,
    OriginalUri(uri): OriginalUri,
    Path(username): Path<String>,
) -> AppResult<Redirect> {
    let Some(author) = store.user_by_username(&username).await? else {
        return Err(AppError::not_found(uri.path()));
    };

    if store.unfollow(user.id, author.id).await? {
        tracing::info!(user = %user.username, author = %author.username, "unfollowed");
    }

    Ok(Redirect::to("/"))
}
