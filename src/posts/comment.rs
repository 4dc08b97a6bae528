use axum::{
    Form, debug_handler,
    extract::{OriginalUri, Path, State},
    response::Redirect,
};

use crate::{
    AppError, AppResult, Store,
    db::NewComment,
    forms::CommentInput,
    session::CurrentUser,
};

use super::parse_post_id;

/// GET on the comment endpoint only leads back to the post.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn comment_page(
    State(store): State<Store>,
    CurrentUser(_): CurrentUser,
    OriginalUri(uri): OriginalUri,
    Path((username, post_id)): Path<(String, String)>,
) -> AppResult<Redirect> {
    let post_id = parse_post_id(&post_id, uri.path())?;
    if store.post(&username, post_id).await?.is_none() {
        return Err(AppError::not_found(uri.path()));
    }
    Ok(Redirect::to(&format!("/{username}/{post_id}/")))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn add_comment(
    State(store): State<Store>,
    CurrentUser(user): CurrentUser,
    OriginalUri(uri): OriginalUri,
    Path((username, post_id)): Path<(String, String)>,
    Form(input): Form<CommentInput>,
) -> AppResult<Redirect> {
    let post_id = parse_post_id(&post_id, uri.path())?;
    let Some(post) = store.post(&username, post_id).await? else {
        return Err(AppError::not_found(uri.path()));
    };

    match input.validate() {
        Ok(text) => {
            let comment_id = store
                .create_comment(&NewComment {
                    post_id: post.id,
                    author_id: user.id,
                    text,
                })
                .await?;
            tracing::info!(comment_id, post_id, author = %user.username, "comment added");
        }
        Err(errors) => errors.log("comment"),
    }

    Ok(Redirect::to(&format!("/{username}/{post_id}/")))
}
