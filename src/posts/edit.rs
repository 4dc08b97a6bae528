use axum::{
    debug_handler,
    extract::{Multipart, OriginalUri, Path, State},
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    AppError, AppResult, AppState,
    db::{DataStore, PostChanges, PostView},
    forms::{FormErrors, PostForm, PostInput},
    media,
    session::{CurrentUser, SessionUser},
};

use super::{
    form::{PostFormPage, render_post_form},
    parse_post_id,
};

/// Only the author edits a post; everyone else is sent back to it.
async fn own_post(
    store: &dyn DataStore,
    user: &SessionUser,
    username: &str,
    post_id: i64,
    path: &str,
) -> AppResult<Result<PostView, Redirect>> {
    if user.username != username {
        tracing::debug!(post_id, editor = %user.username, "edit refused, not the author");
        return Ok(Err(Redirect::to(&format!("/{username}/{post_id}/"))));
    }

    match store.post(username, post_id).await? {
        Some(post) => Ok(Ok(post)),
        None => Err(AppError::not_found(path)),
    }
}

#[debug_handler]
pub(crate) async fn edit_post_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    OriginalUri(uri): OriginalUri,
    Path((username, post_id)): Path<(String, String)>,
) -> AppResult<Response> {
    let post_id = parse_post_id(&post_id, uri.path())?;
    let post = match own_post(&*state.store, &user, &username, post_id, uri.path()).await? {
        Ok(post) => post,
        Err(redirect) => return Ok(redirect.into_response()),
    };

    let group = post.group_id.map(|id| id.to_string());
    let no_errors = FormErrors::default();
    let page = PostFormPage {
        action: format!("/{username}/{post_id}/edit/"),
        editing: true,
        text: &post.text,
        group: group.as_deref(),
        image: post.image.as_deref(),
        errors: &no_errors,
    };
    Ok(render_post_form(&*state.store, &*state.templates, &user, page)
        .await?
        .into_response())
}

#[debug_handler]
pub(crate) async fn edit_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    OriginalUri(uri): OriginalUri,
    Path((username, post_id)): Path<(String, String)>,
    multipart: Multipart,
) -> AppResult<Response> {
    let post_id = parse_post_id(&post_id, uri.path())?;
    let post = match own_post(&*state.store, &user, &username, post_id, uri.path()).await? {
        Ok(post) => post,
        Err(redirect) => return Ok(redirect.into_response()),
    };

    let input = PostInput::from_multipart(multipart).await?;
    let (text, group) = (input.text.clone(), input.group.clone());

    let form = match PostForm::validate(input, &*state.store).await? {
        Ok(form) => form,
        Err(errors) => {
            errors.log("post");
            let page = PostFormPage {
                action: format!("/{username}/{post_id}/edit/"),
                editing: true,
                text: &text,
                group: Some(&group),
                image: post.image.as_deref(),
                errors: &errors,
            };
            return Ok(render_post_form(&*state.store, &*state.templates, &user, page)
                .await?
                .into_response());
        }
    };

    let image = match &form.image {
        Some(upload) => Some(media::save(&state.config.media_root, upload).await?),
        None => None,
    };

    state
        .store
        .update_post(
            post.id,
            &PostChanges {
                text: form.text,
                group_id: form.group.map(|g| g.id),
                image,
            },
        )
        .await?;

    tracing::info!(post_id, author = %user.username, "post edited");
    Ok(Redirect::to(&format!("/{username}/{post_id}/")).into_response())
}
