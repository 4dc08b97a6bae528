use axum::{
    debug_handler,
    extract::{Multipart, State},
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::{
    AppResult, AppState,
    db::NewPost,
    forms::{FormErrors, PostForm, PostInput},
    media,
    session::CurrentUser,
};

use super::form::{PostFormPage, render_post_form};

#[debug_handler]
pub(crate) async fn new_post_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Html<String>> {
    render_post_form(
        &*state.store,
        &*state.templates,
        &user,
        PostFormPage {
            action: "/new/".to_owned(),
            editing: false,
            text: "",
            group: None,
            image: None,
            errors: &FormErrors::default(),
        },
    )
    .await
}

#[debug_handler]
pub(crate) async fn new_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    multipart: Multipart,
) -> AppResult<Response> {
    let input = PostInput::from_multipart(multipart).await?;
    let (text, group) = (input.text.clone(), input.group.clone());

    let form = match PostForm::validate(input, &*state.store).await? {
        Ok(form) => form,
        Err(errors) => {
            errors.log("post");
            let page = PostFormPage {
                action: "/new/".to_owned(),
                editing: false,
                text: &text,
                group: Some(&group),
                image: None,
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

    let post_id = state
        .store
        .create_post(&NewPost {
            author_id: user.id,
            text: form.text,
            group_id: form.group.map(|g| g.id),
            image,
        })
        .await?;

    tracing::info!(post_id, author = %user.username, "post published");
    Ok(Redirect::to("/").into_response())
}
