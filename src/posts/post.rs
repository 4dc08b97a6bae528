use axum::{
    debug_handler,
    extract::{OriginalUri, Path, State},
    response::Html,
};
use maud::html;

use crate::{
    AppError, AppResult, Store, Templates,
    db::PostFilter,
    pages,
    res::Context,
    session::Viewer,
};

use super::parse_post_id;

#[debug_handler(state = crate::AppState)]
pub(crate) async fn post_view(
    State(store): State<Store>,
    State(templates): State<Templates>,
    Viewer(viewer): Viewer,
    OriginalUri(uri): OriginalUri,
    Path((username, post_id)): Path<(String, String)>,
) -> AppResult<Html<String>> {
    let post_id = parse_post_id(&post_id, uri.path())?;
    let Some(post) = store.post(&username, post_id).await? else {
        return Err(AppError::not_found(uri.path()));
    };

    let post_count = store.count_posts(PostFilter::Author(post.author_id)).await?;

    let mut comments = String::new();
    for comment in store.comments(post.id).await? {
        comments += &templates.render(
            "includes/comment",
            &Context::new()
                .text("author", &comment.author)
                .text("created", pages::format_date(comment.created))
                .html("text", pages::linebreaks(&comment.text)),
        )?;
    }

    let edit_link = html! {
        @if viewer.as_ref().is_some_and(|user| user.id == post.author_id) {
            a class="edit-link" href={ "/" (post.author) "/" (post.id) "/edit/" } { "Edit" }
        }
    };

    let content = templates.render(
        "post",
        &Context::new()
            .text("author", &post.author)
            .text("post_count", post_count.to_string())
            .text("post_id", post.id.to_string())
            .html("post", pages::post_item(&*templates, &post)?)
            .html("edit_link", edit_link.into_string())
            .html("comments", comments),
    )?;
    pages::document(&*templates, &format!("Post by {}", post.author), viewer.as_ref(), content)
}
