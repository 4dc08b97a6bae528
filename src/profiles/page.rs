use axum::{
    debug_handler,
    extract::{OriginalUri, Path, Query, State},
    response::Html,
};
use maud::html;

use crate::{
    AppError, AppResult, Store, Templates,
    db::PostFilter,
    pages,
    posts::PageQuery,
    res::Context,
    session::Viewer,
};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn profile(
    State(store): State<Store>,
    State(templates): State<Templates>,
    Viewer(viewer): Viewer,
    OriginalUri(uri): OriginalUri,
    Path(username): Path<String>,
    Query(PageQuery { page }): Query<PageQuery>,
) -> AppResult<Html<String>> {
    let Some(author) = store.user_by_username(&username).await? else {
        return Err(AppError::not_found(uri.path()));
    };

    let filter = PostFilter::Author(author.id);
    let post_count = store.count_posts(filter).await?;
    let counts = store.follow_counts(author.id).await?;

    let follow_button = match &viewer {
        Some(user) if user.id != author.id => {
            let (action, label) = if store.is_following(user.id, author.id).await? {
                ("unfollow", "Unfollow")
            } else {
                ("follow", "Follow")
            };
            html! {
                form method="post" action={ "/" (author.username) "/" (action) "/" } {
                    button type="submit" { (label) }
                }
            }
            .into_string()
        }
        _ => String::new(),
    };

    let posts = pages::post_list(&*store, &*templates, filter, page.as_deref()).await?;

    let content = templates.render(
        "profile",
        &Context::new()
            .text("username", &author.username)
            .text("post_count", post_count.to_string())
            .text("followers", counts.followers.to_string())
            .text("following", counts.following.to_string())
            .html("follow_button", follow_button)
            .html("posts", posts),
    )?;
    pages::document(&*templates, &author.username, viewer.as_ref(), content)
}
