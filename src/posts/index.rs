use axum::{
    debug_handler,
    extract::{OriginalUri, Path, Query, State},
    response::Html,
};

use crate::{
    AppError, AppResult, AppState, Store, Templates,
    cache,
    db::PostFilter,
    pages,
    res::Context,
    session::{CurrentUser, Viewer},
};

use super::PageQuery;

#[debug_handler]
pub(crate) async fn index(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    OriginalUri(uri): OriginalUri,
    Query(PageQuery { page }): Query<PageQuery>,
) -> AppResult<Html<String>> {
    let key = format!("index:{}", path_and_query(&uri));
    let ttl = state.config.cache_timeouts.get("index");

    let posts = cache::get_or_render(&*state.cache, &key, ttl, || {
        pages::post_list(&*state.store, &*state.templates, PostFilter::All, page.as_deref())
    })
    .await?;

    let content = state.templates.render("index", &Context::new().html("posts", posts))?;
    pages::document(&*state.templates, "Latest posts", viewer.as_ref(), content)
}

#[debug_handler]
pub(crate) async fn follow_index(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    OriginalUri(uri): OriginalUri,
    Query(PageQuery { page }): Query<PageQuery>,
) -> AppResult<Html<String>> {
    // feeds differ per reader
    let key = format!("follow:{}:{}", user.id, path_and_query(&uri));
    let ttl = state.config.cache_timeouts.get("follow");

    let posts = cache::get_or_render(&*state.cache, &key, ttl, || {
        pages::post_list(&*state.store, &*state.templates, PostFilter::FollowedBy(user.id), page.as_deref())
    })
    .await?;

    let content = state.templates.render("follow", &Context::new().html("posts", posts))?;
    pages::document(&*state.templates, "Following", Some(&user), content)
}

#[debug_handler(state = AppState)]
pub(crate) async fn group_posts(
    State(store): State<Store>,
    State(templates): State<Templates>,
    Viewer(viewer): Viewer,
    OriginalUri(uri): OriginalUri,
    Path(slug): Path<String>,
    Query(PageQuery { page }): Query<PageQuery>,
) -> AppResult<Html<String>> {
    let Some(group) = store.group_by_slug(&slug).await? else {
        return Err(AppError::not_found(uri.path()));
    };

    let filter = PostFilter::Group(group.id);
    if store.count_posts(filter).await? == 0 {
        return Err(AppError::not_found(uri.path()));
    }

    let posts = pages::post_list(&*store, &*templates, filter, page.as_deref()).await?;
    let content = templates.render(
        "group",
        &Context::new()
            .text("title", &group.title)
            .text("description", &group.description)
            .html("posts", posts),
    )?;
    pages::document(&*templates, &group.title, viewer.as_ref(), content)
}

fn path_and_query(uri: &axum::http::Uri) -> &str {
    uri.path_and_query().map(|pq| pq.as_str()).unwrap_or_else(|| uri.path())
}
