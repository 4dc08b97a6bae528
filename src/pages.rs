//! Fragments shared by several pages: the page shell, post cards and
//! paginated post lists.

use axum::response::Html;
use maud::html;
use time::{OffsetDateTime, macros::format_description};

use crate::{
    AppResult,
    db::{DataStore, PostFilter, PostView},
    paginate::{PAGE_SIZE, Page},
    res::{Context, TemplateRenderer, escape},
    session::SessionUser,
};

/// Wraps `content` in the base layout with the navigation for `viewer`.
pub fn document(
    templates: &dyn TemplateRenderer,
    title: &str,
    viewer: Option<&SessionUser>,
    content: String,
) -> AppResult<Html<String>> {
    let links = html! {
        @match viewer {
            Some(user) => {
                a href="/new/" { "New post" }
                a href="/follow/" { "Following" }
                a href={ "/" (user.username) "/" } { "@" (user.username) }
                a href="/auth/logout/" { "Log out" }
            },
            None => {
                a href="/auth/login/" { "Log in" }
                a href="/auth/signup/" { "Sign up" }
            },
        }
    };
    let nav = templates.render("includes/nav", &Context::new().html("links", links.into_string()))?;

    let body = templates.render(
        "base",
        &Context::new().text("title", title).html("nav", nav).html("content", content),
    )?;
    Ok(Html(body))
}

pub fn format_date(date: OffsetDateTime) -> String {
    date.format(format_description!("[day].[month].[year] [hour]:[minute]"))
        .unwrap_or_else(|_| date.to_string())
}

/// Escaped text with line breaks kept.
pub fn linebreaks(text: &str) -> String {
    escape(text).replace("\r\n", "\n").replace('\n', "<br>")
}

pub fn post_item(templates: &dyn TemplateRenderer, post: &PostView) -> AppResult<String> {
    let image = html! {
        @if let Some(path) = &post.image {
            img class="card-img" src={ "/media/" (path) } alt="";
        }
    };
    let group = html! {
        @if let Some(group) = &post.group {
            a class="group-link" href={ "/group/" (group.slug) "/" } { "#" (group.title) }
        }
    };

    templates.render(
        "includes/post_item",
        &Context::new()
            .text("id", post.id.to_string())
            .html("image", image.into_string())
            .html("text", linebreaks(&post.text))
            .text("author", &post.author)
            .html("group", group.into_string())
            .text("pub_date", format_date(post.pub_date))
            .text("comment_count", post.comment_count.to_string()),
    )
}

fn paginator(templates: &dyn TemplateRenderer, page: &Page) -> AppResult<String> {
    if page.num_pages <= 1 {
        return Ok(String::new());
    }
    let link = |n: i64, label: &str| html! { a href={ "?page=" (n) } { (label) } }.into_string();

    templates.render(
        "includes/paginator",
        &Context::new()
            .html("previous", page.previous().map(|n| link(n, "« previous")).unwrap_or_default())
            .text("number", page.number.to_string())
            .text("num_pages", page.num_pages.to_string())
            .html("next", page.next().map(|n| link(n, "next »")).unwrap_or_default()),
    )
}

/// One page of posts matching `filter` plus the paginator links.
pub async fn post_list(
    store: &dyn DataStore,
    templates: &dyn TemplateRenderer,
    filter: PostFilter,
    requested_page: Option<&str>,
) -> AppResult<String> {
    let count = store.count_posts(filter).await?;
    let page = Page::get(count, PAGE_SIZE, requested_page);
    let posts = store.posts(filter, page.per_page, page.offset()).await?;

    let mut html = String::new();
    for post in &posts {
        html += &post_item(templates, post)?;
    }
    if posts.is_empty() {
        html += r#"<p class="empty">No posts yet.</p>"#;
    }
    html += &paginator(templates, &page)?;
    Ok(html)
}
