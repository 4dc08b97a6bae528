use axum::response::Html;
use maud::html;

use crate::{
    AppResult,
    db::DataStore,
    forms::FormErrors,
    pages,
    res::{Context, TemplateRenderer},
    session::SessionUser,
};

/// What the post form shows: blank, the post being edited, or a rejected
/// submission with its errors.
pub(crate) struct PostFormPage<'a> {
    pub(crate) action: String,
    pub(crate) editing: bool,
    pub(crate) text: &'a str,
    pub(crate) group: Option<&'a str>,
    pub(crate) image: Option<&'a str>,
    pub(crate) errors: &'a FormErrors,
}

pub(crate) async fn render_post_form(
    store: &dyn DataStore,
    templates: &dyn TemplateRenderer,
    user: &SessionUser,
    page: PostFormPage<'_>,
) -> AppResult<Html<String>> {
    let chosen = page.group.map(str::trim).unwrap_or_default();
    let groups = store.groups().await?;
    let group_options = html! {
        @for group in &groups {
            @let id = group.id.to_string();
            option value=(id) selected[id == chosen] { (group.title) }
        }
    };

    let current_image = html! {
        @if let Some(path) = page.image {
            img class="card-img" src={ "/media/" (path) } alt="";
        }
    };

    let (heading, submit) = if page.editing {
        ("Edit post", "Save")
    } else {
        ("New post", "Publish")
    };

    let content = templates.render(
        "post_edit",
        &Context::new()
            .text("heading", heading)
            .text("submit", submit)
            .text("action", &page.action)
            .text("text", page.text)
            .html("group_options", group_options.into_string())
            .html("current_image", current_image.into_string())
            .html("text_errors", page.errors.to_html("text"))
            .html("group_errors", page.errors.to_html("group"))
            .html("image_errors", page.errors.to_html("image")),
    )?;
    pages::document(templates, heading, Some(user), content)
}
