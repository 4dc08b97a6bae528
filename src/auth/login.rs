use axum::{
    Form, debug_handler,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{
    AppResult, Store, Templates,
    forms::{LoginInput, error_list},
    pages,
    res::Context,
    session::{CURRENT_USER, SessionUser, safe_return_url},
};

use super::verify_password;

#[derive(Deserialize)]
pub(crate) struct LoginQuery {
    pub(crate) return_url: Option<String>,
}

fn login_form(templates: &Templates, username: &str, return_url: Option<&str>, error: Option<&str>) -> AppResult<Html<String>> {
    let errors = error
        .map(|e| error_list("__all__", &[e.to_owned()]))
        .unwrap_or_default();
    let content = templates.render(
        "auth/login",
        &Context::new()
            .html("errors", errors)
            .text("username", username)
            .text("return_url", return_url.unwrap_or_default()),
    )?;
    pages::document(&**templates, "Log in", None, content)
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn login_page(
    State(templates): State<Templates>,
    Query(LoginQuery { return_url }): Query<LoginQuery>,
) -> AppResult<Html<String>> {
    login_form(&templates, "", return_url.as_deref(), None)
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn login(
    State(store): State<Store>,
    State(templates): State<Templates>,
    session: Session,
    Form(LoginInput { username, password, return_url }): Form<LoginInput>,
) -> AppResult<Response> {
    let user = store.user_by_username(username.trim()).await?;

    let Some(user) = user.filter(|user| verify_password(&password, &user.password_hash)) else {
        tracing::debug!(username = %username, "login rejected");
        return Ok(login_form(
            &templates,
            &username,
            return_url.as_deref(),
            Some("Please enter a correct username and password."),
        )?
        .into_response());
    };

    session.cycle_id().await?;
    session
        .insert(
            CURRENT_USER,
            SessionUser {
                id: user.id,
                username: user.username.clone(),
            },
        )
        .await?;

    tracing::info!(username = %user.username, "logged in");
    Ok(Redirect::to(safe_return_url(return_url.as_deref())).into_response())
}
