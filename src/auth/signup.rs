use axum::{
    Form, debug_handler,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::{
    AppResult, Store, Templates,
    forms::{FormErrors, SignupInput},
    pages,
    res::Context,
};

use super::hash_password;

const USERNAME_TAKEN: &str = "A user with that username already exists.";

fn signup_form(templates: &Templates, username: &str, errors: &FormErrors) -> AppResult<Html<String>> {
    let content = templates.render(
        "auth/signup",
        &Context::new()
            .text("username", username)
            .html("username_errors", errors.to_html("username"))
            .html("password1_errors", errors.to_html("password1"))
            .html("password2_errors", errors.to_html("password2")),
    )?;
    pages::document(&**templates, "Sign up", None, content)
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn signup_page(State(templates): State<Templates>) -> AppResult<Html<String>> {
    signup_form(&templates, "", &FormErrors::default())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn signup(
    State(store): State<Store>,
    State(templates): State<Templates>,
    Form(input): Form<SignupInput>,
) -> AppResult<Response> {
    let mut errors = input.validate();
    let username = input.username.trim();

    if !errors.contains("username") && store.user_by_username(username).await?.is_some() {
        errors.add_error("username", USERNAME_TAKEN);
    }

    if !errors.is_empty() {
        errors.log("signup");
        return Ok(signup_form(&templates, username, &errors)?.into_response());
    }

    let password_hash = hash_password(&input.password1)?;
    let user = match store.create_user(username, &password_hash).await {
        Ok(user) => user,
        // lost a race with another signup for the same name
        Err(err) if err.is_unique_violation() => {
            errors.add_error("username", USERNAME_TAKEN);
            errors.log("signup");
            return Ok(signup_form(&templates, username, &errors)?.into_response());
        }
        Err(err) => return Err(err),
    };

    tracing::info!(user_id = user.id, username = %user.username, "account created");
    Ok(Redirect::to("/auth/login/").into_response())
}
