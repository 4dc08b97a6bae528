use axum::{
    extract::FromRequestParts,
    http::{Uri, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::AppError;

pub const CURRENT_USER: &str = "current_user";

/// The logged-in account as stored in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i64,
    pub username: String,
}

/// Requires a logged-in user; anyone else is sent to the login page with a
/// `return_url` back to where they were going.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub SessionUser);

/// Whoever is looking at a public page, if they are logged in.
#[derive(Debug, Clone)]
pub struct Viewer(pub Option<SessionUser>);

async fn session_user<S: Send + Sync>(parts: &mut Parts, state: &S) -> Result<Option<SessionUser>, Response> {
    let session = Session::from_request_parts(parts, state)
        .await
        .map_err(IntoResponse::into_response)?;
    session
        .get::<SessionUser>(CURRENT_USER)
        .await
        .map_err(|err| AppError::from(err).into_response())
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match session_user(parts, state).await? {
            Some(user) => Ok(CurrentUser(user)),
            None => Err(login_redirect(&parts.uri).into_response()),
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Viewer {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Viewer(session_user(parts, state).await?))
    }
}

pub fn login_redirect(uri: &Uri) -> Redirect {
    let return_url = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    Redirect::to(&format!("/auth/login/?return_url={}", urlencoding::encode(return_url)))
}

/// Only same-site paths are followed after login or logout.
///
/// Browsers drop tabs and newlines from a `Location`, so `/\t/host` would
/// become `//host`; any whitespace or control character is refused outright.
pub fn safe_return_url(return_url: Option<&str>) -> &str {
    let Some(url) = return_url else {
        return "/";
    };

    let plain_path = url.starts_with('/')
        && !url.starts_with("//")
        && !url.contains('\\')
        && !url.chars().any(|c| c.is_control() || c.is_whitespace());
    let local = plain_path
        && url
            .parse::<Uri>()
            .is_ok_and(|uri| uri.scheme().is_none() && uri.authority().is_none());

    if local { url } else { "/" }
}
