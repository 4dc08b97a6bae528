use axum::{debug_handler, extract::Query, response::Redirect};
use tower_sessions::Session;

use crate::{
    AppResult,
    session::{Viewer, safe_return_url},
};

use super::login::LoginQuery;

/// Drops the whole session, not just the user, and sends the browser on.
#[debug_handler]
pub(crate) async fn logout(
    Viewer(viewer): Viewer,
    Query(LoginQuery { return_url }): Query<LoginQuery>,
    session: Session,
) -> AppResult<Redirect> {
    session.flush().await?;
    if let Some(user) = viewer {
        tracing::info!(username = %user.username, "logged out");
    }
    Ok(Redirect::to(safe_return_url(return_url.as_deref())))
}
