use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::res::{Context, ResTemplates, TemplateRenderer};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A looked-up user, group or post does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown template {0}")]
    Template(String),
}

impl AppError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// A write hit a `UNIQUE` constraint.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::Database(sqlx::Error::Database(err)) if err.is_unique_violation())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound(what) => {
                tracing::debug!(what = %what, "not found");
                not_found_page(&what)
            }
            err => {
                tracing::error!(error = %err, "internal server error");
                let body = ResTemplates
                    .render("misc/500", &Context::new())
                    .unwrap_or_else(|_| "Internal Server Error".to_owned());
                (StatusCode::INTERNAL_SERVER_ERROR, Html(body)).into_response()
            }
        }
    }
}

/// The 404 page, naming whatever could not be found.
pub fn not_found_page(path: &str) -> Response {
    let body = ResTemplates
        .render("misc/404", &Context::new().text("path", path))
        .unwrap_or_else(|_| "Not Found".to_owned());
    (StatusCode::NOT_FOUND, Html(body)).into_response()
}
