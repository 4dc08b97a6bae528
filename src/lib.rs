//! Yatube - a small blogging platform.
//!
//! Users publish posts (text, optional image, optional group), browse them by
//! group or author, comment, and follow other authors' feeds. Pages are
//! rendered on the server from the templates in `res/pages`.
//!
//! # Architecture
//!
//! - **AppState**: the [`DataStore`], [`PageCache`] and [`TemplateRenderer`]
//!   capabilities plus [`Config`], shared by every handler
//! - **Routes**: handlers grouped by domain (`auth`, `posts`, `profiles`)

pub mod appresult;
pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod forms;
pub mod media;
pub mod pages;
pub mod paginate;
pub mod posts;
pub mod profiles;
pub mod res;
pub mod session;

use std::sync::Arc;

use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef, OriginalUri},
    response::Response,
};
use tower_http::services::ServeDir;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::SameSite};

pub use appresult::{AppError, AppResult};
pub use cache::{MokaPageCache, PageCache};
pub use config::{CacheTimeouts, Config};
pub use db::{DataStore, SqliteStore};
pub use res::{ResTemplates, TemplateRenderer};

pub type Store = Arc<dyn DataStore>;
pub type Pages = Arc<dyn PageCache>;
pub type Templates = Arc<dyn TemplateRenderer>;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub store: Store,
    pub cache: Pages,
    pub templates: Templates,
    pub config: Arc<Config>,
}

impl AppState {
    /// State with the in-memory page cache and the embedded templates.
    pub fn new(config: Config, store: impl DataStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
            cache: Arc::new(MokaPageCache::default()),
            templates: Arc::new(ResTemplates),
            config: Arc::new(config),
        }
    }
}

/// Every route, the media files and the session layer.
pub fn router(state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(state.config.session_inactivity));
    let media = ServeDir::new(&state.config.media_root);
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .merge(auth::router())
        .merge(posts::router())
        .merge(profiles::router())
        .nest_service("/media", media)
        .fallback(not_found)
        .layer(body_limit)
        .with_state(state)
        .layer(session_layer)
}

async fn not_found(OriginalUri(uri): OriginalUri) -> Response {
    appresult::not_found_page(uri.path())
}
