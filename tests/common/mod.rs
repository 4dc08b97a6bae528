#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use tempfile::TempDir;
use tower::ServiceExt;

use yatube::{
    AppState, CacheTimeouts, Config, DataStore, SqliteStore, Store,
    auth::hash_password,
    db::{Group, NewGroup},
    router,
};

pub const PASSWORD: &str = "user_password";
const BOUNDARY: &str = "yatube-test-boundary";

pub struct TestApp {
    pub app: Router,
    pub store: Store,
    pub media: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn location(&self) -> &str {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_owned)
    }
}

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(CacheTimeouts::new()).await
}

pub async fn spawn_app_with(cache_timeouts: CacheTimeouts) -> TestApp {
    let store = SqliteStore::in_memory().await.unwrap();
    spawn_app_on(store, cache_timeouts)
}

/// An app over a caller-supplied store.
pub fn spawn_app_on(store: impl DataStore + 'static, cache_timeouts: CacheTimeouts) -> TestApp {
    let media = tempfile::tempdir().unwrap();
    let mut config = Config::with_media_root(media.path());
    config.cache_timeouts = cache_timeouts;

    let state = AppState::new(config, store);
    let store = state.store.clone();

    TestApp {
        app: router(state),
        store,
        media,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        let mut request = Request::get(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, body: &str, cookie: Option<&str>) -> TestResponse {
        let mut request = Request::post(uri).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::from(body.to_owned())).unwrap()).await
    }

    pub async fn post_multipart(&self, uri: &str, parts: &[Part<'_>], cookie: Option<&str>) -> TestResponse {
        let mut request = Request::post(uri).header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::from(multipart_body(parts))).unwrap()).await
    }

    pub async fn create_user(&self, username: &str) -> i64 {
        let hash = hash_password(PASSWORD).unwrap();
        self.store.create_user(username, &hash).await.unwrap().id
    }

    /// Creates the account and returns the session cookie of a logged-in client.
    pub async fn login_as(&self, username: &str) -> String {
        self.create_user(username).await;
        let response = self
            .post_form("/auth/login/", &format!("username={username}&password={PASSWORD}"), None)
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "login failed: {}", response.body);
        response.session_cookie().expect("login sets a session cookie")
    }

    pub async fn create_group(&self, title: &str, slug: &str) -> Group {
        self.store
            .create_group(&NewGroup {
                title: title.to_owned(),
                slug: slug.to_owned(),
                description: format!("All about {title}"),
            })
            .await
            .unwrap()
    }

    pub async fn post_count(&self) -> i64 {
        self.store.count_posts(yatube::db::PostFilter::All).await.unwrap()
    }

    pub async fn assert_page_contains(&self, uri: &str, needle: &str) {
        let response = self.get(uri, None).await;
        assert_eq!(response.status, StatusCode::OK, "GET {uri}");
        assert!(response.body.contains(needle), "GET {uri} should contain {needle:?}");
    }

    pub async fn assert_page_lacks(&self, uri: &str, needle: &str) {
        let response = self.get(uri, None).await;
        assert_eq!(response.status, StatusCode::OK, "GET {uri}");
        assert!(!response.body.contains(needle), "GET {uri} should not contain {needle:?}");
    }
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes());
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, file_name, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn png_bytes() -> Vec<u8> {
    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::new_rgba8(100, 100)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}
