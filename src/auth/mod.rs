mod login;
mod logout;
mod password;
mod signup;

use axum::{Router, routing::get};

use crate::AppState;

pub use password::{hash_password, verify_password};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login/", get(login::login_page).post(login::login))
        .route("/auth/logout/", get(logout::logout))
        .route("/auth/signup/", get(signup::signup_page).post(signup::signup))
}
