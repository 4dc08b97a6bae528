mod common;

use axum::http::StatusCode;
use common::{Part, png_bytes, spawn_app};
use yatube::db::{NewPost, PostFilter};

const POST_ITEM: &str = r#"class="card post""#;

#[tokio::test]
async fn published_post_shows_on_every_listing() {
    let app = spawn_app().await;
    let group = app.create_group("Cats", "cats").await;
    let cookie = app.login_as("leo").await;

    let group_id = group.id.to_string();
    let response = app
        .post_multipart(
            "/new/",
            &[Part::Text("text", "Freshly published text"), Part::Text("group", &group_id)],
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), "/");
    assert_eq!(app.post_count().await, 1);

    let post = &app.store.posts(PostFilter::All, 1, 0).await.unwrap()[0];
    for uri in ["/", "/leo/", "/group/cats/", &format!("/leo/{}/", post.id)] {
        app.assert_page_contains(uri, "Freshly published text").await;
    }
}

#[tokio::test]
async fn anonymous_publish_redirects_to_login() {
    let app = spawn_app().await;

    let response = app
        .post_multipart("/new/", &[Part::Text("text", "Anonymous text")], None)
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), "/auth/login/?return_url=%2Fnew%2F");
    assert_eq!(app.post_count().await, 0);

    let response = app.get("/new/", None).await;
    assert!(response.location().starts_with("/auth/login/?return_url="));
}

#[tokio::test]
async fn blank_text_redisplays_form_with_errors() {
    let app = spawn_app().await;
    let cookie = app.login_as("leo").await;

    let response = app
        .post_multipart("/new/", &[Part::Text("text", "   ")], Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains(r#"data-field="text""#));
    assert_eq!(app.post_count().await, 0);
}

#[tokio::test]
async fn non_image_upload_is_rejected() {
    let app = spawn_app().await;
    let cookie = app.login_as("leo").await;

    let response = app
        .post_multipart(
            "/new/",
            &[
                Part::Text("text", "Post with a fake image"),
                Part::File("image", "notes.txt", b"definitely not an image"),
            ],
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains(r#"data-field="image""#));
    assert_eq!(app.post_count().await, 0);
}

#[tokio::test]
async fn image_post_renders_and_serves_image() {
    let app = spawn_app().await;
    let group = app.create_group("Cats", "cats").await;
    let cookie = app.login_as("leo").await;

    let png = png_bytes();
    let group_id = group.id.to_string();
    let response = app
        .post_multipart(
            "/new/",
            &[
                Part::Text("text", "Post with a picture"),
                Part::Text("group", &group_id),
                Part::File("image", "cat.png", &png),
            ],
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);

    let post = &app.store.posts(PostFilter::All, 1, 0).await.unwrap()[0];
    let image = post.image.clone().expect("post keeps its image");
    assert!(app.media.path().join(&image).is_file());

    for uri in ["/", "/leo/", "/group/cats/", &format!("/leo/{}/", post.id)] {
        app.assert_page_contains(uri, r#"class="card-img""#).await;
    }

    let response = app.get(&format!("/media/{image}"), None).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn edited_post_replaces_old_text() {
    let app = spawn_app().await;
    let group = app.create_group("Cats", "cats").await;
    let cookie = app.login_as("leo").await;

    let group_id = group.id.to_string();
    app.post_multipart(
        "/new/",
        &[Part::Text("text", "Original post text"), Part::Text("group", &group_id)],
        Some(&cookie),
    )
    .await;
    let post_id = app.store.posts(PostFilter::All, 1, 0).await.unwrap()[0].id;

    let form = app.get(&format!("/leo/{post_id}/edit/"), Some(&cookie)).await;
    assert_eq!(form.status, StatusCode::OK);
    assert!(form.body.contains("Original post text"));

    let response = app
        .post_multipart(
            &format!("/leo/{post_id}/edit/"),
            &[Part::Text("text", "Edited post text"), Part::Text("group", &group_id)],
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), format!("/leo/{post_id}/"));

    for uri in ["/", "/leo/", "/group/cats/", &format!("/leo/{post_id}/")] {
        app.assert_page_contains(uri, "Edited post text").await;
        app.assert_page_lacks(uri, "Original post text").await;
    }
}

#[tokio::test]
async fn only_the_author_can_edit() {
    let app = spawn_app().await;
    let author = app.create_user("leo").await;
    let post_id = app
        .store
        .create_post(&NewPost {
            author_id: author,
            text: "Author's own words".into(),
            group_id: None,
            image: None,
        })
        .await
        .unwrap();

    let cookie = app.login_as("mallory").await;
    let response = app
        .post_multipart(
            &format!("/leo/{post_id}/edit/"),
            &[Part::Text("text", "Hijacked")],
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), format!("/leo/{post_id}/"));

    let post = app.store.post("leo", post_id).await.unwrap().unwrap();
    assert_eq!(post.text, "Author's own words");

    let detail = app.get(&format!("/leo/{post_id}/"), Some(&cookie)).await;
    assert!(!detail.body.contains("edit-link"));
}

#[tokio::test]
async fn missing_pages_are_404() {
    let app = spawn_app().await;
    let author = app.create_user("leo").await;
    app.create_group("Empty", "empty").await;
    let post_id = app
        .store
        .create_post(&NewPost {
            author_id: author,
            text: "Lonely post".into(),
            group_id: None,
            image: None,
        })
        .await
        .unwrap();
    app.create_user("someone").await;

    for uri in [
        "/does/not/exist/here/",
        "/nobody/",
        "/group/empty/",
        "/group/unknown/",
        "/leo/abc/",
        &format!("/leo/{}/", post_id + 1),
        &format!("/someone/{post_id}/"),
    ] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "GET {uri}");
    }
}

#[tokio::test]
async fn comments_require_login_and_text() {
    let app = spawn_app().await;
    let author = app.create_user("leo").await;
    let post_id = app
        .store
        .create_post(&NewPost {
            author_id: author,
            text: "Comment on me".into(),
            group_id: None,
            image: None,
        })
        .await
        .unwrap();
    let comment_uri = format!("/leo/{post_id}/comment/");

    let response = app.post_form(&comment_uri, "text=Anonymous+remark", None).await;
    assert!(response.location().starts_with("/auth/login/?return_url="));

    let cookie = app.login_as("reader").await;

    let response = app.get(&comment_uri, Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), format!("/leo/{post_id}/"));

    let response = app.post_form(&comment_uri, "text=", Some(&cookie)).await;
    assert_eq!(response.location(), format!("/leo/{post_id}/"));
    assert!(app.store.comments(post_id).await.unwrap().is_empty());

    app.post_form(&comment_uri, "text=Nice+words", Some(&cookie)).await;
    let comments = app.store.comments(post_id).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].author, "reader");

    app.assert_page_contains(&format!("/leo/{post_id}/"), "Nice words").await;
}

#[tokio::test]
async fn commenting_on_missing_post_is_404() {
    let app = spawn_app().await;
    app.create_user("leo").await;
    let cookie = app.login_as("reader").await;

    for uri in ["/leo/999/comment/", "/nobody/1/comment/", "/leo/abc/comment/"] {
        let response = app.post_form(uri, "text=Hello", Some(&cookie)).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "POST {uri}");
    }
}

#[tokio::test]
async fn index_pages_are_clamped() {
    let app = spawn_app().await;
    let author = app.create_user("leo").await;
    for n in 0..12 {
        app.store
            .create_post(&NewPost {
                author_id: author,
                text: format!("Numbered post {n}"),
                group_id: None,
                image: None,
            })
            .await
            .unwrap();
    }

    let first = app.get("/", None).await;
    assert_eq!(first.body.matches(POST_ITEM).count(), 10);
    assert!(first.body.contains("Numbered post 11"));

    let second = app.get("/?page=2", None).await;
    assert_eq!(second.body.matches(POST_ITEM).count(), 2);
    assert!(second.body.contains("Numbered post 0"));

    let beyond = app.get("/?page=99", None).await;
    assert_eq!(beyond.body.matches(POST_ITEM).count(), 2);

    let garbage = app.get("/?page=abc", None).await;
    assert_eq!(garbage.body.matches(POST_ITEM).count(), 10);
}
