mod sqlite;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::AppResult;

pub use sqlite::SqliteStore;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub date_joined: OffsetDateTime,

    // unique: username
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,

    // unique: slug
}

#[derive(Debug, Clone)]
pub struct NewGroup {
    pub title: String,
    pub slug: String,
    pub description: String,
}

/// The group fields shown next to a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRef {
    pub slug: String,
    pub title: String,
}

/// A post joined with its author and group.
#[derive(Debug, Clone)]
pub struct PostView {
    pub id: i64,
    pub text: String,
    pub image: Option<String>,
    pub pub_date: OffsetDateTime,
    pub author_id: i64,
    pub author: String,
    pub group_id: Option<i64>,
    pub group: Option<GroupRef>,
    pub comment_count: i64,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: i64,
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

/// Edit of an existing post. The author never changes; `image: None` keeps
/// whatever image the post already has.
#[derive(Debug, Clone)]
pub struct PostChanges {
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CommentView {
    pub id: i64,
    pub text: String,
    pub created: OffsetDateTime,
    pub author: String,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i64,
    pub author_id: i64,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FollowCounts {
    pub followers: i64,
    pub following: i64,
}

/// Which posts a listing shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(i64),
    Author(i64),
    /// Posts by every author the given user follows.
    FollowedBy(i64),
}

/// Persistence for users, groups, posts, comments and follows.
///
/// Listings are ordered newest first; comments oldest first.
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn create_user(&self, username: &str, password_hash: &str) -> AppResult<User>;
    async fn user_by_username(&self, username: &str) -> AppResult<Option<User>>;

    async fn create_group(&self, group: &NewGroup) -> AppResult<Group>;
    async fn groups(&self) -> AppResult<Vec<Group>>;
    async fn group_by_slug(&self, slug: &str) -> AppResult<Option<Group>>;
    async fn group_by_id(&self, id: i64) -> AppResult<Option<Group>>;

    async fn create_post(&self, post: &NewPost) -> AppResult<i64>;
    async fn update_post(&self, post_id: i64, changes: &PostChanges) -> AppResult<()>;
    /// A post by id, only if it was written by `username`.
    async fn post(&self, username: &str, post_id: i64) -> AppResult<Option<PostView>>;
    async fn count_posts(&self, filter: PostFilter) -> AppResult<i64>;
    async fn posts(&self, filter: PostFilter, limit: i64, offset: i64) -> AppResult<Vec<PostView>>;

    async fn create_comment(&self, comment: &NewComment) -> AppResult<i64>;
    async fn comments(&self, post_id: i64) -> AppResult<Vec<CommentView>>;

    /// Returns whether a new edge was created.
    async fn follow(&self, user_id: i64, author_id: i64) -> AppResult<bool>;
    /// Returns whether an edge was removed.
    async fn unfollow(&self, user_id: i64, author_id: i64) -> AppResult<bool>;
    async fn is_following(&self, user_id: i64, author_id: i64) -> AppResult<bool>;
    async fn follow_counts(&self, user_id: i64) -> AppResult<FollowCounts>;
}
