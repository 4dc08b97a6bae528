use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{
    QueryBuilder, Sqlite, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use time::OffsetDateTime;

use crate::AppResult;

use super::{
    CommentView, DataStore, FollowCounts, Group, GroupRef, NewComment, NewGroup, NewPost, PostChanges, PostFilter,
    PostView, User,
};

const POST_SELECT: &str = "SELECT p.id, p.text, p.image, p.pub_date, p.author_id, u.username AS author, \
     p.group_id, g.slug AS group_slug, g.title AS group_title, \
     (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comment_count \
     FROM posts p \
     JOIN users u ON u.id = p.author_id \
     LEFT JOIN post_groups g ON g.id = p.group_id";

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    text: String,
    image: Option<String>,
    pub_date: OffsetDateTime,
    author_id: i64,
    author: String,
    group_id: Option<i64>,
    group_slug: Option<String>,
    group_title: Option<String>,
    comment_count: i64,
}

impl From<PostRow> for PostView {
    fn from(row: PostRow) -> Self {
        let group = match (row.group_slug, row.group_title) {
            (Some(slug), Some(title)) => Some(GroupRef { slug, title }),
            _ => None,
        };
        PostView {
            id: row.id,
            text: row.text,
            image: row.image,
            pub_date: row.pub_date,
            author_id: row.author_id,
            author: row.author,
            group_id: row.group_id,
            group,
            comment_count: row.comment_count,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    text: String,
    created: OffsetDateTime,
    author: String,
}

/// [`DataStore`] over a SQLite pool.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(url: &str) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(16)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// A private in-memory database. Every connection to `:memory:` is its
    /// own database, so the pool holds exactly one that never expires.
    pub async fn in_memory() -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::migrate!().run(&self.pool).await?;
        Ok(())
    }
}

fn push_filter(query: &mut QueryBuilder<'_, Sqlite>, filter: PostFilter) {
    match filter {
        PostFilter::All => {}
        PostFilter::Group(group_id) => {
            query.push(" WHERE p.group_id = ").push_bind(group_id);
        }
        PostFilter::Author(author_id) => {
            query.push(" WHERE p.author_id = ").push_bind(author_id);
        }
        PostFilter::FollowedBy(user_id) => {
            query
                .push(" WHERE p.author_id IN (SELECT author_id FROM follows WHERE user_id = ")
                .push_bind(user_id)
                .push(")");
        }
    }
}

#[async_trait]
impl DataStore for SqliteStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (username,password_hash,date_joined) VALUES (?,?,?) \
             RETURNING id,username,password_hash,date_joined",
        )
        .bind(username)
        .bind(password_hash)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT id,username,password_hash,date_joined FROM users WHERE username=?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create_group(&self, group: &NewGroup) -> AppResult<Group> {
        let group = sqlx::query_as::<_, Group>(
            "INSERT INTO post_groups (title,slug,description) VALUES (?,?,?) RETURNING id,title,slug,description",
        )
        .bind(&group.title)
        .bind(&group.slug)
        .bind(&group.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(group)
    }

    async fn groups(&self) -> AppResult<Vec<Group>> {
        let groups = sqlx::query_as::<_, Group>("SELECT id,title,slug,description FROM post_groups ORDER BY title")
            .fetch_all(&self.pool)
            .await?;
        Ok(groups)
    }

    async fn group_by_slug(&self, slug: &str) -> AppResult<Option<Group>> {
        let group = sqlx::query_as::<_, Group>("SELECT id,title,slug,description FROM post_groups WHERE slug=?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(group)
    }

    async fn group_by_id(&self, id: i64) -> AppResult<Option<Group>> {
        let group = sqlx::query_as::<_, Group>("SELECT id,title,slug,description FROM post_groups WHERE id=?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(group)
    }

    async fn create_post(&self, post: &NewPost) -> AppResult<i64> {
        let result = sqlx::query("INSERT INTO posts (text,image,pub_date,author_id,group_id) VALUES (?,?,?,?,?)")
            .bind(&post.text)
            .bind(&post.image)
            .bind(OffsetDateTime::now_utc())
            .bind(post.author_id)
            .bind(post.group_id)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    async fn update_post(&self, post_id: i64, changes: &PostChanges) -> AppResult<()> {
        sqlx::query("UPDATE posts SET text=?, group_id=?, image=COALESCE(?, image) WHERE id=?")
            .bind(&changes.text)
            .bind(changes.group_id)
            .bind(&changes.image)
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn post(&self, username: &str, post_id: i64) -> AppResult<Option<PostView>> {
        let mut query = QueryBuilder::<Sqlite>::new(POST_SELECT);
        query
            .push(" WHERE p.id = ")
            .push_bind(post_id)
            .push(" AND u.username = ")
            .push_bind(username);
        let row = query.build_query_as::<PostRow>().fetch_optional(&self.pool).await?;
        Ok(row.map(PostView::from))
    }

    async fn count_posts(&self, filter: PostFilter) -> AppResult<i64> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM posts p");
        push_filter(&mut query, filter);
        let (count,): (i64,) = query.build_query_as().fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn posts(&self, filter: PostFilter, limit: i64, offset: i64) -> AppResult<Vec<PostView>> {
        let mut query = QueryBuilder::<Sqlite>::new(POST_SELECT);
        push_filter(&mut query, filter);
        query
            .push(" ORDER BY p.pub_date DESC, p.id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        let rows = query.build_query_as::<PostRow>().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(PostView::from).collect())
    }

    async fn create_comment(&self, comment: &NewComment) -> AppResult<i64> {
        let result = sqlx::query("INSERT INTO comments (text,created,author_id,post_id) VALUES (?,?,?,?)")
            .bind(&comment.text)
            .bind(OffsetDateTime::now_utc())
            .bind(comment.author_id)
            .bind(comment.post_id)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    async fn comments(&self, post_id: i64) -> AppResult<Vec<CommentView>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            "SELECT c.id, c.text, c.created, u.username AS author FROM comments c \
             JOIN users u ON u.id = c.author_id WHERE c.post_id=? ORDER BY c.created, c.id",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|CommentRow { id, text, created, author }| CommentView { id, text, created, author })
            .collect())
    }

    async fn follow(&self, user_id: i64, author_id: i64) -> AppResult<bool> {
        let result = sqlx::query("INSERT OR IGNORE INTO follows (user_id,author_id) VALUES (?,?)")
            .bind(user_id)
            .bind(author_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn unfollow(&self, user_id: i64, author_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM follows WHERE user_id=? AND author_id=?")
            .bind(user_id)
            .bind(author_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn is_following(&self, user_id: i64, author_id: i64) -> AppResult<bool> {
        let row = sqlx::query("SELECT 1 FROM follows WHERE user_id=? AND author_id=?")
            .bind(user_id)
            .bind(author_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn follow_counts(&self, user_id: i64) -> AppResult<FollowCounts> {
        let (followers, following): (i64, i64) = sqlx::query_as(
            "SELECT (SELECT COUNT(*) FROM follows WHERE author_id=?1), (SELECT COUNT(*) FROM follows WHERE user_id=?1)",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(FollowCounts { followers, following })
    }
}
