/*
 * Responsibility
 * - posts table access behind the `PostRepo` trait
 * - drafts are always scoped by author; the author id comes from the verified principal
 * - updates only touch rows owned by `NewPost::author_id`
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::repos::{
    BoxFuture,
    error::{RepoError, RepoResult},
};

const WORDS_PER_MINUTE: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostStatus {
    Draft,
    Published,
}

impl PostStatus {
    fn as_db(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Published => "PUBLISHED",
        }
    }

    fn from_db(s: &str) -> Result<Self, RepoError> {
        match s {
            "DRAFT" => Ok(Self::Draft),
            "PUBLISHED" => Ok(Self::Published),
            other => Err(RepoError::Db(sqlx::Error::Decode(
                format!("unknown post status: {other}").into(),
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostRow {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub status: PostStatus,
    pub reading_time: i32,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub status: PostStatus,
    pub reading_time: i32,
    pub author_id: Uuid,
}

impl NewPost {
    pub fn new(title: String, content: String, status: PostStatus, author_id: Uuid) -> Self {
        let reading_time = reading_time_minutes(&content);
        Self {
            title,
            content,
            status,
            reading_time,
            author_id,
        }
    }
}

/// Whole minutes at 200 words per minute (rounded down).
pub fn reading_time_minutes(content: &str) -> i32 {
    let words = content.split_whitespace().count();
    i32::try_from(words / WORDS_PER_MINUTE).unwrap_or(i32::MAX)
}

pub trait PostRepo: Send + Sync {
    fn list_published(&self) -> BoxFuture<'_, RepoResult<Vec<PostRow>>>;

    fn list_drafts_by_author(&self, author_id: Uuid) -> BoxFuture<'_, RepoResult<Vec<PostRow>>>;

    fn get(&self, id: Uuid) -> BoxFuture<'_, RepoResult<Option<PostRow>>>;

    fn create(&self, post: NewPost) -> BoxFuture<'_, RepoResult<PostRow>>;

    /// Replaces title, content and status of `id`. `None` when the post does not
    /// exist or belongs to someone other than `post.author_id`.
    fn update(&self, id: Uuid, post: NewPost) -> BoxFuture<'_, RepoResult<Option<PostRow>>>;
}

#[derive(Debug, sqlx::FromRow)]
struct PgPostRow {
    id: Uuid,
    title: String,
    content: String,
    status: String,
    reading_time: i32,
    author_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PgPostRow> for PostRow {
    type Error = RepoError;

    fn try_from(row: PgPostRow) -> Result<Self, Self::Error> {
        Ok(PostRow {
            id: row.id,
            title: row.title,
            content: row.content,
            status: PostStatus::from_db(&row.status)?,
            reading_time: row.reading_time,
            author_id: row.author_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn convert_all(rows: Vec<PgPostRow>) -> RepoResult<Vec<PostRow>> {
    rows.into_iter().map(PostRow::try_from).collect()
}

#[derive(Clone, Debug)]
pub struct PgPostRepo {
    pool: PgPool,
}

impl PgPostRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl PostRepo for PgPostRepo {
    fn list_published(&self) -> BoxFuture<'_, RepoResult<Vec<PostRow>>> {
        Box::pin(async move {
            let rows = sqlx::query_as::<_, PgPostRow>(
                r#"
                SELECT id, title, content, status, reading_time, author_id, created_at, updated_at
                FROM posts
                WHERE status = $1
                ORDER BY created_at DESC
                "#,
            )
            .bind(PostStatus::Published.as_db())
            .fetch_all(&self.pool)
            .await
            .map_err(RepoError::from_sqlx)?;

            convert_all(rows)
        })
    }

    fn list_drafts_by_author(&self, author_id: Uuid) -> BoxFuture<'_, RepoResult<Vec<PostRow>>> {
        Box::pin(async move {
            let rows = sqlx::query_as::<_, PgPostRow>(
                r#"
                SELECT id, title, content, status, reading_time, author_id, created_at, updated_at
                FROM posts
                WHERE status = $1 AND author_id = $2
                ORDER BY created_at DESC
                "#,
            )
            .bind(PostStatus::Draft.as_db())
            .bind(author_id)
            .fetch_all(&self.pool)
            .await
            .map_err(RepoError::from_sqlx)?;

            convert_all(rows)
        })
    }

    fn get(&self, id: Uuid) -> BoxFuture<'_, RepoResult<Option<PostRow>>> {
        Box::pin(async move {
            let row = sqlx::query_as::<_, PgPostRow>(
                r#"
                SELECT id, title, content, status, reading_time, author_id, created_at, updated_at
                FROM posts
                WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepoError::from_sqlx)?;

            row.map(PostRow::try_from).transpose()
        })
    }

    fn create(&self, post: NewPost) -> BoxFuture<'_, RepoResult<PostRow>> {
        Box::pin(async move {
            let row = sqlx::query_as::<_, PgPostRow>(
                r#"
                INSERT INTO posts (id, title, content, status, reading_time, author_id)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, title, content, status, reading_time, author_id, created_at, updated_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(&post.title)
            .bind(&post.content)
            .bind(post.status.as_db())
            .bind(post.reading_time)
            .bind(post.author_id)
            .fetch_one(&self.pool)
            .await
            .map_err(RepoError::from_sqlx)?;

            row.try_into()
        })
    }

    fn update(&self, id: Uuid, post: NewPost) -> BoxFuture<'_, RepoResult<Option<PostRow>>> {
        Box::pin(async move {
            let row = sqlx::query_as::<_, PgPostRow>(
                r#"
                UPDATE posts
                SET
                    title = $3,
                    content = $4,
                    status = $5,
                    reading_time = $6,
                    updated_at = now()
                WHERE id = $1 AND author_id = $2
                RETURNING id, title, content, status, reading_time, author_id, created_at, updated_at
                "#,
            )
            .bind(id)
            .bind(post.author_id)
            .bind(&post.title)
            .bind(&post.content)
            .bind(post.status.as_db())
            .bind(post.reading_time)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepoError::from_sqlx)?;

            row.map(PostRow::try_from).transpose()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_time_is_words_over_two_hundred() {
        assert_eq!(reading_time_minutes(""), 0);
        assert_eq!(reading_time_minutes("one two three"), 0);

        let four_hundred_words = vec!["word"; 400].join(" ");
        assert_eq!(reading_time_minutes(&four_hundred_words), 2);

        let messy = format!("  {}\n\t ", vec!["w"; 399].join("   "));
        assert_eq!(reading_time_minutes(&messy), 1);
    }

    #[test]
    fn status_serializes_in_upper_case() {
        let json = serde_json::to_string(&PostStatus::Published).unwrap();
        assert_eq!(json, "\"PUBLISHED\"");

        let parsed: PostStatus = serde_json::from_str("\"DRAFT\"").unwrap();
        assert_eq!(parsed, PostStatus::Draft);
    }
}
