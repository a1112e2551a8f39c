/*
 * Responsibility
 * - Posts request/response DTOs
 * - the author is never taken from the request body; handlers use the verified principal
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::post_repo::{PostRow, PostStatus};

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub status: PostStatus,
}

impl CreatePostRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_post(&self.title, &self.content)
    }
}

/// Full replacement of a post's editable fields.
#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub title: String,
    pub content: String,
    pub status: PostStatus,
}

impl UpdatePostRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_post(&self.title, &self.content)
    }
}

fn validate_post(title: &str, content: &str) -> Result<(), &'static str> {
    let title = title.trim().chars().count();
    if !(3..=200).contains(&title) {
        return Err("title must be between 3 and 200 characters");
    }
    let content = content.trim().chars().count();
    if !(3..=50_000).contains(&content) {
        return Err("content must be between 3 and 50000 characters");
    }

    Ok(())
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub status: PostStatus,
    pub reading_time: i32,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PostRow> for PostResponse {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            status: row.status,
            reading_time: row.reading_time,
            author_id: row.author_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(title: &str, content: &str) -> CreatePostRequest {
        CreatePostRequest {
            title: title.into(),
            content: content.into(),
            status: PostStatus::Draft,
        }
    }

    #[test]
    fn title_and_content_lengths() {
        assert!(req("Hello", "World").validate().is_ok());
        assert!(req("Hi", "World").validate().is_err());
        assert!(req(&"t".repeat(201), "World").validate().is_err());
        assert!(req("Hello", "  a ").validate().is_err());
    }

    #[test]
    fn update_uses_the_same_limits() {
        let update = |title: &str, content: &str| UpdatePostRequest {
            title: title.into(),
            content: content.into(),
            status: PostStatus::Published,
        };

        assert!(update("Hello", "World").validate().is_ok());
        assert!(update("  ", "World").validate().is_err());
        assert!(update("Hello", &"c".repeat(50_001)).validate().is_err());
    }
}
