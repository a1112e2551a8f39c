//! In-process stores.
//!
//! Used when no `DATABASE_URL` is configured in development, and by the tests.
//! Each call takes the lock for the duration of a single read or write only.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::repos::{
    BoxFuture,
    error::{RepoError, RepoResult},
    post_repo::{NewPost, PostRepo, PostRow, PostStatus},
    user_repo::{NewUser, UserRepo},
};
use crate::services::auth::principal::Principal;

#[derive(Debug, Default)]
pub struct MemoryUserRepo {
    // keyed by normalized email
    users: RwLock<HashMap<String, Principal>>,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn remove(&self, email: &str) -> bool {
        self.users.write().await.remove(email).is_some()
    }
}

impl UserRepo for MemoryUserRepo {
    fn find_by_email<'a>(&'a self, email: &'a str) -> BoxFuture<'a, RepoResult<Option<Principal>>> {
        Box::pin(async move { Ok(self.users.read().await.get(email).cloned()) })
    }

    fn create(&self, user: NewUser) -> BoxFuture<'_, RepoResult<Principal>> {
        Box::pin(async move {
            let mut users = self.users.write().await;
            if users.contains_key(&user.email) {
                return Err(RepoError::Conflict);
            }

            let principal = Principal::new(
                Uuid::new_v4(),
                user.email.clone(),
                user.display_name,
                user.password_hash,
            );
            users.insert(user.email, principal.clone());

            Ok(principal)
        })
    }
}

#[derive(Debug, Default)]
pub struct MemoryPostRepo {
    posts: RwLock<Vec<PostRow>>,
}

impl MemoryPostRepo {
    pub fn new() -> Self {
        Self::default()
    }

    async fn filtered(&self, keep: impl Fn(&PostRow) -> bool) -> Vec<PostRow> {
        // newest first, same as the SQL repo
        self.posts
            .read()
            .await
            .iter()
            .rev()
            .filter(|p| keep(*p))
            .cloned()
            .collect()
    }
}

impl PostRepo for MemoryPostRepo {
    fn list_published(&self) -> BoxFuture<'_, RepoResult<Vec<PostRow>>> {
        Box::pin(async move {
            Ok(self
                .filtered(|p| p.status == PostStatus::Published)
                .await)
        })
    }

    fn list_drafts_by_author(&self, author_id: Uuid) -> BoxFuture<'_, RepoResult<Vec<PostRow>>> {
        Box::pin(async move {
            Ok(self
                .filtered(|p| p.status == PostStatus::Draft && p.author_id == author_id)
                .await)
        })
    }

    fn get(&self, id: Uuid) -> BoxFuture<'_, RepoResult<Option<PostRow>>> {
        Box::pin(async move {
            Ok(self
                .posts
                .read()
                .await
                .iter()
                .find(|p| p.id == id)
                .cloned())
        })
    }

    fn create(&self, post: NewPost) -> BoxFuture<'_, RepoResult<PostRow>> {
        Box::pin(async move {
            let now = Utc::now();
            let row = PostRow {
                id: Uuid::new_v4(),
                title: post.title,
                content: post.content,
                status: post.status,
                reading_time: post.reading_time,
                author_id: post.author_id,
                created_at: now,
                updated_at: now,
            };
            self.posts.write().await.push(row.clone());

            Ok(row)
        })
    }

    fn update(&self, id: Uuid, post: NewPost) -> BoxFuture<'_, RepoResult<Option<PostRow>>> {
        Box::pin(async move {
            let mut posts = self.posts.write().await;
            let Some(row) = posts
                .iter_mut()
                .find(|p| p.id == id && p.author_id == post.author_id)
            else {
                return Ok(None);
            };

            row.title = post.title;
            row.content = post.content;
            row.status = post.status;
            row.reading_time = post.reading_time;
            row.updated_at = Utc::now();

            Ok(Some(row.clone()))
        })
    }
}
