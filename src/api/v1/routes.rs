/*
 * Responsibility
 * - v1 URL layout
 * - access requirements are NOT declared here; they live in the policy table
 *   (services::auth::policy::blog_policy) and are enforced before dispatch
 */
use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use crate::api::v1::handlers::{
    auth::{login, me, register},
    health::health,
    posts::{create_post, get_post, list_drafts, list_posts, update_post},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/me", get(me))
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/drafts", get(list_drafts))
        .route("/posts/{post_id}", get(get_post).put(update_post))
}
