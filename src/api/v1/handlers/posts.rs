/*
 * Responsibility
 * - /posts handlers: published listing, single post, the caller's drafts, create, update
 * - author-scoped queries take the id from AuthCtx, never from the request
 */
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    api::v1::{
        dto::posts::{CreatePostRequest, PostResponse, UpdatePostRequest},
        extractors::{AuthCtx, MaybeAuthCtx},
    },
    error::AppError,
    repos::post_repo::{NewPost, PostStatus},
    state::AppState,
};

pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<PostResponse>>, AppError> {
    let rows = state.posts.list_published().await?;
    Ok(Json(rows.into_iter().map(PostResponse::from).collect()))
}

pub async fn list_drafts(
    State(state): State<AppState>,
    AuthCtx(principal): AuthCtx,
) -> Result<Json<Vec<PostResponse>>, AppError> {
    let rows = state.posts.list_drafts_by_author(principal.id).await?;
    Ok(Json(rows.into_iter().map(PostResponse::from).collect()))
}

pub async fn get_post(
    State(state): State<AppState>,
    MaybeAuthCtx(viewer): MaybeAuthCtx,
    Path(post_id): Path<Uuid>,
) -> Result<Json<PostResponse>, AppError> {
    let row = state
        .posts
        .get(post_id)
        .await?
        .ok_or(AppError::not_found("post"))?;

    // drafts are only visible to their author
    let visible = row.status == PostStatus::Published
        || viewer.is_some_and(|p| p.id == row.author_id);
    if !visible {
        return Err(AppError::not_found("post"));
    }

    Ok(Json(row.into()))
}

pub async fn create_post(
    State(state): State<AppState>,
    AuthCtx(principal): AuthCtx,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PostResponse>), AppError> {
    let Json(req) = payload?;
    req.validate()
        .map_err(|msg| AppError::bad_request("BAD_REQUEST", msg))?;

    let row = state
        .posts
        .create(NewPost::new(
            req.title.trim().to_string(),
            req.content,
            req.status,
            principal.id,
        ))
        .await?;

    tracing::info!(post_id = %row.id, author_id = %principal.id, "post created");

    Ok((StatusCode::CREATED, Json(row.into())))
}

pub async fn update_post(
    State(state): State<AppState>,
    AuthCtx(principal): AuthCtx,
    Path(post_id): Path<Uuid>,
    payload: Result<Json<UpdatePostRequest>, JsonRejection>,
) -> Result<Json<PostResponse>, AppError> {
    let Json(req) = payload?;
    req.validate()
        .map_err(|msg| AppError::bad_request("BAD_REQUEST", msg))?;

    // someone else's post looks the same as a missing one
    let row = state
        .posts
        .update(
            post_id,
            NewPost::new(
                req.title.trim().to_string(),
                req.content,
                req.status,
                principal.id,
            ),
        )
        .await?
        .ok_or(AppError::not_found("post"))?;

    tracing::info!(post_id = %row.id, author_id = %principal.id, "post updated");

    Ok(Json(row.into()))
}
