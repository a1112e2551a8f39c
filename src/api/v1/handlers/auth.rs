/*
 * Responsibility
 * - POST /auth/login, POST /auth/register: credential check → token issuance
 * - GET /auth/me: the principal attached by the gateway
 */
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use crate::{
    api::v1::{
        dto::auth::{AuthResponse, LoginRequest, MeResponse, RegisterRequest},
        extractors::AuthCtx,
    },
    error::AppError,
    state::AppState,
};

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let Json(req) = payload?;
    req.validate()
        .map_err(|msg| AppError::bad_request("BAD_REQUEST", msg))?;

    let issued = state.auth.login(&req.email, &req.password).await?;

    Ok(Json(issued.into()))
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let Json(req) = payload?;
    req.validate()
        .map_err(|msg| AppError::bad_request("BAD_REQUEST", msg))?;

    let issued = state
        .auth
        .register(&req.email, &req.password, &req.name)
        .await?;

    Ok(Json(issued.into()))
}

pub async fn me(AuthCtx(principal): AuthCtx) -> Json<MeResponse> {
    Json(principal.into())
}
