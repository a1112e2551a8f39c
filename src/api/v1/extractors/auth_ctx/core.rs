use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::Principal;

/// The verified principal for this request.
///
/// The access gateway inserts `Principal` into the request extensions; when it is
/// missing (no token, or the token failed verification) this rejects with 401.
/// The policy layer normally rejects such requests first.
#[derive(Debug, Clone)]
pub struct AuthCtx(pub Principal);

impl<S> FromRequestParts<S> for AuthCtx
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(AuthCtx)
            .ok_or_else(AppError::unauthorized)
    }
}

/// Same as [`AuthCtx`] for routes that also serve anonymous callers.
#[derive(Debug, Clone)]
pub struct MaybeAuthCtx(pub Option<Principal>);

impl<S> FromRequestParts<S> for MaybeAuthCtx
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthCtx(parts.extensions.get::<Principal>().cloned()))
    }
}
