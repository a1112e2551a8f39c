//! Route authorization: consult the `AccessPolicy` table for every request.
//!
//! Sits inside the access gateway, so the `Principal` (if any) is already in
//! the request extensions. Rejections are 401 with the standard error body.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::services::auth::{Principal, policy::Decision};
use crate::state::AppState;

pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, policy_middleware))
}

async fn policy_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let has_identity = req.extensions().get::<Principal>().is_some();

    let decision = state
        .policy
        .match_and_enforce(req.method(), req.uri().path(), has_identity);

    match decision {
        Decision::Allow => Ok(next.run(req).await),
        Decision::RejectUnauthenticated => {
            tracing::debug!(
                method = %req.method(),
                path = %req.uri().path(),
                "rejecting anonymous request to protected route"
            );
            Err(AppError::unauthorized())
        }
    }
}
