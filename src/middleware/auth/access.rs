//! Request gateway: bearer token → verified principal in request extensions.
//!
//! Runs once per request, before the policy layer and before route dispatch.
//! It never rejects anything itself:
//! - no `Authorization: Bearer <token>` header → continue anonymously
//! - token present and valid, principal exists → `Principal` inserted into extensions
//! - any failure (malformed, bad signature, expired, principal gone, store error)
//!   → logged at warn, request continues anonymously
//!
//! Whether an anonymous request may proceed is decided by `middleware::auth::policy`.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Attach the identity gateway to `router`.
///
/// Must be applied *after* `policy::apply` so that it ends up as the outer layer.
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = bearer_token(req.headers()).map(str::to_owned);

    if let Some(token) = token {
        match state.auth.authenticate_token(&token).await {
            Ok(principal) => {
                tracing::debug!(user_id = %principal.id, "request authenticated");
                req.extensions_mut().insert(principal);
            }
            Err(err) => {
                tracing::warn!(kind = err.kind(), error = %err, "received invalid auth token");
            }
        }
    }

    next.run(req).await
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
}
