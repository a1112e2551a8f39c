/*
 * Responsibility
 * - shared context bound to the Router (AppState)
 * - Clone is cheap: everything inside is behind Arc
 * - read-only after startup; no per-request state lives here
 */
use std::sync::Arc;

use crate::repos::post_repo::PostRepo;
use crate::services::auth::{AuthService, policy::AccessPolicy};

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub policy: Arc<AccessPolicy>,
    pub posts: Arc<dyn PostRepo>,
}

impl AppState {
    pub fn new(auth: Arc<AuthService>, policy: Arc<AccessPolicy>, posts: Arc<dyn PostRepo>) -> Self {
        Self {
            auth,
            policy,
            posts,
        }
    }
}
