//! Shared fixtures for router-level tests: in-memory stores, a fixed secret.

use std::sync::Arc;

use axum::{Router, response::Response};
use serde_json::Value;

use crate::app::{build_router, state_from_parts};
use crate::config::Config;
use crate::repos::{MemoryPostRepo, MemoryUserRepo, user_repo::UserRepo};
use crate::services::auth::Principal;
use crate::state::AppState;

pub const TEST_SECRET: &str = "test-secret-key-that-is-at-least-32-bytes-long";
pub const TEST_PASSWORD: &str = "password123";

pub struct TestApp {
    pub config: Config,
    pub state: AppState,
    pub users: Arc<MemoryUserRepo>,
}

pub async fn app() -> TestApp {
    let config = Config::from_lookup(|key| match key {
        "JWT_SECRET" => Some(TEST_SECRET.to_string()),
        _ => None,
    })
    .unwrap();

    let users = Arc::new(MemoryUserRepo::new());
    let state = state_from_parts(&config, users.clone(), Arc::new(MemoryPostRepo::new())).unwrap();

    TestApp {
        config,
        state,
        users,
    }
}

impl TestApp {
    pub fn router(&self) -> Router {
        build_router(self.state.clone(), &self.config)
    }

    /// Registers `email` and returns a fresh token for it.
    pub async fn register(&self, email: &str) -> String {
        self.state
            .auth
            .register(email, TEST_PASSWORD, "Test User")
            .await
            .unwrap()
            .token
    }

    pub async fn principal(&self, email: &str) -> Principal {
        self.users.find_by_email(email).await.unwrap().unwrap()
    }
}

pub async fn json_body(res: Response) -> Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
