use std::sync::Arc;

use crate::repos::user_repo::UserRepo;
use crate::services::auth::{error::AuthError, principal::Principal, token_codec::Claims};

/// Turns verified claims into the current principal.
///
/// Runs on every authenticated request and never caches across requests: a token
/// stays cryptographically valid after its account is deleted, but resolution fails.
#[derive(Clone)]
pub struct IdentityResolver {
    users: Arc<dyn UserRepo>,
}

impl IdentityResolver {
    pub fn new(users: Arc<dyn UserRepo>) -> Self {
        Self { users }
    }

    pub async fn resolve(&self, claims: &Claims) -> Result<Principal, AuthError> {
        self.users
            .find_by_email(&claims.sub)
            .await?
            .ok_or(AuthError::PrincipalNotFound)
    }
}
