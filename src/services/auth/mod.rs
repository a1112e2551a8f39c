pub mod credentials;
pub mod error;
pub mod identity;
pub mod policy;
pub mod principal;
pub mod token_codec;

pub use credentials::CredentialStore;
pub use error::AuthError;
pub use identity::IdentityResolver;
pub use principal::Principal;
pub use token_codec::TokenCodec;

use std::sync::Arc;

use crate::repos::user_repo::UserRepo;

/// Everything the auth endpoints and the request gateway need, built once at startup.
#[derive(Clone)]
pub struct AuthService {
    codec: TokenCodec,
    resolver: IdentityResolver,
    credentials: CredentialStore,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

/// What login/register hand back to the client.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: u64,
    pub principal: Principal,
}

impl AuthService {
    pub fn new(codec: TokenCodec, users: Arc<dyn UserRepo>) -> Self {
        Self {
            codec,
            resolver: IdentityResolver::new(users.clone()),
            credentials: CredentialStore::new(users),
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedToken, AuthError> {
        let principal = self.credentials.authenticate(email, password).await?;
        self.issue_for(principal)
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<IssuedToken, AuthError> {
        let principal = self
            .credentials
            .register(email, password, display_name)
            .await?;
        self.issue_for(principal)
    }

    /// Verify a bearer token and load its principal. Used by the gateway once per request.
    pub async fn authenticate_token(&self, token: &str) -> Result<Principal, AuthError> {
        let claims = self.codec.verify(token)?;
        self.resolver.resolve(&claims).await
    }

    fn issue_for(&self, principal: Principal) -> Result<IssuedToken, AuthError> {
        Ok(IssuedToken {
            token: self.codec.issue(&principal)?,
            expires_in: self.codec.ttl_seconds(),
            principal,
        })
    }
}
