//! Email/password verification and registration.
//!
//! - Passwords are stored as Argon2id PHC strings
//! - Hashing and verification are CPU-bound, so they run on the blocking pool
//! - Unknown email and wrong password are indistinguishable to the caller, in result
//!   and in cost: an unknown email is checked against a throwaway hash

use std::sync::{Arc, OnceLock};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use tracing::{info, warn};

use crate::repos::{error::RepoError, user_repo::NewUser, user_repo::UserRepo};
use crate::services::auth::{
    error::AuthError,
    principal::{Principal, normalize_email},
};

const SALT_BYTES: usize = 16;

const DUMMY_PASSWORD: &str = "unknown-email-placeholder";

static DUMMY_PHC: OnceLock<String> = OnceLock::new();

// Hashed once with the same parameters as real passwords.
fn dummy_phc() -> &'static str {
    DUMMY_PHC.get_or_init(|| hash_password(DUMMY_PASSWORD).unwrap_or_default())
}

#[derive(Clone)]
pub struct CredentialStore {
    users: Arc<dyn UserRepo>,
}

impl CredentialStore {
    pub fn new(users: Arc<dyn UserRepo>) -> Self {
        Self { users }
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        let email = normalize_email(email);

        let found = self.users.find_by_email(&email).await?;

        let hash = found.as_ref().map(|p| p.password_hash().to_string());
        let password = password.to_string();
        let matches = tokio::task::spawn_blocking(move || match hash {
            Some(hash) => verify_password(&hash, &password),
            None => {
                verify_password(dummy_phc(), &password);
                false
            }
        })
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?;

        let Some(principal) = found else {
            info!(email = %email, "login for unknown email");
            return Err(AuthError::BadCredentials);
        };

        if !matches {
            info!(email = %email, "login with wrong password");
            return Err(AuthError::BadCredentials);
        }

        Ok(principal)
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Principal, AuthError> {
        let email = normalize_email(email);

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailAlreadyInUse);
        }

        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))??;

        let created = self
            .users
            .create(NewUser {
                email: email.clone(),
                display_name: display_name.trim().to_string(),
                password_hash,
            })
            .await;

        match created {
            Ok(principal) => {
                info!(user_id = %principal.id, "registered new user");
                Ok(principal)
            }
            // lost a race against a concurrent registration
            Err(RepoError::Conflict) => {
                warn!(email = %email, "registration hit unique constraint");
                Err(AuthError::EmailAlreadyInUse)
            }
            Err(e) => Err(e.into()),
        }
    }
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let mut salt_bytes = [0u8; SALT_BYTES];
    getrandom::fill(&mut salt_bytes).map_err(|e| AuthError::Hashing(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| AuthError::Hashing(e.to_string()))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|phc| phc.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

pub fn verify_password(phc: &str, password: &str) -> bool {
    match PasswordHash::new(phc) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::memory::MemoryUserRepo;

    fn store() -> CredentialStore {
        CredentialStore::new(Arc::new(MemoryUserRepo::new()))
    }

    #[test]
    fn hash_then_verify() {
        let phc = hash_password("correct horse").unwrap();

        assert!(phc.starts_with("$argon2id$"));
        assert!(verify_password(&phc, "correct horse"));
        assert!(!verify_password(&phc, "battery staple"));
        assert!(!verify_password("not-a-phc-string", "correct horse"));
    }

    #[test]
    fn same_password_gets_different_salts() {
        assert_ne!(hash_password("pw").unwrap(), hash_password("pw").unwrap());
    }

    #[tokio::test]
    async fn register_then_authenticate() {
        let store = store();
        let registered = store
            .register("User@Example.com", "password123", " User ")
            .await
            .unwrap();
        assert_eq!(registered.email, "user@example.com");
        assert_eq!(registered.display_name, "User");

        let principal = store
            .authenticate("user@example.com", "password123")
            .await
            .unwrap();
        assert_eq!(principal.id, registered.id);
    }

    #[tokio::test]
    async fn email_match_is_case_insensitive() {
        let store = store();
        store
            .register("user@example.com", "password123", "User")
            .await
            .unwrap();

        assert!(
            store
                .authenticate("  USER@example.COM", "password123")
                .await
                .is_ok()
        );
        assert!(matches!(
            store.register("User@Example.com", "password456", "Again").await,
            Err(AuthError::EmailAlreadyInUse)
        ));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_bad_credentials() {
        let store = store();
        store
            .register("user@example.com", "password123", "User")
            .await
            .unwrap();

        assert!(matches!(
            store.authenticate("user@example.com", "nope").await,
            Err(AuthError::BadCredentials)
        ));
        assert!(matches!(
            store.authenticate("nobody@example.com", "password123").await,
            Err(AuthError::BadCredentials)
        ));
    }

    #[test]
    fn unknown_email_check_runs_a_real_argon2_verification() {
        let phc = dummy_phc();
        let real = hash_password("password123").unwrap();

        // same algorithm and cost parameters as a stored password
        let params = |s: &str| s.split('$').take(4).collect::<Vec<_>>().join("$");
        assert!(phc.starts_with("$argon2id$"));
        assert_eq!(params(phc), params(&real));
        assert!(verify_password(phc, DUMMY_PASSWORD));
    }

    #[tokio::test]
    async fn placeholder_password_does_not_unlock_unknown_emails() {
        let store = store();

        assert!(matches!(
            store.authenticate("nobody@example.com", DUMMY_PASSWORD).await,
            Err(AuthError::BadCredentials)
        ));
    }
}
