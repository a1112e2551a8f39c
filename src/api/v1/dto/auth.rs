/*
 * Responsibility
 * - login / register request and response DTOs
 * - validate() does shape checks only; credential checks live in the credential store
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::auth::{IssuedToken, Principal};

const MIN_PASSWORD_CHARS: usize = 8;

fn validate_email(email: &str) -> Result<(), &'static str> {
    let email = email.trim();
    if email.is_empty() {
        return Err("email is required");
    }
    if !email.contains('@') {
        return Err("email is invalid");
    }
    Ok(())
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err("password is required");
        }
        Ok(())
    }
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_email(&self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_CHARS {
            return Err("password must be at least 8 characters");
        }
        if self.name.trim().is_empty() {
            return Err("name is required");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    /// Seconds until the token expires.
    pub expires_in: u64,
    pub email: String,
    pub name: String,
}

impl From<IssuedToken> for AuthResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token: issued.token,
            expires_in: issued.expires_in,
            email: issued.principal.email,
            name: issued.principal.display_name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
}

impl From<Principal> for MeResponse {
    fn from(p: Principal) -> Self {
        Self {
            id: p.id,
            email: p.email,
            name: p.display_name,
            roles: p.roles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_validation() {
        let ok = RegisterRequest {
            email: "a@example.com".into(),
            password: "long-enough".into(),
            name: "A".into(),
        };
        assert!(ok.validate().is_ok());

        let short = RegisterRequest {
            password: "short".into(),
            ..ok
        };
        assert_eq!(
            short.validate(),
            Err("password must be at least 8 characters")
        );
    }

    #[test]
    fn login_validation() {
        let bad = LoginRequest {
            email: "no-at-sign".into(),
            password: "pw".into(),
        };
        assert_eq!(bad.validate(), Err("email is invalid"));

        let empty = LoginRequest {
            email: "a@example.com".into(),
            password: String::new(),
        };
        assert_eq!(empty.validate(), Err("password is required"));
    }
}
