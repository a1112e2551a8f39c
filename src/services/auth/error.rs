use thiserror::Error;

use crate::repos::error::RepoError;

/// Failures of the authentication core.
///
/// The first four kinds come out of the gateway path and are never surfaced to the
/// client: the gateway logs them and carries on with no identity attached.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("principal not found")]
    PrincipalNotFound,

    #[error("bad credentials")]
    BadCredentials,
    #[error("email already in use")]
    EmailAlreadyInUse,

    #[error("signing key misconfigured: {0}")]
    KeyMisconfigured(&'static str),
    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("user store failure")]
    Store(#[from] RepoError),
}

impl AuthError {
    /// Short, stable label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::InvalidSignature => "invalid_signature",
            Self::Expired => "expired",
            Self::PrincipalNotFound => "principal_not_found",
            Self::BadCredentials => "bad_credentials",
            Self::EmailAlreadyInUse => "email_already_in_use",
            Self::KeyMisconfigured(_) => "key_misconfigured",
            Self::Signing(_) => "signing",
            Self::Hashing(_) => "hashing",
            Self::Store(_) => "store",
        }
    }
}
