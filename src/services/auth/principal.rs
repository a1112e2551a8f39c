use std::fmt;

use uuid::Uuid;

pub const DEFAULT_ROLE: &str = "USER";

/// The authenticated user as the rest of the application sees it.
///
/// - Built by the user store (registration, login, identity resolution)
/// - Attached to request extensions by the gateway; handlers only ever read it
/// - `email` is stored normalized (see [`normalize_email`]), which makes lookups case-insensitive
#[derive(Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub roles: Vec<String>,
    password_hash: String,
}

impl Principal {
    pub fn new(
        id: Uuid,
        email: impl Into<String>,
        display_name: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            display_name: display_name.into(),
            roles: vec![DEFAULT_ROLE.to_string()],
            password_hash: password_hash.into(),
        }
    }

    /// PHC string produced by the credential store. Opaque to everything else.
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the password hash
        f.debug_struct("Principal")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("roles", &self.roles)
            .finish()
    }
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}
