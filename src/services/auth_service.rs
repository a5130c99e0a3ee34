use std::collections::HashMap;

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    #[error("This account is not registered for a wallet")]
    UnknownCredential,
}

/// Resolves a request credential to a wallet user id.
///
/// With a table configured only listed credentials resolve. Without one the
/// gate is open and the credential is the user id.
#[derive(Debug, Clone)]
pub struct AuthGate {
    users: Option<HashMap<String, String>>,
}

impl AuthGate {
    pub fn with_users(users: HashMap<String, String>) -> Self {
        Self { users: Some(users) }
    }

    pub fn open() -> Self {
        Self { users: None }
    }

    pub fn is_open(&self) -> bool {
        self.users.is_none()
    }

    pub fn resolve(&self, credential: &str) -> Result<String, AuthError> {
        match &self.users {
            None => Ok(credential.to_string()),
            Some(users) => users.get(credential).cloned().ok_or_else(|| {
                warn!("Rejected unknown credential {}", credential);
                AuthError::UnknownCredential
            }),
        }
    }
}
