//! Identity service boundary.
//!
//! [`IdentityProvider`] is the single interface the rest of the crate talks
//! to. [`FirebaseIdentity`] calls the hosted identity service,
//! [`LocalIdentity`] is the deterministic offline implementation, and
//! [`UnavailableIdentity`] stands in when the hosted service cannot even be
//! configured.

pub mod firebase;
pub mod local;

pub use firebase::*;
pub use local::*;

use crate::domain::User;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Input the caller can fix, such as a short password.
    #[error("{0}")]
    Validation(String),
    /// The service understood the request and refused it.
    #[error("{0}")]
    Rejected(String),
    /// The service could not be reached or failed internally.
    #[error("Authentication service unavailable: {0}")]
    Unavailable(String),
    #[error("{0} is not supported by this identity provider")]
    Unsupported(&'static str),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// A signed-in user plus whatever tokens the provider needs to resume it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl AuthSession {
    pub fn new(user: User) -> Self {
        Self {
            user,
            id_token: None,
            refresh_token: None,
        }
    }
}

pub trait IdentityProvider {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Resumes a previously mirrored session. `Ok(None)` means signed out.
    fn restore(&self, saved: Option<&AuthSession>) -> AuthResult<Option<AuthSession>>;

    fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession>;

    fn sign_up(&self, email: &str, password: &str) -> AuthResult<AuthSession>;

    fn sign_out(&self, session: Option<&AuthSession>) -> AuthResult<()>;

    fn sign_in_with_federated(&self) -> AuthResult<AuthSession>;

    fn send_password_reset(&self, email: &str) -> AuthResult<()>;
}

/// Provider used when the hosted service has no usable configuration.
/// Every call fails with [`AuthError::Unavailable`].
#[derive(Debug, Clone)]
pub struct UnavailableIdentity {
    reason: String,
}

impl UnavailableIdentity {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }

    fn fail<T>(&self) -> AuthResult<T> {
        Err(AuthError::Unavailable(self.reason.clone()))
    }
}

impl IdentityProvider for UnavailableIdentity {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    fn restore(&self, _saved: Option<&AuthSession>) -> AuthResult<Option<AuthSession>> {
        self.fail()
    }

    fn sign_in(&self, _email: &str, _password: &str) -> AuthResult<AuthSession> {
        self.fail()
    }

    fn sign_up(&self, _email: &str, _password: &str) -> AuthResult<AuthSession> {
        self.fail()
    }

    fn sign_out(&self, _session: Option<&AuthSession>) -> AuthResult<()> {
        self.fail()
    }

    fn sign_in_with_federated(&self) -> AuthResult<AuthSession> {
        self.fail()
    }

    fn send_password_reset(&self, _email: &str) -> AuthResult<()> {
        self.fail()
    }
}
