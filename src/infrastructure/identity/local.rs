use super::{AuthError, AuthResult, AuthSession, IdentityProvider};
use crate::domain::User;

pub const MOCK_USER_ID: &str = "mock-user-123";
pub const MIN_PASSWORD_LEN: usize = 6;

struct DemoAccount {
    email: &'static str,
    password: &'static str,
    display_name: &'static str,
}

const DEMO_ACCOUNTS: [DemoAccount; 2] = [
    DemoAccount {
        email: "demo@gymrat.com",
        password: "demo123",
        display_name: "Demo Client",
    },
    DemoAccount {
        email: "admin@gymrat.com",
        password: "demo123",
        display_name: "Demo Admin",
    },
];

/// Deterministic identity provider that never touches the network.
///
/// Used as the fallback outside production and for offline runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalIdentity;

impl LocalIdentity {
    pub fn new() -> Self {
        Self
    }

    pub fn mock_user(email: Option<&str>, display_name: Option<&str>, photo_url: Option<&str>) -> User {
        User {
            uid: MOCK_USER_ID.to_string(),
            display_name: Some(display_name.unwrap_or("Demo User").to_string()),
            email: Some(email.unwrap_or("user@example.com").to_string()),
            photo_url: photo_url.map(str::to_string),
        }
    }

    /// Session handed out when the hosted service fails to initialise.
    pub fn default_session() -> AuthSession {
        AuthSession::new(Self::mock_user(None, None, None))
    }

    fn check_password(password: &str) -> AuthResult<()> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "Password should be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        Ok(())
    }
}

impl IdentityProvider for LocalIdentity {
    fn name(&self) -> &'static str {
        "local"
    }

    fn restore(&self, saved: Option<&AuthSession>) -> AuthResult<Option<AuthSession>> {
        Ok(saved.cloned())
    }

    fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        if let Some(demo) = DEMO_ACCOUNTS
            .iter()
            .find(|a| a.email == email && a.password == password)
        {
            return Ok(AuthSession::new(Self::mock_user(
                Some(demo.email),
                Some(demo.display_name),
                None,
            )));
        }
        Self::check_password(password)?;
        Ok(AuthSession::new(Self::mock_user(Some(email), None, None)))
    }

    fn sign_up(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        Self::check_password(password)?;
        Ok(AuthSession::new(Self::mock_user(Some(email), None, None)))
    }

    fn sign_out(&self, _session: Option<&AuthSession>) -> AuthResult<()> {
        Ok(())
    }

    fn sign_in_with_federated(&self) -> AuthResult<AuthSession> {
        Ok(AuthSession::new(Self::mock_user(
            Some("google-user@gmail.com"),
            Some("Google User"),
            Some("https://lh3.googleusercontent.com/a/default-user"),
        )))
    }

    fn send_password_reset(&self, email: &str) -> AuthResult<()> {
        if !email.contains('@') {
            return Err(AuthError::Validation("Invalid email address".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_accounts() {
        let local = LocalIdentity::new();
        let client = local.sign_in("demo@gymrat.com", "demo123").unwrap();
        assert_eq!(client.user.display_name.as_deref(), Some("Demo Client"));
        assert_eq!(client.user.email.as_deref(), Some("demo@gymrat.com"));

        let admin = local.sign_in("admin@gymrat.com", "demo123").unwrap();
        assert_eq!(admin.user.display_name.as_deref(), Some("Demo Admin"));
    }

    #[test]
    fn test_other_sign_in_requires_password_length() {
        let local = LocalIdentity::new();
        let err = local.sign_in("someone@example.com", "abc").unwrap_err();
        assert_eq!(err, AuthError::Validation("Password should be at least 6 characters".to_string()));

        let session = local.sign_in("someone@example.com", "abcdef").unwrap();
        assert_eq!(session.user.email.as_deref(), Some("someone@example.com"));
        assert_eq!(session.user.display_name.as_deref(), Some("Demo User"));
        assert_eq!(session.user.uid, MOCK_USER_ID);
    }

    #[test]
    fn test_sign_up_validates_password() {
        let local = LocalIdentity::new();
        assert!(matches!(local.sign_up("a@b.c", "12345"), Err(AuthError::Validation(_))));
        assert!(local.sign_up("a@b.c", "123456").is_ok());
    }

    #[test]
    fn test_federated_sign_in() {
        let session = LocalIdentity::new().sign_in_with_federated().unwrap();
        assert_eq!(session.user.display_name.as_deref(), Some("Google User"));
        assert!(session.user.photo_url.is_some());
    }

    #[test]
    fn test_password_reset_requires_at_sign() {
        let local = LocalIdentity::new();
        assert!(local.send_password_reset("nobody").is_err());
        assert!(local.send_password_reset("a@b.c").is_ok());
    }

    #[test]
    fn test_restore_returns_saved_session() {
        let local = LocalIdentity::new();
        assert_eq!(local.restore(None).unwrap(), None);
        let saved = LocalIdentity::default_session();
        assert_eq!(local.restore(Some(&saved)).unwrap(), Some(saved));
    }
}
