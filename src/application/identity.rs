//! Current-user state on top of an [`IdentityProvider`].
//!
//! Outside production the adapter carries a [`LocalIdentity`] in reserve. The
//! first failure of the primary provider swaps it in for the rest of the
//! process and the failed call is retried once against it. That swap happens
//! in [`IdentityAdapter::run`] and nowhere else.

use crate::config::Environment;
use crate::domain::User;
use crate::infrastructure::{
    load, save, AuthResult, AuthSession, IdentityProvider, KeyValueStore, LocalIdentity,
    Partition, PersistenceResult,
};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Loading,
    Authenticated(User),
    Anonymous,
    Error(String),
}

pub struct IdentityAdapter {
    provider: Box<dyn IdentityProvider>,
    fallback: Option<LocalIdentity>,
    using_fallback: bool,
    storage: Rc<dyn KeyValueStore>,
    session: Option<AuthSession>,
    state: AuthState,
}

impl IdentityAdapter {
    pub fn new(
        primary: Box<dyn IdentityProvider>,
        environment: Environment,
        storage: Rc<dyn KeyValueStore>,
    ) -> Self {
        let fallback = (!environment.is_production()).then(LocalIdentity::new);
        Self {
            provider: primary,
            fallback,
            using_fallback: false,
            storage,
            session: None,
            state: AuthState::Loading,
        }
    }

    /// Adapter that only ever uses the local provider.
    pub fn offline(storage: Rc<dyn KeyValueStore>) -> Self {
        Self {
            provider: Box::new(LocalIdentity::new()),
            fallback: None,
            using_fallback: true,
            storage,
            session: None,
            state: AuthState::Loading,
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn current_user(&self) -> Option<&User> {
        match &self.state {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_using_fallback(&self) -> bool {
        self.using_fallback
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Resolves the `Loading` state from the mirrored session.
    ///
    /// Fails only when the `user` partition exists but cannot be decoded.
    pub fn initialize(&mut self) -> PersistenceResult<()> {
        let saved: Option<AuthSession> = load(self.storage.as_ref(), Partition::User)?;
        let was_fallback = self.using_fallback;

        match self.run("restore", |p| p.restore(saved.as_ref())) {
            Ok(Some(session)) => {
                self.establish(session);
            }
            Ok(None) if self.using_fallback && !was_fallback => {
                self.establish(LocalIdentity::default_session());
            }
            Ok(None) => {
                self.session = None;
                self.state = AuthState::Anonymous;
            }
            Err(err) => {
                tracing::error!(error = %err, "identity initialisation failed");
                self.session = None;
                self.state = AuthState::Error(err.to_string());
            }
        }
        Ok(())
    }

    pub fn sign_in(&mut self, email: &str, password: &str) -> AuthResult<User> {
        let session = self.run("sign_in", |p| p.sign_in(email, password))?;
        Ok(self.establish(session))
    }

    pub fn sign_up(&mut self, email: &str, password: &str) -> AuthResult<User> {
        let session = self.run("sign_up", |p| p.sign_up(email, password))?;
        Ok(self.establish(session))
    }

    pub fn sign_in_with_federated(&mut self) -> AuthResult<User> {
        let session = self.run("sign_in_with_federated", |p| p.sign_in_with_federated())?;
        Ok(self.establish(session))
    }

    pub fn sign_out(&mut self) -> AuthResult<()> {
        let session = self.session.clone();
        self.run("sign_out", |p| p.sign_out(session.as_ref()))?;
        self.session = None;
        self.state = AuthState::Anonymous;
        if let Err(err) = self.storage.remove(Partition::User) {
            tracing::warn!(error = %err, "failed to clear mirrored user");
        }
        tracing::info!("signed out");
        Ok(())
    }

    pub fn send_password_reset(&mut self, email: &str) -> AuthResult<()> {
        self.run("send_password_reset", |p| p.send_password_reset(email))
    }

    /// Calls `call` on the current provider. If it fails while a fallback is
    /// still in reserve, the fallback becomes the provider and `call` runs
    /// once more against it.
    fn run<T>(&mut self, operation: &str, call: impl Fn(&dyn IdentityProvider) -> AuthResult<T>) -> AuthResult<T> {
        match call(self.provider.as_ref()) {
            Err(err) => match self.fallback.take() {
                Some(local) => {
                    tracing::warn!(
                        operation,
                        provider = self.provider.name(),
                        error = %err,
                        "identity provider failed, switching to local fallback"
                    );
                    self.provider = Box::new(local);
                    self.using_fallback = true;
                    call(self.provider.as_ref())
                }
                None => Err(err),
            },
            ok => ok,
        }
    }

    fn establish(&mut self, session: AuthSession) -> User {
        let user = session.user.clone();
        if let Err(err) = save(self.storage.as_ref(), Partition::User, &session) {
            tracing::warn!(error = %err, "failed to mirror signed-in user");
        }
        tracing::info!(uid = %user.uid, provider = self.provider.name(), "signed in");
        self.session = Some(session);
        self.state = AuthState::Authenticated(user.clone());
        user
    }
}
