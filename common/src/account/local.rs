use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use super::{AccountDirectory, AccountError, AccountService, UserIdentity};

/// One signed-in context (a browser tab). Clones share the same session.
#[derive(Clone)]
pub struct LocalAccountService {
    directory: AccountDirectory,
    session: Arc<watch::Sender<Option<UserIdentity>>>,
}

impl LocalAccountService {
    pub fn new(directory: AccountDirectory) -> Self {
        Self {
            directory,
            session: Arc::new(watch::Sender::new(None)),
        }
    }

    /// Creates the account and signs it in.
    pub fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<UserIdentity, AccountError> {
        let user = self.directory.register(email, password, display_name)?;
        self.session.send_replace(Some(user.clone()));
        Ok(user)
    }

    pub fn sign_in(&self, email: &str, password: &str) -> Result<UserIdentity, AccountError> {
        let user = self.directory.verify(email, password)?;
        info!("User {} signed in", user.user_id);
        self.session.send_replace(Some(user.clone()));
        Ok(user)
    }

    pub fn sign_out(&self) {
        if let Some(user) = self.session.send_replace(None) {
            info!("User {} signed out", user.user_id);
        }
    }
}

impl AccountService for LocalAccountService {
    fn current_user(&self) -> Option<UserIdentity> {
        self.session.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<UserIdentity>> {
        self.session.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_signs_in() {
        let service = LocalAccountService::new(AccountDirectory::new());
        assert!(!service.is_authenticated());

        let user = service.register("ana@example.com", "secret1", "Ana").unwrap();
        assert_eq!(service.current_user(), Some(user));
    }

    #[test]
    fn test_failed_sign_in_keeps_session() {
        let directory = AccountDirectory::new();
        directory.register("ana@example.com", "secret1", "Ana").unwrap();
        let service = LocalAccountService::new(directory);

        assert!(service.sign_in("ana@example.com", "wrong12").is_err());
        assert!(service.current_user().is_none());
    }

    #[test]
    fn test_sessions_are_independent() {
        let directory = AccountDirectory::new();
        directory.register("ana@example.com", "secret1", "Ana").unwrap();
        let tab_a = LocalAccountService::new(directory.clone());
        let tab_b = LocalAccountService::new(directory);

        tab_a.sign_in("ana@example.com", "secret1").unwrap();
        assert!(tab_a.is_authenticated());
        assert!(!tab_b.is_authenticated());
    }

    #[tokio::test]
    async fn test_subscribers_see_sign_in_and_out() {
        let directory = AccountDirectory::new();
        directory.register("ana@example.com", "secret1", "Ana").unwrap();
        let service = LocalAccountService::new(directory);
        let mut rx = service.subscribe();

        service.sign_in("ana@example.com", "secret1").unwrap();
        rx.changed().await.unwrap();
        let email = rx.borrow_and_update().as_ref().map(|u| u.email.clone());
        assert_eq!(email.as_deref(), Some("ana@example.com"));

        service.sign_out();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_none());
    }
}
