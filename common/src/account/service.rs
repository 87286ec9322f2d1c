use tokio::sync::watch;

use super::UserIdentity;

/// Read side of an authenticated session. The engine only ever asks who is
/// signed in; signing in and out belongs to the implementation.
pub trait AccountService: Send + Sync + Clone + 'static {
    fn current_user(&self) -> Option<UserIdentity>;

    /// Fires whenever the signed-in user changes, including sign-out.
    fn subscribe(&self) -> watch::Receiver<Option<UserIdentity>>;

    fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }
}
