mod directory;
mod error;
mod identity;
mod local;
mod service;

pub use directory::AccountDirectory;
pub use error::AccountError;
pub use identity::UserIdentity;
pub use local::LocalAccountService;
pub use service::AccountService;
