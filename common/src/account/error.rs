use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Password must be at least {min} characters")]
    WeakPassword { min: usize },

    #[error("Display name must not be empty")]
    MissingDisplayName,

    #[error("Email already in use: {0}")]
    EmailInUse(String),

    #[error("Wrong email or password")]
    InvalidCredentials,

    #[error("Account directory unavailable")]
    DirectoryUnavailable,
}
