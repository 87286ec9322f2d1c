use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rand::Rng;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::UserId;
use super::{AccountError, UserIdentity};

pub const MIN_PASSWORD_LEN: usize = 6;

struct StoredAccount {
    identity: UserIdentity,
    salt: String,
    password_hash: String,
}

/// Credential store shared by every session of the process. Keyed by
/// lower-cased email.
#[derive(Clone, Default)]
pub struct AccountDirectory {
    accounts: Arc<Mutex<HashMap<String, StoredAccount>>>,
}

impl std::fmt::Debug for AccountDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountDirectory").finish()
    }
}

impl AccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<UserIdentity, AccountError> {
        let key = normalize_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AccountError::WeakPassword { min: MIN_PASSWORD_LEN });
        }
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(AccountError::MissingDisplayName);
        }

        let mut accounts = self
            .accounts
            .lock()
            .map_err(|_| AccountError::DirectoryUnavailable)?;
        if accounts.contains_key(&key) {
            return Err(AccountError::EmailInUse(key));
        }

        let salt = random_hex(16);
        let identity = UserIdentity {
            user_id: UserId::new(random_hex(14)),
            email: key.clone(),
            display_name: Some(display_name.to_string()),
        };
        accounts.insert(
            key,
            StoredAccount {
                identity: identity.clone(),
                password_hash: hash_password(&salt, password),
                salt,
            },
        );
        info!(
            "Registered account {} ({}), {} accounts in total",
            identity.user_id,
            identity.email,
            accounts.len()
        );
        Ok(identity)
    }

    pub fn verify(&self, email: &str, password: &str) -> Result<UserIdentity, AccountError> {
        let key = normalize_email(email).map_err(|_| AccountError::InvalidCredentials)?;
        let accounts = self
            .accounts
            .lock()
            .map_err(|_| AccountError::DirectoryUnavailable)?;
        let account = accounts.get(&key).ok_or(AccountError::InvalidCredentials)?;
        if !digests_match(&hash_password(&account.salt, password), &account.password_hash) {
            return Err(AccountError::InvalidCredentials);
        }
        Ok(account.identity.clone())
    }
}

fn normalize_email(email: &str) -> Result<String, AccountError> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
        }
        None => false,
    };
    if valid {
        Ok(email)
    } else {
        Err(AccountError::InvalidEmail(email))
    }
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compares every byte so the time taken does not depend on where they differ.
fn digests_match(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let diff = a.bytes().zip(b.bytes()).fold(0u8, |diff, (x, y)| diff | (x ^ y));
    diff == 0
}

fn random_hex(bytes: usize) -> String {
    let mut rng = rand::rng();
    let raw: Vec<u8> = (0..bytes).map(|_| rng.random()).collect();
    hex::encode(raw)
}
