//! In-memory user directory.

use std::collections::HashMap;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::{AuthError, AuthResult};

#[derive(Debug, Clone)]
struct StoredUser {
    salt: String,
    password_mac: Vec<u8>,
}

/// Registered users, keyed by username. Not persisted.
///
/// Passwords are kept as HMAC-SHA256 digests keyed by a per-user salt and
/// verified in constant time. A dedicated password KDF (argon2, scrypt)
/// would be stronger.
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: HashMap<String, StoredUser>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, username: &str, password: &str) -> AuthResult<()> {
        if self.users.contains_key(username) {
            return Err(AuthError::UserExists);
        }

        let salt = uuid::Uuid::new_v4().simple().to_string();
        let password_mac = password_mac(&salt, password)
            .ok_or(AuthError::InvalidCredentials)?
            .finalize()
            .into_bytes()
            .to_vec();
        self.users
            .insert(username.to_string(), StoredUser { salt, password_mac });
        Ok(())
    }

    /// True only for an exact username and password match.
    pub fn check(&self, username: &str, password: &str) -> bool {
        let Some(user) = self.users.get(username) else {
            return false;
        };
        password_mac(&user.salt, password)
            .is_some_and(|mac| mac.verify_slice(&user.password_mac).is_ok())
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

type HmacSha256 = Hmac<Sha256>;

fn password_mac(salt: &str, password: &str) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(salt.as_bytes()).ok()?;
    mac.update(password.as_bytes());
    Some(mac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_check() {
        let mut users = UserDirectory::new();
        users.register("nurse", "pw").unwrap();

        assert!(users.contains("nurse"));
        assert!(users.check("nurse", "pw"));
        assert!(!users.check("nurse", "pw "));
        assert!(!users.check("Nurse", "pw"));
    }

    #[test]
    fn test_passwords_not_stored_in_plain_text() {
        let mut users = UserDirectory::new();
        users.register("a", "same").unwrap();
        users.register("b", "same").unwrap();

        let a = &users.users["a"];
        let b = &users.users["b"];
        assert_ne!(a.password_mac, b"same".to_vec());
        // Distinct salts give distinct digests for the same password
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.password_mac, b.password_mac);
        assert_eq!(users.len(), 2);
    }

    #[test]
    fn test_same_length_wrong_password_rejected() {
        let mut users = UserDirectory::new();
        users.register("nurse", "secret-1").unwrap();

        assert!(users.check("nurse", "secret-1"));
        assert!(!users.check("nurse", "secret-2"));
        assert!(!users.check("nurse", ""));
        assert!(!users.check("nobody", "secret-1"));
    }

    #[test]
    fn test_stored_digest_is_a_full_mac() {
        let mut users = UserDirectory::new();
        users.register("nurse", "pw").unwrap();

        assert_eq!(users.users["nurse"].password_mac.len(), 32);
    }
}
