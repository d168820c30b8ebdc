//! Authentication: sign-up, login and bearer credential verification.
//!
//! Callers are either signed in or not; there are no roles. Two credential
//! kinds are accepted:
//!
//! - **Local** tokens, HMAC-signed by [`LocalTokenSigner`] at login.
//! - **External** identity-provider tokens, checked by a pluggable
//!   [`ExternalIdentityValidator`]. The default validator trusts them without
//!   any cryptographic check; see [`TrustingExternalValidator`].

mod external;
mod token;
mod users;

pub use external::*;
pub use token::*;
pub use users::*;

use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Log target for authentication events.
pub const AUTHENTICATION: &str = "authentication";

/// Tokens longer than this that were not issued locally are treated as
/// external identity tokens.
pub const EXTERNAL_TOKEN_MIN_LEN: usize = 500;

/// Authentication errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Username and password are required")]
    MissingCredentials,

    #[error("User exists")]
    UserExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("External identity tokens are not accepted")]
    ExternalTokenRejected,
}

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialKind {
    Local,
    External,
}

/// A bearer credential, tagged by who issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential<'a> {
    Local(&'a str),
    External(&'a str),
}

impl<'a> Credential<'a> {
    /// Tag a raw bearer token.
    ///
    /// Tokens carrying the local prefix are always local. Otherwise anything
    /// longer than [`EXTERNAL_TOKEN_MIN_LEN`] is external, and the rest is
    /// treated as local so it fails signature verification.
    pub fn classify(token: &'a str) -> Self {
        if token.starts_with(LOCAL_TOKEN_PREFIX) || token.len() <= EXTERNAL_TOKEN_MIN_LEN {
            Credential::Local(token)
        } else {
            Credential::External(token)
        }
    }

    pub fn kind(&self) -> CredentialKind {
        match self {
            Credential::Local(_) => CredentialKind::Local,
            Credential::External(_) => CredentialKind::External,
        }
    }
}

/// Who a verified credential belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub kind: CredentialKind,
}

/// Issues and verifies bearer credentials.
pub struct AuthService {
    users: Mutex<UserDirectory>,
    signer: LocalTokenSigner,
    external: Box<dyn ExternalIdentityValidator>,
}

impl AuthService {
    pub fn new(secret: &[u8], external: Box<dyn ExternalIdentityValidator>) -> Self {
        Self {
            users: Mutex::new(UserDirectory::new()),
            signer: LocalTokenSigner::new(secret),
            external,
        }
    }

    /// Service that trusts external identity tokens.
    pub fn with_secret(secret: &[u8]) -> Self {
        Self::new(secret, Box::new(TrustingExternalValidator))
    }

    /// Register a new user. Users live in memory only.
    pub fn signup(&self, username: &str, password: &str) -> AuthResult<()> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let mut users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        users.register(username, password)?;
        info!(target: AUTHENTICATION, username, "user signed up");
        Ok(())
    }

    /// Check credentials and issue a non-expiring local token.
    pub fn login(&self, username: &str, password: &str) -> AuthResult<String> {
        let users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        if !users.check(username, password) {
            warn!(target: AUTHENTICATION, username, "failed login");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.signer.issue(username)?;
        info!(target: AUTHENTICATION, username, "user logged in");
        Ok(token)
    }

    /// Verify a bearer token.
    pub fn verify(&self, token: &str) -> AuthResult<Identity> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let credential = Credential::classify(token);
        debug!(target: AUTHENTICATION, kind = ?credential.kind(), "verifying credential");

        match credential {
            Credential::Local(token) => {
                let claims = self.signer.verify(token)?;
                Ok(Identity {
                    username: claims.sub,
                    kind: CredentialKind::Local,
                })
            }
            Credential::External(token) => self.external.validate(token),
        }
    }
}
