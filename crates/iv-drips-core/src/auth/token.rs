//! Locally signed bearer tokens.
//!
//! Shape: `ivd1.<hex claims json>.<hex HMAC-SHA256 of the first two parts>`.
//! Tokens carry no expiry.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::{AuthError, AuthResult};

/// Prefix identifying tokens issued by [`LocalTokenSigner`].
pub const LOCAL_TOKEN_PREFIX: &str = "ivd1.";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Username
    pub sub: String,
    /// Issued at, epoch seconds
    pub iat: i64,
}

/// Signs and verifies local tokens with a shared secret.
pub struct LocalTokenSigner {
    secret: Vec<u8>,
}

impl LocalTokenSigner {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            secret: secret.to_vec(),
        }
    }

    pub fn issue(&self, username: &str) -> AuthResult<String> {
        let claims = TokenClaims {
            sub: username.to_string(),
            iat: chrono::Utc::now().timestamp(),
        };
        let claims_json = serde_json::to_vec(&claims)
            .map_err(|e| AuthError::InvalidToken(format!("unencodable claims: {e}")))?;

        let message = format!("{}{}", LOCAL_TOKEN_PREFIX, hex::encode(claims_json));
        let signature = self.mac(&message)?.finalize().into_bytes();
        Ok(format!("{}.{}", message, hex::encode(signature)))
    }

    pub fn verify(&self, token: &str) -> AuthResult<TokenClaims> {
        let body = token
            .strip_prefix(LOCAL_TOKEN_PREFIX)
            .ok_or_else(|| malformed("unknown token format"))?;
        let (claims_hex, signature_hex) = body
            .split_once('.')
            .ok_or_else(|| malformed("missing signature"))?;

        let signature = hex::decode(signature_hex).map_err(|_| malformed("bad signature encoding"))?;
        let message = &token[..LOCAL_TOKEN_PREFIX.len() + claims_hex.len()];
        self.mac(message)?
            .verify_slice(&signature)
            .map_err(|_| malformed("signature mismatch"))?;

        let claims_json = hex::decode(claims_hex).map_err(|_| malformed("bad claims encoding"))?;
        serde_json::from_slice(&claims_json).map_err(|_| malformed("bad claims"))
    }

    fn mac(&self, message: &str) -> AuthResult<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| AuthError::InvalidToken(format!("unusable secret: {e}")))?;
        mac.update(message.as_bytes());
        Ok(mac)
    }
}

fn malformed(reason: &str) -> AuthError {
    AuthError::InvalidToken(reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify() {
        let signer = LocalTokenSigner::new(b"secret");
        let token = signer.issue("nurse").unwrap();

        assert!(token.starts_with(LOCAL_TOKEN_PREFIX));
        assert_eq!(signer.verify(&token).unwrap().sub, "nurse");
    }

    #[test]
    fn test_tampered_claims_rejected() {
        let signer = LocalTokenSigner::new(b"secret");
        let token = signer.issue("nurse").unwrap();
        let (_, signature) = token.rsplit_once('.').unwrap();

        let forged_claims = hex::encode(br#"{"sub":"admin","iat":0}"#);
        let forged = format!("{}{}.{}", LOCAL_TOKEN_PREFIX, forged_claims, signature);
        assert!(signer.verify(&forged).is_err());
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let signer = LocalTokenSigner::new(b"secret");
        for token in ["", "ivd1.", "ivd1.abcd", "ivd1.zz.zz", "eyJhbGciOi.x.y"] {
            assert!(signer.verify(token).is_err(), "accepted {token:?}");
        }
    }
}
