use super::DEFAULT_AUTH_SECRET;
use iv_drips_core::auth::{
    AuthService, ExternalIdentityValidator, RejectingExternalValidator, TrustingExternalValidator,
};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct AuthConfig {
    /// HMAC key for locally issued tokens
    #[serde(default = "AuthConfig::default_secret")]
    pub secret: String,

    /// Accept external provider tokens without verifying them.
    #[serde(default = "AuthConfig::default_trust_external_tokens")]
    pub trust_external_tokens: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig {
            secret: AuthConfig::default_secret(),
            trust_external_tokens: AuthConfig::default_trust_external_tokens(),
        }
    }
}

impl AuthConfig {
    pub fn default_secret() -> String {
        DEFAULT_AUTH_SECRET.to_string()
    }

    pub fn default_trust_external_tokens() -> bool {
        true
    }

    pub fn uses_default_secret(&self) -> bool {
        self.secret == DEFAULT_AUTH_SECRET
    }

    pub fn service(&self) -> AuthService {
        let external: Box<dyn ExternalIdentityValidator> = if self.trust_external_tokens {
            Box::new(TrustingExternalValidator)
        } else {
            Box::new(RejectingExternalValidator)
        };
        AuthService::new(self.secret.as_bytes(), external)
    }
}
