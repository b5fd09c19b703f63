use std::time::{Duration, SystemTime};

use async_trait::async_trait;

use crate::credential::{AccessToken, TokenCredential, TokenRequestOptions};
use crate::error::CredentialError;

/// A token acquired elsewhere (CLI login, CI secret, tests). Scopes are ignored.
#[derive(Clone, Debug)]
pub struct StaticTokenCredential {
    token: AccessToken,
}

impl StaticTokenCredential {
    /// Treated as valid for one hour from now.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_expiry(token, SystemTime::now() + Duration::from_secs(3600))
    }

    pub fn with_expiry(token: impl Into<String>, expires_on: SystemTime) -> Self {
        Self {
            token: AccessToken::new(token, expires_on),
        }
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn get_token(
        &self,
        _options: &TokenRequestOptions,
    ) -> Result<AccessToken, CredentialError> {
        if self.token.expires_within(Duration::ZERO) {
            return Err(CredentialError::Unavailable(
                "static token has expired".into(),
            ));
        }
        Ok(self.token.clone())
    }
}
