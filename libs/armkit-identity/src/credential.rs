use std::time::{Duration, SystemTime};

use async_trait::async_trait;

use crate::error::CredentialError;
use crate::secret::SecretString;

/// Bearer token plus the moment it stops being valid.
#[derive(Clone, Debug)]
pub struct AccessToken {
    pub token: SecretString,
    pub expires_on: SystemTime,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_on: SystemTime) -> Self {
        Self {
            token: SecretString::new(token),
            expires_on,
        }
    }

    /// `true` when the token expires within `window` of now (or already has).
    #[must_use]
    pub fn expires_within(&self, window: Duration) -> bool {
        self.expires_on
            .duration_since(SystemTime::now())
            .map_or(true, |left| left <= window)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenRequestOptions {
    pub scopes: Vec<String>,
}

impl TokenRequestOptions {
    #[must_use]
    pub fn for_scope(scope: impl Into<String>) -> Self {
        Self {
            scopes: vec![scope.into()],
        }
    }

    /// Space-separated scope list, as sent in the `scope` form field.
    #[must_use]
    pub fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }
}

/// Source of bearer tokens for outbound requests.
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// # Errors
    /// [`CredentialError`] when no usable token can be produced.
    async fn get_token(&self, options: &TokenRequestOptions)
    -> Result<AccessToken, CredentialError>;

    /// Forget cached tokens, e.g. after the service rejected one.
    fn invalidate(&self) {}
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_expires_within() {
        let soon = AccessToken::new("t", SystemTime::now() + Duration::from_secs(60));
        assert!(soon.expires_within(Duration::from_secs(300)));
        assert!(!soon.expires_within(Duration::from_secs(10)));

        let past = AccessToken::new("t", SystemTime::UNIX_EPOCH);
        assert!(past.expires_within(Duration::ZERO));
    }

    #[test]
    fn test_scope_string_joins_with_spaces() {
        let opts = TokenRequestOptions {
            scopes: vec!["a/.default".into(), "offline_access".into()],
        };
        assert_eq!(opts.scope_string(), "a/.default offline_access");
        assert_eq!(
            TokenRequestOptions::for_scope("https://management.core.windows.net//.default").scopes,
            vec!["https://management.core.windows.net//.default".to_owned()]
        );
    }

    #[test]
    fn test_access_token_debug_hides_value() {
        let t = AccessToken::new("eyJ0eXAiOiJKV1QiLCJhbGci", SystemTime::now());
        assert!(!format!("{t:?}").contains("eyJ0"));
    }
}
