use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use aliri_clock::DurationSecs;
use aliri_tokens::backoff::ErrorBackoffConfig;
use aliri_tokens::jitter::RandomEarlyJitter;
use aliri_tokens::{TokenStatus, TokenWatcher};
use arc_swap::ArcSwap;
use async_trait::async_trait;

use crate::config::ClientSecretConfig;
use crate::credential::{AccessToken, TokenCredential, TokenRequestOptions};
use crate::error::CredentialError;
use crate::source::ClientSecretSource;

type Watchers = HashMap<String, Arc<TokenWatcher>>;

/// Service principal authenticated with a client secret.
///
/// One background watcher per scope set keeps a token fresh; the first
/// request for a scope set waits for the initial fetch, later requests read
/// the cached token without blocking. Clones share the cache.
#[derive(Clone)]
pub struct ClientSecretCredential {
    config: Arc<ClientSecretConfig>,
    client: armkit_http::HttpClient,
    watchers: Arc<ArcSwap<Watchers>>,
}

impl fmt::Debug for ClientSecretCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSecretCredential")
            .field("tenant_id", &self.config.tenant_id)
            .field("client_id", &self.config.client_id)
            .finish_non_exhaustive()
    }
}

impl ClientSecretCredential {
    /// No network traffic happens until the first [`get_token`](TokenCredential::get_token).
    ///
    /// # Errors
    /// [`CredentialError::Config`] for an invalid config,
    /// [`CredentialError::Http`] if the HTTP client cannot be built.
    pub fn new(config: ClientSecretConfig) -> Result<Self, CredentialError> {
        config.validate()?;
        config.token_endpoint()?;

        let http_config = config
            .http_config
            .clone()
            .unwrap_or_else(armkit_http::HttpClientConfig::token_endpoint);
        let client = armkit_http::HttpClientBuilder::with_config(http_config)
            .build()
            .map_err(|e| CredentialError::from_http(&e, "token client"))?;

        Ok(Self {
            config: Arc::new(config),
            client,
            watchers: Arc::new(ArcSwap::from_pointee(HashMap::new())),
        })
    }

    async fn watcher_for(&self, scope: &str) -> Result<Arc<TokenWatcher>, CredentialError> {
        if let Some(w) = self.watchers.load().get(scope) {
            return Ok(Arc::clone(w));
        }

        let source = ClientSecretSource::new(&self.config, self.client.clone(), scope.to_owned())?;
        let watcher = Arc::new(spawn_watcher(source, &self.config).await?);
        tracing::debug!(scope, "token watcher started");

        // A concurrent caller may have won the race; keep the first watcher.
        let mut winner = Arc::clone(&watcher);
        self.watchers.rcu(|current| {
            let mut next = Watchers::clone(current);
            winner = Arc::clone(
                next.entry(scope.to_owned())
                    .or_insert_with(|| Arc::clone(&watcher)),
            );
            next
        });
        Ok(winner)
    }
}

#[async_trait]
impl TokenCredential for ClientSecretCredential {
    async fn get_token(
        &self,
        options: &TokenRequestOptions,
    ) -> Result<AccessToken, CredentialError> {
        if options.scopes.is_empty() {
            return Err(CredentialError::Config(
                "at least one scope is required".into(),
            ));
        }
        let scope = options.scope_string();
        let watcher = self.watcher_for(&scope).await?;

        let borrowed = watcher.token();
        if matches!(borrowed.token_status(), TokenStatus::Expired) {
            return Err(CredentialError::Unavailable(
                "token expired, refresh pending".into(),
            ));
        }
        let expires_on = SystemTime::UNIX_EPOCH + Duration::from_secs(borrowed.expiry().0);
        Ok(AccessToken::new(borrowed.access_token().as_str(), expires_on))
    }

    /// Drops every watcher; the next request fetches a new token.
    fn invalidate(&self) {
        tracing::debug!(
            client_id = %self.config.client_id,
            "invalidating cached tokens"
        );
        self.watchers.store(Arc::new(HashMap::new()));
    }
}

async fn spawn_watcher(
    source: ClientSecretSource,
    config: &ClientSecretConfig,
) -> Result<TokenWatcher, CredentialError> {
    let jitter = RandomEarlyJitter::new(DurationSecs(config.jitter_max.as_secs()));
    let backoff =
        ErrorBackoffConfig::new(config.min_refresh_period, config.min_refresh_period * 30, 2);
    TokenWatcher::spawn_from_token_source(source, jitter, backoff).await
}
