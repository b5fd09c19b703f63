use std::time::Duration;

use aliri_clock::DurationSecs;
use aliri_tokens::sources::AsyncTokenSource;
use aliri_tokens::{AccessToken, IdToken, TokenLifetimeConfig, TokenWithLifetime};
use async_trait::async_trait;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use crate::config::ClientSecretConfig;
use crate::error::CredentialError;
use crate::secret::SecretString;

const CONTEXT: &str = "token request";

/// Deserialize-only so a token can never be serialized into a log.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    token_type: Option<String>,
}

/// `client_credentials` exchange for a single scope set, driven by an
/// `aliri_tokens` watcher.
pub struct ClientSecretSource {
    client: armkit_http::HttpClient,
    token_endpoint: Url,
    client_id: String,
    client_secret: SecretString,
    scope: String,
    default_ttl: Duration,
    refresh_offset: Duration,
    min_refresh_period: Duration,
}

impl ClientSecretSource {
    pub(crate) fn new(
        config: &ClientSecretConfig,
        client: armkit_http::HttpClient,
        scope: String,
    ) -> Result<Self, CredentialError> {
        Ok(Self {
            client,
            token_endpoint: config.token_endpoint()?,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            scope,
            default_ttl: config.default_ttl,
            refresh_offset: config.refresh_offset,
            min_refresh_period: config.min_refresh_period,
        })
    }
}

#[async_trait]
impl AsyncTokenSource for ClientSecretSource {
    type Error = CredentialError;

    async fn request_token(&mut self) -> Result<TokenWithLifetime, Self::Error> {
        let secret = Zeroizing::new(self.client_secret.expose().to_owned());
        let fields: [(&str, &str); 4] = [
            ("grant_type", "client_credentials"),
            ("client_id", &self.client_id),
            ("client_secret", &secret),
            ("scope", &self.scope),
        ];

        tracing::debug!(
            endpoint = %self.token_endpoint,
            scope = %self.scope,
            "requesting access token"
        );

        let response = self
            .client
            .post(self.token_endpoint.as_str())
            .header("accept", "application/json")
            .form(&fields)
            .map_err(|e| CredentialError::from_http(&e, CONTEXT))?
            .send()
            .await
            .map_err(|e| CredentialError::from_http(&e, CONTEXT))?;

        let token_resp: TokenResponse = response
            .error_for_status()
            .map_err(|e| CredentialError::from_http(&e, CONTEXT))?
            .json()
            .await
            .map_err(|e| match e {
                armkit_http::HttpError::Json(err) => {
                    CredentialError::InvalidResponse(err.to_string())
                }
                other => CredentialError::from_http(&other, CONTEXT),
            })?;

        if let Some(ref tt) = token_resp.token_type
            && !tt.eq_ignore_ascii_case("bearer")
        {
            return Err(CredentialError::UnsupportedTokenType(tt.clone()));
        }
        if token_resp.access_token.is_empty() {
            return Err(CredentialError::InvalidResponse(
                "access_token is empty".into(),
            ));
        }

        let lifetime_secs = token_resp
            .expires_in
            .unwrap_or(self.default_ttl.as_secs());
        let (freshness, min_stale) =
            refresh_params(lifetime_secs, self.refresh_offset, self.min_refresh_period);
        let lifetime_config = TokenLifetimeConfig::new(freshness, min_stale);

        Ok(lifetime_config.create_token(
            &AccessToken::new(token_resp.access_token),
            None::<&IdToken>,
            DurationSecs(lifetime_secs),
        ))
    }
}

/// `(freshness_period, min_staleness_period)` for [`TokenLifetimeConfig`].
///
/// The token goes stale `refresh_offset` before expiry, or at half its
/// lifetime when it lives shorter than the offset. The stale point never
/// lies past expiry.
#[allow(clippy::integer_division, clippy::cast_precision_loss)]
fn refresh_params(
    lifetime_secs: u64,
    refresh_offset: Duration,
    min_refresh_period: Duration,
) -> (f64, DurationSecs) {
    if lifetime_secs == 0 {
        return (0.0, DurationSecs(0));
    }

    let offset = refresh_offset.as_secs();
    let desired_delay = if offset < lifetime_secs {
        lifetime_secs - offset
    } else {
        lifetime_secs / 2
    };

    let freshness = (desired_delay as f64) / (lifetime_secs as f64);
    let min_stale = min_refresh_period.as_secs().min(desired_delay);
    (freshness, DurationSecs(min_stale))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn source(server: &MockServer) -> ClientSecretSource {
        let mut config =
            ClientSecretConfig::new("tenant-1", "app-1", SecretString::new("shh")).unwrap();
        config = config.with_authority_host(&server.base_url()).unwrap();
        let client = armkit_http::HttpClientBuilder::with_config(
            armkit_http::HttpClientConfig::for_testing(),
        )
        .build()
        .unwrap();
        ClientSecretSource::new(&config, client, "https://management.core.windows.net//.default".into())
            .unwrap()
    }

    #[test]
    fn test_refresh_params_normal_lifetime() {
        let (freshness, min_stale) =
            refresh_params(3600, Duration::from_secs(300), Duration::from_secs(10));
        assert!((freshness - 3300.0 / 3600.0).abs() < f64::EPSILON);
        assert_eq!(min_stale, DurationSecs(10));
    }

    #[test]
    fn test_refresh_params_short_lifetime_uses_half() {
        let (freshness, min_stale) =
            refresh_params(120, Duration::from_secs(300), Duration::from_secs(100));
        assert!((freshness - 0.5).abs() < f64::EPSILON);
        assert_eq!(min_stale, DurationSecs(60));
    }

    #[test]
    fn test_refresh_params_zero_lifetime() {
        assert_eq!(
            refresh_params(0, Duration::from_secs(300), Duration::from_secs(10)),
            (0.0, DurationSecs(0))
        );
    }

    #[tokio::test]
    async fn test_request_token_posts_client_credentials() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/tenant-1/oauth2/v2.0/token")
                .header("content-type", "application/x-www-form-urlencoded")
                .body_includes("grant_type=client_credentials")
                .body_includes("client_id=app-1")
                .body_includes("client_secret=shh")
                .body_includes("scope=https%3A%2F%2Fmanagement.core.windows.net%2F%2F.default");
            then.status(200).json_body(serde_json::json!({
                "token_type": "Bearer",
                "expires_in": 3599,
                "access_token": "arm-token"
            }));
        });

        let token = source(&server).request_token().await.unwrap();
        m.assert();
        assert_eq!(token.access_token().as_str(), "arm-token");
        assert_eq!(token.lifetime(), DurationSecs(3599));
    }

    #[tokio::test]
    async fn test_request_token_rejects_non_bearer() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(POST).path("/tenant-1/oauth2/v2.0/token");
            then.status(200).json_body(serde_json::json!({
                "token_type": "pop",
                "access_token": "x"
            }));
        });

        let err = source(&server).request_token().await.unwrap_err();
        assert!(matches!(err, CredentialError::UnsupportedTokenType(t) if t == "pop"));
    }

    #[tokio::test]
    async fn test_request_token_error_status_hides_body() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(POST).path("/tenant-1/oauth2/v2.0/token");
            then.status(401)
                .json_body(serde_json::json!({"error": "invalid_client", "error_description": "AADSTS7000215"}));
        });

        let err = source(&server).request_token().await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("401"));
        assert!(!msg.contains("AADSTS"));
    }

    #[tokio::test]
    async fn test_request_token_malformed_body() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(POST).path("/tenant-1/oauth2/v2.0/token");
            then.status(200).body("{\"expires_in\": 10}");
        });

        let err = source(&server).request_token().await.unwrap_err();
        assert!(matches!(err, CredentialError::InvalidResponse(_)));
    }
}
