//! Client configuration, layered from defaults, a YAML file and `APIM_*`
//! environment variables.

use std::path::Path;
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

use crate::cloud::{CloudConfig, CloudName};
use crate::error::ArmError;

/// Prefix for environment overrides; `__` separates nested keys,
/// e.g. `APIM_HTTP__MAX_RETRIES=5`.
pub const ENV_PREFIX: &str = "APIM_";

/// Default interval between long-running operation polls.
pub const DEFAULT_POLL_FREQUENCY: Duration = Duration::from_secs(30);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientOptions {
    pub cloud: CloudName,

    /// Resource Manager endpoint; overrides the cloud's default
    pub endpoint: Option<String>,

    /// Token audience; overrides the cloud's default
    pub audience: Option<String>,

    /// Replaces the api-version every operation sends
    pub api_version: Option<String>,

    #[serde(with = "duration_serde")]
    pub poll_frequency: Duration,

    pub http: HttpOptions,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            cloud: CloudName::AzurePublic,
            endpoint: None,
            audience: None,
            api_version: None,
            poll_frequency: DEFAULT_POLL_FREQUENCY,
            http: HttpOptions::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpOptions {
    #[serde(with = "duration_serde")]
    pub request_timeout: Duration,

    #[serde(with = "duration_serde::option")]
    pub total_timeout: Option<Duration>,

    pub max_retries: usize,

    #[serde(with = "duration_serde")]
    pub retry_delay: Duration,

    #[serde(with = "duration_serde")]
    pub max_retry_delay: Duration,

    pub max_body_size: usize,

    pub max_concurrent_requests: usize,

    /// Appended to the default User-Agent
    pub user_agent_suffix: Option<String>,

    /// Accept `http://` endpoints. Mock servers only.
    pub allow_insecure_http: bool,
}

impl Default for HttpOptions {
    fn default() -> Self {
        let base = armkit_http::HttpClientConfig::default();
        let retry = armkit_http::RetryConfig::default();
        Self {
            request_timeout: base.request_timeout,
            total_timeout: None,
            max_retries: retry.max_retries,
            retry_delay: retry.backoff.initial,
            max_retry_delay: retry.backoff.max,
            max_body_size: base.max_body_size,
            max_concurrent_requests: armkit_http::RateLimitConfig::default()
                .max_concurrent_requests,
            user_agent_suffix: None,
            allow_insecure_http: false,
        }
    }
}

impl ClientOptions {
    /// Layer defaults, then `path` (YAML, when given), then `APIM_*` env vars.
    ///
    /// # Errors
    /// [`ArmError::Config`] if a layer cannot be read or the merged result
    /// does not deserialize.
    pub fn load(path: Option<&Path>) -> Result<Self, ArmError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            if !path.exists() {
                return Err(ArmError::Config(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let options: Self = figment
            .extract()
            .map_err(|e| ArmError::Config(e.to_string()))?;
        tracing::debug!(
            cloud = ?options.cloud,
            endpoint = options.endpoint.as_deref().unwrap_or(""),
            "client options loaded"
        );
        Ok(options)
    }

    /// Plain-HTTP endpoint, no retries, fast polling. Mock servers only.
    #[must_use]
    pub fn for_testing(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            poll_frequency: Duration::from_millis(10),
            http: HttpOptions {
                max_retries: 0,
                request_timeout: Duration::from_secs(10),
                allow_insecure_http: true,
                ..HttpOptions::default()
            },
            ..Self::default()
        }
    }

    #[must_use]
    pub fn cloud_config(&self) -> CloudConfig {
        self.cloud.into()
    }

    #[must_use]
    pub fn resource_manager_endpoint(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| self.cloud_config().resource_manager_endpoint.to_owned())
    }

    /// Scope requested from the credential
    #[must_use]
    pub fn token_scope(&self) -> String {
        match &self.audience {
            Some(audience) => crate::cloud::default_scope(audience),
            None => self.cloud_config().default_scope(),
        }
    }

    /// Transport configuration for [`armkit_http::HttpClientBuilder`].
    #[must_use]
    pub fn http_client_config(&self) -> armkit_http::HttpClientConfig {
        let http = &self.http;
        let user_agent = match &http.user_agent_suffix {
            Some(suffix) => format!("{} {suffix}", crate::USER_AGENT),
            None => crate::USER_AGENT.to_owned(),
        };
        let retry = (http.max_retries > 0).then(|| armkit_http::RetryConfig {
            max_retries: http.max_retries,
            backoff: armkit_http::ExponentialBackoff::new(http.retry_delay, http.max_retry_delay),
            ..armkit_http::RetryConfig::default()
        });

        armkit_http::HttpClientConfig {
            request_timeout: http.request_timeout,
            total_timeout: http.total_timeout,
            max_body_size: http.max_body_size,
            user_agent,
            retry,
            rate_limit: Some(armkit_http::RateLimitConfig {
                max_concurrent_requests: http.max_concurrent_requests,
            }),
            transport: if http.allow_insecure_http {
                armkit_http::TransportSecurity::AllowInsecureHttp
            } else {
                armkit_http::TransportSecurity::TlsOnly
            },
            ..armkit_http::HttpClientConfig::default()
        }
    }
}

/// `humantime` strings (`"30s"`, `"1m 30s"`) for `Duration` fields.
pub mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de};

    /// # Errors
    /// Propagates the serializer's error.
    pub fn serialize<S: Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&humantime::format_duration(*value))
    }

    /// # Errors
    /// When the value is not a valid `humantime` duration.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(d)?;
        humantime::parse_duration(&raw).map_err(de::Error::custom)
    }

    pub mod option {
        use std::time::Duration;

        use serde::{Deserialize, Deserializer, Serializer, de};

        /// # Errors
        /// Propagates the serializer's error.
        pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
            match value {
                Some(d) => s.collect_str(&humantime::format_duration(*d)),
                None => s.serialize_none(),
            }
        }

        /// # Errors
        /// When the value is not a valid `humantime` duration.
        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
            Option::<String>::deserialize(d)?
                .map(|raw| humantime::parse_duration(&raw).map_err(de::Error::custom))
                .transpose()
        }
    }
}
