//! Long-running operation polling.
//!
//! A [`Poller`] is created from the initial response of a PUT, PATCH, POST or
//! DELETE and picks a polling strategy from that response:
//!
//! 1. `Azure-AsyncOperation`: poll a status monitor whose body has `status`
//! 2. `Operation-Location`: same, with `resourceLocation` for POST results
//! 3. `Location`: poll until the monitor stops answering `202`
//! 4. any other PUT/PATCH: poll the resource's `properties.provisioningState`
//! 5. any other DELETE/POST: already finished, unless it was a bare `202`
//!
//! The state can be saved with [`Poller::resume_token`] and restored in
//! another process with [`Poller::from_resume_token`].

use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use armkit_http::{HttpResponse, parse_retry_after};
use http::{HeaderMap, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::{ArmError, ErrorDetail};
use crate::pipeline::ArmPipeline;
use crate::response_error::{ResponseError, ensure_status};

const AZURE_ASYNC_OPERATION: &str = "azure-asyncoperation";
const OPERATION_LOCATION: &str = "operation-location";
const LOCATION: &str = "location";

/// Lifecycle state of a long-running operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationStatus {
    InProgress,
    Succeeded,
    Failed,
    Canceled,
}

impl OperationStatus {
    /// Map a service status string. Anything unrecognised (`Accepted`,
    /// `Updating`, `Creating`, ...) is still in progress.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("succeeded") {
            Self::Succeeded
        } else if raw.eq_ignore_ascii_case("failed") {
            Self::Failed
        } else if raw.eq_ignore_ascii_case("canceled") || raw.eq_ignore_ascii_case("cancelled") {
            Self::Canceled
        } else {
            Self::InProgress
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        self != Self::InProgress
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InProgress => "InProgress",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Canceled => "Canceled",
        })
    }
}

/// Where the final resource is read once the operation succeeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinalStateVia {
    AzureAsyncOperation,
    Location,
    OriginalUri,
    OperationLocation,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PollerOptions {
    pub final_state_via: Option<FinalStateVia>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PollUntilDoneOptions {
    /// Delay between polls when the service sends no retry hint.
    /// Defaults to the pipeline's poll frequency.
    pub frequency: Option<Duration>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
enum Strategy {
    AzureAsyncOperation,
    OperationLocation,
    Location,
    Body,
    Done,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct PollerState {
    kind: String,
    method: String,
    original_url: String,
    strategy: Strategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    polling_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    final_state_via: Option<FinalStateVia>,
    status: OperationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_body: Option<Value>,
}

enum FinalTarget {
    Fetch(String),
    LastBody,
    Nothing,
}

/// Tracks one long-running operation until it reaches a terminal state.
pub struct Poller<T> {
    pipeline: ArmPipeline,
    state: PollerState,
    retry_after: Option<Duration>,
    /// Terminal error response from a `Location` monitor
    failure: Option<ResponseError>,
    _result: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Poller<T> {
    /// Build a poller from the initial response of `method` on `url`.
    ///
    /// `kind` names the operation (e.g. `ApiGatewayClient::begin_delete`) and
    /// is checked again when resuming.
    ///
    /// # Errors
    /// [`ArmError::Poller`] for a DELETE or POST `202` without any polling
    /// header, [`ArmError::InvalidUrl`] for an unusable polling header.
    pub async fn from_response(
        pipeline: ArmPipeline,
        kind: &str,
        method: Method,
        url: &Url,
        response: HttpResponse,
        options: PollerOptions,
    ) -> Result<Self, ArmError> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = parse_body(&response.bytes().await?);

        let async_url = header_url(&headers, AZURE_ASYNC_OPERATION)?;
        let op_url = header_url(&headers, OPERATION_LOCATION)?;
        let location_url = header_url(&headers, LOCATION)?;
        let is_put_or_patch = method == Method::PUT || method == Method::PATCH;

        let (strategy, polling_url, op_status) = if let Some(u) = async_url {
            (Strategy::AzureAsyncOperation, Some(u), OperationStatus::InProgress)
        } else if let Some(u) = op_url {
            (Strategy::OperationLocation, Some(u), OperationStatus::InProgress)
        } else if let Some(u) = location_url.clone() {
            let op_status =
                provisioning_state(body.as_ref()).unwrap_or(OperationStatus::InProgress);
            (Strategy::Location, Some(u), op_status)
        } else if is_put_or_patch {
            (
                Strategy::Body,
                Some(url.to_string()),
                initial_body_status(status, body.as_ref()),
            )
        } else if status == StatusCode::ACCEPTED {
            return Err(ArmError::Poller(format!(
                "{kind}: 202 response is missing a polling URL"
            )));
        } else {
            (Strategy::Done, None, OperationStatus::Succeeded)
        };

        tracing::debug!(
            kind,
            strategy = ?strategy,
            status = %op_status,
            "long-running operation started"
        );

        Ok(Self {
            pipeline,
            state: PollerState {
                kind: kind.to_owned(),
                method: method.to_string(),
                original_url: url.to_string(),
                strategy,
                polling_url,
                location_url,
                final_state_via: options.final_state_via,
                status: op_status,
                last_body: body,
            },
            retry_after: parse_retry_after(&headers),
            failure: None,
            _result: PhantomData,
        })
    }

    /// Restore a poller saved with [`resume_token`](Self::resume_token).
    ///
    /// # Errors
    /// [`ArmError::ResumeToken`] if the token is malformed or was produced by
    /// a different kind of operation.
    pub fn from_resume_token(
        pipeline: ArmPipeline,
        kind: &str,
        token: &str,
    ) -> Result<Self, ArmError> {
        let state: PollerState = serde_json::from_str(token)
            .map_err(|e| ArmError::ResumeToken(format!("malformed token: {e}")))?;
        if state.kind != kind {
            return Err(ArmError::ResumeToken(format!(
                "token is for {}, not {kind}",
                state.kind
            )));
        }
        if state.strategy != Strategy::Done && state.polling_url.is_none() {
            return Err(ArmError::ResumeToken("token has no polling URL".into()));
        }
        Ok(Self {
            pipeline,
            state,
            retry_after: None,
            failure: None,
            _result: PhantomData,
        })
    }

    /// Serialize the in-flight state.
    ///
    /// # Errors
    /// [`ArmError::ResumeToken`] once the operation is done.
    pub fn resume_token(&self) -> Result<String, ArmError> {
        if self.done() {
            return Err(ArmError::ResumeToken(
                "operation has already reached a terminal state".into(),
            ));
        }
        Ok(serde_json::to_string(&self.state)?)
    }

    #[must_use]
    pub fn done(&self) -> bool {
        self.state.status.is_terminal()
    }

    #[must_use]
    pub fn status(&self) -> OperationStatus {
        self.state.status
    }

    /// Query the monitor once. A no-op once the operation is done.
    ///
    /// # Errors
    /// Transport failures and unexpected statuses from the monitor. A
    /// failing `Location` monitor also ends the operation.
    pub async fn poll(&mut self) -> Result<OperationStatus, ArmError> {
        if self.done() {
            return Ok(self.state.status);
        }
        let Some(polling_url) = self.state.polling_url.clone() else {
            return Err(ArmError::Poller("no polling URL".into()));
        };
        let url = parse_url(&polling_url)?;
        let response = self.pipeline.request(Method::GET, &url).send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        self.retry_after = parse_retry_after(&headers);

        let previous = self.state.status;
        match self.state.strategy {
            Strategy::AzureAsyncOperation | Strategy::OperationLocation => {
                let response = ensure_status(
                    &Method::GET,
                    url.as_str(),
                    response,
                    &[
                        StatusCode::OK,
                        StatusCode::CREATED,
                        StatusCode::ACCEPTED,
                        StatusCode::NO_CONTENT,
                    ],
                )
                .await?;
                let body = parse_body(&response.bytes().await?);
                let raw = body
                    .as_ref()
                    .and_then(|b| b.get("status"))
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        ArmError::Poller("the status monitor response did not contain a status".into())
                    })?;
                self.state.status = OperationStatus::parse(raw);
                self.state.last_body = body;
            }
            Strategy::Location => {
                if let Some(next) = header_url(&headers, LOCATION)? {
                    self.state.polling_url = Some(next);
                }
                if status.is_success() {
                    let body = parse_body(&response.bytes().await?);
                    self.state.status = match provisioning_state(body.as_ref()) {
                        Some(state) => state,
                        None if status == StatusCode::ACCEPTED => OperationStatus::InProgress,
                        None => OperationStatus::Succeeded,
                    };
                    self.state.last_body = body;
                } else if is_transient(status) {
                    tracing::debug!(status = %status, kind = %self.state.kind, "operation monitor busy");
                    drop(response);
                } else {
                    let failure =
                        ResponseError::from_response(Method::GET, url.as_str(), response).await;
                    self.state.status = OperationStatus::Failed;
                    self.failure = Some(failure.clone());
                    tracing::warn!(status = %status, kind = %self.state.kind, "operation monitor failed");
                    return Err(failure.into());
                }
            }
            Strategy::Body => {
                if status == StatusCode::NO_CONTENT {
                    self.state.status = OperationStatus::Succeeded;
                    self.state.last_body = None;
                } else if status == StatusCode::ACCEPTED {
                    drop(response);
                } else {
                    let response = ensure_status(
                        &Method::GET,
                        url.as_str(),
                        response,
                        &[StatusCode::OK, StatusCode::CREATED],
                    )
                    .await?;
                    let body = parse_body(&response.bytes().await?);
                    self.state.status =
                        provisioning_state(body.as_ref()).unwrap_or(OperationStatus::Succeeded);
                    self.state.last_body = body;
                }
            }
            Strategy::Done => {}
        }

        if self.state.status != previous {
            tracing::debug!(
                kind = %self.state.kind,
                from = %previous,
                to = %self.state.status,
                "long-running operation status changed"
            );
        }
        Ok(self.state.status)
    }

    /// Final value of a finished operation. May issue one GET; a failed GET
    /// can be retried by calling `result` again.
    ///
    /// # Errors
    /// [`ArmError::Poller`] before the operation is done,
    /// [`ArmError::OperationFailed`] for `Failed`/`Canceled`, or the error of
    /// the final GET.
    pub async fn result(&mut self) -> Result<T, ArmError> {
        match self.state.status {
            OperationStatus::InProgress => {
                return Err(ArmError::Poller(
                    "operation has not reached a terminal state".into(),
                ));
            }
            OperationStatus::Failed | OperationStatus::Canceled => {
                if let Some(failure) = &self.failure {
                    return Err(failure.clone().into());
                }
                return Err(ArmError::OperationFailed {
                    status: self.state.status,
                    error: self.error_detail(),
                });
            }
            OperationStatus::Succeeded => {}
        }

        match self.final_target() {
            FinalTarget::Nothing => Ok(serde_json::from_value(Value::Null)?),
            FinalTarget::LastBody => Ok(serde_json::from_value(
                self.state.last_body.clone().unwrap_or(Value::Null),
            )?),
            FinalTarget::Fetch(target) => {
                let url = parse_url(&target)?;
                tracing::debug!(url = %url, "fetching final resource");
                let response = self.pipeline.request(Method::GET, &url).send().await?;
                let response = ensure_status(
                    &Method::GET,
                    url.as_str(),
                    response,
                    &[StatusCode::OK, StatusCode::NO_CONTENT],
                )
                .await?;
                let body = parse_body(&response.bytes().await?);
                Ok(serde_json::from_value(body.unwrap_or(Value::Null))?)
            }
        }
    }

    /// Poll until the operation finishes, then return [`result`](Self::result).
    ///
    /// Between polls, waits for the service's retry hint when one was sent,
    /// otherwise for the configured frequency.
    ///
    /// # Errors
    /// As [`poll`](Self::poll) and [`result`](Self::result).
    pub async fn poll_until_done(
        &mut self,
        options: Option<PollUntilDoneOptions>,
    ) -> Result<T, ArmError> {
        let frequency = options
            .and_then(|o| o.frequency)
            .unwrap_or_else(|| self.pipeline.poll_frequency());
        while !self.done() {
            self.poll().await?;
            if self.done() {
                break;
            }
            tokio::time::sleep(self.retry_after.unwrap_or(frequency)).await;
        }
        self.result().await
    }

    fn error_detail(&self) -> Option<ErrorDetail> {
        let body = self.state.last_body.as_ref()?;
        let error = body
            .get("error")
            .or_else(|| body.get("properties").and_then(|p| p.get("error")))?;
        serde_json::from_value(error.clone()).ok()
    }

    fn final_target(&self) -> FinalTarget {
        let state = &self.state;
        if state.method == Method::DELETE.as_str() {
            return FinalTarget::Nothing;
        }
        if !matches!(
            state.strategy,
            Strategy::AzureAsyncOperation | Strategy::OperationLocation
        ) {
            return FinalTarget::LastBody;
        }

        // PUT and PATCH always read the resource they targeted
        if state.method == Method::PUT.as_str() || state.method == Method::PATCH.as_str() {
            return FinalTarget::Fetch(state.original_url.clone());
        }
        match state.final_state_via {
            Some(FinalStateVia::AzureAsyncOperation | FinalStateVia::OperationLocation) => {
                FinalTarget::LastBody
            }
            Some(FinalStateVia::OriginalUri) => FinalTarget::Fetch(state.original_url.clone()),
            Some(FinalStateVia::Location) | None => {
                if let Some(location) = &state.location_url {
                    return FinalTarget::Fetch(location.clone());
                }
                state
                    .last_body
                    .as_ref()
                    .and_then(|b| b.get("resourceLocation"))
                    .and_then(Value::as_str)
                    .filter(|_| state.strategy == Strategy::OperationLocation)
                    .map_or(FinalTarget::LastBody, |resource| {
                        FinalTarget::Fetch(resource.to_owned())
                    })
            }
        }
    }
}

impl<T> fmt::Debug for Poller<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Poller")
            .field("kind", &self.state.kind)
            .field("strategy", &self.state.strategy)
            .field("status", &self.state.status)
            .finish_non_exhaustive()
    }
}

fn header_url(headers: &HeaderMap, name: &str) -> Result<Option<String>, ArmError> {
    let Some(value) = headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    else {
        return Ok(None);
    };
    parse_url(value)?;
    Ok(Some(value.to_owned()))
}

fn parse_url(raw: &str) -> Result<Url, ArmError> {
    Url::parse(raw).map_err(|e| ArmError::InvalidUrl(format!("{raw}: {e}")))
}

fn parse_body(bytes: &[u8]) -> Option<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match serde_json::from_slice(bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring non-JSON operation body");
            None
        }
    }
}

/// Starting state of a PUT/PATCH polled through the resource itself. A `201`
/// without `provisioningState` is still running; a `200` without it is done.
fn initial_body_status(status: StatusCode, body: Option<&Value>) -> OperationStatus {
    let state = provisioning_state(body);
    match status {
        StatusCode::OK => state.unwrap_or(OperationStatus::Succeeded),
        StatusCode::CREATED => state.unwrap_or(OperationStatus::InProgress),
        StatusCode::NO_CONTENT => OperationStatus::Succeeded,
        _ => OperationStatus::InProgress,
    }
}

/// Throttling and gateway errors leave a `Location` monitor's state as is.
fn is_transient(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::REQUEST_TIMEOUT
            | StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

fn provisioning_state(body: Option<&Value>) -> Option<OperationStatus> {
    body?
        .get("properties")?
        .get("provisioningState")?
        .as_str()
        .map(OperationStatus::parse)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_parsing() {
        assert_eq!(OperationStatus::parse("Succeeded"), OperationStatus::Succeeded);
        assert_eq!(OperationStatus::parse("failed"), OperationStatus::Failed);
        assert_eq!(OperationStatus::parse("Cancelled"), OperationStatus::Canceled);
        assert_eq!(OperationStatus::parse("Canceled"), OperationStatus::Canceled);
        assert_eq!(OperationStatus::parse("Updating"), OperationStatus::InProgress);
        assert!(!OperationStatus::InProgress.is_terminal());
        assert_eq!(OperationStatus::Canceled.to_string(), "Canceled");
    }

    #[test]
    fn test_provisioning_state_lookup() {
        let body = json!({"properties": {"provisioningState": "Creating"}});
        assert_eq!(
            provisioning_state(Some(&body)),
            Some(OperationStatus::InProgress)
        );
        assert_eq!(provisioning_state(Some(&json!({"name": "x"}))), None);
        assert_eq!(provisioning_state(None), None);
    }

    #[test]
    fn test_initial_body_status_follows_status_code() {
        let creating = json!({"properties": {"provisioningState": "Creating"}});
        let plain = json!({"name": "w1"});
        assert_eq!(
            initial_body_status(StatusCode::OK, Some(&plain)),
            OperationStatus::Succeeded
        );
        assert_eq!(
            initial_body_status(StatusCode::OK, Some(&creating)),
            OperationStatus::InProgress
        );
        assert_eq!(
            initial_body_status(StatusCode::CREATED, Some(&plain)),
            OperationStatus::InProgress
        );
        assert_eq!(
            initial_body_status(StatusCode::ACCEPTED, None),
            OperationStatus::InProgress
        );
        assert_eq!(
            initial_body_status(StatusCode::NO_CONTENT, None),
            OperationStatus::Succeeded
        );
    }

    #[test]
    fn test_parse_body_tolerates_empty_and_text() {
        assert_eq!(parse_body(b""), None);
        assert_eq!(parse_body(b"  \n"), None);
        assert_eq!(parse_body(b"accepted"), None);
        assert_eq!(parse_body(b"{\"a\":1}"), Some(json!({"a": 1})));
    }

    #[test]
    fn test_header_url_validates() {
        let mut headers = HeaderMap::new();
        headers.insert("location", "https://management.azure.com/op/1".parse().unwrap());
        headers.insert("operation-location", "not a url".parse().unwrap());
        assert_eq!(
            header_url(&headers, LOCATION).unwrap().as_deref(),
            Some("https://management.azure.com/op/1")
        );
        assert!(header_url(&headers, OPERATION_LOCATION).is_err());
        assert_eq!(header_url(&headers, AZURE_ASYNC_OPERATION).unwrap(), None);
    }
}
