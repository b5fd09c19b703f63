use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Aggregated traffic for one API, user, operation, product, region,
/// subscription or time bucket.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecordContract {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Start of the aggregation bucket.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub timestamp: Option<OffsetDateTime>,
    /// Bucket length as an ISO 8601 duration, for `byTime` reports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_count_success: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_count_blocked: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_count_failed: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_count_other: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_count_total: Option<i32>,
    /// Bytes transferred.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bandwidth: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_hit_count: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_miss_count: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_time_avg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_time_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_time_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_time_avg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_time_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_time_max: Option<f64>,
}

collection!(
    /// One page of aggregated report records.
    ReportCollection of ReportRecordContract
);

/// A single request as seen by the gateway.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestReportRecordContract {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_response_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_size: Option<i32>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub timestamp: Option<OffsetDateTime>,
    /// `none`, `hit` or `miss`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<String>,
    /// Milliseconds spent in the gateway.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_time: Option<f64>,
    /// Milliseconds spent in the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_size: Option<i32>,
}

collection!(
    /// One page of request records.
    RequestReportCollection of RequestReportRecordContract
);
