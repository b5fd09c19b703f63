use serde::{Deserialize, Serialize};

string_enum! {
    /// Which requests are logged regardless of sampling.
    pub enum AlwaysLog {
        AllErrors = "allErrors",
    }
}

string_enum! {
    pub enum SamplingType {
        Fixed = "fixed",
    }
}

string_enum! {
    /// Correlation headers sent to Application Insights.
    pub enum HttpCorrelationProtocol {
        None = "None",
        Legacy = "Legacy",
        W3c = "W3C",
    }
}

string_enum! {
    /// Verbosity applied to traces emitted by trace policies.
    pub enum Verbosity {
        Verbose = "verbose",
        Information = "information",
        Error = "error",
    }
}

string_enum! {
    pub enum OperationNameFormat {
        Name = "Name",
        Url = "Url",
    }
}

string_enum! {
    pub enum DataMaskingMode {
        Mask = "Mask",
        Hide = "Hide",
    }
}

/// Diagnostic settings of an API.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticContract {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<DiagnosticContractProperties>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticContractProperties {
    /// Resource id of the target logger.
    #[serde(default)]
    pub logger_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub always_log: Option<AlwaysLog>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampling: Option<SamplingSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontend: Option<PipelineDiagnosticSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<PipelineDiagnosticSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_client_ip: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_correlation_protocol: Option<HttpCorrelationProtocol>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbosity: Option<Verbosity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name_format: Option<OperationNameFormat>,
    /// Emit custom metrics via the emit-metric policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplingSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampling_type: Option<SamplingType>,
    /// Share of requests sampled, 0 to 100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
}

/// What is logged for requests and responses on one side of the gateway.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineDiagnosticSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<HttpMessageDiagnostic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<HttpMessageDiagnostic>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpMessageDiagnostic {
    /// Header names to log.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<BodyDiagnosticSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_masking: Option<DataMasking>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyDiagnosticSettings {
    /// Number of body bytes to log, at most 8192.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<i32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataMasking {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query_params: Vec<DataMaskingEntity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<DataMaskingEntity>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataMaskingEntity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<DataMaskingMode>,
}

collection!(
    /// One page of diagnostics.
    DiagnosticCollection of DiagnosticContract
);

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partial_model_omits_unset_fields() {
        let contract = DiagnosticContract {
            properties: Some(DiagnosticContractProperties {
                logger_id: "/loggers/azuremonitor".into(),
                always_log: Some(AlwaysLog::AllErrors),
                sampling: Some(SamplingSettings {
                    sampling_type: Some(SamplingType::Fixed),
                    percentage: Some(50.0),
                }),
                frontend: Some(PipelineDiagnosticSettings {
                    request: Some(HttpMessageDiagnostic {
                        headers: vec!["Content-type".into()],
                        body: Some(BodyDiagnosticSettings { bytes: Some(512) }),
                        data_masking: None,
                    }),
                    response: None,
                }),
                ..DiagnosticContractProperties::default()
            }),
            ..DiagnosticContract::default()
        };

        assert_eq!(
            serde_json::to_value(&contract).unwrap(),
            json!({
                "properties": {
                    "loggerId": "/loggers/azuremonitor",
                    "alwaysLog": "allErrors",
                    "sampling": {"samplingType": "fixed", "percentage": 50.0},
                    "frontend": {
                        "request": {"headers": ["Content-type"], "body": {"bytes": 512}}
                    }
                }
            })
        );
    }

    #[test]
    fn test_resource_type_maps_to_type() {
        let contract: DiagnosticContract = serde_json::from_value(json!({
            "id": "/subscriptions/s/resourceGroups/rg1/providers/Microsoft.ApiManagement/service/apimService1/apis/57d1f7558aa04f15146d9d8a/diagnostics/applicationinsights",
            "type": "Microsoft.ApiManagement/service/apis/diagnostics",
            "name": "applicationinsights",
            "properties": {
                "alwaysLog": "allErrors",
                "httpCorrelationProtocol": "Legacy",
                "loggerId": "/loggers/applicationinsights",
                "verbosity": "verbose",
                "operationNameFormat": "Name"
            }
        }))
        .unwrap();
        assert_eq!(
            contract.resource_type.as_deref(),
            Some("Microsoft.ApiManagement/service/apis/diagnostics")
        );
        let props = contract.properties.unwrap();
        assert_eq!(props.http_correlation_protocol, Some(HttpCorrelationProtocol::Legacy));
        assert_eq!(props.verbosity, Some(Verbosity::Verbose));
        assert_eq!(props.operation_name_format, Some(OperationNameFormat::Name));
    }
}
