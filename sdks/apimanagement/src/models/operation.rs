use serde::{Deserialize, Serialize};

/// An operation of an API.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationContract {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<OperationContractProperties>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationContractProperties {
    #[serde(default)]
    pub display_name: String,
    /// HTTP method, not limited to the standard verbs.
    #[serde(default)]
    pub method: String,
    /// Relative URL template, e.g. `/customers/{cid}/orders/{oid}/?date={date}`.
    #[serde(default)]
    pub url_template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policies: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub template_parameters: Vec<ParameterContract>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestContract>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub responses: Vec<ResponseContract>,
}

/// PATCH body for an operation; only the fields that are set change.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationUpdateContract {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<OperationUpdateContractProperties>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationUpdateContractProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policies: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub template_parameters: Vec<ParameterContract>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestContract>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub responses: Vec<ResponseContract>,
}

/// A template, query or header parameter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterContract {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub parameter_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContract {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query_parameters: Vec<ParameterContract>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<ParameterContract>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub representations: Vec<RepresentationContract>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseContract {
    #[serde(default)]
    pub status_code: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub representations: Vec<RepresentationContract>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<ParameterContract>,
}

/// A request or response body representation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepresentationContract {
    #[serde(default)]
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Only for `application/x-www-form-urlencoded` and `multipart/form-data`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub form_parameters: Vec<ParameterContract>,
}

collection!(
    /// One page of API operations.
    OperationCollection of OperationContract
);

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_with_request_and_responses() {
        let op: OperationContract = serde_json::from_value(json!({
            "name": "loginUser",
            "type": "Microsoft.ApiManagement/service/apis/operations",
            "properties": {
                "displayName": "Logs user into the system",
                "method": "GET",
                "urlTemplate": "/user/login?username={username}&password={password}",
                "templateParameters": [
                    {"name": "username", "type": "string", "required": true, "values": []}
                ],
                "request": {"queryParameters": [], "headers": [], "representations": []},
                "responses": [{
                    "statusCode": 200,
                    "description": "successful operation",
                    "representations": [{"contentType": "application/xml", "typeName": "UserLoginGet200ApplicationXmlResponse"}],
                    "headers": [{"name": "X-Rate-Limit", "type": "integer"}]
                }]
            }
        }))
        .unwrap();

        let props = op.properties.unwrap();
        assert_eq!(props.method, "GET");
        assert_eq!(props.template_parameters[0].parameter_type, "string");
        assert_eq!(props.template_parameters[0].required, Some(true));
        assert_eq!(props.responses[0].status_code, 200);
        assert_eq!(props.responses[0].headers[0].name, "X-Rate-Limit");
    }

    #[test]
    fn test_update_contract_serializes_only_changes() {
        let patch = OperationUpdateContract {
            properties: Some(OperationUpdateContractProperties {
                display_name: Some("Retrieve resource".into()),
                method: Some("GET".into()),
                ..OperationUpdateContractProperties::default()
            }),
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"properties": {"displayName": "Retrieve resource", "method": "GET"}})
        );
    }
}
