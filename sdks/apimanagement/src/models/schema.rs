use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A schema document attached to an API.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaContract {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<SchemaContractProperties>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaContractProperties {
    /// Media type of the document, e.g. `application/vnd.ms-azure-apim.xsd+xml`
    /// or `application/vnd.oai.openapi.components+json`.
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub document: SchemaDocumentProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

/// Exactly one of the fields carries the schema, depending on the content type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDocumentProperties {
    /// Escaped document text, for everything except Swagger and OpenAPI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Swagger 2.0 definitions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definitions: Option<Value>,
    /// OpenAPI components.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Value>,
}

collection!(
    /// One page of API schemas.
    SchemaCollection of SchemaContract
);
