use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::SystemData;

string_enum! {
    pub enum ApiGatewaySkuType {
        Standard = "Standard",
        WorkspaceGatewayStandard = "WorkspaceGatewayStandard",
        WorkspaceGatewayPremium = "WorkspaceGatewayPremium",
    }
}

string_enum! {
    /// Virtual network attachment of a gateway.
    pub enum VirtualNetworkType {
        /// Not part of any virtual network.
        None = "None",
        /// Reachable from the internet, deployed inside a virtual network.
        External = "External",
        /// Reachable only from inside the virtual network.
        Internal = "Internal",
    }
}

/// A standalone API Management gateway.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    /// Entity tag carried in the body, read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default)]
    pub sku: GatewaySkuProperties,
    #[serde(default)]
    pub properties: GatewayProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_data: Option<SystemData>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewaySkuProperties {
    pub name: ApiGatewaySkuType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i32>,
}

impl Default for GatewaySkuProperties {
    fn default() -> Self {
        Self {
            name: ApiGatewaySkuType::Standard,
            capacity: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayProperties {
    /// `Created`, `Updating`, `Succeeded`, `Failed` and so on, read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_provisioning_state: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub created_at_utc: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontend: Option<FrontendConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration_api: Option<GatewayConfigurationApi>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_network_type: Option<VirtualNetworkType>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontendConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_hostname: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet: Option<BackendSubnetConfiguration>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendSubnetConfiguration {
    /// ARM id of the subnet the gateway injects into.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfigurationApi {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
}

/// PATCH body for a gateway.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayUpdateParameters {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<GatewayUpdateProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<GatewaySkuPropertiesForPatch>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayUpdateProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontend: Option<FrontendConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration_api: Option<GatewayConfigurationApi>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_network_type: Option<VirtualNetworkType>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewaySkuPropertiesForPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<ApiGatewaySkuType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i32>,
}

/// One page of gateways. Gateway lists report no total count.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayListResult {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub value: Vec<GatewayResource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_link: Option<String>,
}

impl armkit_runtime::Page for GatewayListResult {
    type Item = GatewayResource;

    fn next_link(&self) -> Option<&str> {
        self.next_link.as_deref()
    }

    fn into_items(self) -> Vec<GatewayResource> {
        self.value
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_gateway_resource_from_service_payload() {
        let gateway: GatewayResource = serde_json::from_value(json!({
            "name": "apimGateway1",
            "type": "Microsoft.ApiManagement/gateways",
            "id": "/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/rg1/providers/Microsoft.ApiManagement/gateways/apimGateway1",
            "tags": {"Name": "Contoso", "Test": "User"},
            "etag": "AAAAAAAWN/4=",
            "location": "East US",
            "properties": {
                "backend": {"subnet": {"id": "/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/rg1/providers/Microsoft.Network/virtualNetworks/vn1/subnets/sn1"}},
                "configurationApi": {"hostname": "apimgateway1.westus.gateway.configuration.azure-api.net"},
                "createdAtUtc": "2024-04-29T17:04:27.3669517Z",
                "frontend": {"defaultHostname": "apimgateway1.westus.gateway.azure-api.net"},
                "provisioningState": "Succeeded",
                "targetProvisioningState": "",
                "virtualNetworkType": "External"
            },
            "sku": {"name": "WorkspaceGatewayPremium", "capacity": 1},
            "systemData": {"createdBy": "string", "createdByType": "User", "createdAt": "2024-01-01T11:47:29.571Z"}
        }))
        .unwrap();

        assert_eq!(gateway.location, "East US");
        assert_eq!(gateway.tags["Name"], "Contoso");
        assert_eq!(gateway.sku.name, ApiGatewaySkuType::WorkspaceGatewayPremium);
        assert_eq!(gateway.sku.capacity, Some(1));
        assert_eq!(
            gateway.properties.virtual_network_type,
            Some(VirtualNetworkType::External)
        );
        assert_eq!(
            gateway.properties.created_at_utc.map(OffsetDateTime::year),
            Some(2024)
        );
        assert!(gateway.system_data.is_some());
    }

    #[test]
    fn test_update_parameters_send_only_patched_fields() {
        let patch = GatewayUpdateParameters {
            sku: Some(GatewaySkuPropertiesForPatch {
                name: None,
                capacity: Some(10),
            }),
            ..GatewayUpdateParameters::default()
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"sku": {"capacity": 10}})
        );
    }
}
