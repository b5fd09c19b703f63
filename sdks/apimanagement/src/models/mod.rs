//! Wire models of the API Management Resource Manager surface.
//!
//! Every struct serializes in `camelCase` and leaves out fields that are
//! `None` or empty, so a partially filled model is a valid PATCH body.
//! Enums the service may extend keep unknown values in an `Other` variant.

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// A value this client does not know yet.
            Other(String),
        }

        impl $name {
            #[must_use]
            pub fn as_str(&self) -> &str {
                match self {
                    $( Self::$variant => $wire, )+
                    Self::Other(raw) => raw,
                }
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                match raw {
                    $( $wire => Self::$variant, )+
                    other => Self::Other(other.to_owned()),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                let raw = <String as serde::Deserialize>::deserialize(d)?;
                Ok(Self::from(raw.as_str()))
            }
        }
    };
}

macro_rules! collection {
    ($(#[$meta:meta])* $name:ident of $item:ty) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            #[serde(default, skip_serializing_if = "Vec::is_empty")]
            pub value: Vec<$item>,
            /// Total record count across all pages.
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub count: Option<i64>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub next_link: Option<String>,
        }

        impl armkit_runtime::Page for $name {
            type Item = $item;

            fn next_link(&self) -> Option<&str> {
                self.next_link.as_deref()
            }

            fn into_items(self) -> Vec<$item> {
                self.value
            }
        }
    };
}

mod backend;
mod common;
mod diagnostic;
mod gateway;
mod logger;
mod operation;
mod policy;
mod report;
mod schema;

pub use backend::{
    BackendAuthorizationHeaderCredentials, BackendCollection, BackendContract,
    BackendContractProperties, BackendCredentialsContract, BackendProperties, BackendProtocol,
    BackendProxyContract, BackendReconnectContract, BackendReconnectProperties,
    BackendServiceFabricClusterProperties, BackendTlsProperties, BackendUpdateParameterProperties,
    BackendUpdateParameters,
};
pub use common::{CreatedByType, SystemData};
pub use diagnostic::{
    AlwaysLog, BodyDiagnosticSettings, DataMasking, DataMaskingEntity, DataMaskingMode,
    DiagnosticCollection, DiagnosticContract, DiagnosticContractProperties,
    HttpCorrelationProtocol, HttpMessageDiagnostic, OperationNameFormat,
    PipelineDiagnosticSettings, SamplingSettings, SamplingType, Verbosity,
};
pub use gateway::{
    ApiGatewaySkuType, BackendConfiguration, BackendSubnetConfiguration, FrontendConfiguration,
    GatewayConfigurationApi, GatewayListResult, GatewayProperties, GatewayResource,
    GatewaySkuProperties, GatewaySkuPropertiesForPatch, GatewayUpdateParameters,
    GatewayUpdateProperties, VirtualNetworkType,
};
pub use logger::{
    LoggerCollection, LoggerContract, LoggerContractProperties, LoggerType, LoggerUpdateContract,
    LoggerUpdateParameters,
};
pub use operation::{
    OperationCollection, OperationContract, OperationContractProperties,
    OperationUpdateContract, OperationUpdateContractProperties, ParameterContract,
    RepresentationContract, RequestContract, ResponseContract,
};
pub use policy::{
    PolicyCollection, PolicyContentFormat, PolicyContract, PolicyContractProperties,
    PolicyExportFormat, PolicyIdName, PolicyRestrictionCollection, PolicyRestrictionContract,
    PolicyRestrictionContractProperties, PolicyRestrictionRequireBase,
    PolicyRestrictionUpdateContract,
};
pub use report::{
    ReportCollection, ReportRecordContract, RequestReportCollection, RequestReportRecordContract,
};
pub use schema::{SchemaCollection, SchemaContract, SchemaContractProperties, SchemaDocumentProperties};
