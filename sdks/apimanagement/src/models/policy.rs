use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a policy document. Products and APIs have exactly one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyIdName {
    #[default]
    #[serde(rename = "policy")]
    Policy,
}

impl PolicyIdName {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Policy => "policy",
        }
    }
}

impl fmt::Display for PolicyIdName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

string_enum! {
    /// Format of [`PolicyContractProperties::value`].
    pub enum PolicyContentFormat {
        Xml = "xml",
        XmlLink = "xml-link",
        RawXml = "rawxml",
        RawXmlLink = "rawxml-link",
    }
}

string_enum! {
    /// Format a policy is returned in by `get`.
    pub enum PolicyExportFormat {
        /// Escaped XML
        Xml = "xml",
        /// Unescaped XML
        RawXml = "rawxml",
    }
}

string_enum! {
    /// Whether a scope's policy must contain a `<base/>` element.
    pub enum PolicyRestrictionRequireBase {
        True = "true",
        False = "false",
    }
}

/// A policy document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyContract {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<PolicyContractProperties>,
}

impl PolicyContract {
    /// Inline XML policy body.
    #[must_use]
    pub fn xml(value: impl Into<String>) -> Self {
        Self {
            properties: Some(PolicyContractProperties {
                value: value.into(),
                format: Some(PolicyContentFormat::Xml),
            }),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyContractProperties {
    /// Policy content, or a link to it for the `*-link` formats.
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<PolicyContentFormat>,
}

collection!(
    /// One page of policies.
    PolicyCollection of PolicyContract
);

/// Restriction on the policies allowed at a scope of the service.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRestrictionContract {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<PolicyRestrictionContractProperties>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRestrictionContractProperties {
    /// Path the restriction applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_base: Option<PolicyRestrictionRequireBase>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRestrictionUpdateContract {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<PolicyRestrictionContractProperties>,
}

collection!(
    /// One page of policy restrictions.
    PolicyRestrictionCollection of PolicyRestrictionContract
);
