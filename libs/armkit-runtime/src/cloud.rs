use serde::{Deserialize, Serialize};

/// Endpoints of one Azure cloud.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CloudConfig {
    pub name: &'static str,
    pub authority_host: &'static str,
    pub resource_manager_endpoint: &'static str,
    /// Token audience; the requested scope is `{audience}/.default`
    pub audience: &'static str,
}

impl CloudConfig {
    pub const AZURE_PUBLIC: Self = Self {
        name: "AzurePublicCloud",
        authority_host: "https://login.microsoftonline.com",
        resource_manager_endpoint: "https://management.azure.com",
        audience: "https://management.core.windows.net/",
    };

    pub const AZURE_CHINA: Self = Self {
        name: "AzureChinaCloud",
        authority_host: "https://login.chinacloudapi.cn",
        resource_manager_endpoint: "https://management.chinacloudapi.cn",
        audience: "https://management.core.chinacloudapi.cn",
    };

    pub const AZURE_GOVERNMENT: Self = Self {
        name: "AzureUSGovernment",
        authority_host: "https://login.microsoftonline.us",
        resource_manager_endpoint: "https://management.usgovcloudapi.net",
        audience: "https://management.core.usgovcloudapi.net",
    };

    /// `{audience}/.default`, without doubling a trailing slash
    #[must_use]
    pub fn default_scope(&self) -> String {
        default_scope(self.audience)
    }
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self::AZURE_PUBLIC
    }
}

pub fn default_scope(audience: &str) -> String {
    format!("{}/.default", audience.trim_end_matches('/'))
}

/// Cloud selector used in configuration files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloudName {
    #[default]
    AzurePublic,
    AzureChina,
    AzureGovernment,
}

impl From<CloudName> for CloudConfig {
    fn from(name: CloudName) -> Self {
        match name {
            CloudName::AzurePublic => Self::AZURE_PUBLIC,
            CloudName::AzureChina => Self::AZURE_CHINA,
            CloudName::AzureGovernment => Self::AZURE_GOVERNMENT,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_default_scope_trims_trailing_slash() {
        assert_eq!(
            CloudConfig::AZURE_PUBLIC.default_scope(),
            "https://management.core.windows.net/.default"
        );
        assert_eq!(
            CloudConfig::AZURE_CHINA.default_scope(),
            "https://management.core.chinacloudapi.cn/.default"
        );
    }

    #[test]
    fn test_cloud_name_serde() {
        let name: CloudName = serde_json::from_str("\"azure_government\"").unwrap();
        assert_eq!(CloudConfig::from(name), CloudConfig::AZURE_GOVERNMENT);
    }
}
