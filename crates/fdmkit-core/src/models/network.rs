use serde::{Deserialize, Serialize};

use crate::resource::ConfigResource;

/// What a network object's `value` describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NetworkSubType {
    #[default]
    Host,
    Network,
    Range,
    Fqdn,
}

/// Address families resolved for FQDN objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DnsResolution {
    Ipv4Only,
    Ipv6Only,
    Ipv4AndIpv6,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkObject {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub sub_type: NetworkSubType,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_resolution: Option<DnsResolution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_system_defined: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(rename = "type", default = "NetworkObject::default_kind")]
    pub kind: String,
}

impl NetworkObject {
    pub const KIND: &'static str = "networkobject";

    fn default_kind() -> String {
        Self::KIND.to_string()
    }

    pub fn new(name: impl Into<String>, sub_type: NetworkSubType, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sub_type,
            value: value.into(),
            kind: Self::default_kind(),
            ..Default::default()
        }
    }

    /// A single host address.
    pub fn host(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, NetworkSubType::Host, value)
    }

    /// A network in CIDR notation.
    pub fn network(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, NetworkSubType::Network, value)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl ConfigResource for NetworkObject {
    const TYPE_NAME: &'static str = "NetworkObject";
    const COLLECTION_URL: &'static str = "/object/networks";

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}
