use serde::{Deserialize, Serialize};

use crate::resource::ConfigResource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadiusIdentitySource {
    pub name: String,
    pub host: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_authentication_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_secret_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(rename = "type", default = "RadiusIdentitySource::default_kind")]
    pub kind: String,
}

impl RadiusIdentitySource {
    pub const KIND: &'static str = "radiusidentitysource";

    fn default_kind() -> String {
        Self::KIND.to_string()
    }

    pub fn new(name: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            kind: Self::default_kind(),
            ..Default::default()
        }
    }

    pub fn with_secret_key(mut self, key: impl Into<String>) -> Self {
        self.server_secret_key = Some(key.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.server_authentication_port = Some(port);
        self
    }

    pub fn with_timeout(mut self, timeout: u32) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl ConfigResource for RadiusIdentitySource {
    const TYPE_NAME: &'static str = "RadiusIdentitySource";
    const COLLECTION_URL: &'static str = "/object/radiusidentitysources";

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}
