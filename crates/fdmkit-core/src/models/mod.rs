//! Typed models for a subset of FDM configuration objects.
//!
//! Field names follow the API's camelCase JSON. Unset optional fields are
//! left out of the payload so they do not take part in comparison.

mod certificate;
mod network;
mod radius;
mod security_intelligence;

use serde::{Deserialize, Serialize};

pub use certificate::InternalCertificate;
pub use network::{DnsResolution, NetworkObject, NetworkSubType};
pub use radius::RadiusIdentitySource;
pub use security_intelligence::SecurityIntelligenceNetworkPolicy;

/// Reference to another configuration object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceModel {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ReferenceModel {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            version: None,
            kind: kind.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}
