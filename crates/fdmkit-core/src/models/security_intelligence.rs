use serde::{Deserialize, Serialize};

use super::ReferenceModel;
use crate::operation::ResourceOperation;
use crate::resource::ConfigResource;

/// Network block and allow lists of the Security Intelligence policy.
///
/// The device has exactly one such policy; it can be read and edited but
/// not created or deleted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityIntelligenceNetworkPolicy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Network objects, groups, feeds or feed categories to block.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blacklist_for_block: Vec<ReferenceModel>,
    /// Network objects, groups, feeds or feed categories never blocked.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub whitelist: Vec<ReferenceModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(rename = "type", default = "SecurityIntelligenceNetworkPolicy::default_kind")]
    pub kind: String,
}

impl SecurityIntelligenceNetworkPolicy {
    pub const KIND: &'static str = "securityintelligencenetworkpolicy";

    fn default_kind() -> String {
        Self::KIND.to_string()
    }
}

impl ConfigResource for SecurityIntelligenceNetworkPolicy {
    const TYPE_NAME: &'static str = "SecurityIntelligenceNetworkPolicy";
    const COLLECTION_URL: &'static str = "/policy/securityintelligencenetworkpolicies";
    const OPERATIONS: &'static [ResourceOperation] = &[
        ResourceOperation::Edit,
        ResourceOperation::Get,
        ResourceOperation::GetList,
        ResourceOperation::GetByName,
        ResourceOperation::EditByName,
    ];

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}
