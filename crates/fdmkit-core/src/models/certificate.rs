use serde::{Deserialize, Serialize};

use crate::resource::ConfigResource;

/// Certificate with its private key, stored on the device.
///
/// The `issuer*`/`subject*` and validity fields are filled in by the server
/// from the uploaded PEM.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalCertificate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass_phrase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer_common_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer_locality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer_organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer_organization_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_common_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_distinguished_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_locality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_organization_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validity_start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validity_end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_system_defined: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(rename = "type", default = "InternalCertificate::default_kind")]
    pub kind: String,
}

impl InternalCertificate {
    pub const KIND: &'static str = "internalcertificate";

    fn default_kind() -> String {
        Self::KIND.to_string()
    }

    /// A certificate uploaded from PEM-encoded certificate and key.
    pub fn from_pem(
        name: impl Into<String>,
        cert: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            cert: Some(cert.into()),
            private_key: Some(private_key.into()),
            cert_type: Some("UPLOAD".to_string()),
            kind: Self::default_kind(),
            ..Default::default()
        }
    }
}

impl ConfigResource for InternalCertificate {
    const TYPE_NAME: &'static str = "InternalCertificate";
    const COLLECTION_URL: &'static str = "/object/internalcertificates";

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}
