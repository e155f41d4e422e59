//! Catalog entities
//!
//! Field names serialize to the remote wire names (`ProductId`, `PathId`,
//! `RecordOutputs`, ...) so values can be passed through unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Summary of a product available to the caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductViewSummary {
    /// Product view identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub product_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distributor: Option<String>,

    /// `CLOUD_FORMATION_TEMPLATE`, `MARKETPLACE`, ...
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
}

impl ProductViewSummary {
    pub fn new(product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Versioned variant of a product
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProvisioningArtifact {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,

    /// `DEFAULT` or `DEPRECATED`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidance: Option<String>,
}

impl ProvisioningArtifact {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Route through which a product/artifact pair may be provisioned
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LaunchPathSummary {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl LaunchPathSummary {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }
}

/// A product together with its artifacts and launch paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListing {
    pub product: ProductViewSummary,
    pub artifacts: Vec<ProvisioningArtifact>,
    pub launch_paths: Vec<LaunchPathSummary>,
}

impl ProductListing {
    /// The launch path used when the caller has no preference: the first one listed
    pub fn default_launch_path(&self) -> Option<&LaunchPathSummary> {
        self.launch_paths.first()
    }
}

/// One configurable input required to provision a product/artifact/path combination
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProvisioningArtifactParameter {
    pub parameter_key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_type: Option<String>,

    /// The value must not be echoed back to the user
    #[serde(default)]
    pub is_no_echo: bool,
}

/// Caller-supplied value for a provisioning parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProvisioningParameterValue {
    pub key: String,
    pub value: String,
}

impl ProvisioningParameterValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Status of a provisioned product
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProvisionedProductStatus {
    Available,
    UnderChange,
    Tainted,
    Error,
    PlanInProgress,
    /// Status values this client does not know yet
    Unknown(String),
}

impl ProvisionedProductStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Available => "AVAILABLE",
            Self::UnderChange => "UNDER_CHANGE",
            Self::Tainted => "TAINTED",
            Self::Error => "ERROR",
            Self::PlanInProgress => "PLAN_IN_PROGRESS",
            Self::Unknown(s) => s,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error | Self::Tainted)
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::UnderChange | Self::PlanInProgress)
    }
}

impl From<&str> for ProvisionedProductStatus {
    fn from(s: &str) -> Self {
        match s {
            "AVAILABLE" => Self::Available,
            "UNDER_CHANGE" => Self::UnderChange,
            "TAINTED" => Self::Tainted,
            "ERROR" => Self::Error,
            "PLAN_IN_PROGRESS" => Self::PlanInProgress,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl From<String> for ProvisionedProductStatus {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<ProvisionedProductStatus> for String {
    fn from(status: ProvisionedProductStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for ProvisionedProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A product instance the caller has provisioned
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProvisionedProductAttribute {
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,

    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProvisionedProductStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,

    /// Token to reuse when terminating this instance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_token: Option<String>,

    /// Most recent provisioning record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_record_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_artifact_id: Option<String>,
}

impl ProvisionedProductAttribute {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: ProvisionedProductStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Status of a provisioning record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordStatus {
    Created,
    InProgress,
    InProgressInError,
    Succeeded,
    Failed,
    Unknown(String),
}

impl RecordStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Created => "CREATED",
            Self::InProgress => "IN_PROGRESS",
            Self::InProgressInError => "IN_PROGRESS_IN_ERROR",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Unknown(s) => s,
        }
    }
}

impl From<&str> for RecordStatus {
    fn from(s: &str) -> Self {
        match s {
            "CREATED" => Self::Created,
            "IN_PROGRESS" => Self::InProgress,
            "IN_PROGRESS_IN_ERROR" => Self::InProgressInError,
            "SUCCEEDED" => Self::Succeeded,
            "FAILED" => Self::Failed,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl From<String> for RecordStatus {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<RecordStatus> for String {
    fn from(status: RecordStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error attached to a provisioning record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Outcome of a provisioning or termination request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordDetail {
    pub record_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioned_product_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RecordStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_time: Option<DateTime<Utc>>,

    /// `PROVISION_PRODUCT`, `UPDATE_PROVISIONED_PRODUCT` or `TERMINATE_PROVISIONED_PRODUCT`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioned_product_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_artifact_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_id: Option<String>,

    #[serde(default)]
    pub record_errors: Vec<RecordError>,
}

impl RecordDetail {
    pub fn new(record_id: impl Into<String>) -> Self {
        Self {
            record_id: record_id.into(),
            ..Default::default()
        }
    }

    /// True when the remote side reported errors for this record
    pub fn has_errors(&self) -> bool {
        !self.record_errors.is_empty()
    }
}

/// Key/value output produced by a completed record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RecordOutput {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            output_key: Some(key.into()),
            output_value: Some(value.into()),
            description: None,
        }
    }
}

/// A provisioning record with all of its outputs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProvisioningRecord {
    pub record_detail: RecordDetail,
    pub record_outputs: Vec<RecordOutput>,
}

impl ProvisioningRecord {
    pub fn id(&self) -> &str {
        &self.record_detail.record_id
    }

    /// Look up an output value by key
    pub fn output(&self, key: &str) -> Option<&str> {
        self.record_outputs
            .iter()
            .find(|o| o.output_key.as_deref() == Some(key))
            .and_then(|o| o.output_value.as_deref())
    }
}

/// One page of results with the cursor for the next one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    pub fn is_last(&self) -> bool {
        self.next_page_token.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_listing_serializes_wire_names() {
        let listing = ProductListing {
            product: ProductViewSummary::new("p1"),
            artifacts: vec![ProvisioningArtifact::new("a1")],
            launch_paths: vec![LaunchPathSummary::new("lp1")],
        };

        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "product": {"ProductId": "p1"},
                "artifacts": [{"Id": "a1"}],
                "launchPaths": [{"Id": "lp1"}],
            })
        );
    }

    #[test]
    fn test_default_launch_path_is_first() {
        let mut listing = ProductListing {
            product: ProductViewSummary::new("p1"),
            artifacts: vec![],
            launch_paths: vec![LaunchPathSummary::new("lp1"), LaunchPathSummary::new("lp2")],
        };
        assert_eq!(listing.default_launch_path().unwrap().id, "lp1");

        listing.launch_paths.clear();
        assert!(listing.default_launch_path().is_none());
    }

    #[test]
    fn test_provisioned_status_parsing() {
        assert_eq!(
            ProvisionedProductStatus::from("AVAILABLE"),
            ProvisionedProductStatus::Available
        );
        assert!(ProvisionedProductStatus::from("ERROR").is_error());
        assert!(ProvisionedProductStatus::from("TAINTED").is_error());
        assert!(ProvisionedProductStatus::from("UNDER_CHANGE").is_in_progress());

        let unknown = ProvisionedProductStatus::from("SOMETHING_NEW");
        assert_eq!(unknown.as_str(), "SOMETHING_NEW");
        assert!(!unknown.is_available());
    }

    #[test]
    fn test_provisioned_product_deserializes_from_wire() {
        let json = r#"{
            "Id": "pp-1",
            "Name": "web",
            "Status": "ERROR",
            "StatusMessage": "stack failed",
            "IdempotencyToken": "tok-1",
            "LastRecordId": "rec-1"
        }"#;

        let product: ProvisionedProductAttribute = serde_json::from_str(json).unwrap();
        assert_eq!(product.status, Some(ProvisionedProductStatus::Error));
        assert_eq!(product.idempotency_token.as_deref(), Some("tok-1"));
        assert_eq!(product.last_record_id.as_deref(), Some("rec-1"));
    }

    #[test]
    fn test_record_output_lookup() {
        let record = ProvisioningRecord {
            record_detail: RecordDetail::new("r1"),
            record_outputs: vec![RecordOutput::new("URL", "http://x")],
        };
        assert_eq!(record.id(), "r1");
        assert_eq!(record.output("URL"), Some("http://x"));
        assert_eq!(record.output("Missing"), None);
    }

    #[test]
    fn test_record_errors() {
        let mut detail = RecordDetail::new("r1");
        assert!(!detail.has_errors());

        detail.record_errors.push(RecordError {
            code: Some("ValidationError".to_string()),
            description: None,
        });
        assert!(detail.has_errors());
    }
}
