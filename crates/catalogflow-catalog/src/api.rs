//! Remote catalog API seam
//!
//! [`CatalogApi`] has one method per remote call. Request and response
//! structs carry the remote field names so the contract stays visible at the
//! boundary; [`crate::aws::AwsCatalogApi`] maps them onto the AWS SDK.

use crate::error::RemoteError;
use crate::model::{
    LaunchPathSummary, ProductViewSummary, ProvisionedProductAttribute, ProvisioningArtifact,
    ProvisioningArtifactParameter, ProvisioningParameterValue, RecordDetail, RecordOutput,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Remote catalog API
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn search_products(&self, input: SearchProductsInput)
    -> RemoteResult<SearchProductsOutput>;

    async fn describe_product(
        &self,
        input: DescribeProductInput,
    ) -> RemoteResult<DescribeProductOutput>;

    async fn list_launch_paths(
        &self,
        input: ListLaunchPathsInput,
    ) -> RemoteResult<ListLaunchPathsOutput>;

    async fn describe_provisioning_parameters(
        &self,
        input: DescribeProvisioningParametersInput,
    ) -> RemoteResult<DescribeProvisioningParametersOutput>;

    async fn provision_product(
        &self,
        input: ProvisionProductInput,
    ) -> RemoteResult<ProvisionProductOutput>;

    async fn search_provisioned_products(
        &self,
        input: SearchProvisionedProductsInput,
    ) -> RemoteResult<SearchProvisionedProductsOutput>;

    async fn terminate_provisioned_product(
        &self,
        input: TerminateProvisionedProductInput,
    ) -> RemoteResult<TerminateProvisionedProductOutput>;

    async fn describe_record(&self, input: DescribeRecordInput)
    -> RemoteResult<DescribeRecordOutput>;
}

/// Remote call names, as the API spells them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApiCall {
    SearchProducts,
    DescribeProduct,
    ListLaunchPaths,
    DescribeProvisioningParameters,
    ProvisionProduct,
    SearchProvisionedProducts,
    TerminateProvisionedProduct,
    DescribeRecord,
}

impl ApiCall {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiCall::SearchProducts => "SearchProducts",
            ApiCall::DescribeProduct => "DescribeProduct",
            ApiCall::ListLaunchPaths => "ListLaunchPaths",
            ApiCall::DescribeProvisioningParameters => "DescribeProvisioningParameters",
            ApiCall::ProvisionProduct => "ProvisionProduct",
            ApiCall::SearchProvisionedProducts => "SearchProvisionedProducts",
            ApiCall::TerminateProvisionedProduct => "TerminateProvisionedProduct",
            ApiCall::DescribeRecord => "DescribeRecord",
        }
    }

    /// Whether the call changes remote state
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            ApiCall::ProvisionProduct | ApiCall::TerminateProvisionedProduct
        )
    }
}

impl fmt::Display for ApiCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============ Requests / Responses ============

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchProductsInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchProductsOutput {
    #[serde(default)]
    pub product_view_summaries: Vec<ProductViewSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeProductInput {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeProductOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_view_summary: Option<ProductViewSummary>,
    #[serde(default)]
    pub provisioning_artifacts: Vec<ProvisioningArtifact>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListLaunchPathsInput {
    pub product_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListLaunchPathsOutput {
    #[serde(default)]
    pub launch_path_summaries: Vec<LaunchPathSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeProvisioningParametersInput {
    pub product_id: String,
    pub provisioning_artifact_id: String,
    pub path_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeProvisioningParametersOutput {
    #[serde(default)]
    pub provisioning_artifact_parameters: Vec<ProvisioningArtifactParameter>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProvisionProductInput {
    pub product_id: String,
    pub provision_token: String,
    pub provisioned_product_name: String,
    pub provisioning_artifact_id: String,
    pub path_id: String,
    #[serde(default)]
    pub provisioning_parameters: Vec<ProvisioningParameterValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProvisionProductOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_detail: Option<RecordDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchProvisionedProductsInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchProvisionedProductsOutput {
    #[serde(default)]
    pub provisioned_products: Vec<ProvisionedProductAttribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TerminateProvisionedProductInput {
    pub terminate_token: String,
    pub provisioned_product_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TerminateProvisionedProductOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_detail: Option<RecordDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeRecordInput {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeRecordOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_detail: Option<RecordDetail>,
    #[serde(default)]
    pub record_outputs: Vec<RecordOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provision_input_wire_names() {
        let input = ProvisionProductInput {
            product_id: "p1".to_string(),
            provision_token: "tok".to_string(),
            provisioned_product_name: "web".to_string(),
            provisioning_artifact_id: "a1".to_string(),
            path_id: "lp1".to_string(),
            provisioning_parameters: vec![ProvisioningParameterValue::new("Size", "small")],
        };

        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "ProductId": "p1",
                "ProvisionToken": "tok",
                "ProvisionedProductName": "web",
                "ProvisioningArtifactId": "a1",
                "PathId": "lp1",
                "ProvisioningParameters": [{"Key": "Size", "Value": "small"}],
            })
        );
    }

    #[test]
    fn test_terminate_input_wire_names() {
        let input = TerminateProvisionedProductInput {
            terminate_token: "tok".to_string(),
            provisioned_product_name: "web".to_string(),
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"TerminateToken": "tok", "ProvisionedProductName": "web"})
        );
    }

    #[test]
    fn test_describe_record_output_from_wire() {
        let json = r#"{
            "RecordDetail": {"RecordId": "r1", "Status": "SUCCEEDED"},
            "RecordOutputs": [{"OutputKey": "URL", "OutputValue": "http://x"}]
        }"#;
        let output: DescribeRecordOutput = serde_json::from_str(json).unwrap();
        assert_eq!(output.record_detail.unwrap().record_id, "r1");
        assert_eq!(output.record_outputs.len(), 1);
        assert!(output.next_page_token.is_none());
    }

    #[test]
    fn test_api_call_names() {
        assert_eq!(ApiCall::ListLaunchPaths.to_string(), "ListLaunchPaths");
        assert!(ApiCall::TerminateProvisionedProduct.is_mutation());
        assert!(!ApiCall::DescribeRecord.is_mutation());
    }
}
