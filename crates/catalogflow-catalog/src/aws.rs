//! AWS Service Catalog backed [`CatalogApi`]
//!
//! Each method issues exactly one SDK request and maps the SDK shapes onto
//! the wire structs in [`crate::api`]. SDK retries are disabled: a single
//! remote failure is surfaced to the caller immediately.

use crate::api::*;
use crate::credentials::Credentials;
use crate::error::RemoteError;
use crate::model::{
    LaunchPathSummary, ProductViewSummary, ProvisionedProductAttribute, ProvisioningArtifact,
    ProvisioningArtifactParameter, RecordDetail, RecordError, RecordOutput,
};
use async_trait::async_trait;
use aws_sdk_servicecatalog::config::retry::RetryConfig;
use aws_sdk_servicecatalog::config::{BehaviorVersion, Region};
use aws_sdk_servicecatalog::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_servicecatalog::primitives::DateTime as SdkDateTime;
use aws_sdk_servicecatalog::types as sdk;
use chrono::{DateTime, Utc};

/// [`CatalogApi`] over `aws-sdk-servicecatalog`
#[derive(Debug, Clone)]
pub struct AwsCatalogApi {
    client: aws_sdk_servicecatalog::Client,
    region: String,
}

impl AwsCatalogApi {
    pub fn new(credentials: &Credentials, region: impl Into<String>) -> Self {
        let region = region.into();
        let config = aws_sdk_servicecatalog::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.clone()))
            .credentials_provider(credentials.to_sdk())
            .retry_config(RetryConfig::disabled())
            .build();

        Self {
            client: aws_sdk_servicecatalog::Client::from_conf(config),
            region,
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

#[async_trait]
impl CatalogApi for AwsCatalogApi {
    async fn search_products(
        &self,
        input: SearchProductsInput,
    ) -> RemoteResult<SearchProductsOutput> {
        let output = self
            .client
            .search_products()
            .set_page_token(input.page_token)
            .set_page_size(input.page_size)
            .send()
            .await
            .map_err(remote_error)?;

        Ok(SearchProductsOutput {
            product_view_summaries: output
                .product_view_summaries()
                .iter()
                .map(product_view_summary)
                .collect(),
            next_page_token: output.next_page_token().map(str::to_string),
        })
    }

    async fn describe_product(
        &self,
        input: DescribeProductInput,
    ) -> RemoteResult<DescribeProductOutput> {
        let output = self
            .client
            .describe_product()
            .id(input.id)
            .send()
            .await
            .map_err(remote_error)?;

        Ok(DescribeProductOutput {
            product_view_summary: output.product_view_summary().map(product_view_summary),
            provisioning_artifacts: output
                .provisioning_artifacts()
                .iter()
                .map(provisioning_artifact)
                .collect(),
        })
    }

    async fn list_launch_paths(
        &self,
        input: ListLaunchPathsInput,
    ) -> RemoteResult<ListLaunchPathsOutput> {
        let output = self
            .client
            .list_launch_paths()
            .product_id(input.product_id)
            .set_page_token(input.page_token)
            .send()
            .await
            .map_err(remote_error)?;

        Ok(ListLaunchPathsOutput {
            launch_path_summaries: output
                .launch_path_summaries()
                .iter()
                .map(|p| LaunchPathSummary {
                    id: p.id().unwrap_or_default().to_string(),
                    name: p.name().map(str::to_string),
                })
                .collect(),
            next_page_token: output.next_page_token().map(str::to_string),
        })
    }

    async fn describe_provisioning_parameters(
        &self,
        input: DescribeProvisioningParametersInput,
    ) -> RemoteResult<DescribeProvisioningParametersOutput> {
        let output = self
            .client
            .describe_provisioning_parameters()
            .product_id(input.product_id)
            .provisioning_artifact_id(input.provisioning_artifact_id)
            .path_id(input.path_id)
            .send()
            .await
            .map_err(remote_error)?;

        Ok(DescribeProvisioningParametersOutput {
            provisioning_artifact_parameters: output
                .provisioning_artifact_parameters()
                .iter()
                .map(|p| ProvisioningArtifactParameter {
                    parameter_key: p.parameter_key().unwrap_or_default().to_string(),
                    description: p.description().map(str::to_string),
                    default_value: p.default_value().map(str::to_string),
                    parameter_type: p.parameter_type().map(str::to_string),
                    is_no_echo: p.is_no_echo(),
                })
                .collect(),
        })
    }

    async fn provision_product(
        &self,
        input: ProvisionProductInput,
    ) -> RemoteResult<ProvisionProductOutput> {
        let parameters: Vec<sdk::ProvisioningParameter> = input
            .provisioning_parameters
            .into_iter()
            .map(|p| {
                sdk::ProvisioningParameter::builder()
                    .key(p.key)
                    .value(p.value)
                    .build()
            })
            .collect();

        let output = self
            .client
            .provision_product()
            .product_id(input.product_id)
            .provision_token(input.provision_token)
            .provisioned_product_name(input.provisioned_product_name)
            .provisioning_artifact_id(input.provisioning_artifact_id)
            .path_id(input.path_id)
            .set_provisioning_parameters(Some(parameters))
            .send()
            .await
            .map_err(remote_error)?;

        Ok(ProvisionProductOutput {
            record_detail: output.record_detail().map(record_detail),
        })
    }

    async fn search_provisioned_products(
        &self,
        input: SearchProvisionedProductsInput,
    ) -> RemoteResult<SearchProvisionedProductsOutput> {
        let output = self
            .client
            .search_provisioned_products()
            .set_page_token(input.page_token)
            .set_page_size(input.page_size)
            .send()
            .await
            .map_err(remote_error)?;

        Ok(SearchProvisionedProductsOutput {
            provisioned_products: output
                .provisioned_products()
                .iter()
                .map(provisioned_product)
                .collect(),
            next_page_token: output.next_page_token().map(str::to_string),
        })
    }

    async fn terminate_provisioned_product(
        &self,
        input: TerminateProvisionedProductInput,
    ) -> RemoteResult<TerminateProvisionedProductOutput> {
        let output = self
            .client
            .terminate_provisioned_product()
            .terminate_token(input.terminate_token)
            .provisioned_product_name(input.provisioned_product_name)
            .send()
            .await
            .map_err(remote_error)?;

        Ok(TerminateProvisionedProductOutput {
            record_detail: output.record_detail().map(record_detail),
        })
    }

    async fn describe_record(
        &self,
        input: DescribeRecordInput,
    ) -> RemoteResult<DescribeRecordOutput> {
        let output = self
            .client
            .describe_record()
            .id(input.id)
            .set_page_token(input.page_token)
            .send()
            .await
            .map_err(remote_error)?;

        Ok(DescribeRecordOutput {
            record_detail: output.record_detail().map(record_detail),
            record_outputs: output
                .record_outputs()
                .iter()
                .map(|o| RecordOutput {
                    output_key: o.output_key().map(str::to_string),
                    output_value: o.output_value().map(str::to_string),
                    description: o.description().map(str::to_string),
                })
                .collect(),
            next_page_token: output.next_page_token().map(str::to_string),
        })
    }
}

/// Classify an SDK failure. Service errors keep their error code; anything
/// that never reached the service is a transport failure.
fn remote_error<E, R>(err: SdkError<E, R>) -> RemoteError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    let code = err
        .as_service_error()
        .and_then(|e| e.code())
        .map(str::to_string);
    let message = DisplayErrorContext(&err).to_string();

    match code {
        Some(code) => RemoteError::from_code(code, message),
        None => RemoteError::transport(message),
    }
}

fn timestamp(dt: Option<&SdkDateTime>) -> Option<DateTime<Utc>> {
    dt.and_then(|dt| DateTime::from_timestamp(dt.secs(), dt.subsec_nanos()))
}

fn product_view_summary(p: &sdk::ProductViewSummary) -> ProductViewSummary {
    ProductViewSummary {
        id: p.id().map(str::to_string),
        product_id: p.product_id().unwrap_or_default().to_string(),
        name: p.name().map(str::to_string),
        owner: p.owner().map(str::to_string),
        short_description: p.short_description().map(str::to_string),
        distributor: p.distributor().map(str::to_string),
        product_type: p.r#type().map(|t| t.as_str().to_string()),
    }
}

fn provisioning_artifact(a: &sdk::ProvisioningArtifact) -> ProvisioningArtifact {
    ProvisioningArtifact {
        id: a.id().unwrap_or_default().to_string(),
        name: a.name().map(str::to_string),
        description: a.description().map(str::to_string),
        created_time: timestamp(a.created_time()),
        guidance: a.guidance().map(|g| g.as_str().to_string()),
    }
}

fn provisioned_product(p: &sdk::ProvisionedProductAttribute) -> ProvisionedProductAttribute {
    ProvisionedProductAttribute {
        id: p.id().unwrap_or_default().to_string(),
        name: p.name().unwrap_or_default().to_string(),
        arn: p.arn().map(str::to_string),
        product_type: p.r#type().map(str::to_string),
        status: p.status().map(|s| s.as_str().into()),
        status_message: p.status_message().map(str::to_string),
        created_time: timestamp(p.created_time()),
        idempotency_token: p.idempotency_token().map(str::to_string),
        last_record_id: p.last_record_id().map(str::to_string),
        product_id: p.product_id().map(str::to_string),
        provisioning_artifact_id: p.provisioning_artifact_id().map(str::to_string),
    }
}

fn record_detail(r: &sdk::RecordDetail) -> RecordDetail {
    RecordDetail {
        record_id: r.record_id().unwrap_or_default().to_string(),
        provisioned_product_name: r.provisioned_product_name().map(str::to_string),
        status: r.status().map(|s| s.as_str().into()),
        created_time: timestamp(r.created_time()),
        updated_time: timestamp(r.updated_time()),
        record_type: r.record_type().map(str::to_string),
        provisioned_product_id: r.provisioned_product_id().map(str::to_string),
        product_id: r.product_id().map(str::to_string),
        provisioning_artifact_id: r.provisioning_artifact_id().map(str::to_string),
        path_id: r.path_id().map(str::to_string),
        record_errors: r
            .record_errors()
            .iter()
            .map(|e| RecordError {
                code: e.code().map(str::to_string),
                description: e.description().map(str::to_string),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProvisionedProductStatus, RecordStatus};

    #[test]
    fn test_timestamp_conversion() {
        let dt = SdkDateTime::from_secs(1_700_000_000);
        let converted = timestamp(Some(&dt)).unwrap();
        assert_eq!(converted.timestamp(), 1_700_000_000);
        assert!(timestamp(None).is_none());
    }

    #[test]
    fn test_record_detail_mapping() {
        let sdk_record = sdk::RecordDetail::builder()
            .record_id("r1")
            .provisioned_product_name("web")
            .status(sdk::RecordStatus::Succeeded)
            .record_errors(
                sdk::RecordError::builder()
                    .code("ValidationError")
                    .description("bad parameter")
                    .build(),
            )
            .build();

        let detail = record_detail(&sdk_record);
        assert_eq!(detail.record_id, "r1");
        assert_eq!(detail.provisioned_product_name.as_deref(), Some("web"));
        assert_eq!(detail.status, Some(RecordStatus::Succeeded));
        assert!(detail.has_errors());
    }

    #[test]
    fn test_provisioned_product_mapping() {
        let sdk_product = sdk::ProvisionedProductAttribute::builder()
            .id("pp-1")
            .name("web")
            .status(sdk::ProvisionedProductStatus::UnderChange)
            .idempotency_token("tok-1")
            .last_record_id("rec-1")
            .build();

        let product = provisioned_product(&sdk_product);
        assert_eq!(product.id, "pp-1");
        assert_eq!(product.status, Some(ProvisionedProductStatus::UnderChange));
        assert_eq!(product.idempotency_token.as_deref(), Some("tok-1"));
    }
}
