//! Catalog operations
//!
//! [`CatalogService`] is the entry point used by front ends. It is stateless
//! apart from immutable settings: every operation takes the caller's
//! credentials and an optional region, builds a fresh client through the
//! [`ClientFactory`], and reshapes the remote responses into the types in
//! [`crate::model`].

use crate::api::*;
use crate::credentials::Credentials;
use crate::error::{CatalogError, ErrorContext, RemoteError, Result};
use crate::factory::{AwsClientFactory, ClientFactory, FALLBACK_REGION, validate_region};
use crate::model::{
    LaunchPathSummary, Page, ProductListing, ProductViewSummary, ProvisionedProductAttribute,
    ProvisioningArtifactParameter, ProvisioningParameterValue, ProvisioningRecord, RecordDetail,
    RecordOutput,
};
use futures_util::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

const SEARCH_PRODUCTS: &str = "search_products";
const DESCRIBE_PROVISIONING_PARAMETERS: &str = "describe_provisioning_parameters";
const PROVISION_PRODUCT: &str = "provision_product";
const SEARCH_PROVISIONED_PRODUCTS: &str = "search_provisioned_products";
const TERMINATE_PROVISIONED_PRODUCT: &str = "terminate_provisioned_product";
const DESCRIBE_RECORD_DETAILS: &str = "describe_record_details";

/// Largest page size the remote API accepts
pub const MAX_PAGE_SIZE: i32 = 20;

/// Settings shared by every operation of a [`CatalogService`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    /// Region used when an operation is called without one
    pub default_region: Option<String>,

    /// Products described concurrently by `search_products`.
    /// 1 processes products one at a time.
    pub product_concurrency: usize,

    /// Page size requested from paginated calls (remote default when unset)
    pub page_size: Option<i32>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            default_region: None,
            product_concurrency: 1,
            page_size: None,
        }
    }
}

impl ServiceSettings {
    pub fn validate(&self) -> Result<()> {
        if self.product_concurrency == 0 {
            return Err(CatalogError::InvalidConfig(
                "product_concurrency must be at least 1".to_string(),
            ));
        }
        if let Some(size) = self.page_size.filter(|s| !(1..=MAX_PAGE_SIZE).contains(s)) {
            return Err(CatalogError::InvalidConfig(format!(
                "page_size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, size
            )));
        }
        if let Some(region) = &self.default_region {
            validate_region(region)?;
        }
        Ok(())
    }
}

/// Request to provision a product instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionRequest {
    pub product_id: String,
    pub artifact_id: String,
    pub launch_path_id: String,
    /// Name of the provisioned product to create
    pub resource_name: String,
    pub provisioning_params: Vec<ProvisioningParameterValue>,
    /// Idempotency token pinned by the caller. When unset a fresh token is
    /// generated on every call, so each call is a new provisioning intent.
    pub provision_token: Option<String>,
}

impl ProvisionRequest {
    pub fn new(
        product_id: impl Into<String>,
        artifact_id: impl Into<String>,
        launch_path_id: impl Into<String>,
        resource_name: impl Into<String>,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            artifact_id: artifact_id.into(),
            launch_path_id: launch_path_id.into(),
            resource_name: resource_name.into(),
            provisioning_params: Vec::new(),
            provision_token: None,
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.provisioning_params
            .push(ProvisioningParameterValue::new(key, value));
        self
    }

    pub fn with_params(mut self, params: Vec<ProvisioningParameterValue>) -> Self {
        self.provisioning_params.extend(params);
        self
    }

    pub fn with_provision_token(mut self, token: impl Into<String>) -> Self {
        self.provision_token = Some(token.into());
        self
    }

    fn into_input(self) -> ProvisionProductInput {
        ProvisionProductInput {
            product_id: self.product_id,
            provision_token: self
                .provision_token
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            provisioned_product_name: self.resource_name,
            provisioning_artifact_id: self.artifact_id,
            path_id: self.launch_path_id,
            provisioning_parameters: self.provisioning_params,
        }
    }
}

/// Stateless catalog operations
#[derive(Clone)]
pub struct CatalogService {
    factory: Arc<dyn ClientFactory>,
    settings: ServiceSettings,
}

impl CatalogService {
    /// Service backed by the AWS SDK
    pub fn new(settings: ServiceSettings) -> Result<Self> {
        Self::with_factory(Arc::new(AwsClientFactory), settings)
    }

    pub fn with_factory(factory: Arc<dyn ClientFactory>, settings: ServiceSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { factory, settings })
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Region an operation will talk to: the caller's, else the configured
    /// default, else [`FALLBACK_REGION`]
    pub fn resolve_region<'a>(&'a self, region: Option<&'a str>) -> &'a str {
        region
            .filter(|r| !r.is_empty())
            .or(self.settings.default_region.as_deref())
            .unwrap_or(FALLBACK_REGION)
    }

    /// Build a client handle for one operation
    pub fn client(
        &self,
        operation: &'static str,
        credentials: &Credentials,
        region: Option<&str>,
    ) -> Result<Arc<dyn CatalogApi>> {
        credentials.check(operation)?;
        let region = self.resolve_region(region);
        debug!(operation, region, "creating catalog client");
        self.factory.client(credentials, region)
    }

    // ============ Queries ============

    /// List every product with its artifacts and launch paths, in search order
    pub async fn search_products(
        &self,
        credentials: &Credentials,
        region: Option<&str>,
    ) -> Result<Vec<ProductListing>> {
        let client = self.client(SEARCH_PRODUCTS, credentials, region)?;

        let result = async {
            let summaries = self.collect_product_summaries(client.as_ref()).await?;
            debug!(count = summaries.len(), "found products");

            stream::iter(summaries)
                .map(|summary| Self::product_listing(client.as_ref(), summary))
                .buffered(self.settings.product_concurrency)
                .try_collect::<Vec<_>>()
                .await
        }
        .await;

        result.inspect_err(log_failure)
    }

    /// Parameters required to provision a product/artifact/launch-path triple
    pub async fn describe_provisioning_parameters(
        &self,
        product_id: &str,
        artifact_id: &str,
        launch_path_id: &str,
        credentials: &Credentials,
        region: Option<&str>,
    ) -> Result<Vec<ProvisioningArtifactParameter>> {
        let client = self.client(DESCRIBE_PROVISIONING_PARAMETERS, credentials, region)?;

        debug!(product_id, artifact_id, launch_path_id, "describing provisioning parameters");
        let output = client
            .describe_provisioning_parameters(DescribeProvisioningParametersInput {
                product_id: product_id.to_string(),
                provisioning_artifact_id: artifact_id.to_string(),
                path_id: launch_path_id.to_string(),
            })
            .await
            .map_err(|source| {
                CatalogError::query(
                    DESCRIBE_PROVISIONING_PARAMETERS,
                    ApiCall::DescribeProvisioningParameters,
                    ErrorContext::new()
                        .with("ProductId", product_id)
                        .with("ProvisioningArtifactId", artifact_id)
                        .with("PathId", launch_path_id),
                    source,
                )
            })
            .inspect_err(log_failure)?;

        Ok(output.provisioning_artifact_parameters)
    }

    /// Every provisioned product visible to the caller, across all pages
    pub async fn search_provisioned_products(
        &self,
        credentials: &Credentials,
        region: Option<&str>,
    ) -> Result<Vec<ProvisionedProductAttribute>> {
        let client = self.client(SEARCH_PROVISIONED_PRODUCTS, credentials, region)?;

        let mut products = Vec::new();
        let mut page_token = None;
        loop {
            let page = self
                .provisioned_products_page(client.as_ref(), page_token)
                .await
                .inspect_err(log_failure)?;
            products.extend(page.items);
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(count = products.len(), "found provisioned products");
        Ok(products)
    }

    /// One page of provisioned products, starting at `page_token`
    pub async fn search_provisioned_products_page(
        &self,
        page_token: Option<&str>,
        credentials: &Credentials,
        region: Option<&str>,
    ) -> Result<Page<ProvisionedProductAttribute>> {
        let client = self.client(SEARCH_PROVISIONED_PRODUCTS, credentials, region)?;
        self.provisioned_products_page(client.as_ref(), page_token.map(str::to_string))
            .await
            .inspect_err(log_failure)
    }

    /// A provisioning record with all of its outputs
    pub async fn describe_record_details(
        &self,
        record_id: &str,
        credentials: &Credentials,
        region: Option<&str>,
    ) -> Result<ProvisioningRecord> {
        let client = self.client(DESCRIBE_RECORD_DETAILS, credentials, region)?;

        let mut detail: Option<RecordDetail> = None;
        let mut outputs: Vec<RecordOutput> = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut context = ErrorContext::new().with("Id", record_id);
            if let Some(token) = &page_token {
                context = context.with("PageToken", token.clone());
            }

            let page = client
                .describe_record(DescribeRecordInput {
                    id: record_id.to_string(),
                    page_token: page_token.take(),
                })
                .await
                .map_err(|source| {
                    CatalogError::query(
                        DESCRIBE_RECORD_DETAILS,
                        ApiCall::DescribeRecord,
                        context,
                        source,
                    )
                })
                .inspect_err(log_failure)?;

            if detail.is_none() {
                detail = page.record_detail;
            }
            outputs.extend(page.record_outputs);

            match next_token(page.next_page_token) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(ProvisioningRecord {
            record_detail: detail.unwrap_or_else(|| RecordDetail::new(record_id)),
            record_outputs: outputs,
        })
    }

    // ============ Mutations ============

    /// Provision a product instance and return the accepted record
    pub async fn provision_product(
        &self,
        request: ProvisionRequest,
        credentials: &Credentials,
        region: Option<&str>,
    ) -> Result<RecordDetail> {
        let client = self.client(PROVISION_PRODUCT, credentials, region)?;

        let input = request.into_input();
        let context = ErrorContext::new()
            .with("ProductId", input.product_id.clone())
            .with("ProvisionedProductName", input.provisioned_product_name.clone());

        info!(
            product_id = %input.product_id,
            name = %input.provisioned_product_name,
            artifact_id = %input.provisioning_artifact_id,
            path_id = %input.path_id,
            params = input.provisioning_parameters.len(),
            "provisioning product"
        );

        let output = client
            .provision_product(input)
            .await
            .map_err(|source| {
                CatalogError::mutation(
                    PROVISION_PRODUCT,
                    ApiCall::ProvisionProduct,
                    context.clone(),
                    source,
                )
            })
            .inspect_err(log_failure)?;

        output
            .record_detail
            .ok_or_else(|| {
                CatalogError::mutation(
                    PROVISION_PRODUCT,
                    ApiCall::ProvisionProduct,
                    context,
                    RemoteError::invalid_response("response carried no RecordDetail"),
                )
            })
            .inspect_err(log_failure)
    }

    /// Terminate a provisioned product. `idempotency_token` is sent unchanged,
    /// so retrying with the same token is safe.
    pub async fn terminate_provisioned_product(
        &self,
        name: &str,
        idempotency_token: &str,
        credentials: &Credentials,
        region: Option<&str>,
    ) -> Result<RecordDetail> {
        let client = self.client(TERMINATE_PROVISIONED_PRODUCT, credentials, region)?;
        let context = ErrorContext::new().with("ProvisionedProductName", name);

        info!(name, "terminating provisioned product");
        let output = client
            .terminate_provisioned_product(TerminateProvisionedProductInput {
                terminate_token: idempotency_token.to_string(),
                provisioned_product_name: name.to_string(),
            })
            .await
            .map_err(|source| {
                CatalogError::mutation(
                    TERMINATE_PROVISIONED_PRODUCT,
                    ApiCall::TerminateProvisionedProduct,
                    context.clone(),
                    source,
                )
            })
            .inspect_err(log_failure)?;

        output
            .record_detail
            .ok_or_else(|| {
                CatalogError::mutation(
                    TERMINATE_PROVISIONED_PRODUCT,
                    ApiCall::TerminateProvisionedProduct,
                    context,
                    RemoteError::invalid_response("response carried no RecordDetail"),
                )
            })
            .inspect_err(log_failure)
    }

    // ============ Internals ============

    async fn collect_product_summaries(
        &self,
        client: &dyn CatalogApi,
    ) -> Result<Vec<ProductViewSummary>> {
        let mut summaries = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let page = client
                .search_products(SearchProductsInput {
                    page_token: page_token.take(),
                    page_size: self.settings.page_size,
                })
                .await
                .map_err(|source| {
                    CatalogError::query(
                        SEARCH_PRODUCTS,
                        ApiCall::SearchProducts,
                        ErrorContext::new(),
                        source,
                    )
                })?;

            summaries.extend(page.product_view_summaries);
            match next_token(page.next_page_token) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        Ok(summaries)
    }

    /// Describe one product and list its launch paths concurrently
    async fn product_listing(
        client: &dyn CatalogApi,
        summary: ProductViewSummary,
    ) -> Result<ProductListing> {
        let product_id = summary.product_id.clone();

        let details = async {
            client
                .describe_product(DescribeProductInput {
                    id: product_id.clone(),
                })
                .await
                .map_err(|source| {
                    CatalogError::query(
                        SEARCH_PRODUCTS,
                        ApiCall::DescribeProduct,
                        ErrorContext::new().with("ProductId", product_id.clone()),
                        source,
                    )
                })
        };
        let launch_paths = Self::collect_launch_paths(client, &product_id);

        let (details, launch_paths) = tokio::try_join!(details, launch_paths)?;

        Ok(ProductListing {
            product: details.product_view_summary.unwrap_or(summary),
            artifacts: details.provisioning_artifacts,
            launch_paths,
        })
    }

    async fn collect_launch_paths(
        client: &dyn CatalogApi,
        product_id: &str,
    ) -> Result<Vec<LaunchPathSummary>> {
        let mut paths = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let page = client
                .list_launch_paths(ListLaunchPathsInput {
                    product_id: product_id.to_string(),
                    page_token: page_token.take(),
                })
                .await
                .map_err(|source| {
                    CatalogError::query(
                        SEARCH_PRODUCTS,
                        ApiCall::ListLaunchPaths,
                        ErrorContext::new().with("ProductId", product_id),
                        source,
                    )
                })?;

            paths.extend(page.launch_path_summaries);
            match next_token(page.next_page_token) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        Ok(paths)
    }

    async fn provisioned_products_page(
        &self,
        client: &dyn CatalogApi,
        page_token: Option<String>,
    ) -> Result<Page<ProvisionedProductAttribute>> {
        let mut context = ErrorContext::new();
        if let Some(token) = &page_token {
            context = context.with("PageToken", token.clone());
        }

        let output = client
            .search_provisioned_products(SearchProvisionedProductsInput {
                page_token,
                page_size: self.settings.page_size,
            })
            .await
            .map_err(|source| {
                CatalogError::query(
                    SEARCH_PROVISIONED_PRODUCTS,
                    ApiCall::SearchProvisionedProducts,
                    context,
                    source,
                )
            })?;

        Ok(Page {
            items: output.provisioned_products,
            next_page_token: next_token(output.next_page_token),
        })
    }
}

/// Some endpoints return an empty string instead of omitting the token
fn next_token(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.is_empty())
}

fn log_failure(err: &CatalogError) {
    warn!(
        operation = err.operation().unwrap_or("unknown"),
        call = err.call().map(|c| c.as_str()).unwrap_or("none"),
        "{}",
        err
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockCatalogApi, MockClientFactory};

    fn service(settings: ServiceSettings) -> CatalogService {
        let factory = MockClientFactory::new(MockCatalogApi::new());
        CatalogService::with_factory(Arc::new(factory), settings).unwrap()
    }

    #[test]
    fn test_resolve_region_fallbacks() {
        let svc = service(ServiceSettings::default());
        assert_eq!(svc.resolve_region(Some("eu-west-1")), "eu-west-1");
        assert_eq!(svc.resolve_region(Some("")), FALLBACK_REGION);
        assert_eq!(svc.resolve_region(None), FALLBACK_REGION);

        let svc = service(ServiceSettings {
            default_region: Some("ap-northeast-1".to_string()),
            ..Default::default()
        });
        assert_eq!(svc.resolve_region(None), "ap-northeast-1");
        assert_eq!(svc.resolve_region(Some("eu-west-1")), "eu-west-1");
    }

    #[test]
    fn test_settings_validation() {
        assert!(ServiceSettings::default().validate().is_ok());

        let zero = ServiceSettings {
            product_concurrency: 0,
            ..Default::default()
        };
        assert!(matches!(zero.validate(), Err(CatalogError::InvalidConfig(_))));

        let too_big = ServiceSettings {
            page_size: Some(100),
            ..Default::default()
        };
        assert!(too_big.validate().is_err());

        let bad_region = ServiceSettings {
            default_region: Some("Mars 1".to_string()),
            ..Default::default()
        };
        assert!(bad_region.validate().is_err());
    }

    #[test]
    fn test_provision_request_mints_token_unless_pinned() {
        let request = ProvisionRequest::new("p1", "a1", "lp1", "web");
        let first = request.clone().into_input();
        let second = request.into_input();
        assert_ne!(first.provision_token, second.provision_token);
        assert!(Uuid::parse_str(&first.provision_token).is_ok());

        let pinned = ProvisionRequest::new("p1", "a1", "lp1", "web")
            .with_provision_token("retry-safe")
            .into_input();
        assert_eq!(pinned.provision_token, "retry-safe");
    }

    #[test]
    fn test_provision_request_maps_wire_fields() {
        let input = ProvisionRequest::new("p1", "a1", "lp1", "web")
            .with_param("InstanceType", "t3.micro")
            .into_input();
        assert_eq!(input.product_id, "p1");
        assert_eq!(input.provisioning_artifact_id, "a1");
        assert_eq!(input.path_id, "lp1");
        assert_eq!(input.provisioned_product_name, "web");
        assert_eq!(
            input.provisioning_parameters,
            vec![ProvisioningParameterValue::new("InstanceType", "t3.micro")]
        );
    }

    #[test]
    fn test_next_token_treats_empty_as_end() {
        assert_eq!(next_token(None), None);
        assert_eq!(next_token(Some(String::new())), None);
        assert_eq!(next_token(Some("2".to_string())), Some("2".to_string()));
    }
}
