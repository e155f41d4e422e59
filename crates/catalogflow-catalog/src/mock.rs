//! In-memory [`CatalogApi`] for tests and offline development.
//!
//! Only available with the `mock` feature. The mock keeps a small catalog in
//! memory, records every request it receives and can be told to reject
//! specific calls. Page tokens are decimal offsets into the stored lists.

use crate::api::*;
use crate::credentials::Credentials;
use crate::error::{RemoteError, Result};
use crate::factory::ClientFactory;
use crate::model::{
    LaunchPathSummary, ProductViewSummary, ProvisionedProductAttribute, ProvisionedProductStatus,
    ProvisioningArtifact, ProvisioningArtifactParameter, RecordDetail, RecordOutput, RecordStatus,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// A request as received by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedRequest {
    SearchProducts(SearchProductsInput),
    DescribeProduct(DescribeProductInput),
    ListLaunchPaths(ListLaunchPathsInput),
    DescribeProvisioningParameters(DescribeProvisioningParametersInput),
    ProvisionProduct(ProvisionProductInput),
    SearchProvisionedProducts(SearchProvisionedProductsInput),
    TerminateProvisionedProduct(TerminateProvisionedProductInput),
    DescribeRecord(DescribeRecordInput),
}

impl RecordedRequest {
    pub fn call(&self) -> ApiCall {
        match self {
            Self::SearchProducts(_) => ApiCall::SearchProducts,
            Self::DescribeProduct(_) => ApiCall::DescribeProduct,
            Self::ListLaunchPaths(_) => ApiCall::ListLaunchPaths,
            Self::DescribeProvisioningParameters(_) => ApiCall::DescribeProvisioningParameters,
            Self::ProvisionProduct(_) => ApiCall::ProvisionProduct,
            Self::SearchProvisionedProducts(_) => ApiCall::SearchProvisionedProducts,
            Self::TerminateProvisionedProduct(_) => ApiCall::TerminateProvisionedProduct,
            Self::DescribeRecord(_) => ApiCall::DescribeRecord,
        }
    }

    /// Identifier used to target failures at a single product, name or record
    fn key(&self) -> Option<&str> {
        match self {
            Self::DescribeProduct(i) => Some(&i.id),
            Self::ListLaunchPaths(i) => Some(&i.product_id),
            Self::DescribeProvisioningParameters(i) => Some(&i.product_id),
            Self::ProvisionProduct(i) => Some(&i.provisioned_product_name),
            Self::TerminateProvisionedProduct(i) => Some(&i.provisioned_product_name),
            Self::DescribeRecord(i) => Some(&i.id),
            Self::SearchProducts(_) | Self::SearchProvisionedProducts(_) => None,
        }
    }
}

struct Failure {
    call: ApiCall,
    key: Option<String>,
    error: RemoteError,
}

type ParameterKey = (String, String, String);

#[derive(Default)]
struct MockState {
    products: Vec<ProductViewSummary>,
    artifacts: HashMap<String, Vec<ProvisioningArtifact>>,
    launch_paths: HashMap<String, Vec<LaunchPathSummary>>,
    parameters: HashMap<ParameterKey, Vec<ProvisioningArtifactParameter>>,
    provisioned: Vec<ProvisionedProductAttribute>,
    records: HashMap<String, (RecordDetail, Vec<RecordOutput>)>,
    terminations: HashMap<String, RecordDetail>,
    failures: Vec<Failure>,
    latency: HashMap<String, Duration>,
    requests: Vec<RecordedRequest>,
    next_record: usize,
}

impl MockState {
    fn new_record(&mut self, record_type: &str, name: &str) -> RecordDetail {
        self.next_record += 1;
        RecordDetail {
            record_id: format!("rec-{}", self.next_record),
            provisioned_product_name: Some(name.to_string()),
            status: Some(RecordStatus::Created),
            record_type: Some(record_type.to_string()),
            ..Default::default()
        }
    }
}

/// In-memory catalog
#[derive(Default)]
pub struct MockCatalogApi {
    state: Mutex<MockState>,
    page_size: Option<usize>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockCatalogApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force a server-side page size, regardless of what the request asks for
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn with_product(
        mut self,
        product: ProductViewSummary,
        artifacts: Vec<ProvisioningArtifact>,
        launch_paths: Vec<LaunchPathSummary>,
    ) -> Self {
        let state = self.state_mut();
        state
            .artifacts
            .insert(product.product_id.clone(), artifacts);
        state
            .launch_paths
            .insert(product.product_id.clone(), launch_paths);
        state.products.push(product);
        self
    }

    pub fn with_parameters(
        mut self,
        product_id: &str,
        artifact_id: &str,
        path_id: &str,
        parameters: Vec<ProvisioningArtifactParameter>,
    ) -> Self {
        let key = (
            product_id.to_string(),
            artifact_id.to_string(),
            path_id.to_string(),
        );
        self.state_mut().parameters.insert(key, parameters);
        self
    }

    pub fn with_provisioned(mut self, product: ProvisionedProductAttribute) -> Self {
        self.state_mut().provisioned.push(product);
        self
    }

    pub fn with_record(mut self, detail: RecordDetail, outputs: Vec<RecordOutput>) -> Self {
        self.state_mut()
            .records
            .insert(detail.record_id.clone(), (detail, outputs));
        self
    }

    /// Delay `DescribeProduct` and `ListLaunchPaths` for one product
    pub fn with_latency(mut self, product_id: &str, delay: Duration) -> Self {
        self.state_mut()
            .latency
            .insert(product_id.to_string(), delay);
        self
    }

    /// Reject every request of `call`
    pub fn fail_on(mut self, call: ApiCall, error: RemoteError) -> Self {
        self.state_mut().failures.push(Failure {
            call,
            key: None,
            error,
        });
        self
    }

    /// Reject requests of `call` that target `key` (product id, name or record id)
    pub fn fail_on_key(mut self, call: ApiCall, key: &str, error: RemoteError) -> Self {
        self.state_mut().failures.push(Failure {
            call,
            key: Some(key.to_string()),
            error,
        });
        self
    }

    /// Every request received so far, in arrival order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state().requests.clone()
    }

    pub fn call_count(&self, call: ApiCall) -> usize {
        self.state()
            .requests
            .iter()
            .filter(|r| r.call() == call)
            .count()
    }

    pub fn provision_requests(&self) -> Vec<ProvisionProductInput> {
        self.state()
            .requests
            .iter()
            .filter_map(|r| match r {
                RecordedRequest::ProvisionProduct(input) => Some(input.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn terminate_requests(&self) -> Vec<TerminateProvisionedProductInput> {
        self.state()
            .requests
            .iter()
            .filter_map(|r| match r {
                RecordedRequest::TerminateProvisionedProduct(input) => Some(input.clone()),
                _ => None,
            })
            .collect()
    }

    /// Highest number of requests that were being served at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_mut(&mut self) -> &mut MockState {
        self.state.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the request, apply injected failures and return the delay to
    /// simulate for it
    fn receive(&self, request: RecordedRequest) -> RemoteResult<Option<Duration>> {
        let mut state = self.state();
        let call = request.call();
        let key = request.key().map(str::to_string);
        state.requests.push(request);

        let failure = state.failures.iter().find(|f| {
            f.call == call && (f.key.is_none() || f.key.as_deref() == key.as_deref())
        });
        if let Some(failure) = failure {
            return Err(failure.error.clone());
        }

        let latency = match call {
            ApiCall::DescribeProduct | ApiCall::ListLaunchPaths => {
                key.and_then(|k| state.latency.get(&k).copied())
            }
            _ => None,
        };
        Ok(latency)
    }

    async fn serve(&self, request: RecordedRequest) -> RemoteResult<()> {
        let _guard = InFlight::enter(self);
        let latency = self.receive(request)?;
        if let Some(delay) = latency {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    fn page_size(&self, requested: Option<i32>) -> Option<usize> {
        self.page_size
            .or_else(|| requested.and_then(|s| usize::try_from(s).ok()))
    }
}

struct InFlight<'a> {
    api: &'a MockCatalogApi,
}

impl<'a> InFlight<'a> {
    fn enter(api: &'a MockCatalogApi) -> Self {
        let now = api.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        api.max_in_flight.fetch_max(now, Ordering::SeqCst);
        Self { api }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.api.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

fn paginate<T: Clone>(
    items: &[T],
    page_token: Option<&str>,
    page_size: Option<usize>,
) -> (Vec<T>, Option<String>) {
    let start = page_token
        .and_then(|t| t.parse::<usize>().ok())
        .unwrap_or(0)
        .min(items.len());
    let end = page_size
        .filter(|s| *s > 0)
        .map_or(items.len(), |s| (start + s).min(items.len()));
    let next = (end < items.len()).then(|| end.to_string());
    (items[start..end].to_vec(), next)
}

fn not_found(what: &str, id: &str) -> RemoteError {
    RemoteError::from_code("ResourceNotFoundException", format!("{what} {id} not found"))
}

#[async_trait]
impl CatalogApi for MockCatalogApi {
    async fn search_products(
        &self,
        input: SearchProductsInput,
    ) -> RemoteResult<SearchProductsOutput> {
        self.serve(RecordedRequest::SearchProducts(input.clone()))
            .await?;

        let state = self.state();
        let (items, next) = paginate(
            &state.products,
            input.page_token.as_deref(),
            self.page_size(input.page_size),
        );
        Ok(SearchProductsOutput {
            product_view_summaries: items,
            next_page_token: next,
        })
    }

    async fn describe_product(
        &self,
        input: DescribeProductInput,
    ) -> RemoteResult<DescribeProductOutput> {
        self.serve(RecordedRequest::DescribeProduct(input.clone()))
            .await?;

        let state = self.state();
        let product = state
            .products
            .iter()
            .find(|p| p.product_id == input.id)
            .ok_or_else(|| not_found("Product", &input.id))?;
        Ok(DescribeProductOutput {
            product_view_summary: Some(product.clone()),
            provisioning_artifacts: state
                .artifacts
                .get(&input.id)
                .cloned()
                .unwrap_or_default(),
        })
    }

    async fn list_launch_paths(
        &self,
        input: ListLaunchPathsInput,
    ) -> RemoteResult<ListLaunchPathsOutput> {
        self.serve(RecordedRequest::ListLaunchPaths(input.clone()))
            .await?;

        let state = self.state();
        let paths = state
            .launch_paths
            .get(&input.product_id)
            .ok_or_else(|| not_found("Product", &input.product_id))?;
        let (items, next) = paginate(paths, input.page_token.as_deref(), self.page_size);
        Ok(ListLaunchPathsOutput {
            launch_path_summaries: items,
            next_page_token: next,
        })
    }

    async fn describe_provisioning_parameters(
        &self,
        input: DescribeProvisioningParametersInput,
    ) -> RemoteResult<DescribeProvisioningParametersOutput> {
        self.serve(RecordedRequest::DescribeProvisioningParameters(
            input.clone(),
        ))
        .await?;

        let key = (
            input.product_id.clone(),
            input.provisioning_artifact_id.clone(),
            input.path_id.clone(),
        );
        let state = self.state();
        let parameters = state.parameters.get(&key).ok_or_else(|| {
            RemoteError::from_code(
                "InvalidParametersException",
                format!(
                    "no launch path {} for product {} artifact {}",
                    input.path_id, input.product_id, input.provisioning_artifact_id
                ),
            )
        })?;
        Ok(DescribeProvisioningParametersOutput {
            provisioning_artifact_parameters: parameters.clone(),
        })
    }

    async fn provision_product(
        &self,
        input: ProvisionProductInput,
    ) -> RemoteResult<ProvisionProductOutput> {
        self.serve(RecordedRequest::ProvisionProduct(input.clone()))
            .await?;

        let mut state = self.state();
        let existing = state
            .provisioned
            .iter()
            .find(|p| p.name == input.provisioned_product_name)
            .cloned();

        if let Some(existing) = existing {
            // Same token: the request is a retry of the one that created it
            if existing.idempotency_token.as_deref() == Some(input.provision_token.as_str()) {
                let record = existing
                    .last_record_id
                    .as_ref()
                    .and_then(|id| state.records.get(id))
                    .map(|(detail, _)| detail.clone());
                return Ok(ProvisionProductOutput {
                    record_detail: record,
                });
            }
            return Err(RemoteError::from_code(
                "DuplicateResourceException",
                format!(
                    "provisioned product {} already exists",
                    input.provisioned_product_name
                ),
            ));
        }

        let mut record = state.new_record("PROVISION_PRODUCT", &input.provisioned_product_name);
        record.product_id = Some(input.product_id.clone());
        record.provisioning_artifact_id = Some(input.provisioning_artifact_id.clone());
        record.path_id = Some(input.path_id.clone());

        let instance_id = format!("pp-{}", state.provisioned.len() + 1);
        record.provisioned_product_id = Some(instance_id.clone());
        state.provisioned.push(ProvisionedProductAttribute {
            id: instance_id,
            name: input.provisioned_product_name.clone(),
            status: Some(ProvisionedProductStatus::UnderChange),
            idempotency_token: Some(input.provision_token.clone()),
            last_record_id: Some(record.record_id.clone()),
            product_id: Some(input.product_id.clone()),
            provisioning_artifact_id: Some(input.provisioning_artifact_id.clone()),
            ..Default::default()
        });
        state
            .records
            .insert(record.record_id.clone(), (record.clone(), Vec::new()));

        Ok(ProvisionProductOutput {
            record_detail: Some(record),
        })
    }

    async fn search_provisioned_products(
        &self,
        input: SearchProvisionedProductsInput,
    ) -> RemoteResult<SearchProvisionedProductsOutput> {
        self.serve(RecordedRequest::SearchProvisionedProducts(input.clone()))
            .await?;

        let state = self.state();
        let (items, next) = paginate(
            &state.provisioned,
            input.page_token.as_deref(),
            self.page_size(input.page_size),
        );
        Ok(SearchProvisionedProductsOutput {
            provisioned_products: items,
            next_page_token: next,
        })
    }

    async fn terminate_provisioned_product(
        &self,
        input: TerminateProvisionedProductInput,
    ) -> RemoteResult<TerminateProvisionedProductOutput> {
        self.serve(RecordedRequest::TerminateProvisionedProduct(
            input.clone(),
        ))
        .await?;

        let mut state = self.state();
        if let Some(record) = state.terminations.get(&input.terminate_token) {
            return Ok(TerminateProvisionedProductOutput {
                record_detail: Some(record.clone()),
            });
        }

        let index = state
            .provisioned
            .iter()
            .position(|p| p.name == input.provisioned_product_name)
            .ok_or_else(|| not_found("Provisioned product", &input.provisioned_product_name))?;

        let mut record = state.new_record(
            "TERMINATE_PROVISIONED_PRODUCT",
            &input.provisioned_product_name,
        );
        let instance = &mut state.provisioned[index];
        instance.status = Some(ProvisionedProductStatus::UnderChange);
        instance.last_record_id = Some(record.record_id.clone());
        record.provisioned_product_id = Some(instance.id.clone());
        record.product_id = instance.product_id.clone();

        state
            .records
            .insert(record.record_id.clone(), (record.clone(), Vec::new()));
        state
            .terminations
            .insert(input.terminate_token, record.clone());

        Ok(TerminateProvisionedProductOutput {
            record_detail: Some(record),
        })
    }

    async fn describe_record(
        &self,
        input: DescribeRecordInput,
    ) -> RemoteResult<DescribeRecordOutput> {
        self.serve(RecordedRequest::DescribeRecord(input.clone()))
            .await?;

        let state = self.state();
        let (detail, outputs) = state
            .records
            .get(&input.id)
            .ok_or_else(|| not_found("Record", &input.id))?;
        let (items, next) = paginate(outputs, input.page_token.as_deref(), self.page_size);
        Ok(DescribeRecordOutput {
            record_detail: Some(detail.clone()),
            record_outputs: items,
            next_page_token: next,
        })
    }
}

/// [`ClientFactory`] handing out one shared [`MockCatalogApi`]
pub struct MockClientFactory {
    api: Arc<MockCatalogApi>,
    clients: Mutex<Vec<(String, String)>>,
}

impl MockClientFactory {
    pub fn new(api: MockCatalogApi) -> Self {
        Self {
            api: Arc::new(api),
            clients: Mutex::new(Vec::new()),
        }
    }

    pub fn api(&self) -> Arc<MockCatalogApi> {
        Arc::clone(&self.api)
    }

    /// `(access key id, region)` of every client handed out
    pub fn clients(&self) -> Vec<(String, String)> {
        self.clients
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ClientFactory for MockClientFactory {
    fn client(&self, credentials: &Credentials, region: &str) -> Result<Arc<dyn CatalogApi>> {
        self.clients
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((credentials.access_key_id().to_string(), region.to_string()));
        Ok(self.api())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate() {
        let items = vec![1, 2, 3, 4, 5];
        assert_eq!(paginate(&items, None, None), (vec![1, 2, 3, 4, 5], None));
        assert_eq!(
            paginate(&items, None, Some(2)),
            (vec![1, 2], Some("2".to_string()))
        );
        assert_eq!(
            paginate(&items, Some("4"), Some(2)),
            (vec![5], None)
        );
        assert_eq!(paginate(&items, Some("99"), Some(2)), (vec![], None));
    }

    #[tokio::test]
    async fn test_injected_failure_targets_key() {
        let api = MockCatalogApi::new()
            .with_product(ProductViewSummary::new("p1"), vec![], vec![])
            .with_product(ProductViewSummary::new("p2"), vec![], vec![])
            .fail_on_key(
                ApiCall::DescribeProduct,
                "p2",
                RemoteError::from_code("ThrottlingException", "slow down"),
            );

        let ok = api
            .describe_product(DescribeProductInput {
                id: "p1".to_string(),
            })
            .await;
        tokio_test::assert_ok!(ok);

        let err = tokio_test::assert_err!(
            api.describe_product(DescribeProductInput {
                id: "p2".to_string(),
            })
            .await
        );
        assert_eq!(err.code.as_deref(), Some("ThrottlingException"));
        assert_eq!(api.call_count(ApiCall::DescribeProduct), 2);
    }

    #[tokio::test]
    async fn test_provision_retry_with_same_token_is_idempotent() {
        let api = MockCatalogApi::new();
        let input = ProvisionProductInput {
            product_id: "p1".to_string(),
            provision_token: "tok".to_string(),
            provisioned_product_name: "web".to_string(),
            provisioning_artifact_id: "a1".to_string(),
            path_id: "lp1".to_string(),
            provisioning_parameters: vec![],
        };

        let first = api.provision_product(input.clone()).await.unwrap();
        let second = api.provision_product(input.clone()).await.unwrap();
        assert_eq!(first.record_detail, second.record_detail);

        let conflict = api
            .provision_product(ProvisionProductInput {
                provision_token: "other".to_string(),
                ..input
            })
            .await
            .unwrap_err();
        assert_eq!(conflict.code.as_deref(), Some("DuplicateResourceException"));
    }
}
