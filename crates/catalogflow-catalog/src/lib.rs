//! CatalogFlow Catalog
//!
//! Async operations over the AWS Service Catalog provisioning API: product
//! discovery, provisioning parameters, provisioning, termination and
//! record inspection.
//!
//! Every operation takes explicit [`Credentials`] and an optional region.
//! Nothing is cached between calls.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 catalog CLI                      │
//! │        (catalog products / provision ...)        │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               CatalogService                     │
//! │  pagination, fan-out, error context, tokens      │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │            ClientFactory                  │   │
//! │  │  (credentials, region) -> CatalogApi      │   │
//! │  └──────────────────────────────────────────┘   │
//! └───────┬─────────────────┬───────────────────────┘
//!         │                 │
//! ┌───────▼───────┐ ┌───────▼───────┐
//! │ AwsCatalogApi │ │MockCatalogApi │
//! │  (AWS SDK)    │ │ (feature mock)│
//! └───────────────┘ └───────────────┘
//! ```

pub mod api;
pub mod aws;
pub mod credentials;
pub mod error;
pub mod factory;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod model;
pub mod service;

// Re-exports
pub use api::{ApiCall, CatalogApi, RemoteResult};
pub use aws::AwsCatalogApi;
pub use credentials::{Credentials, load_default_credentials};
pub use error::{CatalogError, ErrorContext, RemoteError, RemoteErrorKind, Result};
pub use factory::{AwsClientFactory, ClientFactory, FALLBACK_REGION};
pub use model::{
    LaunchPathSummary, Page, ProductListing, ProductViewSummary, ProvisionedProductAttribute,
    ProvisionedProductStatus, ProvisioningArtifact, ProvisioningArtifactParameter,
    ProvisioningParameterValue, ProvisioningRecord, RecordDetail, RecordError, RecordOutput,
    RecordStatus,
};
pub use service::{CatalogService, MAX_PAGE_SIZE, ProvisionRequest, ServiceSettings};
