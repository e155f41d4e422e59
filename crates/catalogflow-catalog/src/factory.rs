//! Catalog client factory

use crate::api::CatalogApi;
use crate::aws::AwsCatalogApi;
use crate::credentials::Credentials;
use crate::error::{CatalogError, Result};
use std::sync::Arc;

/// Region used when neither the caller nor the configuration names one
pub const FALLBACK_REGION: &str = "us-east-1";

/// Builds remote API handles for a credential set and region
///
/// Implementations must be stateless: no caching, no shared mutable state,
/// safe to call from concurrent tasks.
pub trait ClientFactory: Send + Sync {
    fn client(&self, credentials: &Credentials, region: &str) -> Result<Arc<dyn CatalogApi>>;
}

/// Factory producing [`AwsCatalogApi`] handles
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsClientFactory;

impl ClientFactory for AwsClientFactory {
    fn client(&self, credentials: &Credentials, region: &str) -> Result<Arc<dyn CatalogApi>> {
        validate_region(region)?;
        Ok(Arc::new(AwsCatalogApi::new(credentials, region)))
    }
}

/// Region names are lowercase ASCII letters, digits and dashes (`us-east-1`)
pub fn validate_region(region: &str) -> Result<()> {
    let valid = !region.is_empty()
        && region
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !valid {
        return Err(CatalogError::InvalidConfig(format!(
            "invalid region name: '{}'",
            region
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_region() {
        assert!(validate_region("us-east-1").is_ok());
        assert!(validate_region("ap-northeast-1").is_ok());
        assert!(validate_region("").is_err());
        assert!(validate_region("US East").is_err());
    }
}
