use catalogflow_catalog::{CatalogService, Credentials, ServiceSettings, load_default_credentials};
use catalogflow_config::CatalogConfig;

/// Everything a command needs: the service, the caller's credentials and
/// the output mode
pub struct Context {
    pub service: CatalogService,
    pub credentials: Credentials,
    region: Option<String>,
    pub json: bool,
}

impl Context {
    pub async fn load(region: Option<String>, json: bool) -> anyhow::Result<Self> {
        let config = CatalogConfig::load()?;
        let service = CatalogService::new(settings_from_config(config))?;
        let credentials = load_default_credentials().await?;

        Ok(Self {
            service,
            credentials,
            region,
            json,
        })
    }

    /// Region given on the command line, if any
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Region the commands will actually talk to
    pub fn effective_region(&self) -> &str {
        self.service.resolve_region(self.region())
    }
}

fn settings_from_config(config: CatalogConfig) -> ServiceSettings {
    ServiceSettings {
        default_region: config.default_region,
        product_concurrency: config.product_concurrency,
        page_size: config.page_size,
    }
}
