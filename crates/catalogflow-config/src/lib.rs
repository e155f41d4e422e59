pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Direct path to a config file, bypassing discovery
pub const CONFIG_PATH_ENV: &str = "CATALOGFLOW_CONFIG_PATH";

/// Region override, takes precedence over `AWS_REGION`
pub const REGION_ENV: &str = "CATALOGFLOW_REGION";

const AWS_REGION_ENV: &str = "AWS_REGION";

/// File names looked up in the current directory, in priority order
const CANDIDATES: [&str; 2] = ["catalog.local.yaml", "catalog.yaml"];

const GLOBAL_CONFIG_FILE: &str = "catalog.yaml";

/// Largest page size the catalog API accepts
const MAX_PAGE_SIZE: i32 = 20;

/// `~/.config/catalogflow` (platform equivalent elsewhere)
pub fn get_config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("catalogflow"))
}

/// Locate the CatalogFlow config file
///
/// Search order:
/// 1. `CATALOGFLOW_CONFIG_PATH` (direct path)
/// 2. current directory: catalog.local.yaml, catalog.yaml
/// 3. ~/.config/catalogflow/catalog.yaml
pub fn find_config_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
        tracing::warn!(path = %path.display(), "{} points to a missing file", CONFIG_PATH_ENV);
    }

    let current_dir = std::env::current_dir()?;
    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    if let Ok(config_dir) = get_config_dir() {
        let global_config = config_dir.join(GLOBAL_CONFIG_FILE);
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}

/// Settings read from `catalog.yaml`
///
/// ```yaml
/// default_region: eu-west-1
/// product_concurrency: 4
/// page_size: 20
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Region used when none is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_region: Option<String>,

    /// Products described concurrently when listing the catalog
    pub product_concurrency: usize,

    /// Page size for paginated calls (1-20, remote default when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<i32>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_region: None,
            product_concurrency: 1,
            page_size: None,
        }
    }
}

impl CatalogConfig {
    /// Discover, parse and apply environment overrides.
    /// A missing config file gives the defaults.
    pub fn load() -> Result<Self> {
        let mut config = match find_config_file() {
            Ok(path) => {
                tracing::debug!(path = %path.display(), "loading config");
                Self::from_file(&path)?
            }
            Err(ConfigError::ConfigFileNotFound) => {
                tracing::debug!("no config file found, using defaults");
                Self::default()
            }
            Err(e) => return Err(e),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, path)
    }

    /// Parse YAML content. `path` only labels errors.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        // An empty file is a valid, empty config
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate(path)?;
        Ok(config)
    }

    /// `CATALOGFLOW_REGION`, else `AWS_REGION`, replaces `default_region`
    pub fn apply_env_overrides(&mut self) {
        let region = [REGION_ENV, AWS_REGION_ENV]
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.trim().is_empty());

        if let Some(region) = region {
            tracing::debug!(region = %region, "region overridden from environment");
            self.default_region = Some(region);
        }
    }

    fn validate(&self, path: &Path) -> Result<()> {
        let invalid = |message: String| ConfigError::Invalid {
            path: path.to_path_buf(),
            message,
        };

        if self.product_concurrency == 0 {
            return Err(invalid(
                "product_concurrency must be at least 1".to_string(),
            ));
        }
        if let Some(size) = self.page_size.filter(|s| !(1..=MAX_PAGE_SIZE).contains(s)) {
            return Err(invalid(format!(
                "page_size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, size
            )));
        }
        if self
            .default_region
            .as_deref()
            .is_some_and(|r| r.trim().is_empty())
        {
            return Err(invalid("default_region must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    /// Clear every variable `load` reads
    fn clear_env() {
        unsafe {
            std::env::remove_var(CONFIG_PATH_ENV);
            std::env::remove_var(REGION_ENV);
            std::env::remove_var(AWS_REGION_ENV);
        }
    }

    #[test]
    fn test_get_config_dir() {
        let config_dir = get_config_dir().unwrap();
        assert!(config_dir.ends_with("catalogflow"));
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = "default_region: eu-west-1\nproduct_concurrency: 4\npage_size: 20\n";
        let config = CatalogConfig::parse(yaml, Path::new("catalog.yaml")).unwrap();
        assert_eq!(
            config,
            CatalogConfig {
                default_region: Some("eu-west-1".to_string()),
                product_concurrency: 4,
                page_size: Some(20),
            }
        );
    }

    #[test]
    fn test_parse_partial_and_empty_config() {
        let config = CatalogConfig::parse("page_size: 5\n", Path::new("catalog.yaml")).unwrap();
        assert_eq!(config.product_concurrency, 1);
        assert_eq!(config.page_size, Some(5));
        assert_eq!(config.default_region, None);

        let config = CatalogConfig::parse("", Path::new("catalog.yaml")).unwrap();
        assert_eq!(config, CatalogConfig::default());
    }

    #[test]
    fn test_parse_rejects_unknown_keys() {
        let result = CatalogConfig::parse("regoin: eu-west-1\n", Path::new("catalog.yaml"));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_parse_rejects_invalid_values() {
        let path = Path::new("catalog.yaml");
        assert!(matches!(
            CatalogConfig::parse("product_concurrency: 0\n", path),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            CatalogConfig::parse("page_size: 50\n", path),
            Err(ConfigError::Invalid { .. })
        ));

        let err = CatalogConfig::parse("default_region: \"\"\n", path).unwrap_err();
        assert!(err.to_string().contains("catalog.yaml"));
    }

    #[test]
    #[serial]
    fn test_find_config_file_in_current_dir() {
        clear_env();
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::write(temp_dir.path().join("catalog.yaml"), "page_size: 10\n").unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_config_file();
        std::env::set_current_dir(original_dir).unwrap();

        assert!(result.unwrap().ends_with("catalog.yaml"));
    }

    #[test]
    #[serial]
    fn test_find_config_file_local_priority() {
        clear_env();
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::write(temp_dir.path().join("catalog.yaml"), "page_size: 10\n").unwrap();
        fs::write(temp_dir.path().join("catalog.local.yaml"), "page_size: 5\n").unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_config_file();
        std::env::set_current_dir(original_dir).unwrap();

        assert!(result.unwrap().ends_with("catalog.local.yaml"));
    }

    #[test]
    #[serial]
    fn test_find_config_file_env_var() {
        clear_env();
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.yaml");
        fs::write(&config_path, "product_concurrency: 2\n").unwrap();

        unsafe {
            std::env::set_var(CONFIG_PATH_ENV, &config_path);
        }
        let result = find_config_file();
        clear_env();

        assert_eq!(result.unwrap(), config_path);
    }

    #[test]
    #[serial]
    fn test_load_applies_env_region_priority() {
        clear_env();
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("catalog.yaml");
        fs::write(&config_path, "default_region: eu-west-1\n").unwrap();

        unsafe {
            std::env::set_var(CONFIG_PATH_ENV, &config_path);
        }
        assert_eq!(
            CatalogConfig::load().unwrap().default_region.as_deref(),
            Some("eu-west-1")
        );

        unsafe {
            std::env::set_var(AWS_REGION_ENV, "us-west-2");
        }
        assert_eq!(
            CatalogConfig::load().unwrap().default_region.as_deref(),
            Some("us-west-2")
        );

        unsafe {
            std::env::set_var(REGION_ENV, "ap-northeast-1");
        }
        assert_eq!(
            CatalogConfig::load().unwrap().default_region.as_deref(),
            Some("ap-northeast-1")
        );

        clear_env();
    }

    #[test]
    #[serial]
    fn test_load_parse_error_names_file() {
        clear_env();
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("broken.yaml");
        fs::write(&config_path, "product_concurrency: [1, 2\n").unwrap();

        unsafe {
            std::env::set_var(CONFIG_PATH_ENV, &config_path);
        }
        let result = CatalogConfig::load();
        clear_env();

        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("broken.yaml"));
    }
}
