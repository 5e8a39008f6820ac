use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::formset::payload::MEASUREMENT_DETAILS_PREFIX;
use crate::formset::{DependentRule, FormsetLayout};

/// Environment variable replacing `base_url` for one run
pub const BASE_URL_ENV: &str = "MES_BASE_URL";

/// Backend data types whose catalogs make up one page's field set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTypeSources {
    /// Backend data types, in catalog precedence order
    pub sources: Vec<String>,
    /// Label shown next to fields coming from each backend data type
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl DataTypeSources {
    pub fn single(data_type: &str) -> Self {
        Self {
            sources: vec![data_type.to_string()],
            labels: BTreeMap::new(),
        }
    }

    pub fn label(&self, source: &str) -> Option<&str> {
        self.labels.get(source).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub csrf_token: Option<String>,
    #[serde(default)]
    pub session_cookie: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_formset_prefix")]
    pub formset_prefix: String,
    #[serde(default = "default_data_types")]
    pub data_types: BTreeMap<String, DataTypeSources>,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_formset_prefix() -> String {
    MEASUREMENT_DETAILS_PREFIX.to_string()
}

fn default_data_types() -> BTreeMap<String, DataTypeSources> {
    let goods_receipt = DataTypeSources {
        sources: vec!["purchase_order".to_string(), "goods_receipt".to_string()],
        labels: BTreeMap::from([
            ("purchase_order".to_string(), "入庫予定".to_string()),
            ("goods_receipt".to_string(), "入庫実績".to_string()),
        ]),
    };
    BTreeMap::from([("goods_receipt".to_string(), goods_receipt)])
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            csrf_token: None,
            session_cookie: None,
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            retry_attempts: default_retry_attempts(),
            formset_prefix: default_formset_prefix(),
            data_types: default_data_types(),
        }
    }
}

impl Config {
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "linux") {
            dirs::config_dir()
                .context("Failed to get XDG config directory")?
                .join("mes-fieldset")
        } else {
            dirs::home_dir()
                .context("Failed to get home directory")?
                .join(".mes-fieldset")
        };

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {:?}", config_dir))?;
            info!("Created config directory: {:?}", config_dir);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config file, falling back to defaults, then apply `MES_BASE_URL`
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                debug!("Overriding base_url from {}", BASE_URL_ENV);
                config.base_url = url;
            }
        }
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        debug!("Loading config from: {:?}", config_path);

        if !config_path.exists() {
            info!("Config file doesn't exist, using defaults");
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        Self::parse(&config_content).with_context(|| format!("Failed to parse config file: {:?}", config_path))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        debug!("Loaded config with {} page data types", config.data_types.len());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        debug!("Saving config to: {:?}", config_path);

        let config_content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, config_content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        info!("Config saved successfully");
        Ok(())
    }

    pub fn set_base_url(&mut self, url: &str) -> Result<()> {
        let url = url.trim().trim_end_matches('/');
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!("Base URL must start with http:// or https://: {}", url);
        }

        info!("Setting base URL to: {}", url);
        self.base_url = url.to_string();
        self.save()
    }

    /// Layout of the measurement detail formset under the configured prefix
    pub fn formset_layout(&self) -> FormsetLayout {
        FormsetLayout::new(self.formset_prefix.clone()).with_rule(DependentRule::measurement_type())
    }

    /// Backend data types behind a page data type; unknown types map to themselves
    pub fn sources_for(&self, data_type: &str) -> DataTypeSources {
        self.data_types
            .get(data_type)
            .cloned()
            .unwrap_or_else(|| DataTypeSources::single(data_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.formset_prefix, "measurement_details");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = Config::parse(
            r#"
base_url = "https://mes.example.com"
retry_attempts = 5

[data_types.inspection]
sources = ["inspection"]
"#,
        )
        .unwrap();

        assert_eq!(config.base_url, "https://mes.example.com");
        assert_eq!(config.retry_attempts, 5);
        assert_eq!(config.timeout_secs, 30);
        assert!(config.data_types.contains_key("inspection"));
        assert!(!config.data_types.contains_key("goods_receipt"));
    }

    #[test]
    fn test_sources_for() {
        let config = Config::default();
        let combined = config.sources_for("goods_receipt");
        assert_eq!(combined.sources, vec!["purchase_order", "goods_receipt"]);
        assert_eq!(combined.label("purchase_order"), Some("入庫予定"));

        let single = config.sources_for("part");
        assert_eq!(single.sources, vec!["part"]);
        assert_eq!(single.label("part"), None);
    }

    #[test]
    fn test_formset_layout_uses_prefix() {
        let config = Config {
            formset_prefix: "details".to_string(),
            ..Config::default()
        };
        let layout = config.formset_layout();
        assert_eq!(layout.row_key(0, "name"), "details-0-name");
        assert_eq!(Config::default().formset_layout(), FormsetLayout::measurement_details());
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(Config::parse(&text).unwrap(), config);
    }
}
