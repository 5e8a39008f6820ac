pub mod config;
pub mod mappings;
pub mod settings;

use crate::api::MesClient;
use crate::config::Config;
use anyhow::{Context, Result};

/// Client for the configured backend
pub fn connect(config: &Config) -> Result<MesClient> {
    MesClient::from_config(config).with_context(|| format!("Failed to create client for {}", config.base_url))
}
