//! Backend seams used by the editors
//!
//! [`MesClient`](super::MesClient) implements these over HTTP; tests plug in
//! in-memory fakes.

use super::error::ApiError;
use crate::editor::csv_mapping::CsvMapping;
use crate::fieldset::{FieldCatalogEntry, FieldSetting, WireSetting};
use crate::formset::{EditFormResponse, FormsetPayload};
use async_trait::async_trait;

/// Which form of the master-data endpoints is being edited
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormTarget {
    Create,
    Update(String),
}

impl FormTarget {
    pub fn is_new(&self) -> bool {
        matches!(self, FormTarget::Create)
    }
}

#[async_trait]
pub trait SettingsBackend: Send + Sync {
    async fn fetch_catalog(&self, data_type: &str) -> Result<Vec<FieldCatalogEntry>, ApiError>;

    async fn fetch_settings(&self, data_type: &str) -> Result<Vec<FieldSetting>, ApiError>;

    /// Replace every setting of `data_type`; returns the server's message
    async fn bulk_save(&self, data_type: &str, payload: &[WireSetting]) -> Result<String, ApiError>;
}

#[async_trait]
pub trait FormsetBackend: Send + Sync {
    async fn fetch_edit_form(&self, target: &FormTarget) -> Result<EditFormResponse, ApiError>;

    /// Submit a parent form with its formset; returns the server's message
    async fn submit_form(&self, target: &FormTarget, payload: FormsetPayload) -> Result<String, ApiError>;
}

#[async_trait]
pub trait CsvMappingBackend: Send + Sync {
    async fn list_csv_mappings(&self, data_type: &str) -> Result<Vec<CsvMapping>, ApiError>;

    async fn create_csv_mapping(&self, mapping: &CsvMapping) -> Result<CsvMapping, ApiError>;

    async fn update_csv_mapping(&self, id: &str, mapping: &CsvMapping) -> Result<CsvMapping, ApiError>;

    async fn delete_csv_mapping(&self, id: &str) -> Result<(), ApiError>;
}
