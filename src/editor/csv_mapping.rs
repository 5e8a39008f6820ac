//! CSV import column mappings: sorted list plus a single-record editor

use super::Banner;
use super::gate::SaveGate;
use crate::api::{ApiError, CsvMappingBackend};
use crate::fieldset::catalog::value_text;
use crate::fieldset::setting::ORDER_STEP;
use crate::formset::errors::route_flat_errors;
use log::{info, warn};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Fields of a mapping that server errors can be attached to
const MAPPING_FIELDS: &[&str] = &[
    "data_type",
    "csv_header",
    "model_field_name",
    "display_name",
    "order",
    "is_required",
    "is_update_key",
    "is_active",
];

/// One CSV column mapped to a model field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvMapping {
    #[serde(default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub data_type: String,
    #[serde(default)]
    pub csv_header: String,
    #[serde(default)]
    pub model_field_name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default = "default_true")]
    pub is_required: bool,
    #[serde(default)]
    pub is_update_key: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Ids are UUID strings, but accept numbers too
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(|v| value_text(&v)).filter(|id| !id.is_empty()))
}

/// Blank mapping placed after every existing one
pub fn new_mapping(data_type: &str, existing: &[CsvMapping]) -> CsvMapping {
    let order = existing
        .iter()
        .map(|mapping| mapping.order)
        .max()
        .map_or(ORDER_STEP, |max| max + ORDER_STEP);

    CsvMapping {
        id: None,
        data_type: data_type.to_string(),
        csv_header: String::new(),
        model_field_name: String::new(),
        display_name: String::new(),
        order,
        is_required: true,
        is_update_key: false,
        is_active: true,
    }
}

pub fn sort_mappings(mappings: &mut [CsvMapping]) {
    mappings.sort_by_key(|mapping| mapping.order);
}

/// Mapping being created or edited, with the server's field errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingDraft {
    pub mapping: CsvMapping,
    pub errors: BTreeMap<String, String>,
}

impl MappingDraft {
    pub fn is_new(&self) -> bool {
        self.mapping.id.is_none()
    }
}

pub struct CsvMappingEditor<B> {
    backend: B,
    data_type: String,
    mappings: Vec<CsvMapping>,
    draft: Option<MappingDraft>,
    gate: SaveGate,
    banner: Option<Banner>,
}

impl<B: CsvMappingBackend> CsvMappingEditor<B> {
    pub fn new(backend: B, data_type: impl Into<String>) -> Self {
        Self {
            backend,
            data_type: data_type.into(),
            mappings: Vec::new(),
            draft: None,
            gate: SaveGate::new(),
            banner: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn mappings(&self) -> &[CsvMapping] {
        &self.mappings
    }

    pub fn draft(&self) -> Option<&MappingDraft> {
        self.draft.as_ref()
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub async fn load(&mut self) -> Result<(), ApiError> {
        let mut mappings = self.backend.list_csv_mappings(&self.data_type).await?;
        sort_mappings(&mut mappings);
        info!("Loaded {} CSV mappings for '{}'", mappings.len(), self.data_type);
        self.mappings = mappings;
        Ok(())
    }

    pub fn open_new(&mut self) -> &mut CsvMapping {
        let mapping = new_mapping(&self.data_type, &self.mappings);
        self.open(mapping)
    }

    /// Start editing the mapping with `id`; `None` when it is not listed
    pub fn open_edit(&mut self, id: &str) -> Option<&mut CsvMapping> {
        let mapping = self
            .mappings
            .iter()
            .find(|mapping| mapping.id.as_deref() == Some(id))?
            .clone();
        Some(self.open(mapping))
    }

    fn open(&mut self, mapping: CsvMapping) -> &mut CsvMapping {
        self.banner = None;
        let draft = self.draft.insert(MappingDraft {
            mapping,
            errors: BTreeMap::new(),
        });
        &mut draft.mapping
    }

    pub fn draft_mut(&mut self) -> Option<&mut CsvMapping> {
        self.draft.as_mut().map(|draft| &mut draft.mapping)
    }

    pub fn cancel(&mut self) {
        self.draft = None;
    }

    /// Create or update the draft; on success the draft closes and the list
    /// is reloaded. Returns `Ok(false)` when there is no draft.
    pub async fn save_draft(&mut self) -> Result<bool, ApiError> {
        let gate = self.gate.clone();
        let _ticket = gate.try_acquire()?;

        let Some(draft) = self.draft.as_mut() else {
            return Ok(false);
        };

        let result = match draft.mapping.id.clone() {
            Some(id) => self.backend.update_csv_mapping(&id, &draft.mapping).await,
            None => self.backend.create_csv_mapping(&draft.mapping).await,
        };

        match result {
            Ok(saved) => {
                info!("Saved CSV mapping '{}'", saved.csv_header);
                self.draft = None;
                self.banner = None;
                self.load().await?;
                Ok(true)
            }
            Err(err) => {
                warn!("Saving CSV mapping failed: {}", err);
                let unmatched = match err.server_errors() {
                    Some(errors) => {
                        draft.errors.clear();
                        let report = route_flat_errors(errors, |key, message| {
                            if !MAPPING_FIELDS.contains(&key) {
                                return false;
                            }
                            draft.errors.insert(key.to_string(), message);
                            true
                        });
                        report.banner()
                    }
                    None => None,
                };

                let text = match unmatched {
                    Some(unmatched) => format!("{} {}", err.banner(), unmatched),
                    None => err.banner(),
                };
                self.banner = Some(Banner::error(text));
                Err(err)
            }
        }
    }

    pub async fn delete(&mut self, id: &str) -> Result<(), ApiError> {
        if let Err(err) = self.backend.delete_csv_mapping(id).await {
            self.banner = Some(Banner::error(err.banner()));
            return Err(err);
        }
        self.load().await
    }
}
