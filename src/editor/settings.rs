//! Display settings page: load, reorder, toggle and bulk-save field settings

use super::Banner;
use super::gate::SaveGate;
use crate::api::{ApiError, SettingsBackend};
use crate::config::DataTypeSources;
use crate::fieldset::reorder::apply_order;
use crate::formset::ErrorReport;
use crate::formset::errors::route_flat_errors;
use crate::fieldset::{
    CatalogSource, EditableRow, FieldSetting, OrderAxis, ProjectedRow, ReorderError, SettingFlag, WireSetting,
    build_bulk_payload, combine_catalogs, drag, merge_sourced_with_settings, project, renumber,
};
use futures::future::{join_all, try_join_all};
use log::{debug, info, warn};
use std::collections::HashMap;

pub struct DisplaySettingsEditor<B> {
    backend: B,
    data_type: String,
    sources: DataTypeSources,
    rows: Vec<EditableRow>,
    snapshot: Vec<WireSetting>,
    gate: SaveGate,
    banner: Option<Banner>,
    load_error: Option<String>,
}

impl<B: SettingsBackend> DisplaySettingsEditor<B> {
    /// Editor for a page data type backed by one or more backend data types
    pub fn new(backend: B, data_type: impl Into<String>, sources: DataTypeSources) -> Self {
        Self {
            backend,
            data_type: data_type.into(),
            sources,
            rows: Vec::new(),
            snapshot: Vec::new(),
            gate: SaveGate::new(),
            banner: None,
            load_error: None,
        }
    }

    pub fn single(backend: B, data_type: &str) -> Self {
        Self::new(backend, data_type, DataTypeSources::single(data_type))
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    pub fn rows(&self) -> &[EditableRow] {
        &self.rows
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn is_saving(&self) -> bool {
        self.gate.is_busy()
    }

    /// Handle that lets other tasks observe or contend for the save slot
    pub fn gate(&self) -> &SaveGate {
        &self.gate
    }

    async fn fetch_source(&self, source: &str) -> Result<(CatalogSource, Vec<FieldSetting>), ApiError> {
        let (entries, settings) =
            futures::try_join!(self.backend.fetch_catalog(source), self.backend.fetch_settings(source))?;

        let source = CatalogSource {
            label: self.sources.label(source).map(str::to_string),
            entries,
        };
        Ok((source, settings))
    }

    /// Fetch catalog and settings of every backend data type at once and
    /// rebuild the rows.
    ///
    /// On failure the previous rows stay in place and the error is kept as
    /// the load error.
    pub async fn load(&mut self) -> Result<(), ApiError> {
        info!("Loading display settings for '{}' from {:?}", self.data_type, self.sources.sources);
        let fetched = try_join_all(self.sources.sources.iter().map(|source| self.fetch_source(source))).await;

        let fetched = match fetched {
            Ok(fetched) => fetched,
            Err(err) => {
                warn!("Loading display settings for '{}' failed: {}", self.data_type, err);
                self.load_error = Some(err.banner());
                return Err(err);
            }
        };

        let (catalogs, settings): (Vec<_>, Vec<_>) = fetched.into_iter().unzip();
        let settings: Vec<FieldSetting> = settings.into_iter().flatten().collect();
        let catalog = combine_catalogs(catalogs);

        self.rows = merge_sourced_with_settings(&catalog, &settings);
        self.snapshot = build_bulk_payload(&self.rows);
        self.load_error = None;
        Ok(())
    }

    /// Rows of one axis in display order
    pub fn projection(&self, axis: OrderAxis) -> Vec<ProjectedRow> {
        project(&self.rows, axis)
    }

    /// Move a projected row and renumber that axis
    pub fn drag(&mut self, axis: OrderAxis, from: usize, to: Option<usize>) -> Result<(), ReorderError> {
        drag(&mut self.rows, axis, from, to)
    }

    fn row_mut(&mut self, name: &str) -> Option<&mut EditableRow> {
        self.rows.iter_mut().find(|row| row.name == name)
    }

    /// Flip a flag of the named row; `false` when no row has that name
    pub fn toggle(&mut self, name: &str, flag: SettingFlag) -> bool {
        match self.row_mut(name) {
            Some(row) => {
                row.toggle(flag);
                debug!("Toggled {:?} of '{}' to {}", flag, name, row.flag(flag));
                true
            }
            None => false,
        }
    }

    pub fn set_display_name(&mut self, name: &str, value: &str) -> bool {
        self.row_mut(name).map(|row| row.set_display_name(value)).is_some()
    }

    /// Store a typed order value as-is; it is coerced only when saving
    pub fn set_order(&mut self, name: &str, axis: OrderAxis, raw: &str) -> bool {
        self.row_mut(name).map(|row| axis.set_order(row, raw)).is_some()
    }

    /// Renumber one axis from its current projection without moving anything
    pub fn normalize(&mut self, axis: OrderAxis) {
        let orders = renumber(&self.projection(axis));
        apply_order(&mut self.rows, axis, &orders);
    }

    /// Rows whose serialized form differs from what was last loaded
    pub fn changed_count(&self) -> usize {
        let before: HashMap<&str, &WireSetting> = self
            .snapshot
            .iter()
            .map(|setting| (setting.model_field_name.as_str(), setting))
            .collect();

        build_bulk_payload(&self.rows)
            .iter()
            .filter(|setting| before.get(setting.model_field_name.as_str()).copied() != Some(*setting))
            .count()
    }

    /// Send the full row set to every backend data type of this page.
    ///
    /// The first failure becomes the error banner and leaves the rows as
    /// edited; on success the page is reloaded from the server.
    fn clear_row_errors(&mut self) {
        for row in &mut self.rows {
            row.error = None;
        }
    }

    pub async fn save(&mut self) -> Result<String, ApiError> {
        let gate = self.gate.clone();
        let _ticket = gate.try_acquire()?;
        self.banner = None;

        let payload = build_bulk_payload(&self.rows);
        debug!("Bulk payload for '{}' has {} entries", self.data_type, payload.len());

        let results = join_all(
            self.sources
                .sources
                .iter()
                .map(|source| self.backend.bulk_save(source, &payload)),
        )
        .await;

        let mut messages = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(message) => messages.push(message),
                Err(err) => {
                    let report = match err.server_errors() {
                        Some(errors) => {
                            self.clear_row_errors();
                            route_flat_errors(errors, |key, message| {
                                match self.rows.iter_mut().find(|row| row.name == key) {
                                    Some(row) => {
                                        row.error = Some(message);
                                        true
                                    }
                                    None => false,
                                }
                            })
                        }
                        None => ErrorReport::default(),
                    };
                    warn!(
                        "Saving display settings for '{}' failed: {} ({} errors applied)",
                        self.data_type, err, report.applied
                    );

                    let text = match report.banner() {
                        Some(unmatched) => format!("{} {}", err.banner(), unmatched),
                        None => err.banner(),
                    };
                    self.banner = Some(Banner::error(text));
                    return Err(err);
                }
            }
        }

        self.clear_row_errors();
        let message = messages.into_iter().next().unwrap_or_default();
        info!("Saved display settings for '{}'", self.data_type);
        self.banner = Some(Banner::success(message.clone()));

        if let Err(err) = self.load().await {
            warn!("Reload after save failed: {}", err);
        }
        Ok(message)
    }
}
