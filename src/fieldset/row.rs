//! Editable rows: one catalog entry merged with its stored setting

use super::catalog::{FieldCatalogEntry, SourcedEntry, WidgetKind};
use super::setting::{FieldSetting, ResolvedSetting};
use std::collections::{HashMap, HashSet};

/// Boolean switches carried by every row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingFlag {
    ListDisplay,
    SearchField,
    ListFilter,
}

impl SettingFlag {
    pub fn field_name(&self) -> &'static str {
        match self {
            SettingFlag::ListDisplay => "is_list_display",
            SettingFlag::SearchField => "is_search_field",
            SettingFlag::ListFilter => "is_list_filter",
        }
    }
}

/// In-memory unit the settings editor manipulates.
///
/// Order values are kept as the raw text the user typed; they are only turned
/// into numbers when sorting or when the bulk payload is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditableRow {
    pub name: String,
    pub label: String,
    pub help_text: String,
    pub widget: WidgetKind,
    pub display_name: String,
    pub display_order: String,
    pub search_order: String,
    pub is_list_display: bool,
    pub is_search_field: bool,
    pub is_list_filter: bool,
    pub error: Option<String>,
}

impl EditableRow {
    fn from_parts(entry: &SourcedEntry, resolved: ResolvedSetting) -> Self {
        Self {
            name: entry.entry.name.clone(),
            label: entry.display_label(),
            help_text: entry.entry.help_text.clone(),
            widget: entry.entry.widget.clone(),
            display_name: resolved.display_name,
            display_order: resolved.display_order.to_string(),
            search_order: resolved.search_order.to_string(),
            is_list_display: resolved.is_list_display,
            is_search_field: resolved.is_search_field,
            is_list_filter: resolved.is_list_filter,
            error: None,
        }
    }

    /// Name shown in lists: the override when set, otherwise the catalog label
    pub fn effective_display_name(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.label
        } else {
            &self.display_name
        }
    }

    pub fn flag(&self, flag: SettingFlag) -> bool {
        match flag {
            SettingFlag::ListDisplay => self.is_list_display,
            SettingFlag::SearchField => self.is_search_field,
            SettingFlag::ListFilter => self.is_list_filter,
        }
    }

    pub fn set_flag(&mut self, flag: SettingFlag, value: bool) {
        match flag {
            SettingFlag::ListDisplay => self.is_list_display = value,
            SettingFlag::SearchField => self.is_search_field = value,
            SettingFlag::ListFilter => self.is_list_filter = value,
        }
        self.error = None;
    }

    pub fn toggle(&mut self, flag: SettingFlag) {
        self.set_flag(flag, !self.flag(flag));
    }

    pub fn set_display_name(&mut self, value: impl Into<String>) {
        self.display_name = value.into();
        self.error = None;
    }
}

/// Merge a catalog with the stored settings into one row per catalog entry.
///
/// Settings are matched by exact field name; the first setting wins when a
/// name appears more than once, and settings for names absent from the
/// catalog are ignored.
pub fn merge_catalog_with_settings(
    catalog: &[FieldCatalogEntry],
    settings: &[FieldSetting],
) -> Vec<EditableRow> {
    let sourced: Vec<SourcedEntry> = catalog.iter().cloned().map(SourcedEntry::from).collect();
    merge_sourced_with_settings(&sourced, settings)
}

/// [`merge_catalog_with_settings`] over a combined multi-source catalog
pub fn merge_sourced_with_settings(
    catalog: &[SourcedEntry],
    settings: &[FieldSetting],
) -> Vec<EditableRow> {
    let mut by_name: HashMap<&str, &FieldSetting> = HashMap::with_capacity(settings.len());
    for setting in settings {
        by_name.entry(setting.name.as_str()).or_insert(setting);
    }

    let mut seen = HashSet::with_capacity(catalog.len());
    let rows: Vec<EditableRow> = catalog
        .iter()
        .filter(|entry| seen.insert(entry.entry.name.as_str()))
        .enumerate()
        .map(|(index, entry)| {
            let setting = by_name.get(entry.entry.name.as_str()).copied();
            EditableRow::from_parts(entry, ResolvedSetting::resolve(setting, index))
        })
        .collect();

    log::debug!(
        "Merged {} catalog entries with {} settings into {} rows",
        catalog.len(),
        settings.len(),
        rows.len()
    );
    rows
}
