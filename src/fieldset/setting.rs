//! Persisted per-field display settings

use serde::{Deserialize, Serialize};

/// Step between generated order values
pub const ORDER_STEP: i64 = 10;

/// Display/search configuration stored by the backend for one field.
///
/// Every attribute except the field name may be missing or `null`; a missing
/// attribute falls back to the same default an absent setting would get.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldSetting {
    #[serde(rename = "model_field_name")]
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub display_order: Option<i64>,
    #[serde(default)]
    pub search_order: Option<i64>,
    #[serde(default)]
    pub is_list_display: Option<bool>,
    #[serde(default)]
    pub is_search_field: Option<bool>,
    #[serde(default)]
    pub is_list_filter: Option<bool>,
}

impl FieldSetting {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Fully resolved setting values for one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSetting {
    pub display_name: String,
    pub display_order: i64,
    pub search_order: i64,
    pub is_list_display: bool,
    pub is_search_field: bool,
    pub is_list_filter: bool,
}

impl ResolvedSetting {
    /// Defaults for the field at `index` in the catalog
    pub fn defaults(index: usize) -> Self {
        let order = default_order(index);
        Self {
            display_name: String::new(),
            display_order: order,
            search_order: order,
            is_list_display: true,
            is_search_field: false,
            is_list_filter: false,
        }
    }

    /// Overlay a stored setting (if any) on the defaults for `index`
    pub fn resolve(setting: Option<&FieldSetting>, index: usize) -> Self {
        let defaults = Self::defaults(index);
        let Some(setting) = setting else {
            return defaults;
        };

        Self {
            display_name: setting.display_name.clone().unwrap_or(defaults.display_name),
            display_order: setting.display_order.unwrap_or(defaults.display_order),
            search_order: setting.search_order.unwrap_or(defaults.search_order),
            is_list_display: setting.is_list_display.unwrap_or(defaults.is_list_display),
            is_search_field: setting.is_search_field.unwrap_or(defaults.is_search_field),
            is_list_filter: setting.is_list_filter.unwrap_or(defaults.is_list_filter),
        }
    }
}

/// Order value for the item at zero-based `index`
pub fn default_order(index: usize) -> i64 {
    (index as i64 + 1) * ORDER_STEP
}
