//! Server-rendered form descriptions
//!
//! The create/update endpoints answer a GET with the main form, the existing
//! formset rows and an empty row template, every field carrying its widget
//! description next to its value.

use super::errors::ServerErrors;
use super::payload::ManagementMeta;
use super::row::FieldSlot;
use crate::fieldset::catalog::{Choice, FieldCatalogEntry, WidgetKind, value_text};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Widget description per field name
pub type FormSchema = BTreeMap<String, FieldCatalogEntry>;

/// One field of a server-rendered form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerField {
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub help_text: Option<String>,
    #[serde(default, alias = "widget")]
    pub widget_type: Option<String>,
    #[serde(default)]
    pub choices: Option<Vec<(Value, Value)>>,
    #[serde(default, alias = "required")]
    pub is_required: Option<bool>,
}

impl ServerField {
    pub fn slot(&self) -> FieldSlot {
        FieldSlot::new(value_text(&self.value))
    }

    pub fn catalog_entry(&self, name: &str) -> FieldCatalogEntry {
        let choices = self
            .choices
            .iter()
            .flatten()
            .map(|(value, label)| Choice::new(value_text(value), value_text(label)))
            .collect();

        FieldCatalogEntry {
            name: name.to_string(),
            label: self.label.clone().unwrap_or_else(|| name.to_string()),
            help_text: self.help_text.clone().unwrap_or_default(),
            widget: WidgetKind::from_wire(self.widget_type.as_deref().unwrap_or("text"), choices),
            required: self.is_required.unwrap_or(false),
        }
    }
}

/// One existing formset row
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerForm {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub fields: BTreeMap<String, ServerField>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormsetData {
    #[serde(default)]
    pub management_form: ManagementMeta,
    #[serde(default)]
    pub forms: Vec<ServerForm>,
}

/// Response of the create/update endpoints to a JSON GET
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditFormResponse {
    #[serde(default)]
    pub form_data: BTreeMap<String, ServerField>,
    #[serde(default)]
    pub formset_data: FormsetData,
    #[serde(default)]
    pub empty_form_fields_data: BTreeMap<String, ServerField>,
    #[serde(default)]
    pub errors: Option<ServerErrors>,
}

/// Response of the create/update endpoints to a POST
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormsetResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<ServerErrors>,
}

/// Split server fields into editable values and their widget schema
pub fn split_fields(fields: &BTreeMap<String, ServerField>) -> (BTreeMap<String, FieldSlot>, FormSchema) {
    let values = fields.iter().map(|(name, field)| (name.clone(), field.slot())).collect();
    let schema = fields
        .iter()
        .map(|(name, field)| (name.clone(), field.catalog_entry(name)))
        .collect();
    (values, schema)
}
