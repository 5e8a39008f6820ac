//! Formset request bodies

use super::dependent::{DependentRule, is_hidden};
use super::form::FormSchema;
use super::row::{DELETE_FIELD, DetailRow, FormFields, ID_FIELD, ORDER_FIELD, is_reserved_field};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub const DEFAULT_MIN_NUM_FORMS: usize = 0;
pub const DEFAULT_MAX_NUM_FORMS: usize = 1000;

/// Prefix of the quality master's measurement detail formset
pub const MEASUREMENT_DETAILS_PREFIX: &str = "measurement_details";

/// Management values the server reported for a formset.
///
/// Missing values are filled in from the rows when the payload is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ManagementMeta {
    #[serde(rename = "TOTAL_FORMS", default, deserialize_with = "lenient_count")]
    pub total_forms: Option<usize>,
    #[serde(rename = "INITIAL_FORMS", default, deserialize_with = "lenient_count")]
    pub initial_forms: Option<usize>,
    #[serde(rename = "MIN_NUM_FORMS", default, deserialize_with = "lenient_count")]
    pub min_num_forms: Option<usize>,
    #[serde(rename = "MAX_NUM_FORMS", default, deserialize_with = "lenient_count")]
    pub max_num_forms: Option<usize>,
}

/// Accept counts sent either as numbers or as numeric strings
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64().map(|n| n as usize),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Prefix and visibility rules of one formset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormsetLayout {
    pub prefix: String,
    pub rules: Vec<DependentRule>,
}

impl FormsetLayout {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            rules: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: DependentRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Layout of the quality master's measurement details
    pub fn measurement_details() -> Self {
        Self::new(MEASUREMENT_DETAILS_PREFIX).with_rule(DependentRule::measurement_type())
    }

    pub fn row_key(&self, index: usize, field: &str) -> String {
        format!("{}-{}-{}", self.prefix, index, field)
    }

    pub fn management_key(&self, name: &str) -> String {
        format!("{}-{}", self.prefix, name)
    }
}

/// Ordered multipart form fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormsetPayload {
    entries: Vec<(String, String)>,
}

impl FormsetPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append plain form fields under their bare names, encoded per widget
    pub fn push_fields(&mut self, fields: &FormFields, schema: &FormSchema) {
        for (name, slot) in fields {
            let value = match schema.get(name) {
                Some(entry) => entry.widget.form_value(&slot.value),
                None => slot.value.clone(),
            };
            self.push(name.clone(), value);
        }
    }
}

impl IntoIterator for FormsetPayload {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Encode detail rows as formset fields.
///
/// Persisted rows carry their `id`, new rows carry none. Persisted rows marked
/// for deletion are sent with `DELETE=on` so the server removes the record;
/// new rows marked for deletion are skipped and the indices close up behind
/// them. Fields hidden by a dependent rule are left out.
pub fn build_formset_payload(rows: &[DetailRow], meta: &ManagementMeta, layout: &FormsetLayout) -> FormsetPayload {
    let mut payload = FormsetPayload::new();
    let submitted: Vec<&DetailRow> = rows.iter().filter(|row| row.is_submitted()).collect();
    let initial_forms = meta
        .initial_forms
        .unwrap_or_else(|| submitted.iter().filter(|row| row.is_persisted()).count());

    payload.push(layout.management_key("TOTAL_FORMS"), submitted.len().to_string());
    payload.push(layout.management_key("INITIAL_FORMS"), initial_forms.to_string());
    payload.push(
        layout.management_key("MIN_NUM_FORMS"),
        meta.min_num_forms.unwrap_or(DEFAULT_MIN_NUM_FORMS).to_string(),
    );
    payload.push(
        layout.management_key("MAX_NUM_FORMS"),
        meta.max_num_forms.unwrap_or(DEFAULT_MAX_NUM_FORMS).to_string(),
    );

    for (index, row) in submitted.iter().enumerate() {
        if let Some(id) = &row.original_id {
            payload.push(layout.row_key(index, ID_FIELD), id.clone());
        }
        for (name, slot) in &row.fields {
            if is_reserved_field(name) || is_hidden(&layout.rules, row, name) {
                continue;
            }
            payload.push(layout.row_key(index, name), slot.value.clone());
        }
        payload.push(layout.row_key(index, ORDER_FIELD), row.order.to_string());
        if row.marked_for_delete {
            payload.push(layout.row_key(index, DELETE_FIELD), "on");
        }
    }

    log::debug!("Built formset '{}' payload: {} rows, {} fields", layout.prefix, submitted.len(), payload.len());
    payload
}
