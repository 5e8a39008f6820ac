//! Mapping server validation errors back onto rows and fields

use super::row::{DetailRow, FormFields};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Field errors as returned by the backend, keyed by form field name.
///
/// The backend sends lists of messages, but single strings and nested objects
/// occur as well; everything is flattened to a list of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, Value>")]
pub struct ServerErrors(BTreeMap<String, Vec<String>>);

impl ServerErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.0.entry(key.into()).or_default().push(message.into());
    }

    pub fn messages(&self, key: &str) -> &[String] {
        self.0.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Every message, in key order
    pub fn all_messages(&self) -> Vec<&str> {
        self.0.values().flatten().map(String::as_str).collect()
    }
}

impl From<BTreeMap<String, Value>> for ServerErrors {
    fn from(raw: BTreeMap<String, Value>) -> Self {
        let errors = raw
            .into_iter()
            .map(|(key, value)| {
                let mut messages = Vec::new();
                flatten_messages(&value, &mut messages);
                (key, messages)
            })
            .filter(|(_, messages)| !messages.is_empty())
            .collect();
        Self(errors)
    }
}

fn flatten_messages(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Null => {}
        Value::String(s) => out.push(s.clone()),
        Value::Array(items) => items.iter().for_each(|item| flatten_messages(item, out)),
        Value::Object(map) => map.values().for_each(|item| flatten_messages(item, out)),
        other => out.push(other.to_string()),
    }
}

/// Outcome of applying server errors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorReport {
    /// Number of keys attached to a row or field
    pub applied: usize,
    /// Keys that matched nothing, with their joined messages
    pub unmatched: Vec<(String, String)>,
}

impl ErrorReport {
    /// Single banner text for every unmatched message, if there are any
    pub fn banner(&self) -> Option<String> {
        if self.unmatched.is_empty() {
            return None;
        }
        Some(
            self.unmatched
                .iter()
                .map(|(_, message)| message.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        )
    }

    fn record(&mut self, matched: bool, key: &str, message: String) {
        if matched {
            self.applied += 1;
        } else {
            log::warn!("Server error for '{}' matched no field: {}", key, message);
            self.unmatched.push((key.to_string(), message));
        }
    }
}

/// Split a `{prefix}-{index}-{field}` key into row index and field name
pub fn split_formset_key<'a>(key: &'a str, prefix: &str) -> Option<(usize, &'a str)> {
    let rest = key.strip_prefix(prefix)?.strip_prefix('-')?;
    let (index, field) = rest.split_once('-')?;
    let index = index.parse().ok()?;
    (!field.is_empty()).then_some((index, field))
}

/// Attach formset-style errors to the rows they address.
///
/// Keys that are not formset keys for `prefix`, point past the last row or
/// name a field the row lacks end up in the report's banner.
pub fn apply_server_errors(rows: &mut [DetailRow], errors: &ServerErrors, prefix: &str) -> ErrorReport {
    let mut report = ErrorReport::default();
    for (key, messages) in errors.iter() {
        let message = messages.join(" ");
        let matched = attach_to_rows(rows, key, prefix, &message);
        report.record(matched, key, message);
    }
    report
}

/// Attach flat errors to plain form fields by name
pub fn apply_flat_errors(fields: &mut FormFields, errors: &ServerErrors) -> ErrorReport {
    route_flat_errors(errors, |key, message| match fields.get_mut(key) {
        Some(slot) => {
            slot.error = Some(message);
            true
        }
        None => false,
    })
}

/// Attach errors of a parent form with one formset: row keys go to rows,
/// everything else to the plain fields
pub fn apply_form_errors(
    fields: &mut FormFields,
    rows: &mut [DetailRow],
    errors: &ServerErrors,
    prefix: &str,
) -> ErrorReport {
    route_flat_errors(errors, |key, message| {
        if split_formset_key(key, prefix).is_some() {
            return attach_to_rows(rows, key, prefix, &message);
        }
        match fields.get_mut(key) {
            Some(slot) => {
                slot.error = Some(message);
                true
            }
            None => false,
        }
    })
}

/// Hand each key with its joined messages to `accept`; rejected keys are
/// collected for the banner
pub fn route_flat_errors<F>(errors: &ServerErrors, mut accept: F) -> ErrorReport
where
    F: FnMut(&str, String) -> bool,
{
    let mut report = ErrorReport::default();
    for (key, messages) in errors.iter() {
        let message = messages.join(" ");
        let matched = accept(key, message.clone());
        report.record(matched, key, message);
    }
    report
}

fn attach_to_rows(rows: &mut [DetailRow], key: &str, prefix: &str, message: &str) -> bool {
    let Some((index, field)) = split_formset_key(key, prefix) else {
        return false;
    };
    rows.iter_mut()
        .filter(|row| row.is_submitted())
        .nth(index)
        .is_some_and(|row| row.set_error(field, message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formset::row::FieldSlot;
    use serde_json::json;

    fn rows() -> Vec<DetailRow> {
        (0..3)
            .map(|i| DetailRow::new().with_field("name", format!("row{}", i)).with_field("unit", ""))
            .collect()
    }

    #[test]
    fn test_split_formset_key() {
        assert_eq!(split_formset_key("measurement_details-1-name", "measurement_details"), Some((1, "name")));
        assert_eq!(
            split_formset_key("measurement_details-12-specification_unit", "measurement_details"),
            Some((12, "specification_unit"))
        );
        assert_eq!(split_formset_key("measurement_details-x-name", "measurement_details"), None);
        assert_eq!(split_formset_key("code", "measurement_details"), None);
        assert_eq!(split_formset_key("measurement_details-1-", "measurement_details"), None);
    }

    #[test]
    fn test_error_lands_on_one_row_only() {
        let mut rows = rows();
        let errors: ServerErrors =
            serde_json::from_value(json!({"measurement_details-1-name": ["必須です"]})).unwrap();

        let report = apply_server_errors(&mut rows, &errors, "measurement_details");

        assert_eq!(report.applied, 1);
        assert_eq!(report.banner(), None);
        assert_eq!(rows[1].error("name"), Some("必須です"));
        assert_eq!(rows[1].value("name"), "row1");
        assert!(!rows[0].has_errors());
        assert!(!rows[2].has_errors());
    }

    #[test]
    fn test_error_indices_skip_unsent_rows() {
        let mut rows = rows();
        rows[0].marked_for_delete = true;
        let errors: ServerErrors =
            serde_json::from_value(json!({"measurement_details-0-name": ["必須です"]})).unwrap();

        apply_server_errors(&mut rows, &errors, "measurement_details");

        assert!(!rows[0].has_errors());
        assert_eq!(rows[1].error("name"), Some("必須です"));
    }

    #[test]
    fn test_unmatched_keys_become_one_banner() {
        let mut rows = rows();
        let errors: ServerErrors = serde_json::from_value(json!({
            "__all__": ["重複があります"],
            "measurement_details-9-name": ["範囲外"],
            "measurement_details-0-missing": "no such field"
        }))
        .unwrap();

        let report = apply_server_errors(&mut rows, &errors, "measurement_details");

        assert_eq!(report.applied, 0);
        assert_eq!(report.unmatched.len(), 3);
        let banner = report.banner().unwrap();
        assert!(banner.contains("重複があります"));
        assert!(banner.contains("範囲外"));
        assert!(banner.contains("no such field"));
    }

    #[test]
    fn test_flat_errors_match_by_name() {
        let mut fields = FormFields::new();
        fields.insert("csv_header".into(), FieldSlot::new(""));

        let errors: ServerErrors = serde_json::from_value(json!({
            "csv_header": ["この項目は必須です。", "長すぎます"],
            "non_field_errors": ["組み合わせが重複しています"]
        }))
        .unwrap();
        let report = apply_flat_errors(&mut fields, &errors);

        assert_eq!(fields["csv_header"].error.as_deref(), Some("この項目は必須です。 長すぎます"));
        assert_eq!(report.banner().as_deref(), Some("組み合わせが重複しています"));
    }

    #[test]
    fn test_form_errors_split_between_main_and_rows() {
        let mut fields = FormFields::new();
        fields.insert("code".into(), FieldSlot::new("QC"));
        let mut rows = rows();

        let mut errors = ServerErrors::new();
        errors.insert("code", "既に存在します");
        errors.insert("measurement_details-2-order", "数値を入力してください");

        let report = apply_form_errors(&mut fields, &mut rows, &errors, "measurement_details");
        assert_eq!(report.applied, 2);
        assert_eq!(fields["code"].error.as_deref(), Some("既に存在します"));
        assert_eq!(rows[2].error("order"), Some("数値を入力してください"));
    }

    #[test]
    fn test_nested_messages_are_flattened() {
        let errors: ServerErrors = serde_json::from_value(json!({
            "detail": "権限がありません",
            "nested": {"inner": ["a", "b"]},
            "empty": null
        }))
        .unwrap();

        assert_eq!(errors.messages("detail"), &["権限がありません".to_string()]);
        assert_eq!(errors.messages("nested").len(), 2);
        assert_eq!(errors.len(), 2);
    }
}
