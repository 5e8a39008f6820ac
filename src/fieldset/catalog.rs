//! Field catalog entries as declared by the backend
//!
//! The catalog describes which attributes of a record type can be configured
//! and how each one is edited. It is read-only from the editor's point of view.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;

/// Catalog fields that are never offered for configuration
const HIDDEN_FIELDS: &[&str] = &["id"];

/// One `(value, label)` option of a select widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl Choice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// How a field is edited
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WidgetKind {
    #[default]
    Text,
    Number,
    Boolean,
    Select(Vec<Choice>),
    TextArea,
}

impl WidgetKind {
    /// Map a backend widget name onto a widget kind.
    ///
    /// Accepts both the short names (`select`, `number`, ...) and the form widget
    /// class names the backend emits (`Select`, `NumberInput`, `CheckboxInput`,
    /// `Textarea`). Anything unknown is edited as plain text.
    pub fn from_wire(kind: &str, choices: Vec<Choice>) -> Self {
        match kind.to_ascii_lowercase().as_str() {
            "select" | "radioselect" => WidgetKind::Select(choices),
            "number" | "numberinput" | "integer" | "decimal" | "float" => WidgetKind::Number,
            "boolean" | "checkbox" | "checkboxinput" => WidgetKind::Boolean,
            "textarea" => WidgetKind::TextArea,
            _ => WidgetKind::Text,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WidgetKind::Text => "text",
            WidgetKind::Number => "number",
            WidgetKind::Boolean => "boolean",
            WidgetKind::Select(_) => "select",
            WidgetKind::TextArea => "textarea",
        }
    }

    pub fn choices(&self) -> &[Choice] {
        match self {
            WidgetKind::Select(choices) => choices,
            WidgetKind::Text | WidgetKind::Number | WidgetKind::Boolean | WidgetKind::TextArea => &[],
        }
    }

    /// Form-encoded text for a raw input value.
    ///
    /// Checkboxes submit `on` when ticked and an empty string otherwise; every
    /// other widget submits its text unchanged.
    pub fn form_value(&self, raw: &str) -> String {
        match self {
            WidgetKind::Boolean => {
                if is_truthy(raw) {
                    "on".to_string()
                } else {
                    String::new()
                }
            }
            WidgetKind::Text | WidgetKind::Number | WidgetKind::Select(_) | WidgetKind::TextArea => {
                raw.to_string()
            }
        }
    }
}

/// Whether a stored checkbox value counts as ticked
pub fn is_truthy(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "on" | "true" | "1" | "yes")
}

/// Render an arbitrary JSON scalar as the string-typed value the editors store.
///
/// `null` and `false` become the empty string so that an unticked checkbox and
/// a blank input look the same; `true` becomes `on`.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "on".to_string(),
        Value::Bool(false) => String::new(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Description of one editable attribute of a record type
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawCatalogEntry")]
pub struct FieldCatalogEntry {
    pub name: String,
    pub label: String,
    pub help_text: String,
    pub widget: WidgetKind,
    pub required: bool,
}

impl FieldCatalogEntry {
    pub fn new(name: impl Into<String>, label: impl Into<String>, widget: WidgetKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            help_text: String::new(),
            widget,
            required: false,
        }
    }
}

#[derive(Deserialize)]
struct RawCatalogEntry {
    name: String,
    #[serde(default, alias = "verbose_name")]
    label: Option<String>,
    #[serde(default)]
    help_text: Option<String>,
    #[serde(default, alias = "widget_type", alias = "widget_kind")]
    widget: Option<String>,
    #[serde(default)]
    choices: Option<Vec<(Value, Value)>>,
    #[serde(default, alias = "is_required")]
    required: Option<bool>,
}

impl From<RawCatalogEntry> for FieldCatalogEntry {
    fn from(raw: RawCatalogEntry) -> Self {
        let choices = raw
            .choices
            .unwrap_or_default()
            .iter()
            .map(|(value, label)| Choice::new(value_text(value), value_text(label)))
            .collect();
        let widget = WidgetKind::from_wire(raw.widget.as_deref().unwrap_or("text"), choices);

        Self {
            label: raw.label.unwrap_or_else(|| raw.name.clone()),
            name: raw.name,
            help_text: raw.help_text.unwrap_or_default(),
            widget,
            required: raw.required.unwrap_or(false),
        }
    }
}

/// Catalog fetched from one backend data type, with an optional origin label
#[derive(Debug, Clone, Default)]
pub struct CatalogSource {
    pub label: Option<String>,
    pub entries: Vec<FieldCatalogEntry>,
}

/// Catalog entry remembering which labelled source it was taken from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcedEntry {
    pub entry: FieldCatalogEntry,
    pub source: Option<String>,
}

impl SourcedEntry {
    /// Label shown to the user, annotated with the origin when there is one
    pub fn display_label(&self) -> String {
        match &self.source {
            Some(source) => format!("{} ({})", self.entry.label, source),
            None => self.entry.label.clone(),
        }
    }
}

impl From<FieldCatalogEntry> for SourcedEntry {
    fn from(entry: FieldCatalogEntry) -> Self {
        Self { entry, source: None }
    }
}

/// Combine catalogs of several data types into one.
///
/// The primary key field is dropped and names are deduplicated keeping the
/// first occurrence; the source label only feeds [`SourcedEntry::display_label`].
pub fn combine_catalogs(sources: Vec<CatalogSource>) -> Vec<SourcedEntry> {
    let mut seen = HashSet::new();
    let mut combined = Vec::new();

    for source in sources {
        for entry in source.entries {
            if HIDDEN_FIELDS.contains(&entry.name.as_str()) {
                continue;
            }
            if !seen.insert(entry.name.clone()) {
                log::debug!(
                    "Dropping duplicate catalog field '{}' from source {:?}",
                    entry.name,
                    source.label
                );
                continue;
            }
            combined.push(SourcedEntry {
                entry,
                source: source.label.clone(),
            });
        }
    }

    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(name: &str) -> FieldCatalogEntry {
        FieldCatalogEntry::new(name, name.to_uppercase(), WidgetKind::Text)
    }

    #[test]
    fn test_widget_from_wire_names() {
        assert_eq!(WidgetKind::from_wire("NumberInput", vec![]), WidgetKind::Number);
        assert_eq!(WidgetKind::from_wire("CheckboxInput", vec![]), WidgetKind::Boolean);
        assert_eq!(WidgetKind::from_wire("Textarea", vec![]), WidgetKind::TextArea);
        assert_eq!(WidgetKind::from_wire("DateInput", vec![]), WidgetKind::Text);

        let select = WidgetKind::from_wire("Select", vec![Choice::new("a", "A")]);
        assert_eq!(select.choices(), &[Choice::new("a", "A")]);
        assert_eq!(select.name(), "select");
    }

    #[test]
    fn test_boolean_form_value() {
        assert_eq!(WidgetKind::Boolean.form_value("true"), "on");
        assert_eq!(WidgetKind::Boolean.form_value(""), "");
        assert_eq!(WidgetKind::Number.form_value("12"), "12");
    }

    #[test]
    fn test_deserialize_backend_entry() {
        let entry: FieldCatalogEntry = serde_json::from_value(json!({
            "name": "measurement_type",
            "verbose_name": "タイプ",
            "help_text": null,
            "widget_type": "Select",
            "choices": [["quantitative", "定量"], ["qualitative", "定性"]],
            "is_required": true
        }))
        .unwrap();

        assert_eq!(entry.label, "タイプ");
        assert_eq!(entry.help_text, "");
        assert!(entry.required);
        assert_eq!(entry.widget.choices().len(), 2);
        assert_eq!(entry.widget.choices()[1].value, "qualitative");
    }

    #[test]
    fn test_deserialize_minimal_entry_defaults_to_text() {
        let entry: FieldCatalogEntry = serde_json::from_value(json!({"name": "qty"})).unwrap();
        assert_eq!(entry.label, "qty");
        assert_eq!(entry.widget, WidgetKind::Text);
        assert!(!entry.required);
    }

    #[test]
    fn test_combine_keeps_first_occurrence_and_drops_id() {
        let combined = combine_catalogs(vec![
            CatalogSource {
                label: Some("入庫予定".into()),
                entries: vec![entry("id"), entry("item"), entry("quantity")],
            },
            CatalogSource {
                label: Some("入庫実績".into()),
                entries: vec![entry("id"), entry("quantity"), entry("received_at")],
            },
        ]);

        let names: Vec<_> = combined.iter().map(|e| e.entry.name.as_str()).collect();
        assert_eq!(names, vec!["item", "quantity", "received_at"]);
        assert_eq!(combined[1].source.as_deref(), Some("入庫予定"));
        assert_eq!(combined[2].display_label(), "RECEIVED_AT (入庫実績)");
    }

    #[test]
    fn test_value_text() {
        assert_eq!(value_text(&json!(null)), "");
        assert_eq!(value_text(&json!(true)), "on");
        assert_eq!(value_text(&json!(false)), "");
        assert_eq!(value_text(&json!(5)), "5");
        assert_eq!(value_text(&json!("x")), "x");
    }
}
