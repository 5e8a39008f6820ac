//! Bulk-save payload for field settings

use super::row::EditableRow;
use serde::{Deserialize, Serialize};

/// One entry of the bulk-save request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireSetting {
    pub model_field_name: String,
    pub display_name: String,
    pub display_order: i64,
    pub search_order: i64,
    pub is_list_display: bool,
    pub is_search_field: bool,
    pub is_list_filter: bool,
}

/// Lenient numeric coercion for order inputs.
///
/// Blank or non-numeric text becomes `0` instead of an error, and fractional
/// values are truncated. This can silently collide with another row's order;
/// the backend accepts it and existing pages depend on it.
pub fn coerce_number(raw: &str) -> i64 {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return value;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => value.trunc() as i64,
        _ => 0,
    }
}

/// Serialize every row, dirty or not.
///
/// The backend treats a missing field as "reset to default", so the payload is
/// always the full row set.
pub fn build_bulk_payload(rows: &[EditableRow]) -> Vec<WireSetting> {
    rows.iter()
        .map(|row| WireSetting {
            model_field_name: row.name.clone(),
            display_name: row.display_name.clone(),
            display_order: coerce_number(&row.display_order),
            search_order: coerce_number(&row.search_order),
            is_list_display: row.is_list_display,
            is_search_field: row.is_search_field,
            is_list_filter: row.is_list_filter,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fieldset::catalog::{FieldCatalogEntry, WidgetKind};
    use crate::fieldset::row::merge_catalog_with_settings;
    use serde_json::json;

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number("40"), 40);
        assert_eq!(coerce_number(" 15 "), 15);
        assert_eq!(coerce_number("abc"), 0);
        assert_eq!(coerce_number(""), 0);
        assert_eq!(coerce_number("2.9"), 2);
        assert_eq!(coerce_number("-20"), -20);
        assert_eq!(coerce_number("NaN"), 0);
    }

    #[test]
    fn test_non_numeric_order_becomes_zero() {
        let mut rows = merge_catalog_with_settings(
            &[FieldCatalogEntry::new("qty", "数量", WidgetKind::Number)],
            &[],
        );
        rows[0].display_order = "abc".to_string();

        let payload = build_bulk_payload(&rows);
        assert_eq!(payload[0].display_order, 0);
        assert_eq!(payload[0].search_order, 10);
    }

    #[test]
    fn test_payload_wire_shape() {
        let rows = merge_catalog_with_settings(
            &[
                FieldCatalogEntry::new("item", "品番", WidgetKind::Text),
                FieldCatalogEntry::new("qty", "数量", WidgetKind::Number),
            ],
            &[],
        );

        let payload = serde_json::to_value(build_bulk_payload(&rows)).unwrap();
        assert_eq!(
            payload[1],
            json!({
                "model_field_name": "qty",
                "display_name": "",
                "display_order": 20,
                "search_order": 20,
                "is_list_display": true,
                "is_search_field": false,
                "is_list_filter": false
            })
        );
    }
}
