//! Display settings from backend JSON through reordering to the save payload

use mes_fieldset::fieldset::{
    CatalogSource, FieldCatalogEntry, FieldSetting, OrderAxis, SettingFlag, build_bulk_payload, combine_catalogs,
    drag, merge_catalog_with_settings, merge_sourced_with_settings, project,
};
use serde_json::json;

fn catalog() -> Vec<FieldCatalogEntry> {
    serde_json::from_value(json!([
        {"name": "id", "verbose_name": "ID"},
        {"name": "order_number", "verbose_name": "発注番号", "help_text": "発注書の番号"},
        {"name": "supplier", "verbose_name": "仕入先"},
        {"name": "quantity", "verbose_name": "数量", "widget_type": "number"},
        {"name": "status", "verbose_name": "状態", "widget_type": "select",
         "choices": [["pending", "未入庫"], ["received", "入庫済"]]}
    ]))
    .unwrap()
}

fn settings() -> Vec<FieldSetting> {
    serde_json::from_value(json!([
        {"model_field_name": "quantity", "display_name": "入庫数", "display_order": 5, "search_order": 40,
         "is_list_display": true, "is_search_field": true, "is_list_filter": false},
        {"model_field_name": "supplier", "display_order": null, "is_list_display": false},
        {"model_field_name": "removed_field", "display_order": 1}
    ]))
    .unwrap()
}

fn names(rows: &[mes_fieldset::fieldset::ProjectedRow]) -> Vec<&str> {
    rows.iter().map(|row| row.name.as_str()).collect()
}

#[test]
fn test_merge_drag_and_save_payload() {
    let sources = vec![CatalogSource {
        label: None,
        entries: catalog(),
    }];
    let catalog = combine_catalogs(sources);
    let mut rows = merge_sourced_with_settings(&catalog, &settings());

    // `id` is never configurable
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[2].effective_display_name(), "入庫数");
    assert_eq!(rows[0].effective_display_name(), "発注番号");

    let list = project(&rows, OrderAxis::List);
    assert_eq!(names(&list), vec!["quantity", "order_number", "supplier", "status"]);
    assert!(!list[2].active);

    drag(&mut rows, OrderAxis::List, 0, Some(3)).unwrap();
    let list = project(&rows, OrderAxis::List);
    assert_eq!(names(&list), vec!["order_number", "supplier", "status", "quantity"]);
    let orders: Vec<i64> = list.iter().map(|row| row.order).collect();
    assert_eq!(orders, vec![10, 20, 30, 40]);

    rows[1].toggle(SettingFlag::ListFilter);
    rows[0].display_order = "not a number".to_string();

    let payload = build_bulk_payload(&rows);
    assert_eq!(payload.len(), 4);
    let order_number = payload.iter().find(|s| s.model_field_name == "order_number").unwrap();
    assert_eq!(order_number.display_order, 0);
    let supplier = payload.iter().find(|s| s.model_field_name == "supplier").unwrap();
    assert!(supplier.is_list_filter);
    assert!(!supplier.is_list_display);
    let quantity = payload.iter().find(|s| s.model_field_name == "quantity").unwrap();
    assert_eq!(quantity.search_order, 40);

    let body = serde_json::to_value(&payload).unwrap();
    assert_eq!(body[2]["model_field_name"], "quantity");
    assert_eq!(body[2]["display_name"], "入庫数");
}

#[test]
fn test_search_axis_is_independent() {
    let mut rows = merge_catalog_with_settings(&catalog(), &settings());
    let list_before: Vec<String> = rows.iter().map(|row| row.display_order.clone()).collect();

    drag(&mut rows, OrderAxis::Search, 3, Some(0)).unwrap();
    drag(&mut rows, OrderAxis::Search, 0, None).unwrap();

    let list_after: Vec<String> = rows.iter().map(|row| row.display_order.clone()).collect();
    assert_eq!(list_after, list_before);
    assert_eq!(project(&rows, OrderAxis::Search)[0].order, 10);
}

#[test]
fn test_combined_sources_prefer_first() {
    let purchase: Vec<FieldCatalogEntry> = serde_json::from_value(json!([
        {"name": "id", "verbose_name": "ID"},
        {"name": "part_number", "verbose_name": "品番"}
    ]))
    .unwrap();
    let receipt: Vec<FieldCatalogEntry> = serde_json::from_value(json!([
        {"name": "part_number", "verbose_name": "品番"},
        {"name": "received_quantity", "verbose_name": "入庫数"}
    ]))
    .unwrap();

    let combined = combine_catalogs(vec![
        CatalogSource {
            label: Some("入庫予定".into()),
            entries: purchase,
        },
        CatalogSource {
            label: Some("入庫実績".into()),
            entries: receipt,
        },
    ]);
    let rows = merge_sourced_with_settings(&combined, &[]);

    let labels: Vec<&str> = rows.iter().map(|row| row.label.as_str()).collect();
    assert_eq!(labels, vec!["品番 (入庫予定)", "入庫数 (入庫実績)"]);
    assert_eq!(rows[1].display_order, "20");
}
