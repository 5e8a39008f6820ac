//! Detail-row editing, formset payloads and server error routing

use mes_fieldset::formset::{
    DetailRow, FormsetLayout, ManagementMeta, Removal, ServerErrors, apply_flat_errors, apply_server_errors,
    build_formset_payload, instantiate_empty_row, move_row, remove_row, set_field_value, visible_rows,
};
use mes_fieldset::formset::row::FieldSlot;
use serde_json::json;
use std::collections::BTreeMap;

fn quantitative(name: &str) -> DetailRow {
    DetailRow::new()
        .with_field("name", name)
        .with_field("measurement_type", "quantitative")
        .with_field("specification_nominal", "5")
        .with_field("specification_unit", "mm")
        .with_field("expected_qualitative_result", "")
}

#[test]
fn test_update_payload_with_new_and_deleted_rows() {
    let layout = FormsetLayout::measurement_details();
    let mut rows = vec![
        quantitative("外径").with_original_id("7").with_order(1),
        quantitative("内径").with_order(2),
        quantitative("長さ").with_original_id("9").with_order(3),
    ];
    assert_eq!(remove_row(&mut rows, 2), Removal::MarkedForDelete);

    let payload = build_formset_payload(&rows, &ManagementMeta::default(), &layout);

    assert_eq!(payload.get("measurement_details-0-id"), Some("7"));
    assert!(!payload.contains_key("measurement_details-1-id"));
    assert_eq!(payload.get("measurement_details-2-id"), Some("9"));
    assert_eq!(payload.get("measurement_details-2-DELETE"), Some("on"));
    assert!(!payload.contains_key("measurement_details-0-DELETE"));

    assert_eq!(payload.get("measurement_details-TOTAL_FORMS"), Some("3"));
    assert_eq!(payload.get("measurement_details-INITIAL_FORMS"), Some("2"));
    assert_eq!(payload.get("measurement_details-MIN_NUM_FORMS"), Some("0"));
    assert_eq!(payload.get("measurement_details-MAX_NUM_FORMS"), Some("1000"));

    assert_eq!(visible_rows(&rows).count(), 2);
}

#[test]
fn test_server_management_values_win() {
    let meta: ManagementMeta = serde_json::from_value(json!({
        "TOTAL_FORMS": "1", "INITIAL_FORMS": "4", "MIN_NUM_FORMS": 1, "MAX_NUM_FORMS": "20"
    }))
    .unwrap();
    let rows = vec![quantitative("a")];

    let payload = build_formset_payload(&rows, &meta, &FormsetLayout::measurement_details());
    assert_eq!(payload.get("measurement_details-INITIAL_FORMS"), Some("4"));
    assert_eq!(payload.get("measurement_details-MIN_NUM_FORMS"), Some("1"));
    assert_eq!(payload.get("measurement_details-MAX_NUM_FORMS"), Some("20"));
}

#[test]
fn test_qualitative_rows_drop_specification_fields() {
    let layout = FormsetLayout::measurement_details();
    let mut row = quantitative("外観");
    set_field_value(&mut row, "measurement_type", "qualitative", &layout.rules);
    set_field_value(&mut row, "expected_qualitative_result", "傷なし", &layout.rules);

    let payload = build_formset_payload(&[row.clone()], &ManagementMeta::default(), &layout);
    assert!(!payload.contains_key("measurement_details-0-specification_nominal"));
    assert!(!payload.contains_key("measurement_details-0-specification_unit"));
    assert_eq!(payload.get("measurement_details-0-expected_qualitative_result"), Some("傷なし"));

    set_field_value(&mut row, "measurement_type", "quantitative", &layout.rules);
    assert_eq!(row.value("specification_nominal"), "");
    assert_eq!(row.value("expected_qualitative_result"), "");
}

#[test]
fn test_new_rows_and_moves_renumber() {
    let template = DetailRow::new().with_field("name", "").with_field("measurement_type", "quantitative");
    let mut rows = vec![quantitative("a").with_original_id("1").with_order(1)];

    rows.push(instantiate_empty_row(&template, rows.len() as i64 + 1));
    set_field_value(&mut rows[1], "name", "b", &[]);
    rows.push(instantiate_empty_row(&template, rows.len() as i64 + 1));
    set_field_value(&mut rows[2], "name", "c", &[]);
    assert_eq!(rows[2].order, 3);

    move_row(&mut rows, 2, 0).unwrap();
    let order: Vec<(&str, i64)> = rows.iter().map(|row| (row.value("name"), row.order)).collect();
    assert_eq!(order, vec![("c", 1), ("a", 2), ("b", 3)]);

    assert!(move_row(&mut rows, 0, 3).is_err());
    assert_eq!(rows.len(), 3);

    assert_eq!(remove_row(&mut rows, 0), Removal::Dropped);
    assert_eq!(rows.len(), 2);
}

#[test]
fn test_formset_errors_attach_to_rows() {
    let mut rows = vec![quantitative("a"), quantitative("b")];
    let errors: ServerErrors = serde_json::from_value(json!({
        "measurement_details-1-specification_nominal": ["数値を入力してください。"],
        "measurement_details-0-order": ["必須です。"],
        "measurement_details-5-name": ["範囲外"],
        "__all__": ["同じ名前の測定項目があります。"]
    }))
    .unwrap();

    let report = apply_server_errors(&mut rows, &errors, "measurement_details");
    assert_eq!(report.applied, 2);
    assert_eq!(rows[1].error("specification_nominal"), Some("数値を入力してください。"));
    assert_eq!(rows[0].error("order"), Some("必須です。"));

    let banner = report.banner().unwrap();
    assert!(banner.contains("範囲外"));
    assert!(banner.contains("同じ名前の測定項目があります。"));

    // A local edit clears the stale error
    set_field_value(&mut rows[1], "specification_nominal", "4.5", &[]);
    assert_eq!(rows[1].error("specification_nominal"), None);
}

#[test]
fn test_flat_errors_match_by_name() {
    let mut fields = BTreeMap::from([
        ("code".to_string(), FieldSlot::new("QC-01")),
        ("name".to_string(), FieldSlot::new("")),
    ]);
    let errors: ServerErrors = serde_json::from_value(json!({
        "name": ["この項目は必須です。"],
        "detail": "権限がありません。"
    }))
    .unwrap();

    let report = apply_flat_errors(&mut fields, &errors);
    assert_eq!(fields["name"].error.as_deref(), Some("この項目は必須です。"));
    assert_eq!(fields["code"].error, None);
    assert_eq!(report.banner().as_deref(), Some("権限がありません。"));
}
