//! Formset editing: variable-length lists of sub-records submitted as indexed
//! form fields with management metadata

pub mod dependent;
pub mod errors;
pub mod form;
pub mod payload;
pub mod row;

pub use dependent::DependentRule;
pub use errors::{ErrorReport, ServerErrors, apply_flat_errors, apply_form_errors, apply_server_errors};
pub use form::{EditFormResponse, FormSchema, FormsetResponse, ServerField, ServerForm};
pub use payload::{FormsetLayout, FormsetPayload, ManagementMeta, build_formset_payload};
pub use row::{
    DetailRow, FieldSlot, FormFields, Removal, instantiate_empty_row, mark_for_delete, move_row, remove_row,
    set_field_value, unmark, visible_rows,
};
