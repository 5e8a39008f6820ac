//! Ordered field-set editing for page display settings
//!
//! The backend declares a catalog of configurable fields and stores one
//! setting per field. This module merges the two into editable rows, keeps
//! two independent orderings (list display and search) and turns the rows
//! back into the bulk-save payload.

pub mod catalog;
pub mod payload;
pub mod reorder;
pub mod row;
pub mod setting;

pub use catalog::{CatalogSource, Choice, FieldCatalogEntry, SourcedEntry, WidgetKind, combine_catalogs};
pub use payload::{WireSetting, build_bulk_payload, coerce_number};
pub use reorder::{OrderAxis, ProjectedRow, ReorderError, drag, project, renumber, reorder};
pub use row::{EditableRow, SettingFlag, merge_catalog_with_settings, merge_sourced_with_settings};
pub use setting::{FieldSetting, ResolvedSetting};
