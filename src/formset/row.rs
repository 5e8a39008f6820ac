//! Detail rows of a formset and the edits applied to them

use super::dependent::DependentRule;
use super::form::{ServerField, ServerForm};
use crate::fieldset::catalog::{is_truthy, value_text};
use crate::fieldset::payload::coerce_number;
use crate::fieldset::reorder::{ReorderError, reorder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field names the formset manages itself rather than storing as plain values
pub const ID_FIELD: &str = "id";
pub const ORDER_FIELD: &str = "order";
pub const DELETE_FIELD: &str = "DELETE";

pub fn is_reserved_field(name: &str) -> bool {
    matches!(name, ID_FIELD | ORDER_FIELD | DELETE_FIELD)
}

/// Value and current server error of one input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSlot {
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FieldSlot {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            error: None,
        }
    }
}

/// Plain (non-formset) form fields keyed by name
pub type FormFields = BTreeMap<String, FieldSlot>;

/// One sub-record edited inside a parent form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailRow {
    pub fields: BTreeMap<String, FieldSlot>,
    /// Primary key of the persisted record; `None` for rows created in the editor
    pub original_id: Option<String>,
    pub order: i64,
    pub order_error: Option<String>,
    pub marked_for_delete: bool,
}

impl DetailRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), FieldSlot::new(value));
        self
    }

    pub fn with_original_id(mut self, id: impl Into<String>) -> Self {
        self.original_id = Some(id.into());
        self
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    /// Build a row from a form the server rendered.
    ///
    /// `index` is the row's position; it becomes the order when the server
    /// sent none.
    pub fn from_server(form: &ServerForm, index: usize) -> Self {
        let mut row = Self::from_fields(&form.fields, index);
        row.original_id = form.id.as_ref().map(value_text).filter(|id| !id.is_empty());
        // Nothing to delete on the server without an id
        row.marked_for_delete &= row.is_persisted();
        row
    }

    /// Build the blank template used for "add row" from the server's empty form
    pub fn template(fields: &BTreeMap<String, ServerField>) -> Self {
        Self::from_fields(fields, 0)
    }

    fn from_fields(fields: &BTreeMap<String, ServerField>, index: usize) -> Self {
        let order = fields
            .get(ORDER_FIELD)
            .map(|field| value_text(&field.value))
            .filter(|value| !value.trim().is_empty())
            .map(|value| coerce_number(&value))
            .unwrap_or(index as i64 + 1);
        let marked_for_delete = fields
            .get(DELETE_FIELD)
            .is_some_and(|field| is_truthy(&value_text(&field.value)));

        Self {
            fields: fields
                .iter()
                .filter(|(name, _)| !is_reserved_field(name))
                .map(|(name, field)| (name.clone(), field.slot()))
                .collect(),
            original_id: None,
            order,
            order_error: None,
            marked_for_delete,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.original_id.is_some()
    }

    /// Whether the row goes into the formset; new rows marked for deletion do not
    pub fn is_submitted(&self) -> bool {
        self.is_persisted() || !self.marked_for_delete
    }

    pub fn value(&self, field: &str) -> &str {
        self.fields.get(field).map(|slot| slot.value.as_str()).unwrap_or("")
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        if field == ORDER_FIELD {
            return self.order_error.as_deref();
        }
        self.fields.get(field).and_then(|slot| slot.error.as_deref())
    }

    /// Attach a server message to `field`; returns `false` if the row has no such field
    pub fn set_error(&mut self, field: &str, message: impl Into<String>) -> bool {
        if field == ORDER_FIELD {
            self.order_error = Some(message.into());
            return true;
        }
        match self.fields.get_mut(field) {
            Some(slot) => {
                slot.error = Some(message.into());
                true
            }
            None => false,
        }
    }

    pub fn clear_errors(&mut self) {
        self.order_error = None;
        for slot in self.fields.values_mut() {
            slot.error = None;
        }
    }

    pub fn has_errors(&self) -> bool {
        self.order_error.is_some() || self.fields.values().any(|slot| slot.error.is_some())
    }
}

/// Copy the blank template into a new, never-persisted row at `position_hint`
pub fn instantiate_empty_row(template: &DetailRow, position_hint: i64) -> DetailRow {
    let mut row = template.clone();
    row.original_id = None;
    row.marked_for_delete = false;
    row.order = position_hint;
    row.clear_errors();
    row
}

/// Store a raw input value and drop any stale server error for it.
///
/// Values stay text; nothing is coerced here except the order position.
/// Changing a discriminator clears the fields its rules now hide, so an old
/// value can never come back by switching the discriminator back.
pub fn set_field_value(row: &mut DetailRow, field: &str, raw: impl Into<String>, rules: &[DependentRule]) {
    let raw = raw.into();

    if field == ORDER_FIELD {
        row.order = coerce_number(&raw);
        row.order_error = None;
        return;
    }

    let slot = row.fields.entry(field.to_string()).or_default();
    let changed = slot.value != raw;
    slot.value = raw;
    slot.error = None;

    if changed {
        for rule in rules.iter().filter(|rule| rule.discriminator == field) {
            rule.clear_hidden(row);
        }
    }
}

/// Flag a persisted row for deletion; never-persisted rows are left alone.
///
/// Returns whether the row is now marked.
pub fn mark_for_delete(row: &mut DetailRow) -> bool {
    if row.is_persisted() {
        row.marked_for_delete = true;
    }
    row.marked_for_delete
}

pub fn unmark(row: &mut DetailRow) {
    row.marked_for_delete = false;
}

/// What [`remove_row`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The row was never persisted and is gone from the list
    Dropped,
    /// The row stays in the list and will be deleted by the server
    MarkedForDelete,
    /// The row was already marked; the mark has been lifted
    Restored,
    NotFound,
}

/// Toggle deletion of the row at `index`.
///
/// Persisted rows are soft-deleted (and restored on a second call); rows the
/// server has never seen are removed outright.
pub fn remove_row(rows: &mut Vec<DetailRow>, index: usize) -> Removal {
    let Some(row) = rows.get_mut(index) else {
        return Removal::NotFound;
    };

    if !row.is_persisted() {
        rows.remove(index);
        return Removal::Dropped;
    }
    if row.marked_for_delete {
        unmark(row);
        Removal::Restored
    } else {
        mark_for_delete(row);
        Removal::MarkedForDelete
    }
}

/// Drag a detail row and renumber every row's order as `index + 1`
pub fn move_row(rows: &mut Vec<DetailRow>, from: usize, to: usize) -> Result<(), ReorderError> {
    *rows = reorder(rows.clone(), from, to)?;
    for (index, row) in rows.iter_mut().enumerate() {
        row.order = index as i64 + 1;
    }
    Ok(())
}

/// Rows to render: everything not marked for deletion, with its list index
pub fn visible_rows(rows: &[DetailRow]) -> impl Iterator<Item = (usize, &DetailRow)> {
    rows.iter().enumerate().filter(|(_, row)| !row.marked_for_delete)
}
