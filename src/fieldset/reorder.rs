//! Drag-and-drop ordering over independent order axes
//!
//! A projection is the backing rows sorted by one order field. Drags operate
//! on projection indices; the result is written back to the backing rows by
//! name so the other axis is never touched.

use super::payload::coerce_number;
use super::row::{EditableRow, SettingFlag};
use super::setting::ORDER_STEP;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReorderError {
    #[error("index {index} is out of bounds for a projection of {len} rows")]
    OutOfBounds { index: usize, len: usize },
}

/// Which order field a projection sorts by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderAxis {
    /// List display order (`display_order`)
    List,
    /// Search field order (`search_order`)
    Search,
}

impl OrderAxis {
    pub fn raw_order<'a>(&self, row: &'a EditableRow) -> &'a str {
        match self {
            OrderAxis::List => &row.display_order,
            OrderAxis::Search => &row.search_order,
        }
    }

    pub fn order(&self, row: &EditableRow) -> i64 {
        coerce_number(self.raw_order(row))
    }

    pub fn set_order(&self, row: &mut EditableRow, value: impl Into<String>) {
        match self {
            OrderAxis::List => row.display_order = value.into(),
            OrderAxis::Search => row.search_order = value.into(),
        }
    }

    /// Flag deciding whether a row takes part in this axis
    pub fn active_flag(&self) -> SettingFlag {
        match self {
            OrderAxis::List => SettingFlag::ListDisplay,
            OrderAxis::Search => SettingFlag::SearchField,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            OrderAxis::List => "List display",
            OrderAxis::Search => "Search fields",
        }
    }
}

/// A row as seen through one axis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedRow {
    pub name: String,
    /// Index of the row in the backing collection
    pub position: usize,
    pub order: i64,
    /// Inactive rows are still ordered but rendered muted
    pub active: bool,
}

/// Sort the backing rows by `axis`; ties keep backing-array order.
pub fn project(rows: &[EditableRow], axis: OrderAxis) -> Vec<ProjectedRow> {
    let mut projection: Vec<ProjectedRow> = rows
        .iter()
        .enumerate()
        .map(|(position, row)| ProjectedRow {
            name: row.name.clone(),
            position,
            order: axis.order(row),
            active: row.flag(axis.active_flag()),
        })
        .collect();
    projection.sort_by_key(|row| (row.order, row.position));
    projection
}

/// Move the item at `from` to `to` (splice, not swap).
pub fn reorder<T>(mut projection: Vec<T>, from: usize, to: usize) -> Result<Vec<T>, ReorderError> {
    let len = projection.len();
    for index in [from, to] {
        if index >= len {
            return Err(ReorderError::OutOfBounds { index, len });
        }
    }
    if from != to {
        let item = projection.remove(from);
        projection.insert(to, item);
    }
    Ok(projection)
}

/// New order value per name: `(index + 1) * 10` in projection order
pub fn renumber(projection: &[ProjectedRow]) -> HashMap<String, i64> {
    projection
        .iter()
        .enumerate()
        .map(|(index, row)| (row.name.clone(), (index as i64 + 1) * ORDER_STEP))
        .collect()
}

/// Write renumbered orders back to the rows they name
pub fn apply_order(rows: &mut [EditableRow], axis: OrderAxis, orders: &HashMap<String, i64>) {
    for row in rows.iter_mut() {
        if let Some(order) = orders.get(&row.name) {
            axis.set_order(row, order.to_string());
        }
    }
}

/// Handle a completed drag on one axis.
///
/// `to` is `None` when the item was dropped outside the list, which leaves
/// everything untouched.
pub fn drag(
    rows: &mut [EditableRow],
    axis: OrderAxis,
    from: usize,
    to: Option<usize>,
) -> Result<(), ReorderError> {
    let Some(to) = to else {
        return Ok(());
    };

    let projection = reorder(project(rows, axis), from, to)?;
    let orders = renumber(&projection);
    apply_order(rows, axis, &orders);

    log::debug!("Moved {:?} row {} -> {} ({} rows renumbered)", axis, from, to, orders.len());
    Ok(())
}
