//! Fields whose visibility depends on a discriminator value

use super::row::DetailRow;

/// Show one group of fields when the discriminator has `active_value` and
/// another group otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependentRule {
    pub discriminator: String,
    pub active_value: String,
    /// Shown only while the discriminator equals `active_value`
    pub active_fields: Vec<String>,
    /// Shown only while it does not
    pub inactive_fields: Vec<String>,
}

impl DependentRule {
    pub fn new(discriminator: impl Into<String>, active_value: impl Into<String>) -> Self {
        Self {
            discriminator: discriminator.into(),
            active_value: active_value.into(),
            active_fields: Vec::new(),
            inactive_fields: Vec::new(),
        }
    }

    pub fn with_active_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.active_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn with_inactive_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inactive_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Quality measurement details: specification limits only apply to
    /// quantitative measurements, the expected result only to qualitative ones.
    pub fn measurement_type() -> Self {
        Self::new("measurement_type", "quantitative")
            .with_active_fields([
                "specification_nominal",
                "specification_upper_limit",
                "specification_lower_limit",
                "specification_unit",
            ])
            .with_inactive_fields(["expected_qualitative_result"])
    }

    pub fn is_active(&self, row: &DetailRow) -> bool {
        row.value(&self.discriminator) == self.active_value
    }

    /// Fields this rule hides for the row's current discriminator value
    pub fn hidden_fields(&self, row: &DetailRow) -> &[String] {
        if self.is_active(row) {
            &self.inactive_fields
        } else {
            &self.active_fields
        }
    }

    pub fn hides(&self, row: &DetailRow, field: &str) -> bool {
        self.hidden_fields(row).iter().any(|hidden| hidden == field)
    }

    /// Blank every field that is hidden right now, errors included
    pub fn clear_hidden(&self, row: &mut DetailRow) {
        let hidden = self.hidden_fields(row).to_vec();
        for field in hidden {
            if let Some(slot) = row.fields.get_mut(&field) {
                slot.value.clear();
                slot.error = None;
            }
        }
    }
}

/// Whether any rule hides `field` on this row
pub fn is_hidden(rules: &[DependentRule], row: &DetailRow, field: &str) -> bool {
    rules.iter().any(|rule| rule.hides(row, field))
}
