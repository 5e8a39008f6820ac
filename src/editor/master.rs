//! Master record editor: a parent form plus one formset of detail rows

use super::Banner;
use super::gate::SaveGate;
use crate::api::{ApiError, FormTarget, FormsetBackend};
use crate::fieldset::ReorderError;
use crate::formset::dependent::is_hidden;
use crate::formset::form::split_fields;
use crate::formset::{
    DetailRow, ErrorReport, FormFields, FormSchema, FormsetLayout, FormsetPayload, ManagementMeta, Removal,
    apply_form_errors, build_formset_payload, instantiate_empty_row, move_row, remove_row, set_field_value,
    visible_rows,
};
use crate::ui::{ScrollLock, ScrollLockGuard};
use log::{debug, info, warn};

/// Where an editor is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Editing,
    /// The server accepted the form; the caller drops the editor and re-fetches its list
    Saved,
}

/// Editor state for one open create/update modal.
///
/// The page stays scroll-locked until the editor is saved or closed.
pub struct MasterFormEditor<B> {
    backend: B,
    target: FormTarget,
    layout: FormsetLayout,
    fields: FormFields,
    schema: FormSchema,
    rows: Vec<DetailRow>,
    row_schema: FormSchema,
    template: DetailRow,
    management: ManagementMeta,
    gate: SaveGate,
    banner: Option<Banner>,
    state: EditorState,
    scroll_lock: Option<ScrollLockGuard>,
}

impl<B: FormsetBackend> MasterFormEditor<B> {
    /// Lock page scrolling and load the form for `target`
    pub async fn open(
        backend: B,
        target: FormTarget,
        layout: FormsetLayout,
        scroll_lock: &ScrollLock,
    ) -> Result<Self, ApiError> {
        let guard = scroll_lock.acquire();
        let response = backend.fetch_edit_form(&target).await?;

        let (fields, schema) = split_fields(&response.form_data);
        let (_, row_schema) = split_fields(&response.empty_form_fields_data);
        let template = DetailRow::template(&response.empty_form_fields_data);
        let rows: Vec<DetailRow> = response
            .formset_data
            .forms
            .iter()
            .enumerate()
            .map(|(index, form)| DetailRow::from_server(form, index))
            .collect();

        info!(
            "Opened {:?} form with {} fields and {} '{}' rows",
            target,
            fields.len(),
            rows.len(),
            layout.prefix
        );

        Ok(Self {
            backend,
            target,
            layout,
            fields,
            schema,
            rows,
            row_schema,
            template,
            management: response.formset_data.management_form,
            gate: SaveGate::new(),
            banner: None,
            state: EditorState::Editing,
            scroll_lock: Some(guard),
        })
    }

    pub fn target(&self) -> &FormTarget {
        &self.target
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn row_schema(&self) -> &FormSchema {
        &self.row_schema
    }

    pub fn rows(&self) -> &[DetailRow] {
        &self.rows
    }

    /// Rows still shown to the user, with their list index
    pub fn visible_rows(&self) -> impl Iterator<Item = (usize, &DetailRow)> {
        visible_rows(&self.rows)
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn is_saved(&self) -> bool {
        self.state == EditorState::Saved
    }

    pub fn is_saving(&self) -> bool {
        self.gate.is_busy()
    }

    pub fn gate(&self) -> &SaveGate {
        &self.gate
    }

    pub fn value(&self, field: &str) -> &str {
        self.fields.get(field).map(|slot| slot.value.as_str()).unwrap_or("")
    }

    /// Set a parent form field; unknown names are ignored
    pub fn set_value(&mut self, field: &str, raw: impl Into<String>) -> bool {
        match self.fields.get_mut(field) {
            Some(slot) => {
                slot.value = raw.into();
                slot.error = None;
                true
            }
            None => false,
        }
    }

    pub fn set_row_value(&mut self, index: usize, field: &str, raw: impl Into<String>) -> bool {
        match self.rows.get_mut(index) {
            Some(row) => {
                set_field_value(row, field, raw, &self.layout.rules);
                true
            }
            None => false,
        }
    }

    /// Whether a dependent rule currently hides `field` of the row at `index`
    pub fn is_row_field_hidden(&self, index: usize, field: &str) -> bool {
        self.rows
            .get(index)
            .is_some_and(|row| is_hidden(&self.layout.rules, row, field))
    }

    /// Append a blank row from the server template; returns its index
    pub fn add_row(&mut self) -> usize {
        let row = instantiate_empty_row(&self.template, self.rows.len() as i64 + 1);
        self.rows.push(row);
        debug!("Added detail row, now {}", self.rows.len());
        self.rows.len() - 1
    }

    pub fn remove_row(&mut self, index: usize) -> Removal {
        remove_row(&mut self.rows, index)
    }

    pub fn move_row(&mut self, from: usize, to: usize) -> Result<(), ReorderError> {
        move_row(&mut self.rows, from, to)
    }

    /// Full request body: parent fields under bare names, then the formset
    pub fn payload(&self) -> FormsetPayload {
        let mut payload = FormsetPayload::new();
        payload.push_fields(&self.fields, &self.schema);
        for (key, value) in build_formset_payload(&self.rows, &self.management, &self.layout) {
            payload.push(key, value);
        }
        payload
    }

    fn clear_errors(&mut self) {
        for slot in self.fields.values_mut() {
            slot.error = None;
        }
        for row in &mut self.rows {
            row.clear_errors();
        }
    }

    /// Submit the form.
    ///
    /// On success the editor moves to [`EditorState::Saved`] and gives up its
    /// scroll lock. Validation errors replace the ones on fields and rows and
    /// every typed value is kept so the user can fix and resubmit; any other
    /// failure only sets the banner.
    pub async fn submit(&mut self) -> Result<String, ApiError> {
        let gate = self.gate.clone();
        let _ticket = gate.try_acquire()?;
        self.banner = None;

        let payload = self.payload();
        match self.backend.submit_form(&self.target, payload).await {
            Ok(message) => {
                info!("Submitted {:?} form", self.target);
                self.clear_errors();
                self.banner = Some(Banner::success(message.clone()));
                self.state = EditorState::Saved;
                self.scroll_lock = None;
                Ok(message)
            }
            Err(err) => {
                let report = match err.server_errors() {
                    Some(errors) => {
                        self.clear_errors();
                        apply_form_errors(&mut self.fields, &mut self.rows, errors, &self.layout.prefix)
                    }
                    None => ErrorReport::default(),
                };
                warn!("Submitting {:?} form failed: {} ({} errors applied)", self.target, err, report.applied);

                let text = match report.banner() {
                    Some(unmatched) => format!("{} {}", err.banner(), unmatched),
                    None => err.banner(),
                };
                self.banner = Some(Banner::error(text));
                Err(err)
            }
        }
    }

    /// Close the modal, releasing its scroll lock
    pub fn close(self) {
        debug!("Closing {:?} form", self.target);
    }
}
