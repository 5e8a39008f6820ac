//! Stateful editors driving the field-set and formset models against a backend

pub mod csv_mapping;
pub mod gate;
pub mod master;
pub mod settings;

pub use csv_mapping::{CsvMapping, CsvMappingEditor};
pub use gate::{SaveGate, SaveTicket};
pub use master::{EditorState, MasterFormEditor};
pub use settings::DisplaySettingsEditor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

/// Page-level alert shown above an editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub text: String,
}

impl Banner {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == BannerKind::Error
    }
}
