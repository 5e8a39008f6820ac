//! HTTP access to the MES backend
//!
//! The editors only see the traits in [`backend`]; [`MesClient`] is the
//! reqwest implementation used by the CLI.

pub mod backend;
pub mod client;
pub mod constants;
pub mod error;
pub mod retry;

pub use backend::{CsvMappingBackend, FormTarget, FormsetBackend, SettingsBackend};
pub use client::MesClient;
pub use error::ApiError;
pub use retry::{RetryConfig, RetryPolicy, RetryStatus, RetryableError};
