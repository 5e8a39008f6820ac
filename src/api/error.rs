//! Failure taxonomy for backend calls

use crate::formset::errors::ServerErrors;
use thiserror::Error;

const TRANSPORT_BANNER: &str = "Could not reach the server. Please try again.";
const VALIDATION_BANNER: &str = "Please check the input.";
const SESSION_BANNER: &str = "The server sent an unexpected response. You may have been logged out \
                              or your session may have expired; please reload the page.";

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never completed or the server answered with an unreadable error
    #[error("request failed: {0}")]
    Transport(String),

    /// The server refused the request and explained why in a `message`
    #[error("server returned {status}: {message}")]
    Rejected { status: u16, message: String },

    /// Structured field errors the user can fix in place
    #[error("validation failed: {message}")]
    Validation { message: String, errors: ServerErrors },

    /// A JSON endpoint answered with something that is not JSON, usually a
    /// login page after the session expired
    #[error("unexpected non-JSON response: {0}")]
    SessionExpired(String),

    /// A save was attempted while another one is still pending
    #[error("a save is already in progress")]
    SaveInProgress,
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

impl ApiError {
    pub fn validation(message: Option<String>, errors: ServerErrors) -> Self {
        ApiError::Validation {
            message: message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| VALIDATION_BANNER.to_string()),
            errors,
        }
    }

    /// Text for the page-level alert
    pub fn banner(&self) -> String {
        match self {
            ApiError::Transport(detail) => format!("{} ({})", TRANSPORT_BANNER, detail),
            ApiError::Rejected { message, .. } => message.clone(),
            ApiError::Validation { message, .. } => message.clone(),
            ApiError::SessionExpired(_) => SESSION_BANNER.to_string(),
            ApiError::SaveInProgress => "A save is already in progress.".to_string(),
        }
    }

    pub fn server_errors(&self) -> Option<&ServerErrors> {
        match self {
            ApiError::Validation { errors, .. } => Some(errors),
            _ => None,
        }
    }
}
