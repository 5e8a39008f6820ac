use super::backend::{CsvMappingBackend, FormTarget, FormsetBackend, SettingsBackend};
use super::constants::{self, DATA_TYPE_PARAM, headers};
use super::error::ApiError;
use super::retry::{RetryConfig, RetryPolicy};
use crate::config::Config;
use crate::editor::csv_mapping::CsvMapping;
use crate::fieldset::{FieldCatalogEntry, FieldSetting, WireSetting};
use crate::formset::{EditFormResponse, FormsetPayload, FormsetResponse, ServerErrors};
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

const SAVED_MESSAGE: &str = "Settings saved.";
const SUBMITTED_MESSAGE: &str = "Saved.";

/// Body of a JSON error or confirmation from the settings endpoints
#[derive(Debug, Default, Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<ServerErrors>,
}

/// HTTP client for the MES backend with cookie-based session and CSRF echo
#[derive(Clone)]
pub struct MesClient {
    base_url: String,
    http_client: reqwest::Client,
    csrf_token: Option<String>,
    session_cookie: Option<String>,
    retry_policy: RetryPolicy,
}

impl MesClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_timeouts(base_url, Duration::from_secs(30), Duration::from_secs(10))
    }

    pub fn with_timeouts(
        base_url: impl Into<String>,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .user_agent(concat!("mes-fieldset/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_custom_client(base_url, http_client))
    }

    /// Create a client around a preconfigured HTTP client
    pub fn with_custom_client(base_url: impl Into<String>, http_client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            http_client,
            csrf_token: None,
            session_cookie: None,
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let client = Self::with_timeouts(
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs),
            Duration::from_secs(config.connect_timeout_secs),
        )?
        .with_retry_config(RetryConfig::default().with_max_attempts(config.retry_attempts));

        let client = match &config.csrf_token {
            Some(token) => client.with_csrf_token(token.clone()),
            None => client,
        };
        Ok(match &config.session_cookie {
            Some(session) => client.with_session_cookie(session.clone()),
            None => client,
        })
    }

    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    pub fn with_session_cookie(mut self, session: impl Into<String>) -> Self {
        self.session_cookie = Some(session.into());
        self
    }

    pub fn with_retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_policy = RetryPolicy::new(config);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn cookie_header(&self) -> Option<String> {
        let mut cookies = Vec::new();
        if let Some(session) = &self.session_cookie {
            cookies.push(format!("{}={}", headers::SESSION_COOKIE, session));
        }
        if let Some(token) = &self.csrf_token {
            cookies.push(format!("{}={}", headers::CSRF_COOKIE, token));
        }
        (!cookies.is_empty()).then(|| cookies.join("; "))
    }

    /// Attach session cookies and ask for JSON
    fn prepare(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(reqwest::header::ACCEPT, headers::CONTENT_TYPE_JSON);
        match self.cookie_header() {
            Some(cookies) => request.header(reqwest::header::COOKIE, cookies),
            None => request,
        }
    }

    /// Like [`prepare`](Self::prepare), plus the CSRF header mutating requests need
    fn prepare_mutation(&self, request: RequestBuilder) -> RequestBuilder {
        let request = self.prepare(request);
        match &self.csrf_token {
            Some(token) => request.header(headers::CSRF_HEADER, token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T, ApiError> {
        debug!("GET {} {:?}", url, query);
        let response = self
            .retry_policy
            .execute(|| self.prepare(self.http_client.get(url)).query(query).send())
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(rejection(status, &body));
        }
        decode_json(&body)
    }
}

/// Parse the body of a successful JSON response.
///
/// A 2xx answer that is not JSON is almost always a login page served after
/// the session expired.
fn decode_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|err| {
        warn!("Expected JSON but could not parse response: {}", err);
        ApiError::SessionExpired(err.to_string())
    })
}

/// Classify a non-2xx answer by what its body tells us
fn rejection(status: StatusCode, body: &str) -> ApiError {
    match serde_json::from_str::<MessageBody>(body) {
        Ok(MessageBody {
            message,
            errors: Some(errors),
        }) if !errors.is_empty() => ApiError::validation(message, errors),
        Ok(MessageBody {
            message: Some(message), ..
        }) if !message.trim().is_empty() => ApiError::Rejected {
            status: status.as_u16(),
            message,
        },
        _ => ApiError::Transport(format!("HTTP {}", status)),
    }
}

/// Classify a non-2xx answer whose body is a flat field-error map
fn flat_rejection(status: StatusCode, body: &str) -> ApiError {
    match serde_json::from_str::<ServerErrors>(body) {
        Ok(errors) if !errors.is_empty() => ApiError::validation(None, errors),
        _ => ApiError::Transport(format!("HTTP {}", status)),
    }
}

#[async_trait]
impl SettingsBackend for MesClient {
    async fn fetch_catalog(&self, data_type: &str) -> Result<Vec<FieldCatalogEntry>, ApiError> {
        let url = constants::model_fields_endpoint(&self.base_url);
        let catalog: Vec<FieldCatalogEntry> = self.get_json(&url, &[(DATA_TYPE_PARAM, data_type)]).await?;
        info!("Fetched {} catalog fields for '{}'", catalog.len(), data_type);
        Ok(catalog)
    }

    async fn fetch_settings(&self, data_type: &str) -> Result<Vec<FieldSetting>, ApiError> {
        let url = constants::display_settings_endpoint(&self.base_url);
        let settings: Vec<FieldSetting> = self.get_json(&url, &[(DATA_TYPE_PARAM, data_type)]).await?;
        info!("Fetched {} display settings for '{}'", settings.len(), data_type);
        Ok(settings)
    }

    async fn bulk_save(&self, data_type: &str, payload: &[WireSetting]) -> Result<String, ApiError> {
        let url = constants::bulk_save_endpoint(&self.base_url);
        info!("Saving {} settings for '{}'", payload.len(), data_type);

        let response = self
            .prepare_mutation(self.http_client.post(&url))
            .query(&[(DATA_TYPE_PARAM, data_type)])
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(rejection(status, &body));
        }

        let confirmation: MessageBody = decode_json(&body)?;
        Ok(confirmation.message.unwrap_or_else(|| SAVED_MESSAGE.to_string()))
    }
}

impl MesClient {
    fn form_url(&self, target: &FormTarget) -> String {
        match target {
            FormTarget::Create => constants::master_create_endpoint(&self.base_url),
            FormTarget::Update(id) => constants::master_update_endpoint(&self.base_url, id),
        }
    }
}

#[async_trait]
impl FormsetBackend for MesClient {
    async fn fetch_edit_form(&self, target: &FormTarget) -> Result<EditFormResponse, ApiError> {
        let url = self.form_url(target);
        let response: EditFormResponse = self.get_json(&url, &[]).await?;

        if let Some(errors) = response.errors.as_ref().filter(|errors| !errors.is_empty()) {
            let message = errors.all_messages().join(" ");
            return Err(ApiError::validation(Some(message), errors.clone()));
        }

        debug!(
            "Loaded form with {} main fields and {} detail rows",
            response.form_data.len(),
            response.formset_data.forms.len()
        );
        Ok(response)
    }

    async fn submit_form(&self, target: &FormTarget, payload: FormsetPayload) -> Result<String, ApiError> {
        let url = self.form_url(target);
        info!("Submitting {} form fields to {}", payload.len(), url);

        let mut form = reqwest::multipart::Form::new();
        if let Some(token) = &self.csrf_token {
            form = form.text(headers::CSRF_FORM_FIELD, token.clone());
        }
        for (key, value) in payload {
            form = form.text(key, value);
        }

        let response = self
            .prepare_mutation(self.http_client.post(&url))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let result: FormsetResponse = match serde_json::from_str(&body) {
            Ok(result) => result,
            Err(_) if !status.is_success() => return Err(ApiError::Transport(format!("HTTP {}", status))),
            Err(err) => return Err(ApiError::SessionExpired(err.to_string())),
        };

        if result.success {
            Ok(result.message.unwrap_or_else(|| SUBMITTED_MESSAGE.to_string()))
        } else {
            Err(ApiError::validation(result.message, result.errors.unwrap_or_default()))
        }
    }
}

#[async_trait]
impl CsvMappingBackend for MesClient {
    async fn list_csv_mappings(&self, data_type: &str) -> Result<Vec<CsvMapping>, ApiError> {
        let url = constants::csv_mappings_endpoint(&self.base_url);
        self.get_json(&url, &[(DATA_TYPE_PARAM, data_type)]).await
    }

    async fn create_csv_mapping(&self, mapping: &CsvMapping) -> Result<CsvMapping, ApiError> {
        let url = constants::csv_mappings_endpoint(&self.base_url);
        let request = self.prepare_mutation(self.http_client.post(&url)).json(mapping);
        send_mapping(request).await
    }

    async fn update_csv_mapping(&self, id: &str, mapping: &CsvMapping) -> Result<CsvMapping, ApiError> {
        let url = constants::csv_mapping_endpoint(&self.base_url, id);
        let request = self.prepare_mutation(self.http_client.put(&url)).json(mapping);
        send_mapping(request).await
    }

    async fn delete_csv_mapping(&self, id: &str) -> Result<(), ApiError> {
        let url = constants::csv_mapping_endpoint(&self.base_url, id);
        let response = self.prepare_mutation(self.http_client.delete(&url)).send().await?;

        let status = response.status();
        if status != StatusCode::NO_CONTENT {
            let body = response.text().await.unwrap_or_default();
            return Err(rejection(status, &body));
        }
        info!("Deleted CSV mapping {}", id);
        Ok(())
    }
}

async fn send_mapping(request: RequestBuilder) -> Result<CsvMapping, ApiError> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(flat_rejection(status, &body));
    }
    decode_json(&body)
}
