//! Endpoint paths and header names of the MES backend

/// Base path of the shared REST endpoints
pub const API_BASE_PATH: &str = "/api/base";

/// Query parameter selecting the record type
pub const DATA_TYPE_PARAM: &str = "data_type";

/// Standard headers and cookies
pub mod headers {
    pub const CONTENT_TYPE_JSON: &str = "application/json";

    /// Header echoing the CSRF cookie on mutating requests
    pub const CSRF_HEADER: &str = "X-CSRFToken";

    /// Form field carrying the CSRF token in multipart submissions
    pub const CSRF_FORM_FIELD: &str = "csrfmiddlewaretoken";

    pub const CSRF_COOKIE: &str = "csrftoken";
    pub const SESSION_COOKIE: &str = "sessionid";
}

fn join(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Field catalog of a data type
pub fn model_fields_endpoint(base_url: &str) -> String {
    join(base_url, &format!("{}/model-fields/", API_BASE_PATH))
}

/// Stored display settings of a data type
pub fn display_settings_endpoint(base_url: &str) -> String {
    join(base_url, &format!("{}/model-display-settings/", API_BASE_PATH))
}

/// Full replace of a data type's display settings
pub fn bulk_save_endpoint(base_url: &str) -> String {
    join(base_url, &format!("{}/model-display-settings/bulk-save/", API_BASE_PATH))
}

pub fn csv_mappings_endpoint(base_url: &str) -> String {
    join(base_url, &format!("{}/csv-mappings/", API_BASE_PATH))
}

pub fn csv_mapping_endpoint(base_url: &str, id: &str) -> String {
    join(base_url, &format!("{}/csv-mappings/{}/", API_BASE_PATH, id))
}

/// Quality inspection item master: create form
pub fn master_create_endpoint(base_url: &str) -> String {
    join(base_url, "/quality/master_creation/create/")
}

/// Quality inspection item master: update form of one item
pub fn master_update_endpoint(base_url: &str, id: &str) -> String {
    join(base_url, &format!("/quality/master_creation/update/{}/", id))
}
