//! MesClient against a one-shot local HTTP server

use mes_fieldset::api::{
    ApiError, CsvMappingBackend, FormTarget, FormsetBackend, MesClient, RetryConfig, SettingsBackend,
};
use mes_fieldset::fieldset::WireSetting;
use mes_fieldset::formset::FormsetPayload;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

fn canned(status: &str, content_type: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        content_type,
        body.len(),
        body
    )
}

/// Serve exactly one request with a canned response; the handle yields the raw request
async fn serve_once(status: &str, content_type: &str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let response = canned(status, content_type, body);

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request
    });

    (base_url, handle)
}

/// Answer successive connections with `responses` in order
async fn serve_sequence(responses: Vec<String>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let mut requests = Vec::new();
        for response in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            requests.push(read_request(&mut socket).await);
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        }
        requests
    });

    (base_url, handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let read = socket.read(&mut chunk).await.unwrap();
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);

        let text = String::from_utf8_lossy(&buffer);
        let Some(header_end) = text.find("\r\n\r\n") else {
            continue;
        };
        let headers = text[..header_end].to_ascii_lowercase();
        let body_len = buffer.len() - (header_end + 4);

        if headers.contains("transfer-encoding: chunked") {
            if text.ends_with("0\r\n\r\n") {
                break;
            }
            continue;
        }

        let content_length = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if body_len >= content_length {
            break;
        }
    }

    String::from_utf8_lossy(&buffer).into_owned()
}

fn client(base_url: &str) -> MesClient {
    MesClient::new(base_url)
        .unwrap()
        .with_retry_config(RetryConfig::disabled())
        .with_csrf_token("csrf-token-value")
        .with_session_cookie("session-value")
}

#[tokio::test]
async fn test_fetch_catalog_parses_fields() {
    let (base_url, server) = serve_once(
        "200 OK",
        "application/json",
        r#"[{"name": "id", "verbose_name": "ID"}, {"name": "quantity", "verbose_name": "数量", "widget_type": "number"}]"#,
    )
    .await;

    let catalog = client(&base_url).fetch_catalog("goods_receipt").await.unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog[1].label, "数量");

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /api/base/model-fields/?data_type=goods_receipt "));
    assert!(request.to_ascii_lowercase().contains("sessionid=session-value"));
}

#[tokio::test]
async fn test_unavailable_fetch_is_retried() {
    let (base_url, server) = serve_sequence(vec![
        canned("503 Service Unavailable", "text/html", "<h1>maintenance</h1>"),
        canned("200 OK", "application/json", r#"[{"name": "quantity", "verbose_name": "数量"}]"#),
    ])
    .await;

    let retrying = MesClient::new(&base_url).unwrap().with_retry_config(RetryConfig {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        backoff_multiplier: 2.0,
        jitter: false,
    });
    let catalog = retrying.fetch_catalog("goods_receipt").await.unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].name, "quantity");

    let requests = server.await.unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|request| request.starts_with("GET /api/base/model-fields/")));
}

#[tokio::test]
async fn test_login_page_means_session_expired() {
    let (base_url, server) = serve_once("200 OK", "text/html", "<!DOCTYPE html><title>ログイン</title>").await;

    let err = client(&base_url).fetch_settings("goods_receipt").await.unwrap_err();
    assert!(matches!(err, ApiError::SessionExpired(_)));
    server.await.unwrap();
}

#[tokio::test]
async fn test_bulk_save_rejection_carries_field_errors() {
    let (base_url, server) = serve_once(
        "400 Bad Request",
        "application/json",
        r#"{"message": "保存に失敗しました。", "errors": {"display_order": ["整数を入力してください。"]}}"#,
    )
    .await;

    let payload = vec![WireSetting {
        model_field_name: "quantity".into(),
        display_name: String::new(),
        display_order: 10,
        search_order: 10,
        is_list_display: true,
        is_search_field: false,
        is_list_filter: false,
    }];
    let err = client(&base_url).bulk_save("goods_receipt", &payload).await.unwrap_err();
    assert_eq!(err.banner(), "保存に失敗しました。");
    assert_eq!(err.server_errors().unwrap().messages("display_order").len(), 1);

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/base/model-display-settings/bulk-save/?data_type=goods_receipt "));
    assert!(request.to_ascii_lowercase().contains("x-csrftoken: csrf-token-value"));
    assert!(request.contains(r#""model_field_name":"quantity""#));
}

#[tokio::test]
async fn test_gateway_error_is_transport() {
    let (base_url, server) = serve_once("502 Bad Gateway", "text/html", "<h1>Bad Gateway</h1>").await;

    let err = client(&base_url).bulk_save("goods_receipt", &[]).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    server.await.unwrap();
}

#[tokio::test]
async fn test_formset_submit_sends_multipart_fields() {
    let (base_url, server) = serve_once(
        "200 OK",
        "application/json",
        r#"{"success": false, "message": "入力内容を確認してください。", "errors": {"measurement_details-0-name": ["必須です。"]}}"#,
    )
    .await;

    let mut payload = FormsetPayload::new();
    payload.push("code", "QC-01");
    payload.push("measurement_details-TOTAL_FORMS", "1");
    payload.push("measurement_details-0-id", "7");

    let err = client(&base_url)
        .submit_form(&FormTarget::Update("3".into()), payload)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation { .. }));
    assert_eq!(err.banner(), "入力内容を確認してください。");

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /quality/master_creation/update/3/ "));
    assert!(request.contains("name=\"csrfmiddlewaretoken\""));
    assert!(request.contains("name=\"measurement_details-0-id\""));
    assert!(request.contains("QC-01"));
}

#[tokio::test]
async fn test_delete_mapping_expects_no_content() {
    let (base_url, server) = serve_once("204 No Content", "application/json", "").await;
    client(&base_url).delete_csv_mapping("4f1c").await.unwrap();
    let request = server.await.unwrap();
    assert!(request.starts_with("DELETE /api/base/csv-mappings/4f1c/ "));

    let (base_url, server) = serve_once("200 OK", "application/json", "{}").await;
    assert!(client(&base_url).delete_csv_mapping("4f1c").await.is_err());
    server.await.unwrap();
}
