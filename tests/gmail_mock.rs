use agendita::components::gmail::{notifications, GmailHandle, Notifier};
use agendita::components::google_calendar::NewEvent;
use agendita::config::Config;
use agendita::error::AssistantResult;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use chrono::{TimeZone, Utc};
use chrono_tz::America::Guatemala;
use serde_json::json;
use std::fs;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::RwLock;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_valid_token(dir: &TempDir) -> String {
    let token_path = dir.path().join("token.json");
    let token = json!({
        "access_token": "test-token",
        "refresh_token": "refresh-123",
        "expires_at": Utc::now().timestamp() + 3600,
    });
    fs::write(&token_path, token.to_string()).unwrap();
    token_path.to_string_lossy().to_string()
}

fn test_config(token_path: &str) -> Config {
    Config {
        google_client_id: "test_client_id".to_string(),
        google_client_secret: "test_client_secret".to_string(),
        google_calendar_id: "primary".to_string(),
        google_token_path: token_path.to_string(),
        timezone: "America/Guatemala".to_string(),
        default_duration_min: 60,
        notify_email: Some("amiga@example.com".to_string()),
        sender_email: Some("asistente@example.com".to_string()),
        locale: "es".to_string(),
    }
}

/// Decode the "raw" field of the request the Gmail API received
fn decode_raw_message(request: &wiremock::Request) -> String {
    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    let raw = body["raw"].as_str().unwrap();
    let bytes = general_purpose::URL_SAFE_NO_PAD.decode(raw).unwrap();
    String::from_utf8(bytes).unwrap()
}

/// Sending posts a base64url RFC 2822 message with the expected headers
#[tokio::test]
async fn test_send_email_builds_rfc2822() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let token_path = write_valid_token(&dir);
    let config = Arc::new(RwLock::new(test_config(&token_path)));

    Mock::given(method("POST"))
        .and(path("/users/me/messages/send"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "msg-1" })))
        .expect(1)
        .mount(&server)
        .await;

    let handle = GmailHandle::with_api_base(config, &server.uri());
    handle
        .send_email("amiga@example.com", "Nueva cita agendada", "Hola,\nte aviso.")
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    let message = decode_raw_message(&requests[0]);
    assert!(message.contains("From: asistente@example.com\r\n"));
    assert!(message.contains("To: amiga@example.com\r\n"));
    assert!(message.contains("Subject: Nueva cita agendada\r\n"));
    assert!(message.contains("Content-Type: text/plain; charset=\"UTF-8\"\r\n"));
    assert!(message.ends_with("\r\n\r\nHola,\nte aviso."));
}

/// Non-ASCII subjects are RFC 2047 encoded
#[tokio::test]
async fn test_subject_with_accents_is_encoded() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let token_path = write_valid_token(&dir);
    let config = Arc::new(RwLock::new(test_config(&token_path)));

    Mock::given(method("POST"))
        .and(path("/users/me/messages/send"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "msg-1" })))
        .mount(&server)
        .await;

    let handle = GmailHandle::with_api_base(config, &server.uri());
    handle
        .send_email("amiga@example.com", "Cita añadida", "Hola")
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let message = decode_raw_message(&requests[0]);
    let encoded = format!(
        "Subject: =?UTF-8?B?{}?=\r\n",
        general_purpose::STANDARD.encode("Cita añadida")
    );
    assert!(message.contains(&encoded));
}

/// API failures surface the HTTP status in the error message
#[tokio::test]
async fn test_send_email_surfaces_http_error() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let token_path = write_valid_token(&dir);
    let config = Arc::new(RwLock::new(test_config(&token_path)));

    Mock::given(method("POST"))
        .and(path("/users/me/messages/send"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let handle = GmailHandle::with_api_base(config, &server.uri());
    let error = handle
        .send_email("amiga@example.com", "Hola", "Hola")
        .await
        .unwrap_err();

    assert!(error.to_string().contains("HTTP 500"));
}

/// Notifier that records what it was asked to send
#[derive(Default)]
struct MockNotifier {
    sent: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> AssistantResult<()> {
        self.sent.lock().unwrap().push((
            to.to_string(),
            subject.to_string(),
            body.to_string(),
        ));
        Ok(())
    }
}

fn new_event() -> NewEvent {
    NewEvent {
        summary: "Dentista".to_string(),
        location: Some("zona 10".to_string()),
        description: None,
        start: Guatemala.with_ymd_and_hms(2024, 3, 16, 15, 0, 0).unwrap(),
        end: Guatemala.with_ymd_and_hms(2024, 3, 16, 15, 45, 0).unwrap(),
    }
}

/// The created-event notification goes to the configured recipient
#[tokio::test]
async fn test_notification_uses_configured_recipient() {
    agendita::utils::i18n::set_locale("es");

    let notifier = MockNotifier::default();
    let sent = notifications::send_created_notification(
        &notifier,
        Some("amiga@example.com"),
        &new_event(),
        "https://calendar.google.com/event?eid=abc",
    )
    .await
    .unwrap();

    assert!(sent);
    let messages = notifier.sent.lock().unwrap();
    assert_eq!(messages.len(), 1);

    let (to, subject, body) = &messages[0];
    assert_eq!(to, "amiga@example.com");
    assert_eq!(subject, "Nueva cita agendada");
    assert!(body.contains("Se creó el evento 'Dentista' el 16/03 15:00 en zona 10"));
    assert!(body.contains("Enlace en Calendar: https://calendar.google.com/event?eid=abc"));
}

/// Without a configured recipient the notification is skipped quietly
#[tokio::test]
async fn test_notification_skipped_without_recipient() {
    let notifier = MockNotifier::default();
    let sent = notifications::send_created_notification(
        &notifier,
        None,
        &new_event(),
        "https://calendar.google.com/event?eid=abc",
    )
    .await
    .unwrap();

    assert!(!sent);
    assert!(notifier.sent.lock().unwrap().is_empty());
}
