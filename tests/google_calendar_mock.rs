use agendita::components::google_calendar::token::TokenManager;
use agendita::components::google_calendar::{GoogleCalendarHandle, NewEvent};
use agendita::config::Config;
use chrono::{TimeZone, Utc};
use chrono_tz::America::Guatemala;
use serde_json::json;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::RwLock;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Write a token file that is still valid for an hour
fn write_valid_token(dir: &TempDir) -> String {
    write_token(dir, Utc::now().timestamp() + 3600)
}

fn write_token(dir: &TempDir, expires_at: i64) -> String {
    let token_path = dir.path().join("token.json");
    let token = json!({
        "access_token": "test-token",
        "refresh_token": "refresh-123",
        "expires_at": expires_at,
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
        notify_email: None,
        sender_email: None,
        locale: "es".to_string(),
    }
}

/// Listing maps the API items into CalendarEvent, all-day events included
#[tokio::test]
async fn test_list_events_parses_items() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let token_path = write_valid_token(&dir);
    let config = Arc::new(RwLock::new(test_config(&token_path)));

    let start = Guatemala.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
    let end = Guatemala.with_ymd_and_hms(2024, 3, 16, 0, 0, 0).unwrap();

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .and(header("Authorization", "Bearer test-token"))
        .and(query_param("timeMin", start.to_rfc3339()))
        .and(query_param("timeMax", end.to_rfc3339()))
        .and(query_param("singleEvents", "true"))
        .and(query_param("orderBy", "startTime"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {
                    "id": "event1",
                    "summary": "Dentista",
                    "location": "zona 10",
                    "htmlLink": "https://calendar.google.com/event?eid=event1",
                    "start": { "dateTime": "2024-03-15T10:00:00-06:00" },
                    "end": { "dateTime": "2024-03-15T11:00:00-06:00" },
                },
                {
                    "id": "event2",
                    "summary": "Feriado",
                    "start": { "date": "2024-03-15" },
                    "end": { "date": "2024-03-16" },
                },
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let handle = GoogleCalendarHandle::with_api_base(config, &server.uri());
    let events = handle.list_events(start, end).await.unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].id, "event1");
    assert_eq!(events[0].summary.as_deref(), Some("Dentista"));
    assert_eq!(
        events[0].start_date_time.as_deref(),
        Some("2024-03-15T10:00:00-06:00")
    );
    assert_eq!(events[1].id, "event2");
    assert_eq!(events[1].start_date.as_deref(), Some("2024-03-15"));
    assert!(events[1].start_date_time.is_none());
}

/// Creating an event posts the expected JSON and returns the created event
#[tokio::test]
async fn test_create_event_posts_body() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let token_path = write_valid_token(&dir);
    let config = Arc::new(RwLock::new(test_config(&token_path)));

    let start = Guatemala.with_ymd_and_hms(2024, 3, 16, 15, 0, 0).unwrap();
    let end = Guatemala.with_ymd_and_hms(2024, 3, 16, 15, 45, 0).unwrap();

    Mock::given(method("POST"))
        .and(path("/calendars/primary/events"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "created1",
            "summary": "Dentista",
            "htmlLink": "https://calendar.google.com/event?eid=created1",
            "start": { "dateTime": "2024-03-16T15:00:00-06:00" },
            "end": { "dateTime": "2024-03-16T15:45:00-06:00" },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let handle = GoogleCalendarHandle::with_api_base(config, &server.uri());
    let created = handle
        .create_event(NewEvent {
            summary: "Dentista".to_string(),
            location: Some("zona 10".to_string()),
            description: None,
            start,
            end,
        })
        .await
        .unwrap();

    assert_eq!(created.id, "created1");
    assert_eq!(
        created.html_link.as_deref(),
        Some("https://calendar.google.com/event?eid=created1")
    );

    // The posted body carries the fields Google expects
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["summary"], "Dentista");
    assert_eq!(body["location"], "zona 10");
    assert_eq!(body["start"]["dateTime"], start.to_rfc3339());
    assert_eq!(body["start"]["timeZone"], "America/Guatemala");
    assert_eq!(body["end"]["dateTime"], end.to_rfc3339());
}

/// API failures surface the HTTP status in the error message
#[tokio::test]
async fn test_list_events_surfaces_http_error() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let token_path = write_valid_token(&dir);
    let config = Arc::new(RwLock::new(test_config(&token_path)));

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let start = Guatemala.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
    let end = Guatemala.with_ymd_and_hms(2024, 3, 16, 0, 0, 0).unwrap();

    let handle = GoogleCalendarHandle::with_api_base(config, &server.uri());
    let error = handle.list_events(start, end).await.unwrap_err();

    assert!(error.to_string().contains("HTTP 403"));
}

/// An expired token is refreshed and the new token persisted
#[tokio::test]
async fn test_expired_token_is_refreshed() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let token_path = write_token(&dir, Utc::now().timestamp() - 60);
    let config = Arc::new(RwLock::new(test_config(&token_path)));

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "refreshed-token",
            "expires_in": 3600,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let token_manager =
        TokenManager::new(config).with_token_url(&format!("{}/token", server.uri()));
    let token = token_manager.get_token().await.unwrap();

    assert_eq!(
        token.get("access_token").and_then(|t| t.as_str()),
        Some("refreshed-token")
    );

    // The refreshed token was written back, keeping the refresh token
    let saved = fs::read_to_string(&token_path).unwrap();
    assert!(saved.contains("refreshed-token"));
    assert!(saved.contains("refresh-123"));
}

/// A missing token file points the user at the authorization binary
#[tokio::test]
async fn test_missing_token_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let token_path = dir.path().join("missing.json");
    let config = Arc::new(RwLock::new(test_config(&token_path.to_string_lossy())));

    let token_manager = TokenManager::new(config);
    let error = token_manager.get_token().await.unwrap_err();

    assert!(error.to_string().contains("get_google_token"));
}
