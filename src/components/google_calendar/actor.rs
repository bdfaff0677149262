use super::models::{CalendarEvent, NewEvent};
use super::token::TokenManager;
use crate::config::Config;
use crate::error::{google_calendar_error, AssistantResult};
use chrono::DateTime;
use chrono_tz::Tz;
use reqwest::Client;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::info;
use url::Url;

/// Base URL of the Google Calendar API
pub const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// The Google Calendar actor that processes messages
pub struct GoogleCalendarActor {
    config: Arc<RwLock<Config>>,
    token_manager: TokenManager,
    client: Client,
    api_base: String,
    command_rx: mpsc::Receiver<GoogleCalendarCommand>,
}

/// Commands that can be sent to the Google Calendar actor
pub enum GoogleCalendarCommand {
    CreateEvent(NewEvent, mpsc::Sender<AssistantResult<CalendarEvent>>),
    ListEvents(
        DateTime<Tz>,
        DateTime<Tz>,
        mpsc::Sender<AssistantResult<Vec<CalendarEvent>>>,
    ),
    Shutdown,
}

/// Handle for communicating with the Google Calendar actor
#[derive(Clone)]
pub struct GoogleCalendarActorHandle {
    command_tx: mpsc::Sender<GoogleCalendarCommand>,
}

impl GoogleCalendarActorHandle {
    /// Insert a new event into the calendar
    pub async fn create_event(&self, event: NewEvent) -> AssistantResult<CalendarEvent> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(GoogleCalendarCommand::CreateEvent(event, response_tx))
            .await
            .map_err(|e| google_calendar_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| google_calendar_error("Response channel closed"))?
    }

    /// List events between two instants
    pub async fn list_events(
        &self,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    ) -> AssistantResult<Vec<CalendarEvent>> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(GoogleCalendarCommand::ListEvents(start, end, response_tx))
            .await
            .map_err(|e| google_calendar_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| google_calendar_error("Response channel closed"))?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> AssistantResult<()> {
        let _ = self.command_tx.send(GoogleCalendarCommand::Shutdown).await;
        Ok(())
    }
}

impl GoogleCalendarActor {
    /// Create a new actor and return its handle
    pub fn new(
        config: Arc<RwLock<Config>>,
        api_base: String,
    ) -> (Self, GoogleCalendarActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self {
            config: Arc::clone(&config),
            token_manager: TokenManager::new(Arc::clone(&config)),
            client: Client::new(),
            api_base,
            command_rx,
        };

        let handle = GoogleCalendarActorHandle { command_tx };

        (actor, handle)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Google Calendar actor started");

        // Process commands
        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                GoogleCalendarCommand::CreateEvent(event, response_tx) => {
                    let result = self.create_event(event).await;
                    let _ = response_tx.send(result).await;
                }
                GoogleCalendarCommand::ListEvents(start, end, response_tx) => {
                    let result = self.list_events(start, end).await;
                    let _ = response_tx.send(result).await;
                }
                GoogleCalendarCommand::Shutdown => {
                    info!("Google Calendar actor shutting down");
                    break;
                }
            }
        }

        info!("Google Calendar actor shut down");
    }

    /// Insert a new event into the calendar
    async fn create_event(&self, event: NewEvent) -> AssistantResult<CalendarEvent> {
        // Get calendar ID from config
        let calendar_id = {
            let config_read = self.config.read().await;
            config_read.google_calendar_id.clone()
        };

        // Get authentication token
        let token = self.token_manager.get_token().await?;
        let access_token = token
            .get("access_token")
            .and_then(|t| t.as_str())
            .ok_or_else(|| google_calendar_error("No access token available"))?;

        let timezone = event.start.timezone().name();
        let body = json!({
            "summary": event.summary,
            "location": event.location.unwrap_or_default(),
            "description": event.description.unwrap_or_default(),
            "start": {
                "dateTime": event.start.to_rfc3339(),
                "timeZone": timezone,
            },
            "end": {
                "dateTime": event.end.to_rfc3339(),
                "timeZone": timezone,
            },
        });

        let url = format!("{}/calendars/{}/events", self.api_base, calendar_id);

        // Make API request
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", access_token))
            .json(&body)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to create event: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to create event: HTTP {} - {}",
                status, error_body
            )));
        }

        let created: serde_json::Value = response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse event response: {}", e)))?;

        Ok(event_from_json(&created))
    }

    /// List events between two instants
    async fn list_events(
        &self,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    ) -> AssistantResult<Vec<CalendarEvent>> {
        // Get calendar ID from config
        let calendar_id = {
            let config_read = self.config.read().await;
            config_read.google_calendar_id.clone()
        };

        // Get authentication token
        let token = self.token_manager.get_token().await?;
        let access_token = token
            .get("access_token")
            .and_then(|t| t.as_str())
            .ok_or_else(|| google_calendar_error("No access token available"))?;

        // Build URL with query parameters
        let url_str = format!("{}/calendars/{}/events", self.api_base, calendar_id);

        let mut url = Url::parse(&url_str)
            .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;

        let mut query_params = HashMap::new();
        query_params.insert("timeMin", start.to_rfc3339());
        query_params.insert("timeMax", end.to_rfc3339());
        query_params.insert("singleEvents", "true".to_string());
        query_params.insert("orderBy", "startTime".to_string());

        for (key, value) in query_params {
            url.query_pairs_mut().append_pair(key, &value);
        }

        // Make API request
        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to fetch events: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to fetch events: HTTP {} - {}",
                status, error_body
            )));
        }

        let response_data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse events response: {}", e)))?;

        // Parse events from response
        let events = response_data
            .get("items")
            .and_then(|i| i.as_array())
            .ok_or_else(|| google_calendar_error("No items in response"))?;

        Ok(events.iter().map(event_from_json).collect())
    }
}

/// Convert one event from the API response into a CalendarEvent
fn event_from_json(event: &serde_json::Value) -> CalendarEvent {
    let id = event
        .get("id")
        .and_then(|id| id.as_str())
        .unwrap_or("")
        .to_string();
    let summary = event
        .get("summary")
        .and_then(|s| s.as_str())
        .map(|s| s.to_string());
    let description = event
        .get("description")
        .and_then(|s| s.as_str())
        .map(|s| s.to_string());
    let location = event
        .get("location")
        .and_then(|s| s.as_str())
        .map(|s| s.to_string());
    let html_link = event
        .get("htmlLink")
        .and_then(|s| s.as_str())
        .map(|s| s.to_string());

    let start_date_time = event
        .get("start")
        .and_then(|start| start.as_object())
        .and_then(|start| start.get("dateTime"))
        .and_then(|dt| dt.as_str())
        .map(|s| s.to_string());

    let start_date = event
        .get("start")
        .and_then(|start| start.as_object())
        .and_then(|start| start.get("date"))
        .and_then(|d| d.as_str())
        .map(|s| s.to_string());

    let end_date_time = event
        .get("end")
        .and_then(|end| end.as_object())
        .and_then(|end| end.get("dateTime"))
        .and_then(|dt| dt.as_str())
        .map(|s| s.to_string());

    let end_date = event
        .get("end")
        .and_then(|end| end.as_object())
        .and_then(|end| end.get("date"))
        .and_then(|d| d.as_str())
        .map(|s| s.to_string());

    CalendarEvent {
        id,
        summary,
        description,
        location,
        html_link,
        start_date_time,
        start_date,
        end_date_time,
        end_date,
    }
}
