use super::actor::{GoogleCalendarActor, GoogleCalendarActorHandle, CALENDAR_API_BASE};
use super::models::{CalendarEvent, NewEvent};
use crate::config::Config;
use crate::error::AssistantResult;
use chrono::DateTime;
use chrono_tz::Tz;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Handle for interacting with the Google Calendar actor
#[derive(Clone)]
pub struct GoogleCalendarHandle {
    actor_handle: GoogleCalendarActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl GoogleCalendarHandle {
    /// Create a new GoogleCalendarHandle and spawn the actor
    pub fn new(config: Arc<RwLock<Config>>) -> Self {
        Self::with_api_base(config, CALENDAR_API_BASE)
    }

    /// Create a handle with a custom API base URL, used by tests
    pub fn with_api_base(config: Arc<RwLock<Config>>, api_base: &str) -> Self {
        // Create the actor and get its handle
        let (mut actor, handle) = GoogleCalendarActor::new(config, api_base.to_string());

        // Spawn a task to run the actor
        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// Insert a new event into the calendar
    pub async fn create_event(&self, event: NewEvent) -> AssistantResult<CalendarEvent> {
        self.actor_handle.create_event(event).await
    }

    /// List events between two instants
    pub async fn list_events(
        &self,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    ) -> AssistantResult<Vec<CalendarEvent>> {
        self.actor_handle.list_events(start, end).await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> AssistantResult<()> {
        self.actor_handle.shutdown().await
    }
}
