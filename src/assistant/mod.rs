pub mod dates;
pub mod intent;
pub mod parser;
pub mod prompts;
pub mod render;

use crate::components::gmail::{notifications, GmailHandle};
use crate::components::google_calendar::{GoogleCalendarHandle, NewEvent};
use crate::config::Config;
use crate::error::AssistantResult;
use crate::utils::time::{day_range, week_range};
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use intent::Intent;
use rust_i18n::t;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

/// Words that end the console session
const QUIT_WORDS: &[&str] = &["salir", "exit", "quit"];

/// The interactive console assistant
pub struct Assistant {
    config: Arc<RwLock<Config>>,
    timezone: Tz,
    calendar: GoogleCalendarHandle,
    gmail: GmailHandle,
}

impl Assistant {
    pub fn new(
        config: Arc<RwLock<Config>>,
        calendar: GoogleCalendarHandle,
        gmail: GmailHandle,
        timezone: Tz,
    ) -> Self {
        Self {
            config,
            timezone,
            calendar,
            gmail,
        }
    }

    /// Run the console loop until the user quits
    pub async fn run(&self) -> AssistantResult<()> {
        println!("{}", render::greeting());

        loop {
            // Empty input closes the session, same as the quit words
            let Some(input) = prompts::ask(&t!("prompt_main"))? else {
                println!("{}", t!("goodbye"));
                break;
            };
            if is_quit(&input) {
                println!("{}", t!("goodbye"));
                break;
            }
            self.handle_input(&input).await;
        }

        Ok(())
    }

    /// Dispatch one console command, printing errors instead of bailing out
    async fn handle_input(&self, text: &str) {
        let now = Utc::now().with_timezone(&self.timezone);

        let result = match intent::detect_intent(text, now) {
            Intent::Create => self.create_flow(text, now).await,
            Intent::ListToday => {
                self.list_flow(day_range(now.date_naive(), self.timezone)).await
            }
            Intent::ListTomorrow => {
                let range = now
                    .date_naive()
                    .succ_opt()
                    .and_then(|date| day_range(date, self.timezone));
                self.list_flow(range).await
            }
            Intent::ListWeek => self.list_flow(week_range(&now)).await,
            Intent::ListDate(date) => self.list_flow(day_range(date, self.timezone)).await,
            Intent::SendEmail => self.email_flow().await,
            Intent::Unknown => self.unknown_flow(text, now).await,
        };

        if let Err(e) = result {
            error!("Command failed: {:?}", e);
            println!("{}", t!("command_error", error = e.to_string()));
        }
    }

    /// Parse a scheduling command, fill in the gaps, confirm and create
    async fn create_flow(&self, text: &str, now: DateTime<Tz>) -> AssistantResult<()> {
        let mut event = parser::parse_event(text, now);
        let default_duration_min = {
            let config_read = self.config.read().await;
            config_read.default_duration_min
        };

        prompts::complete_event(&mut event, now, default_duration_min)?;

        let (Some(start), Some(title)) = (event.start, event.title.clone()) else {
            println!("{}", t!("missing_essentials"));
            return Ok(());
        };

        println!("{}", render::event_summary(&event, default_duration_min));
        if !prompts::confirm(&t!("prompt_confirm"))? {
            println!("{}", t!("cancelled"));
            return Ok(());
        }

        let duration_min = event.duration_min.unwrap_or(default_duration_min);
        let new_event = NewEvent {
            summary: title,
            location: event.location.clone(),
            description: None,
            start,
            end: start + Duration::minutes(duration_min),
        };

        match self.calendar.create_event(new_event.clone()).await {
            Ok(created) => {
                info!("Created event {}", created.id);
                let link = created.html_link.unwrap_or_default();
                println!("{}", t!("event_created"));
                println!("{}", t!("event_link", link = link));
                self.notify_created(&new_event, &link).await;
            }
            Err(e) => {
                error!("Failed to create event: {:?}", e);
                println!("{}", t!("event_create_error", error = e.to_string()));
            }
        }
        Ok(())
    }

    /// List events in the given range and render them
    async fn list_flow(
        &self,
        range: Option<(DateTime<Tz>, DateTime<Tz>)>,
    ) -> AssistantResult<()> {
        let Some((start, end)) = range else {
            println!("{}", t!("invalid_range"));
            return Ok(());
        };

        match self.calendar.list_events(start, end).await {
            Ok(events) => println!("{}", render::agenda(&events, self.timezone)),
            Err(e) => {
                error!("Failed to list events: {:?}", e);
                println!("{}", t!("agenda_error", error = e.to_string()));
            }
        }
        Ok(())
    }

    /// Compose an email from prompts and send it
    async fn email_flow(&self) -> AssistantResult<()> {
        let default_to = {
            let config_read = self.config.read().await;
            config_read.notify_email.clone()
        };

        let Some(to) = prompts::ask_email_recipient(default_to.as_deref())? else {
            println!("{}", t!("cancelled"));
            return Ok(());
        };
        let Some(subject) = prompts::ask_email_subject()? else {
            println!("{}", t!("cancelled"));
            return Ok(());
        };
        let Some(body) = prompts::ask_email_body()? else {
            println!("{}", t!("cancelled"));
            return Ok(());
        };

        match self.gmail.send_email(&to, &subject, &body).await {
            Ok(()) => println!("{}", t!("email_sent", to = to)),
            Err(e) => {
                error!("Failed to send email: {:?}", e);
                println!("{}", t!("email_error", error = e.to_string()));
            }
        }
        Ok(())
    }

    /// A date or time in otherwise unknown input counts as a scheduling attempt
    async fn unknown_flow(&self, text: &str, now: DateTime<Tz>) -> AssistantResult<()> {
        if parser::parse_event(text, now).start.is_some() {
            return self.create_flow(text, now).await;
        }
        println!("{}", render::help());
        Ok(())
    }

    /// Send the notification email after an event was created
    async fn notify_created(&self, event: &NewEvent, link: &str) {
        let notify_email = {
            let config_read = self.config.read().await;
            config_read.notify_email.clone()
        };

        match notifications::send_created_notification(
            &self.gmail,
            notify_email.as_deref(),
            event,
            link,
        )
        .await
        {
            Ok(true) => {
                if let Some(to) = notify_email {
                    println!("{}", t!("email_sent", to = to));
                }
            }
            Ok(false) => {}
            Err(e) => {
                error!("Failed to send notification email: {:?}", e);
                println!("{}", t!("email_error", error = e.to_string()));
            }
        }
    }
}

fn is_quit(input: &str) -> bool {
    QUIT_WORDS.contains(&dates::normalize(input).as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_words() {
        assert!(is_quit("salir"));
        assert!(is_quit("Salir"));
        assert!(is_quit("exit"));
        assert!(is_quit("quit"));
        assert!(!is_quit("seguir"));
        assert!(!is_quit("salir ya"));
    }
}
