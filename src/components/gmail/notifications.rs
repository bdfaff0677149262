use super::Notifier;
use crate::components::google_calendar::NewEvent;
use crate::error::AssistantResult;
use crate::utils::time::format_start;
use rust_i18n::t;
use tracing::info;

/// Send the "event created" notification email
///
/// Returns false when no recipient is configured and the email was skipped.
pub async fn send_created_notification(
    notifier: &dyn Notifier,
    to: Option<&str>,
    event: &NewEvent,
    link: &str,
) -> AssistantResult<bool> {
    let Some(to) = to else {
        info!("No notification email configured, skipping notification");
        return Ok(false);
    };

    let subject = t!("email_subject");
    let body = t!(
        "email_body",
        title = event.summary,
        start = format_start(&event.start),
        location = event.location.as_deref().unwrap_or("—"),
        link = link
    );

    notifier.send_email(to, &subject, &body).await?;
    Ok(true)
}
