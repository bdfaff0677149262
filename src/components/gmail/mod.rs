mod actor;
mod handle;
pub mod notifications;

pub use actor::OutgoingEmail;
pub use handle::GmailHandle;

use crate::error::AssistantResult;
use async_trait::async_trait;

/// Anything that can deliver an email on behalf of the assistant
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> AssistantResult<()>;
}
