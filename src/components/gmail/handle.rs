use super::actor::{GmailActor, GmailActorHandle, OutgoingEmail, GMAIL_API_BASE};
use super::Notifier;
use crate::config::Config;
use crate::error::AssistantResult;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Handle for interacting with the Gmail actor
#[derive(Clone)]
pub struct GmailHandle {
    actor_handle: GmailActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl GmailHandle {
    /// Create a new GmailHandle and spawn the actor
    pub fn new(config: Arc<RwLock<Config>>) -> Self {
        Self::with_api_base(config, GMAIL_API_BASE)
    }

    /// Create a handle with a custom API base URL, used by tests
    pub fn with_api_base(config: Arc<RwLock<Config>>, api_base: &str) -> Self {
        // Create the actor and get its handle
        let (mut actor, handle) = GmailActor::new(config, api_base.to_string());

        // Spawn a task to run the actor
        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// Send an email through the Gmail API
    pub async fn send_email(&self, to: &str, subject: &str, body: &str) -> AssistantResult<()> {
        self.actor_handle
            .send_email(OutgoingEmail {
                to: to.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            })
            .await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> AssistantResult<()> {
        self.actor_handle.shutdown().await
    }
}

#[async_trait]
impl Notifier for GmailHandle {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> AssistantResult<()> {
        GmailHandle::send_email(self, to, subject, body).await
    }
}
