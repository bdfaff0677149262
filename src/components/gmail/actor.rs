use crate::components::google_calendar::token::TokenManager;
use crate::config::Config;
use crate::error::{gmail_error, AssistantResult};
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::info;

/// Base URL of the Gmail API
pub const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1";

/// An email about to be sent
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// The Gmail actor that processes messages
pub struct GmailActor {
    config: Arc<RwLock<Config>>,
    token_manager: TokenManager,
    client: Client,
    api_base: String,
    command_rx: mpsc::Receiver<GmailCommand>,
}

/// Commands that can be sent to the Gmail actor
pub enum GmailCommand {
    SendEmail(OutgoingEmail, mpsc::Sender<AssistantResult<()>>),
    Shutdown,
}

/// Handle for communicating with the Gmail actor
#[derive(Clone)]
pub struct GmailActorHandle {
    command_tx: mpsc::Sender<GmailCommand>,
}

impl GmailActorHandle {
    /// Send an email through the Gmail API
    pub async fn send_email(&self, email: OutgoingEmail) -> AssistantResult<()> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(GmailCommand::SendEmail(email, response_tx))
            .await
            .map_err(|e| gmail_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| gmail_error("Response channel closed"))?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> AssistantResult<()> {
        let _ = self.command_tx.send(GmailCommand::Shutdown).await;
        Ok(())
    }
}

impl GmailActor {
    /// Create a new actor and return its handle
    pub fn new(config: Arc<RwLock<Config>>, api_base: String) -> (Self, GmailActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self {
            config: Arc::clone(&config),
            token_manager: TokenManager::new(Arc::clone(&config)),
            client: Client::new(),
            api_base,
            command_rx,
        };

        let handle = GmailActorHandle { command_tx };

        (actor, handle)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Gmail actor started");

        // Process commands
        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                GmailCommand::SendEmail(email, response_tx) => {
                    let result = self.send_email(email).await;
                    let _ = response_tx.send(result).await;
                }
                GmailCommand::Shutdown => {
                    info!("Gmail actor shutting down");
                    break;
                }
            }
        }

        info!("Gmail actor shut down");
    }

    /// Send an email through the Gmail API
    async fn send_email(&self, email: OutgoingEmail) -> AssistantResult<()> {
        let sender = {
            let config_read = self.config.read().await;
            config_read.sender_email.clone()
        };

        // Get authentication token
        let token = self.token_manager.get_token().await?;
        let access_token = token
            .get("access_token")
            .and_then(|t| t.as_str())
            .ok_or_else(|| gmail_error("No access token available"))?;

        let message = build_raw_message(sender.as_deref(), &email.to, &email.subject, &email.body);
        let raw = general_purpose::URL_SAFE_NO_PAD.encode(message);

        let url = format!("{}/users/me/messages/send", self.api_base);

        // Make API request
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", access_token))
            .json(&json!({ "raw": raw }))
            .send()
            .await
            .map_err(|e| gmail_error(&format!("Failed to send email: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(gmail_error(&format!(
                "Failed to send email: HTTP {} - {}",
                status, error_body
            )));
        }

        info!("Email sent to {}", email.to);
        Ok(())
    }
}

/// Build an RFC 2822 message ready for base64url encoding
fn build_raw_message(from: Option<&str>, to: &str, subject: &str, body: &str) -> String {
    let mut message = String::new();
    if let Some(from) = from {
        message.push_str(&format!("From: {}\r\n", from));
    }
    message.push_str(&format!("To: {}\r\n", to));
    message.push_str(&format!("Subject: {}\r\n", encode_subject(subject)));
    message.push_str("MIME-Version: 1.0\r\n");
    message.push_str("Content-Type: text/plain; charset=\"UTF-8\"\r\n");
    message.push_str("Content-Transfer-Encoding: 8bit\r\n");
    message.push_str("\r\n");
    message.push_str(body);
    message
}

/// RFC 2047 encode the subject when it is not plain ASCII
fn encode_subject(subject: &str) -> String {
    if subject.is_ascii() {
        subject.to_string()
    } else {
        format!("=?UTF-8?B?{}?=", general_purpose::STANDARD.encode(subject))
    }
}
